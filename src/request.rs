//! Routing request parameters and their query-string encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, RoutingError};
use crate::task::{BestRouteSelector, RoutingTask};
use crate::traits::RoutingListener;
use crate::transport::DirectionsConfig;

/// A latitude/longitude pair in degrees.
///
/// Field names match the service's `{"lat": .., "lng": ..}` objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    /// Locale-independent `lat,lng`, always with a fractional part.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_degrees(f, self.lat)?;
        f.write_str(",")?;
        write_degrees(f, self.lng)
    }
}

fn write_degrees(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    // `Display` for f64 never uses exponent notation, but drops ".0" on integers.
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        f.write_str(&text)
    } else {
        write!(f, "{}.0", text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Lowercase token used for the `mode` query parameter.
    pub fn token(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

/// Route preference. Not sent on the wire; the service has no matching parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouteMode {
    #[default]
    Fastest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvoidKind {
    Tolls,
    Highways,
    Ferries,
    Indoor,
}

impl AvoidKind {
    /// All kinds in canonical bit order.
    pub const ALL: [AvoidKind; 4] = [
        AvoidKind::Tolls,
        AvoidKind::Highways,
        AvoidKind::Ferries,
        AvoidKind::Indoor,
    ];

    pub fn bit(self) -> u8 {
        match self {
            AvoidKind::Tolls => 1,
            AvoidKind::Highways => 1 << 1,
            AvoidKind::Ferries => 1 << 2,
            AvoidKind::Indoor => 1 << 3,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            AvoidKind::Tolls => "tolls",
            AvoidKind::Highways => "highways",
            AvoidKind::Ferries => "ferries",
            AvoidKind::Indoor => "indoor",
        }
    }
}

/// Bit set of [`AvoidKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AvoidKinds(u8);

impl AvoidKinds {
    pub const NONE: AvoidKinds = AvoidKinds(0);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, kind: AvoidKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: AvoidKind) {
        self.0 |= kind.bit();
    }

    /// Set kinds in canonical bit order.
    pub fn iter(self) -> impl Iterator<Item = AvoidKind> {
        AvoidKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }

    /// `|`-joined tokens for the `avoid` query parameter.
    pub fn request_param(self) -> String {
        self.iter().map(AvoidKind::token).collect::<Vec<_>>().join("|")
    }
}

impl FromIterator<AvoidKind> for AvoidKinds {
    fn from_iter<I: IntoIterator<Item = AvoidKind>>(iter: I) -> Self {
        let mut kinds = AvoidKinds::NONE;
        for kind in iter {
            kinds.insert(kind);
        }
        kinds
    }
}

/// Raw routing parameters, validated by [`Routing::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingOptions {
    pub travel_mode: TravelMode,
    pub route_mode: RouteMode,
    pub waypoints: Vec<LatLng>,
    pub avoid: AvoidKinds,
    pub optimize: bool,
    /// Opaque API key. Never validated locally.
    pub key: Option<String>,
}

/// An immutable, validated routing request.
#[derive(Clone, PartialEq)]
pub struct Routing {
    options: RoutingOptions,
}

impl Routing {
    /// Validates `options`. Nothing is corrected silently.
    pub fn new(options: RoutingOptions) -> Result<Self, ConfigurationError> {
        let count = options.waypoints.len();
        if count < 2 {
            return Err(ConfigurationError::TooFewWaypoints { count });
        }
        if options.optimize && count < 3 {
            return Err(ConfigurationError::OptimizeNeedsViaPoints { count });
        }
        Ok(Self { options })
    }

    pub fn builder() -> RoutingBuilder {
        RoutingBuilder::default()
    }

    pub fn travel_mode(&self) -> TravelMode {
        self.options.travel_mode
    }

    pub fn route_mode(&self) -> RouteMode {
        self.options.route_mode
    }

    pub fn waypoints(&self) -> &[LatLng] {
        &self.options.waypoints
    }

    pub fn avoid(&self) -> AvoidKinds {
        self.options.avoid
    }

    pub fn optimize(&self) -> bool {
        self.options.optimize
    }

    pub fn key(&self) -> Option<&str> {
        self.options.key.as_deref()
    }

    pub fn origin(&self) -> LatLng {
        self.options.waypoints[0]
    }

    pub fn destination(&self) -> LatLng {
        self.options.waypoints[self.options.waypoints.len() - 1]
    }

    /// Interior waypoints, in order.
    pub fn via_points(&self) -> &[LatLng] {
        let waypoints = &self.options.waypoints;
        &waypoints[1..waypoints.len() - 1]
    }

    /// Encodes the query string (without a leading `?`).
    ///
    /// `language` is the caller's locale language code, e.g. `"en"`.
    pub fn query(&self, language: &str) -> String {
        let mut query = String::new();

        if let Some(key) = &self.options.key {
            query.push_str(&format!("key={}&", key));
        }

        query.push_str(&format!("origin={}", self.origin()));
        query.push_str(&format!("&destination={}", self.destination()));
        query.push_str(&format!("&mode={}", self.options.travel_mode.token()));

        if self.options.waypoints.len() > 2 {
            query.push_str("&waypoints=");
            if self.options.optimize {
                query.push_str("optimize:true|");
            }
            // `via:` keeps the service from splitting legs at interior points.
            for point in self.via_points() {
                query.push_str(&format!("via:{}|", point));
            }
        }

        if !self.options.avoid.is_empty() {
            query.push_str(&format!("&avoid={}", self.options.avoid.request_param()));
        }

        query.push_str("&alternatives=true");
        query.push_str(&format!("&language={}", language));
        query.push_str("&sensor=true");

        query
    }

    /// Full request URL against the configured endpoint.
    pub fn url(&self, config: &DirectionsConfig) -> String {
        format!("{}?{}", config.base_url, self.query(&config.language))
    }
}

impl fmt::Debug for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routing")
            .field("travel_mode", &self.options.travel_mode)
            .field("route_mode", &self.options.route_mode)
            .field("waypoints", &self.options.waypoints)
            .field("avoid", &self.options.avoid)
            .field("optimize", &self.options.optimize)
            .field("key", &self.options.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}, {} via)",
            self.origin(),
            self.destination(),
            self.options.travel_mode.token(),
            self.via_points().len()
        )
    }
}

/// Fluent assembly of a [`RoutingOptions`] plus the task's listener.
#[derive(Default)]
pub struct RoutingBuilder {
    options: RoutingOptions,
    listener: Option<Box<dyn RoutingListener>>,
    selector: Option<BestRouteSelector>,
}

impl RoutingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn travel_mode(mut self, mode: TravelMode) -> Self {
        self.options.travel_mode = mode;
        self
    }

    pub fn route_mode(mut self, mode: RouteMode) -> Self {
        self.options.route_mode = mode;
        self
    }

    /// Replaces any previously configured waypoints.
    pub fn waypoints<I, P>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<LatLng>,
    {
        self.options.waypoints = points.into_iter().map(Into::into).collect();
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.options.optimize = optimize;
        self
    }

    /// Adds to the avoid set; earlier kinds stay set.
    pub fn avoid<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = AvoidKind>,
    {
        for kind in kinds {
            self.options.avoid.insert(kind);
        }
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.options.key = Some(key.into());
        self
    }

    pub fn listener(mut self, listener: impl RoutingListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Overrides which returned alternative is reported as best.
    pub fn best_route<F>(mut self, selector: F) -> Self
    where
        F: Fn(&[crate::route::Route]) -> usize + 'static,
    {
        self.selector = Some(Box::new(selector));
        self
    }

    /// Validates the request and wraps it in an idle task.
    pub fn build(self) -> Result<RoutingTask, RoutingError> {
        let routing = Routing::new(self.options)?;
        Ok(RoutingTask::new(routing, self.listener, self.selector))
    }
}
