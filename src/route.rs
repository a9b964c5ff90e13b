//! Decoded directions: routes, legs and steps.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::polyline::Polyline;
use crate::request::{LatLng, TravelMode};

/// Status value the service uses for a successful lookup.
pub const STATUS_OK: &str = "OK";

/// Integer quantity paired with the service's human-readable rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextValue {
    pub value: u64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl Bounds {
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.southwest.lat
            && point.lat <= self.northeast.lat
            && point.lng >= self.southwest.lng
            && point.lng <= self.northeast.lng
    }
}

/// One alternative returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub summary: String,
    pub bounds: Bounds,
    pub legs: Vec<Leg>,
    pub overview: Polyline,
    /// Overview geometry as received, before decoding.
    pub overview_encoded: String,
    pub copyrights: Option<String>,
    pub warnings: Vec<String>,
}

impl Route {
    /// Total distance over all legs, in meters.
    pub fn distance_meters(&self) -> u64 {
        self.legs.iter().map(|leg| leg.distance.value).sum()
    }

    /// Total duration over all legs, in seconds.
    pub fn duration_seconds(&self) -> u64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }
}

/// Portion of a route between two consecutive stopping waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub start_location: LatLng,
    pub end_location: LatLng,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub distance: TextValue,
    pub duration: TextValue,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub polyline: Polyline,
    pub distance: TextValue,
    pub duration: TextValue,
    pub start_location: LatLng,
    pub end_location: LatLng,
    pub travel_mode: TravelMode,
    pub maneuver: Option<String>,
    /// HTML-formatted instruction text.
    pub instructions: Option<String>,
}

/// Decodes a directions response body into its routes.
///
/// A non-OK `status` becomes [`RoutingError::ServiceStatus`]; any shape
/// mismatch, including an undecodable polyline, becomes
/// [`RoutingError::MalformedResponse`].
pub fn decode_response(body: &str) -> Result<Vec<Route>, RoutingError> {
    let envelope: StatusEnvelope = serde_json::from_str(body)?;
    if envelope.status != STATUS_OK {
        warn!(status = %envelope.status, message = ?envelope.error_message, "directions service reported failure");
        return Err(RoutingError::ServiceStatus {
            status: envelope.status,
            message: envelope.error_message,
        });
    }

    let response: DirectionsResponse = serde_json::from_str(body)?;
    let routes = response
        .routes
        .into_iter()
        .map(Route::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(routes = routes.len(), "decoded directions response");
    Ok(routes)
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<RouteBody>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    summary: String,
    bounds: Bounds,
    legs: Vec<LegBody>,
    overview_polyline: EncodedPolyline,
    #[serde(default)]
    copyrights: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegBody {
    start_location: LatLng,
    end_location: LatLng,
    #[serde(default)]
    start_address: Option<String>,
    #[serde(default)]
    end_address: Option<String>,
    distance: TextValue,
    duration: TextValue,
    steps: Vec<StepBody>,
}

#[derive(Debug, Deserialize)]
struct StepBody {
    polyline: EncodedPolyline,
    distance: TextValue,
    duration: TextValue,
    start_location: LatLng,
    end_location: LatLng,
    travel_mode: TravelMode,
    #[serde(default)]
    maneuver: Option<String>,
    #[serde(default)]
    html_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

impl TryFrom<RouteBody> for Route {
    type Error = RoutingError;

    fn try_from(body: RouteBody) -> Result<Self, Self::Error> {
        let overview = Polyline::decode(&body.overview_polyline.points)?;
        let legs = body
            .legs
            .into_iter()
            .map(Leg::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Route {
            summary: body.summary,
            bounds: body.bounds,
            legs,
            overview,
            overview_encoded: body.overview_polyline.points,
            copyrights: body.copyrights,
            warnings: body.warnings,
        })
    }
}

impl TryFrom<LegBody> for Leg {
    type Error = RoutingError;

    fn try_from(body: LegBody) -> Result<Self, Self::Error> {
        let steps = body
            .steps
            .into_iter()
            .map(Step::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Leg {
            start_location: body.start_location,
            end_location: body.end_location,
            start_address: body.start_address,
            end_address: body.end_address,
            distance: body.distance,
            duration: body.duration,
            steps,
        })
    }
}

impl TryFrom<StepBody> for Step {
    type Error = RoutingError;

    fn try_from(body: StepBody) -> Result<Self, Self::Error> {
        Ok(Step {
            polyline: Polyline::decode(&body.polyline.points)?,
            distance: body.distance,
            duration: body.duration,
            start_location: body.start_location,
            end_location: body.end_location,
            travel_mode: body.travel_mode,
            maneuver: body.maneuver,
            instructions: body.html_instructions,
        })
    }
}
