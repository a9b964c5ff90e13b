//! directions-route
//!
//! Request builder and response interpreter for a remote directions service.

pub mod error;
pub mod traits;
pub mod request;
pub mod polyline;
pub mod route;
pub mod transport;
pub mod task;

pub use error::{ConfigurationError, PolylineError, RoutingError, TransportError};
pub use polyline::Polyline;
pub use request::{AvoidKind, AvoidKinds, LatLng, RouteMode, Routing, RoutingBuilder, RoutingOptions, TravelMode};
pub use route::{Bounds, Leg, Route, Step, TextValue};
pub use task::{BestRouteSelector, RoutingTask, TaskState};
pub use traits::{RoutingListener, Transport};
pub use transport::{DirectionsClient, DirectionsConfig, HttpTransport};
