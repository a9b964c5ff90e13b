//! Seams between the routing core and its collaborators.
//!
//! The HTTP stack and the result receiver are supplied by the caller; the
//! core only encodes requests, decodes responses and sequences callbacks.

use crate::error::{RoutingError, TransportError};
use crate::route::Route;

/// Blocking HTTP GET against a fully encoded URL.
///
/// Called from a background worker, so implementations must be shareable
/// across threads. Returns the response body on a successful status.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// Receiver of routing task outcomes.
///
/// Callbacks run on the thread that owns the task (inside `start`, `cancel`,
/// `poll` or `wait`). At most one of success, failure or cancelled is ever
/// invoked for a given task.
pub trait RoutingListener {
    fn on_routing_start(&mut self) {}

    /// `best_route_index` is a valid index into `routes`.
    fn on_routing_success(&mut self, routes: Vec<Route>, best_route_index: usize);

    fn on_routing_failure(&mut self, error: RoutingError);

    fn on_routing_cancelled(&mut self) {}
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String, TransportError> + Send + Sync,
{
    fn get(&self, url: &str) -> Result<String, TransportError> {
        self(url)
    }
}
