//! Background fetch-and-decode of a single routing request.
//!
//! `Idle -> Running -> {Succeeded, Failed, Cancelled}`. The HTTP call and
//! the decode run on the rayon pool; the outcome comes back over a channel
//! and the listener is invoked on the owning thread from `poll` or `wait`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::request::Routing;
use crate::route::{decode_response, Route};
use crate::traits::{RoutingListener, Transport};
use crate::transport::DirectionsClient;

/// Picks the index of the best alternative from a non-empty route list.
pub type BestRouteSelector = Box<dyn Fn(&[Route]) -> usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Cancelled
        )
    }
}

type Outcome = Result<Vec<Route>, RoutingError>;

pub struct RoutingTask {
    routing: Arc<Routing>,
    listener: Option<Box<dyn RoutingListener>>,
    selector: Option<BestRouteSelector>,
    state: TaskState,
    cancelled: Arc<AtomicBool>,
    receiver: Option<Receiver<Outcome>>,
}

impl RoutingTask {
    pub(crate) fn new(
        routing: Routing,
        listener: Option<Box<dyn RoutingListener>>,
        selector: Option<BestRouteSelector>,
    ) -> Self {
        Self {
            routing: Arc::new(routing),
            listener,
            selector,
            state: TaskState::Idle,
            cancelled: Arc::new(AtomicBool::new(false)),
            receiver: None,
        }
    }

    pub fn request(&self) -> &Routing {
        &self.routing
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Issues the request in the background. Only valid from `Idle`.
    pub fn start(&mut self, client: &DirectionsClient) -> Result<(), RoutingError> {
        if self.state != TaskState::Idle {
            return Err(RoutingError::IllegalState {
                action: "start",
                state: self.state,
            });
        }

        let url = client.url_for(&self.routing);
        let transport = client.transport();
        let cancelled = Arc::clone(&self.cancelled);
        let (sender, receiver) = mpsc::channel();

        self.receiver = Some(receiver);
        self.state = TaskState::Running;
        debug!(request = %self.routing, "routing task started");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_routing_start();
        }

        rayon::spawn(move || {
            if cancelled.load(Ordering::Acquire) {
                return;
            }
            // Unwinding out of `rayon::spawn` aborts the process.
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| fetch(transport.as_ref(), &url)))
                .unwrap_or_else(|payload| Err(worker_panicked(payload.as_ref())));
            if !cancelled.load(Ordering::Acquire) {
                // The task may already be gone; nobody is left to notify.
                let _ = sender.send(outcome);
            }
        });

        Ok(())
    }

    /// Cancels a running task. No success or failure callback follows.
    pub fn cancel(&mut self) -> Result<(), RoutingError> {
        if self.state != TaskState::Running {
            return Err(RoutingError::IllegalState {
                action: "cancel",
                state: self.state,
            });
        }

        self.cancelled.store(true, Ordering::Release);
        self.receiver = None;
        self.state = TaskState::Cancelled;
        debug!(request = %self.routing, "routing task cancelled");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_routing_cancelled();
        }

        Ok(())
    }

    /// Delivers the outcome if it has arrived. Never blocks.
    pub fn poll(&mut self) -> TaskState {
        if self.state != TaskState::Running {
            return self.state;
        }

        let received = match self.receiver.as_ref().map(Receiver::try_recv) {
            Some(Ok(outcome)) => outcome,
            Some(Err(TryRecvError::Empty)) => return self.state,
            Some(Err(TryRecvError::Disconnected)) | None => Err(worker_lost()),
        };
        self.deliver(received);
        self.state
    }

    /// Blocks until the task reaches a terminal state and delivers its outcome.
    pub fn wait(&mut self) -> TaskState {
        if self.state != TaskState::Running {
            return self.state;
        }

        let received = match self.receiver.as_ref().map(Receiver::recv) {
            Some(Ok(outcome)) => outcome,
            Some(Err(_)) | None => Err(worker_lost()),
        };
        self.deliver(received);
        self.state
    }

    fn deliver(&mut self, outcome: Outcome) {
        self.receiver = None;

        match outcome.and_then(non_empty) {
            Ok(routes) => {
                let best = self.best_route_index(&routes);
                self.state = TaskState::Succeeded;
                debug!(routes = routes.len(), best, "routing task succeeded");
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_routing_success(routes, best);
                }
            }
            Err(err) => {
                self.state = TaskState::Failed;
                warn!(error = %err, "routing task failed");
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_routing_failure(err);
                }
            }
        }
    }

    fn best_route_index(&self, routes: &[Route]) -> usize {
        let Some(selector) = self.selector.as_ref() else {
            return 0;
        };

        let index = selector(routes);
        if index < routes.len() {
            index
        } else {
            warn!(index, routes = routes.len(), "best route index out of range, using first");
            0
        }
    }
}

fn fetch(transport: &dyn Transport, url: &str) -> Outcome {
    let body = transport.get(url)?;
    decode_response(&body)
}

fn non_empty(routes: Vec<Route>) -> Outcome {
    if routes.is_empty() {
        Err(RoutingError::MalformedResponse(
            "OK status without any routes".to_string(),
        ))
    } else {
        Ok(routes)
    }
}

fn worker_panicked(payload: &(dyn Any + Send)) -> RoutingError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    warn!(detail = %detail, "routing worker panicked");
    RoutingError::Transport(crate::error::TransportError::Other(format!(
        "routing worker panicked: {}",
        detail
    )))
}

fn worker_lost() -> RoutingError {
    RoutingError::Transport(crate::error::TransportError::Other(
        "routing worker exited without a result".to_string(),
    ))
}
