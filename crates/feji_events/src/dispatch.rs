//! A single dispatch: the handler snapshot, its progress, and the outcome.

use std::sync::Arc;

use feji_foundation::Error;

use crate::bus::RegisteredHandler;
use crate::event::Event;

/// Progress of a dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// No handler has run yet.
    Pending,
    /// The handler at this index ran last.
    Running(usize),
    /// Every handler has run.
    Completed,
}

/// A handler that returned an error.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Name of the handler.
    pub handler: Arc<str>,
    /// What it reported, with the handler pushed as a frame.
    pub error: Error,
}

/// Outcome of a publication.
#[derive(Debug)]
pub struct DispatchReport {
    /// The event as the last handler left it.
    pub event: Event,
    /// How many handlers ran.
    pub handlers_run: usize,
    /// Handlers that failed, in the order they ran.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Whether the host should suppress the triggering action.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        self.event.is_cancelled()
    }

    /// True if every handler succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One in-flight publication.
///
/// Owns a snapshot of the handlers taken when it began, so handlers
/// registered mid-dispatch only see later events.
#[derive(Debug)]
pub struct Dispatch<C> {
    event: Event,
    handlers: Vec<RegisteredHandler<C>>,
    state: DispatchState,
    failures: Vec<HandlerFailure>,
}

impl<C> Dispatch<C> {
    pub(crate) fn new(event: Event, handlers: Vec<RegisteredHandler<C>>) -> Self {
        Self {
            event,
            handlers,
            state: DispatchState::Pending,
            failures: Vec::new(),
        }
    }

    /// Current progress.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// The event being dispatched.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Runs the next handler. Returns false once the dispatch is complete.
    pub fn step(&mut self, host: &mut C) -> bool {
        let next = match self.state {
            DispatchState::Pending => 0,
            DispatchState::Running(i) => i + 1,
            DispatchState::Completed => return false,
        };
        let Some(entry) = self.handlers.get(next).cloned() else {
            self.state = DispatchState::Completed;
            return false;
        };

        self.state = DispatchState::Running(next);
        if let Err(error) = (entry.handler)(host, &mut self.event) {
            tracing::warn!(
                event = %self.event.kind(),
                handler = %entry.name,
                %error,
                "handler failed"
            );
            self.failures.push(HandlerFailure {
                error: error.in_frame(format!("handler {}", entry.name)),
                handler: entry.name,
            });
        }
        true
    }

    /// Runs every remaining handler.
    pub fn run(&mut self, host: &mut C) {
        while self.step(host) {}
    }

    pub(crate) fn into_report(self) -> DispatchReport {
        let handlers_run = match self.state {
            DispatchState::Pending => 0,
            DispatchState::Running(i) => i + 1,
            DispatchState::Completed => self.handlers.len(),
        };
        DispatchReport {
            event: self.event,
            handlers_run,
            failures: self.failures,
        }
    }
}
