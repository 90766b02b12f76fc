#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative per-frame activity engine.
//!
//! Every actor runs at most one [`Activity`] at a time; the activity holds the
//! rest of the actor's queued behaviour as a chain of successors. The
//! [`Activities`] scheduler advances each chain exactly once per frame and then
//! flushes the world's frame-end queue, so activities only ever observe the
//! world as it stood at the start of the frame.

mod capture;
mod enter_transport;
mod scheduler;
mod wait;

use std::fmt;

use skirmish_core::ActorId;
use skirmish_world::World;

pub use capture::CaptureBuilding;
pub use enter_transport::EnterTransport;
pub use scheduler::Activities;
pub use wait::Wait;

/// Outcome of ticking an activity once.
#[derive(Debug)]
pub enum ActivityResult {
    /// Keep the same activity current for the next frame.
    Continue,
    /// Replace the activity with its successor; `None` leaves the actor idle.
    Advance(Option<Box<dyn Activity>>),
    /// Drop the activity together with every queued successor.
    Terminate,
}

/// One unit of per-frame actor behaviour.
pub trait Activity: fmt::Debug {
    /// Short name used for logging and inspection.
    fn name(&self) -> &'static str;

    /// Advances the activity by one frame on behalf of `actor`.
    fn tick(&mut self, actor: ActorId, world: &mut World) -> ActivityResult;

    /// Requests cancellation. Takes effect on the next tick.
    fn cancel(&mut self);

    /// Reports whether cancellation has been requested.
    fn is_canceled(&self) -> bool;

    /// Appends an activity to the end of the chain.
    fn queue(&mut self, next: Box<dyn Activity>);
}

/// Cancellation flag and successor link shared by every activity type.
#[derive(Debug, Default)]
pub struct Chain {
    canceled: bool,
    next: Option<Box<dyn Activity>>,
}

impl Chain {
    /// Marks the owning activity as canceled.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    /// Reports whether the owning activity was canceled.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Appends an activity after the last link of the chain.
    pub fn queue(&mut self, activity: Box<dyn Activity>) {
        match &mut self.next {
            Some(next) => next.queue(activity),
            None => self.next = Some(activity),
        }
    }

    /// Hands the successor over, leaving the owning activity finished.
    #[must_use]
    pub fn advance(&mut self) -> ActivityResult {
        ActivityResult::Advance(self.next.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_queues_at_the_end() {
        let mut chain = Chain::default();
        chain.queue(Box::new(Wait::new(1)));
        chain.queue(Box::new(Wait::new(2)));

        let ActivityResult::Advance(Some(first)) = chain.advance() else {
            panic!("expected a successor");
        };
        assert_eq!(first.name(), "Wait");
        assert!(matches!(chain.advance(), ActivityResult::Advance(None)));
    }

    #[test]
    fn cancel_sets_flag() {
        let mut chain = Chain::default();
        assert!(!chain.is_canceled());
        chain.cancel();
        assert!(chain.is_canceled());
    }
}
