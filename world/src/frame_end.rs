//! Frame-end queue holding deferred world mutations.

use skirmish_core::Command;

/// Ordered batch of commands waiting for the next flush.
#[derive(Debug, Default)]
pub(crate) struct FrameEndQueue {
    pending: Vec<Command>,
}

impl FrameEndQueue {
    pub(crate) fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Detaches the current batch so commands queued while it runs wait a frame.
    pub(crate) fn take_batch(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn pending(&self) -> &[Command] {
        &self.pending
    }
}
