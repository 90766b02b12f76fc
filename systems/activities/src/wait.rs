use skirmish_core::ActorId;
use skirmish_world::World;

use crate::{Activity, ActivityResult, Chain};

/// Idles for a fixed number of frames.
#[derive(Debug)]
pub struct Wait {
    remaining: u32,
    chain: Chain,
}

impl Wait {
    /// Creates an activity that stays current for `frames` ticks.
    #[must_use]
    pub fn new(frames: u32) -> Self {
        Self {
            remaining: frames,
            chain: Chain::default(),
        }
    }
}

impl Activity for Wait {
    fn name(&self) -> &'static str {
        "Wait"
    }

    fn tick(&mut self, _actor: ActorId, _world: &mut World) -> ActivityResult {
        if self.chain.is_canceled() || self.remaining == 0 {
            return self.chain.advance();
        }
        self.remaining -= 1;
        ActivityResult::Continue
    }

    fn cancel(&mut self) {
        self.chain.cancel();
    }

    fn is_canceled(&self) -> bool {
        self.chain.is_canceled()
    }

    fn queue(&mut self, next: Box<dyn Activity>) {
        self.chain.queue(next);
    }
}
