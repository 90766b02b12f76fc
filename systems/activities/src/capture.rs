use skirmish_core::{ActorId, Command};
use skirmish_world::{query, World};
use tracing::{debug, trace};

use crate::{Activity, ActivityResult, Chain};

/// Captures a building the actor is standing inside.
///
/// The capture itself lands when the world flushes; the capturing actor is
/// consumed in the process. No pathing happens here, so the actor must already
/// occupy one of the target's cells.
#[derive(Debug)]
pub struct CaptureBuilding {
    target: ActorId,
    chain: Chain,
}

impl CaptureBuilding {
    /// Creates a capture order against `target`.
    #[must_use]
    pub fn new(target: ActorId) -> Self {
        Self {
            target,
            chain: Chain::default(),
        }
    }
}

impl Activity for CaptureBuilding {
    fn name(&self) -> &'static str {
        "CaptureBuilding"
    }

    fn tick(&mut self, actor: ActorId, world: &mut World) -> ActivityResult {
        if self.chain.is_canceled() {
            return self.chain.advance();
        }

        let Some(target) = query::actor(world, self.target) else {
            trace!(%actor, target = %self.target, "capture target unknown");
            return self.chain.advance();
        };
        if !target.is_in_world() || !target.is_alive() {
            trace!(%actor, target = %self.target, "capture target gone");
            return self.chain.advance();
        }
        let Some(capturer) = query::actor(world, actor) else {
            return self.chain.advance();
        };
        if target.owner() == capturer.owner() {
            trace!(%actor, target = %self.target, "capture target already owned");
            return self.chain.advance();
        }
        if !target.occupied_cells().contains(&capturer.location()) {
            trace!(%actor, target = %self.target, "capturer not inside target");
            return self.chain.advance();
        }

        debug!(%actor, target = %self.target, "scheduling capture");
        world.schedule(Command::CaptureActor {
            target: self.target,
            capturer: actor,
        });
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
