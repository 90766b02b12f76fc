use skirmish_core::{ActorId, Command};
use skirmish_world::{query, World};
use tracing::{debug, trace};

use crate::{Activity, ActivityResult, Chain};

/// Boards an adjacent transport.
///
/// The passenger is stowed in the cargo bay immediately and leaves the world at
/// the next flush. The caller is responsible for moving the actor next to the
/// transport first.
#[derive(Debug)]
pub struct EnterTransport {
    transport: ActorId,
    loaded: bool,
    chain: Chain,
}

impl EnterTransport {
    /// Creates a boarding order for `transport`.
    #[must_use]
    pub fn new(transport: ActorId) -> Self {
        Self {
            transport,
            loaded: false,
            chain: Chain::default(),
        }
    }
}

impl Activity for EnterTransport {
    fn name(&self) -> &'static str {
        "EnterTransport"
    }

    fn tick(&mut self, actor: ActorId, world: &mut World) -> ActivityResult {
        if self.chain.is_canceled() || self.loaded {
            return self.chain.advance();
        }

        let Some(transport) = query::actor(world, self.transport) else {
            return self.chain.advance();
        };
        if !transport.is_in_world() {
            trace!(%actor, transport = %self.transport, "transport gone");
            return self.chain.advance();
        }
        if transport.cargo().map_or(true, |cargo| cargo.is_full()) {
            trace!(%actor, transport = %self.transport, "transport full");
            return self.chain.advance();
        }
        let Some(passenger) = query::actor(world, actor) else {
            return self.chain.advance();
        };
        if transport.location().chebyshev_distance(passenger.location()) > 1 {
            trace!(%actor, transport = %self.transport, "transport out of reach");
            return self.chain.advance();
        }

        let stowed = world
            .cargo_mut(self.transport)
            .is_some_and(|cargo| cargo.load(actor));
        if !stowed {
            return self.chain.advance();
        }

        debug!(%actor, transport = %self.transport, "passenger loaded");
        self.loaded = true;
        world.schedule(Command::RemoveActor { actor });
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
