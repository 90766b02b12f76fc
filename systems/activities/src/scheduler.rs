use std::collections::BTreeMap;

use skirmish_core::{ActorId, Event};
use skirmish_world::{self as world, query, World};
use tracing::{debug, trace};

use crate::{Activity, ActivityResult};

/// Holds the current activity of every busy actor and advances them once per frame.
#[derive(Debug, Default)]
pub struct Activities {
    current: BTreeMap<ActorId, Box<dyn Activity>>,
}

impl Activities {
    /// Creates a scheduler with no busy actors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `activity` to the actor's chain, making it current when idle.
    pub fn queue(&mut self, actor: ActorId, activity: Box<dyn Activity>) {
        match self.current.get_mut(&actor) {
            Some(current) => current.queue(activity),
            None => {
                let _ = self.current.insert(actor, activity);
            }
        }
    }

    /// Requests cancellation of the actor's current activity.
    ///
    /// Returns `false` when the actor was idle.
    pub fn cancel(&mut self, actor: ActorId) -> bool {
        match self.current.get_mut(&actor) {
            Some(current) => {
                current.cancel();
                true
            }
            None => false,
        }
    }

    /// Reports whether the actor has no current activity.
    #[must_use]
    pub fn is_idle(&self, actor: ActorId) -> bool {
        !self.current.contains_key(&actor)
    }

    /// Name of the actor's current activity, if any.
    #[must_use]
    pub fn current(&self, actor: ActorId) -> Option<&'static str> {
        self.current.get(&actor).map(|activity| activity.name())
    }

    /// Number of actors with a current activity.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.current.len()
    }

    /// Ticks every busy actor once in ascending id order, then flushes the
    /// frame-end queue.
    ///
    /// Actors that are alive but outside the world keep their chain untouched
    /// until they return. Chains belonging to dead or unknown actors are dropped.
    pub fn run_frame(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        let actors: Vec<ActorId> = self.current.keys().copied().collect();
        for actor in actors {
            if !query::is_alive(world, actor) {
                trace!(%actor, "dropping chain of departed actor");
                let _ = self.current.remove(&actor);
                continue;
            }
            if !query::is_in_world(world, actor) {
                continue;
            }
            let Some(mut activity) = self.current.remove(&actor) else {
                continue;
            };

            match activity.tick(actor, world) {
                ActivityResult::Continue => {
                    let _ = self.current.insert(actor, activity);
                }
                ActivityResult::Advance(Some(next)) => {
                    trace!(%actor, from = activity.name(), to = next.name(), "activity advanced");
                    let _ = self.current.insert(actor, next);
                }
                ActivityResult::Advance(None) => {
                    trace!(%actor, from = activity.name(), "actor idle");
                }
                ActivityResult::Terminate => {
                    debug!(%actor, activity = activity.name(), "activity chain terminated");
                }
            }
        }

        let applied = world::flush(world, out_events);
        trace!(applied, busy = self.current.len(), "activity frame complete");
    }
}
