#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the map grid, the rules registry, every actor, and the
//! local shroud. Code outside this crate reads it through [`query`] and
//! requests changes to the actor containers by scheduling [`Command`] values;
//! those commands only run when [`flush`] drains the frame-end queue, so no
//! reader ever observes a container changing underneath it mid-frame.

mod actors;
mod frame_end;
mod index;
mod map;
mod rules;
mod shroud;

use std::collections::BTreeMap;

use skirmish_core::{
    ActorId, CaptureNotice, Color, Command, Event, PlayerId, RejectionReason,
};
use tracing::debug;

pub use actors::{
    Actor, ActorInit, Cargo, EjectPassengersOnCapture, NotifyCapture, RadarSignature,
};
pub use map::{Map, MapError};
pub use rules::{ResourceTypeInfo, Ruleset, TerrainInfo, Tileset};
pub use shroud::Shroud;

use frame_end::FrameEndQueue;
use index::ActorIndex;

/// Signature color used when an actor's owner is not a registered player.
pub const FALLBACK_SIGNATURE_COLOR: Color = Color::from_rgb(0xff, 0xff, 0xff);

/// Participant in the match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    /// Identifier used as actor owner.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Color used for radar signatures.
    pub color: Color,
}

impl Player {
    /// Creates a new player descriptor.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }
}

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    map: Map,
    rules: Ruleset,
    players: BTreeMap<PlayerId, Player>,
    local_player: PlayerId,
    actors: BTreeMap<ActorId, Actor>,
    index: ActorIndex,
    shroud: Shroud,
    frame_end: FrameEndQueue,
    next_actor_id: ActorId,
    frame_index: u64,
}

impl World {
    /// Creates a world around a loaded map viewed from `local_player`.
    #[must_use]
    pub fn new(map: Map, rules: Ruleset, local_player: PlayerId) -> Self {
        let (columns, rows) = map.dimensions();
        Self {
            map,
            rules,
            players: BTreeMap::new(),
            local_player,
            actors: BTreeMap::new(),
            index: ActorIndex::new(columns, rows),
            shroud: Shroud::new(columns, rows),
            frame_end: FrameEndQueue::default(),
            next_actor_id: ActorId::new(0),
            frame_index: 0,
        }
    }

    /// Registers a player, replacing any player with the same identifier.
    pub fn add_player(&mut self, player: Player) {
        let _ = self.players.insert(player.id, player);
    }

    /// Creates an actor from the blueprint and places it in the world.
    ///
    /// Intended for match setup; mid-frame code should schedule commands instead.
    pub fn spawn(&mut self, init: ActorInit) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        let mut actor = init.into_actor(id);
        actor.in_world = true;
        self.index.insert(&actor);
        let _ = self.actors.insert(id, actor);
        id
    }

    /// Appends a command to the frame-end queue.
    pub fn schedule(&mut self, command: Command) {
        debug!(?command, frame = self.frame_index, "scheduled frame-end command");
        self.frame_end.push(command);
    }

    /// Mutable access to an actor's cargo bay.
    ///
    /// Loading passengers is a trait-local change and may happen mid-frame; the
    /// passenger's own departure from the world must still be scheduled.
    pub fn cargo_mut(&mut self, actor: ActorId) -> Option<&mut Cargo> {
        self.actors
            .get_mut(&actor)
            .and_then(|actor| actor.capabilities.cargo.as_mut())
    }

    fn attach(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.in_world = true;
            self.index.insert(actor);
        }
    }

    fn detach(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            if actor.in_world {
                self.index.remove(actor);
            }
            actor.in_world = false;
        }
    }

    fn validate_living(&self, id: ActorId) -> Result<&Actor, RejectionReason> {
        let actor = self.actors.get(&id).ok_or(RejectionReason::UnknownActor)?;
        if !actor.alive {
            return Err(RejectionReason::ActorDead);
        }
        Ok(actor)
    }

    fn validate_in_world(&self, id: ActorId) -> Result<&Actor, RejectionReason> {
        let actor = self.validate_living(id)?;
        if !actor.in_world {
            return Err(RejectionReason::NotInWorld);
        }
        Ok(actor)
    }

    fn destroy(&mut self, id: ActorId, out_events: &mut Vec<Event>) {
        self.detach(id);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.alive = false;
        }
        self.release_passenger(id);
        out_events.push(Event::ActorDestroyed { actor: id });
    }

    /// Frees the cargo slot held by `passenger`, if any transport carries it.
    fn release_passenger(&mut self, passenger: ActorId) {
        let Some(transport) = query::carrier_of(self, passenger) else {
            return;
        };
        if self
            .cargo_mut(transport)
            .is_some_and(|cargo| cargo.release(passenger))
        {
            debug!(%transport, %passenger, "released cargo slot");
        }
    }

    fn capture(
        &mut self,
        target: ActorId,
        capturer: ActorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let old_owner = self.validate_in_world(target)?.owner;
        let new_owner = self.validate_living(capturer)?.owner;
        if old_owner == new_owner {
            return Err(RejectionReason::AlreadyOwned);
        }

        // Ownership is part of the index key, so the target leaves and rejoins.
        self.detach(target);
        if let Some(actor) = self.actors.get_mut(&target) {
            actor.owner = new_owner;
        }
        self.attach(target);
        out_events.push(Event::OwnerChanged {
            actor: target,
            old_owner,
            new_owner,
        });

        let notice = CaptureNotice {
            target,
            capturer,
            old_owner,
            new_owner,
        };
        let follow_up = self
            .actors
            .get_mut(&target)
            .map(|actor| actor.notify_capture(&notice))
            .unwrap_or_default();
        for command in follow_up {
            self.schedule(command);
        }
        out_events.push(Event::ActorCaptured(notice));
        debug!(%target, %capturer, ?old_owner, ?new_owner, "actor captured");

        self.destroy(capturer, out_events);
        Ok(())
    }

    fn unload(
        &mut self,
        transport: ActorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let location = self.validate_in_world(transport)?.location;
        let passengers = self
            .cargo_mut(transport)
            .map(Cargo::unload_all)
            .ok_or(RejectionReason::NoCargo)?;

        for passenger in passengers {
            let Some(actor) = self.actors.get_mut(&passenger) else {
                continue;
            };
            if !actor.alive || actor.in_world {
                debug!(%transport, %passenger, "skipping stale passenger");
                continue;
            }
            actor.location = location;
            self.attach(passenger);
            out_events.push(Event::CargoUnloaded {
                transport,
                passenger,
            });
            out_events.push(Event::ActorAdded { actor: passenger });
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands naming stale actors are dropped with [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Err(reason) = execute(world, &command, out_events) {
        debug!(?command, %reason, "dropping stale command");
        out_events.push(Event::CommandRejected { command, reason });
    }
}

fn execute(
    world: &mut World,
    command: &Command,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    match command {
        Command::AddActor { actor } => {
            if world.validate_living(*actor)?.in_world {
                return Err(RejectionReason::AlreadyInWorld);
            }
            world.attach(*actor);
            out_events.push(Event::ActorAdded { actor: *actor });
        }
        Command::RemoveActor { actor } => {
            if let Err(reason) = world.validate_in_world(*actor).map(|_| ()) {
                // A passenger that died before leaving the world never boarded.
                if reason != RejectionReason::NotInWorld {
                    world.release_passenger(*actor);
                }
                return Err(reason);
            }
            world.detach(*actor);
            out_events.push(Event::ActorRemoved { actor: *actor });
            if let Some(transport) = query::carrier_of(world, *actor) {
                out_events.push(Event::CargoLoaded {
                    transport,
                    passenger: *actor,
                });
            }
        }
        Command::DestroyActor { actor } => {
            let _ = world.validate_living(*actor)?;
            world.destroy(*actor, out_events);
        }
        Command::CaptureActor { target, capturer } => {
            world.capture(*target, *capturer, out_events)?;
        }
        Command::UnloadCargo { transport } => world.unload(*transport, out_events)?,
        Command::UpdateVision { visible } => {
            let visible_cells = world.shroud.update_vision(visible);
            out_events.push(Event::VisionUpdated { visible_cells });
        }
        Command::SetShroudDisabled { disabled } => {
            world.shroud.set_disabled(*disabled);
            out_events.push(Event::ShroudToggled {
                disabled: *disabled,
            });
        }
    }
    Ok(())
}

/// Applies every command queued before the call, in scheduling order.
///
/// Commands scheduled while the batch runs stay queued for the next flush.
/// Returns the number of commands applied.
pub fn flush(world: &mut World, out_events: &mut Vec<Event>) -> usize {
    let batch = world.frame_end.take_batch();
    let applied = batch.len();
    for command in batch {
        apply(world, command, out_events);
    }
    debug!(
        frame = world.frame_index,
        applied,
        deferred = world.frame_end.pending().len(),
        "flushed frame-end queue"
    );
    world.frame_index = world.frame_index.saturating_add(1);
    applied
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{ActorId, CellCoord, Color, Command, PlayerId};

    use super::{Actor, Map, Player, Ruleset, Shroud, Tileset, World, FALLBACK_SIGNATURE_COLOR};

    /// Radar presence of a single in-world actor.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct RadarBlip {
        /// Actor producing the blip.
        pub actor: ActorId,
        /// Color painted on the minimap.
        pub color: Color,
        /// Cells covered by the blip.
        pub cells: Vec<CellCoord>,
    }

    /// Provides read-only access to the map grid.
    #[must_use]
    pub fn map(world: &World) -> &Map {
        &world.map
    }

    /// Provides read-only access to the rules registry.
    #[must_use]
    pub fn rules(world: &World) -> &Ruleset {
        &world.rules
    }

    /// Tileset the map was authored against, if the rules provide it.
    #[must_use]
    pub fn tileset(world: &World) -> Option<&Tileset> {
        world.rules.tileset(world.map.tileset())
    }

    /// Player whose perspective the shroud represents.
    #[must_use]
    pub fn local_player(world: &World) -> PlayerId {
        world.local_player
    }

    /// Registered player with the provided identifier.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> Option<&Player> {
        world.players.get(&player)
    }

    /// Shroud of the local player.
    #[must_use]
    pub fn shroud(world: &World) -> &Shroud {
        &world.shroud
    }

    /// Actor registered under the identifier, alive or not.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<&Actor> {
        world.actors.get(&actor)
    }

    /// Every registered actor in identifier order.
    pub fn actors(world: &World) -> impl Iterator<Item = &Actor> {
        world.actors.values()
    }

    /// Reports whether the actor exists and belongs to the world.
    #[must_use]
    pub fn is_in_world(world: &World, actor: ActorId) -> bool {
        world.actors.get(&actor).is_some_and(Actor::is_in_world)
    }

    /// Reports whether the actor exists and has not been destroyed.
    #[must_use]
    pub fn is_alive(world: &World, actor: ActorId) -> bool {
        world.actors.get(&actor).is_some_and(Actor::is_alive)
    }

    /// Transport whose cargo bay currently holds the actor.
    #[must_use]
    pub fn carrier_of(world: &World, passenger: ActorId) -> Option<ActorId> {
        world
            .actors
            .values()
            .find(|actor| {
                actor
                    .cargo()
                    .is_some_and(|cargo| cargo.passengers().contains(&passenger))
            })
            .map(Actor::id)
    }

    /// In-world actors indexed at the provided cell.
    #[must_use]
    pub fn actors_at(world: &World, cell: CellCoord) -> &[ActorId] {
        world.index.at(cell)
    }

    /// In-world actors indexed under the provided owner, in identifier order.
    #[must_use]
    pub fn actors_owned_by(world: &World, player: PlayerId) -> Vec<ActorId> {
        world.index.owned_by(player).collect()
    }

    /// Reports whether the local player can currently see the actor.
    #[must_use]
    pub fn is_actor_visible(world: &World, actor: &Actor) -> bool {
        if world.shroud.is_disabled() || actor.owner() == world.local_player {
            return true;
        }
        actor
            .presence_cells()
            .into_iter()
            .any(|cell| world.shroud.is_visible(cell))
    }

    /// Color painted for the actor's radar signature.
    #[must_use]
    pub fn signature_color(world: &World, actor: &Actor) -> Option<Color> {
        let signature = actor.radar_signature()?;
        Some(signature.color.unwrap_or_else(|| {
            world
                .players
                .get(&actor.owner())
                .map_or(FALLBACK_SIGNATURE_COLOR, |player| player.color)
        }))
    }

    /// Radar blips of every in-world actor exposing a radar signature.
    pub fn radar_blips(world: &World) -> impl Iterator<Item = RadarBlip> + '_ {
        world
            .actors
            .values()
            .filter(|actor| actor.is_in_world())
            .filter_map(move |actor| {
                signature_color(world, actor).map(|color| RadarBlip {
                    actor: actor.id(),
                    color,
                    cells: actor.presence_cells(),
                })
            })
    }

    /// Commands waiting for the next flush, in application order.
    #[must_use]
    pub fn pending_commands(world: &World) -> &[Command] {
        world.frame_end.pending()
    }

    /// Number of flushes performed so far.
    #[must_use]
    pub fn frame_index(world: &World) -> u64 {
        world.frame_index
    }
}
