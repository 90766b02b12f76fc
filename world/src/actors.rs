//! Actor state and the typed capability table attached to each actor.

use std::fmt;

use skirmish_core::{
    ActorId, CaptureNotice, CellCoord, CellRect, CellRectSize, Color, Command, PlayerId,
};

/// Hook invoked on a captured actor after its owner changes.
///
/// Commands pushed into `out` are scheduled on the frame-end queue and run on
/// the following flush, never within the flush that performed the capture.
pub trait NotifyCapture: fmt::Debug {
    /// Reacts to the capture described by `notice`.
    fn on_capture(&mut self, notice: &CaptureNotice, out: &mut Vec<Command>);
}

/// Empties the captured actor's cargo bay back into the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct EjectPassengersOnCapture;

impl NotifyCapture for EjectPassengersOnCapture {
    fn on_capture(&mut self, notice: &CaptureNotice, out: &mut Vec<Command>) {
        out.push(Command::UnloadCargo {
            transport: notice.target,
        });
    }
}

/// Radar presence of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RadarSignature {
    /// Fixed signature color. Falls back to the owner's color when absent.
    pub color: Option<Color>,
}

/// Passenger storage for transports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cargo {
    capacity: u32,
    passengers: Vec<ActorId>,
}

impl Cargo {
    /// Creates an empty cargo bay holding at most `capacity` passengers.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            passengers: Vec::new(),
        }
    }

    /// Maximum number of passengers.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Passengers currently aboard, in boarding order.
    #[must_use]
    pub fn passengers(&self) -> &[ActorId] {
        &self.passengers
    }

    /// Reports whether no further passenger fits.
    #[must_use]
    pub fn is_full(&self) -> bool {
        u32::try_from(self.passengers.len()).map_or(true, |count| count >= self.capacity)
    }

    /// Stows a passenger. Returns `false` when full or already aboard.
    pub fn load(&mut self, passenger: ActorId) -> bool {
        if self.is_full() || self.passengers.contains(&passenger) {
            return false;
        }
        self.passengers.push(passenger);
        true
    }

    pub(crate) fn release(&mut self, passenger: ActorId) -> bool {
        let before = self.passengers.len();
        self.passengers.retain(|aboard| *aboard != passenger);
        self.passengers.len() != before
    }

    pub(crate) fn unload_all(&mut self) -> Vec<ActorId> {
        std::mem::take(&mut self.passengers)
    }
}

/// Capability table populated once when an actor is constructed.
#[derive(Debug, Default)]
pub(crate) struct Capabilities {
    pub(crate) footprint: Option<CellRectSize>,
    pub(crate) radar_signature: Option<RadarSignature>,
    pub(crate) cargo: Option<Cargo>,
    pub(crate) capture_notifiers: Vec<Box<dyn NotifyCapture>>,
}

/// Blueprint describing an actor to spawn.
#[derive(Debug)]
pub struct ActorInit {
    kind: String,
    owner: PlayerId,
    location: CellCoord,
    capabilities: Capabilities,
}

impl ActorInit {
    /// Starts a blueprint with no capabilities.
    #[must_use]
    pub fn new(kind: impl Into<String>, owner: PlayerId, location: CellCoord) -> Self {
        Self {
            kind: kind.into(),
            owner,
            location,
            capabilities: Capabilities::default(),
        }
    }

    /// Grants the occupies-space capability with a footprint anchored at the location.
    #[must_use]
    pub fn with_footprint(mut self, size: CellRectSize) -> Self {
        self.capabilities.footprint = Some(size);
        self
    }

    /// Grants the radar-signature capability.
    #[must_use]
    pub fn with_radar_signature(mut self, signature: RadarSignature) -> Self {
        self.capabilities.radar_signature = Some(signature);
        self
    }

    /// Grants a cargo bay with the provided capacity.
    #[must_use]
    pub fn with_cargo(mut self, capacity: u32) -> Self {
        self.capabilities.cargo = Some(Cargo::new(capacity));
        self
    }

    /// Adds a capture notification hook.
    #[must_use]
    pub fn with_capture_notifier(mut self, notifier: Box<dyn NotifyCapture>) -> Self {
        self.capabilities.capture_notifiers.push(notifier);
        self
    }

    pub(crate) fn into_actor(self, id: ActorId) -> Actor {
        Actor {
            id,
            kind: self.kind,
            owner: self.owner,
            location: self.location,
            alive: true,
            in_world: false,
            capabilities: self.capabilities,
        }
    }
}

/// Entity tracked by the world.
#[derive(Debug)]
pub struct Actor {
    pub(crate) id: ActorId,
    kind: String,
    pub(crate) owner: PlayerId,
    pub(crate) location: CellCoord,
    pub(crate) alive: bool,
    pub(crate) in_world: bool,
    pub(crate) capabilities: Capabilities,
}

impl Actor {
    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Rules name of the actor, such as `e6` or `apc`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Player that owns the actor.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Cell the actor is anchored at.
    #[must_use]
    pub const fn location(&self) -> CellCoord {
        self.location
    }

    /// Reports whether the actor has not been destroyed.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Reports whether the actor currently belongs to the world.
    #[must_use]
    pub const fn is_in_world(&self) -> bool {
        self.in_world
    }

    /// Cells claimed by the occupies-space capability. Empty without that capability.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<CellCoord> {
        self.capabilities
            .footprint
            .map(|size| CellRect::from_origin_and_size(self.location, size).cells().collect())
            .unwrap_or_default()
    }

    /// Occupied cells, or just the location for actors that claim no space.
    #[must_use]
    pub fn presence_cells(&self) -> Vec<CellCoord> {
        let cells = self.occupied_cells();
        if cells.is_empty() {
            vec![self.location]
        } else {
            cells
        }
    }

    /// Radar-signature capability, if granted.
    #[must_use]
    pub const fn radar_signature(&self) -> Option<&RadarSignature> {
        self.capabilities.radar_signature.as_ref()
    }

    /// Cargo capability, if granted.
    #[must_use]
    pub const fn cargo(&self) -> Option<&Cargo> {
        self.capabilities.cargo.as_ref()
    }

    /// Number of capture notification hooks installed.
    #[must_use]
    pub fn capture_notifier_count(&self) -> usize {
        self.capabilities.capture_notifiers.len()
    }

    pub(crate) fn notify_capture(&mut self, notice: &CaptureNotice) -> Vec<Command> {
        let mut follow_up = Vec::new();
        for notifier in &mut self.capabilities.capture_notifiers {
            notifier.on_capture(notice, &mut follow_up);
        }
        follow_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_refuses_passengers_beyond_capacity() {
        let mut cargo = Cargo::new(2);
        assert!(cargo.load(ActorId::new(1)));
        assert!(!cargo.load(ActorId::new(1)), "duplicate boarding");
        assert!(cargo.load(ActorId::new(2)));
        assert!(cargo.is_full());
        assert!(!cargo.load(ActorId::new(3)));
        assert_eq!(cargo.capacity(), 2);
        assert_eq!(cargo.unload_all(), vec![ActorId::new(1), ActorId::new(2)]);
        assert!(cargo.passengers().is_empty());
    }

    #[test]
    fn released_passenger_frees_its_slot() {
        let mut cargo = Cargo::new(1);
        assert!(cargo.load(ActorId::new(1)));
        assert!(cargo.release(ActorId::new(1)));
        assert!(!cargo.release(ActorId::new(1)));
        assert!(cargo.load(ActorId::new(2)));
    }

    #[test]
    fn zero_capacity_cargo_is_always_full() {
        assert!(Cargo::new(0).is_full());
    }

    #[test]
    fn occupied_cells_follow_footprint() {
        let actor = ActorInit::new("fact", PlayerId::new(1), CellCoord::new(4, 4))
            .with_footprint(CellRectSize::new(2, 1))
            .into_actor(ActorId::new(0));
        assert_eq!(
            actor.occupied_cells(),
            vec![CellCoord::new(4, 4), CellCoord::new(5, 4)]
        );
    }

    #[test]
    fn presence_falls_back_to_location_without_footprint() {
        let actor = ActorInit::new("e1", PlayerId::new(1), CellCoord::new(2, 3))
            .into_actor(ActorId::new(0));
        assert!(actor.occupied_cells().is_empty());
        assert_eq!(actor.presence_cells(), vec![CellCoord::new(2, 3)]);
    }

    #[test]
    fn eject_passengers_requests_unload_of_target() {
        let mut actor = ActorInit::new("apc", PlayerId::new(1), CellCoord::new(0, 0))
            .with_capture_notifier(Box::new(EjectPassengersOnCapture))
            .into_actor(ActorId::new(5));
        assert_eq!(actor.capture_notifier_count(), 1);
        let follow_up = actor.notify_capture(&CaptureNotice {
            target: ActorId::new(5),
            capturer: ActorId::new(6),
            old_owner: PlayerId::new(1),
            new_owner: PlayerId::new(2),
        });
        assert_eq!(
            follow_up,
            vec![Command::UnloadCargo {
                transport: ActorId::new(5)
            }]
        );
    }
}
