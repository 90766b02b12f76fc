#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects activities, the
//! authoritative world, and adapters. Activities schedule [`Command`] values
//! describing the world mutations they want, the world applies those commands
//! when it flushes its frame-end queue, and then broadcasts [`Event`] values
//! describing what actually changed. Nothing outside the world mutates the
//! actor containers directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands that express all deferred world mutations.
///
/// Commands are queued during a frame and applied in FIFO order when the world
/// flushes. Every command re-validates the actors it names at application
/// time because the world may have changed since it was scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Places an existing, living actor back into the world.
    AddActor {
        /// Actor that should rejoin the world.
        actor: ActorId,
    },
    /// Takes an actor out of the world without destroying it.
    RemoveActor {
        /// Actor that should leave the world.
        actor: ActorId,
    },
    /// Destroys an actor, removing it from the world if present.
    DestroyActor {
        /// Actor that should be destroyed.
        actor: ActorId,
    },
    /// Transfers ownership of `target` to the owner of `capturer`, consuming the capturer.
    CaptureActor {
        /// Actor whose ownership changes hands.
        target: ActorId,
        /// Actor performing the capture; destroyed once the capture lands.
        capturer: ActorId,
    },
    /// Returns every passenger carried by the transport to the world.
    UnloadCargo {
        /// Actor whose cargo bay is emptied.
        transport: ActorId,
    },
    /// Replaces the set of cells currently visible to the local player.
    UpdateVision {
        /// Cells that are visible after the update. Each becomes explored.
        visible: Vec<CellCoord>,
    },
    /// Toggles full-vision mode for the local shroud.
    SetShroudDisabled {
        /// Whether the shroud should be disabled.
        disabled: bool,
    },
}

/// Events broadcast by the world after applying commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an actor joined the world.
    ActorAdded {
        /// Actor that joined the world.
        actor: ActorId,
    },
    /// Confirms that an actor left the world while staying alive.
    ActorRemoved {
        /// Actor that left the world.
        actor: ActorId,
    },
    /// Confirms that an actor was destroyed.
    ActorDestroyed {
        /// Actor that was destroyed.
        actor: ActorId,
    },
    /// Reports that an actor changed hands.
    OwnerChanged {
        /// Actor whose owner changed.
        actor: ActorId,
        /// Owner before the change.
        old_owner: PlayerId,
        /// Owner after the change.
        new_owner: PlayerId,
    },
    /// Reports that a capture completed.
    ActorCaptured(CaptureNotice),
    /// Reports that a passenger was stowed inside a transport.
    CargoLoaded {
        /// Transport receiving the passenger.
        transport: ActorId,
        /// Actor that boarded.
        passenger: ActorId,
    },
    /// Reports that a passenger left a transport.
    CargoUnloaded {
        /// Transport that released the passenger.
        transport: ActorId,
        /// Actor that disembarked.
        passenger: ActorId,
    },
    /// Reports that the local vision changed.
    VisionUpdated {
        /// Number of cells currently visible.
        visible_cells: usize,
    },
    /// Reports that the shroud switched between normal and full-vision mode.
    ShroudToggled {
        /// Whether the shroud is now disabled.
        disabled: bool,
    },
    /// Reports that a queued command no longer applied when the world flushed.
    CommandRejected {
        /// Command that was dropped.
        command: Command,
        /// Specific reason the command was dropped.
        reason: RejectionReason,
    },
}

/// Reasons a queued command may be dropped when the world flushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The named actor is not registered with the world.
    UnknownActor,
    /// The named actor has been destroyed.
    ActorDead,
    /// The named actor is not in the world.
    NotInWorld,
    /// The actor is already in the world.
    AlreadyInWorld,
    /// The target already belongs to the capturing player.
    AlreadyOwned,
    /// The transport lacks a cargo bay.
    NoCargo,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownActor => "unknown actor",
            Self::ActorDead => "actor is dead",
            Self::NotInWorld => "actor is not in the world",
            Self::AlreadyInWorld => "actor is already in the world",
            Self::AlreadyOwned => "target already owned by capturer",
            Self::NoCargo => "actor has no cargo bay",
        };
        f.write_str(text)
    }
}

/// Details passed to capture notification hooks and broadcast after a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureNotice {
    /// Actor that changed hands.
    pub target: ActorId,
    /// Actor that performed the capture.
    pub capturer: ActorId,
    /// Owner before the capture.
    pub old_owner: PlayerId,
    /// Owner after the capture.
    pub new_owner: PlayerId,
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Unique identifier assigned to a player or faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance, so diagonal neighbours are one step away.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = cell.column();
        let row = cell.row();
        column >= self.origin.column()
            && row >= self.origin.row()
            && u64::from(column) < u64::from(self.origin.column()) + u64::from(self.size.width())
            && u64::from(row) < u64::from(self.origin.row()) + u64::from(self.size.height())
    }

    /// Iterates over every covered cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width()).map(move |dx| {
                CellCoord::new(
                    origin.column().saturating_add(dx),
                    origin.row().saturating_add(dy),
                )
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Playable rectangle of a map, expressed in cells of the full grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Column of the left-most playable cell.
    pub left: u32,
    /// Row of the top-most playable cell.
    pub top: u32,
    /// Number of playable columns.
    pub width: u32,
    /// Number of playable rows.
    pub height: u32,
}

impl Bounds {
    /// Creates a new bounds rectangle.
    #[must_use]
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Reports whether the provided cell lies within the playable rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        CellRect::from_origin_and_size(
            CellCoord::new(self.left, self.top),
            CellRectSize::new(self.width, self.height),
        )
        .contains(cell)
    }

    /// Side of the smallest power-of-two square that fits the bounds.
    #[must_use]
    pub fn power_of_two_side(&self) -> u32 {
        self.width.max(self.height).max(1).next_power_of_two()
    }
}

/// Tile reference stored per map cell: a tileset template and an index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    /// Template identifier within the tileset.
    pub template: u16,
    /// Index of the tile inside the template.
    pub index: u8,
}

impl TileId {
    /// Creates a new tile reference.
    #[must_use]
    pub const fn new(template: u16, index: u8) -> Self {
        Self { template, index }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.template, self.index)
    }
}

/// Resource deposit stored per map cell. A `kind` of zero means no resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTile {
    /// Resource type identifier, matched against the ruleset.
    pub kind: u8,
    /// Amount of resource stored in the cell.
    pub density: u8,
}

impl ResourceTile {
    /// Creates a new resource descriptor.
    #[must_use]
    pub const fn new(kind: u8, density: u8) -> Self {
        Self { kind, density }
    }

    /// Reports whether the cell carries no resource at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind == 0
    }
}

/// Named terrain category such as `Clear`, `Water`, or `Ore`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainType(String);

impl TerrainType {
    /// Creates a terrain type from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the terrain type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Straight-alpha RGBA color used by tilesets, players, and signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Creates an opaque color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, u8::MAX)
    }

    /// Creates a color from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Packs the color as premultiplied `0xAARRGGBB`.
    ///
    /// Opaque colors pack unchanged; translucent channels are scaled by alpha
    /// with rounding.
    #[must_use]
    pub const fn to_premultiplied_argb(self) -> u32 {
        let alpha = self.alpha as u32;
        let red = premultiply(self.red, self.alpha) as u32;
        let green = premultiply(self.green, self.alpha) as u32;
        let blue = premultiply(self.blue, self.alpha) as u32;
        (alpha << 24) | (red << 16) | (green << 8) | blue
    }
}

const fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((channel as u32 * alpha as u32 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::{
        ActorId, Bounds, CellCoord, CellRect, CellRectSize, Color, Command, RejectionReason,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn chebyshev_distance_treats_diagonals_as_adjacent() {
        let origin = CellCoord::new(5, 5);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(6, 6)), 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(4, 5)), 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(7, 6)), 2);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn capture_command_round_trips_through_bincode() {
        assert_round_trip(&Command::CaptureActor {
            target: ActorId::new(3),
            capturer: ActorId::new(9),
        });
    }

    #[test]
    fn rejection_reason_round_trips_through_bincode() {
        assert_round_trip(&RejectionReason::NotInWorld);
    }

    #[test]
    fn cell_rect_enumerates_cells_row_major() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(2, 3), CellRectSize::new(2, 2));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 3),
                CellCoord::new(3, 3),
                CellCoord::new(2, 4),
                CellCoord::new(3, 4),
            ]
        );
        assert!(rect.contains(CellCoord::new(3, 4)));
        assert!(!rect.contains(CellCoord::new(4, 4)));
    }

    #[test]
    fn bounds_power_of_two_side_rounds_up_longest_edge() {
        assert_eq!(Bounds::new(0, 0, 5, 3).power_of_two_side(), 8);
        assert_eq!(Bounds::new(2, 2, 16, 9).power_of_two_side(), 16);
        assert_eq!(Bounds::new(0, 0, 0, 0).power_of_two_side(), 1);
    }

    #[test]
    fn bounds_contains_respects_offset() {
        let bounds = Bounds::new(2, 1, 3, 2);
        assert!(bounds.contains(CellCoord::new(2, 1)));
        assert!(bounds.contains(CellCoord::new(4, 2)));
        assert!(!bounds.contains(CellCoord::new(1, 1)));
        assert!(!bounds.contains(CellCoord::new(5, 1)));
        assert!(!bounds.contains(CellCoord::new(2, 3)));
    }

    #[test]
    fn opaque_colors_pack_unchanged() {
        assert_eq!(
            Color::from_rgb(0x12, 0x34, 0x56).to_premultiplied_argb(),
            0xff12_3456
        );
    }

    #[test]
    fn translucent_colors_are_premultiplied() {
        assert_eq!(Color::BLACK.with_alpha(128).to_premultiplied_argb(), 0x8000_0000);
        assert_eq!(
            Color::from_rgba(255, 255, 255, 128).to_premultiplied_argb(),
            0x8080_8080
        );
        assert_eq!(Color::TRANSPARENT.to_premultiplied_argb(), 0);
    }
}
