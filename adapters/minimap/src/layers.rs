use skirmish_core::{Bounds, CellCoord, Color, TerrainType};
use skirmish_world::{query, Map, Ruleset, Tileset, World};
use tracing::{debug, trace};

use crate::{MinimapError, PixelBuffer};

/// Pixel painted over cells the local player has never explored.
pub const UNEXPLORED_PIXEL: u32 = Color::BLACK.to_premultiplied_argb();

/// Pixel painted over explored cells that are currently out of sight.
pub const FOG_PIXEL: u32 = Color::BLACK.with_alpha(0x80).to_premultiplied_argb();

/// Every world-dependent layer of the minimap, ready for compositing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinimapLayers {
    /// Terrain with static resources painted on top.
    pub terrain: PixelBuffer,
    /// Runtime terrain overrides.
    pub custom_terrain: PixelBuffer,
    /// Radar signatures of visible actors.
    pub actors: PixelBuffer,
    /// Shroud and fog overlay.
    pub shroud: PixelBuffer,
}

impl MinimapLayers {
    /// Renders every layer for the current world state.
    pub fn render(world: &World) -> Result<Self, MinimapError> {
        Ok(Self {
            terrain: render_map_preview(query::map(world), query::rules(world))?,
            custom_terrain: custom_terrain_bitmap(world)?,
            actors: actors_bitmap(world),
            shroud: shroud_bitmap(world),
        })
    }
}

/// Rasterizes the base terrain color of every in-bounds cell.
///
/// With `actual_size` the buffer matches the bounds exactly; otherwise it is a
/// square power-of-two canvas and pixels beyond the bounds stay transparent.
pub fn terrain_bitmap(
    map: &Map,
    ruleset: &Ruleset,
    actual_size: bool,
) -> Result<PixelBuffer, MinimapError> {
    let tileset = resolve_tileset(map, ruleset)?;
    let bounds = map.bounds();
    let mut buffer = if actual_size {
        PixelBuffer::new(bounds.width, bounds.height)
    } else {
        power_of_two_canvas(bounds)
    };

    for cell in map.cells_in_bounds() {
        let Some(tile) = map.tile(cell) else {
            continue;
        };
        let terrain = tileset
            .terrain_type(tile)
            .ok_or_else(|| MinimapError::MissingTile {
                tileset: tileset.id().to_owned(),
                tile,
            })?;
        let color = terrain_color(tileset, terrain)?;
        paint(&mut buffer, bounds, cell, color);
    }

    trace!(
        width = buffer.width(),
        height = buffer.height(),
        "rasterized terrain"
    );
    Ok(buffer)
}

/// Paints static resource deposits over a copy of `base`.
///
/// Cells whose resource kind has no terrain mapping in the rules keep their
/// base pixel.
pub fn add_static_resources(
    map: &Map,
    ruleset: &Ruleset,
    base: &PixelBuffer,
) -> Result<PixelBuffer, MinimapError> {
    let tileset = resolve_tileset(map, ruleset)?;
    let bounds = map.bounds();
    let mut buffer = base.clone();

    for cell in map.cells_in_bounds() {
        let Some(resource) = map.resource(cell) else {
            continue;
        };
        if resource.is_empty() {
            continue;
        }
        let Some(terrain) = ruleset.resource_terrain(resource.kind) else {
            continue;
        };
        let color = terrain_color(tileset, terrain)?;
        paint(&mut buffer, bounds, cell, color);
    }

    Ok(buffer)
}

/// Rasterizes runtime terrain overrides on a transparent power-of-two canvas.
pub fn custom_terrain_bitmap(world: &World) -> Result<PixelBuffer, MinimapError> {
    let map = query::map(world);
    let tileset = resolve_tileset(map, query::rules(world))?;
    let bounds = map.bounds();
    let mut buffer = power_of_two_canvas(bounds);

    for cell in map.cells_in_bounds() {
        if let Some(terrain) = map.custom_terrain(cell) {
            let color = terrain_color(tileset, terrain)?;
            paint(&mut buffer, bounds, cell, color);
        }
    }

    Ok(buffer)
}

/// Paints radar signatures of actors the local player can see.
pub fn actors_bitmap(world: &World) -> PixelBuffer {
    let bounds = query::map(world).bounds();
    let mut buffer = power_of_two_canvas(bounds);
    let mut painted = 0_usize;

    for blip in query::radar_blips(world) {
        let visible = query::actor(world, blip.actor)
            .is_some_and(|actor| query::is_actor_visible(world, actor));
        if !visible {
            continue;
        }
        for cell in blip.cells {
            if bounds.contains(cell) {
                paint(&mut buffer, bounds, cell, blip.color);
            }
        }
        painted += 1;
    }

    debug!(painted, "rasterized radar signatures");
    buffer
}

/// Rasterizes the local shroud: black where unexplored, dimmed where fogged.
pub fn shroud_bitmap(world: &World) -> PixelBuffer {
    let map = query::map(world);
    let shroud = query::shroud(world);
    let bounds = map.bounds();
    let mut buffer = power_of_two_canvas(bounds);
    if shroud.is_disabled() {
        return buffer;
    }

    for cell in map.cells_in_bounds() {
        let pixel = if !shroud.is_explored(cell) {
            UNEXPLORED_PIXEL
        } else if !shroud.is_visible(cell) {
            FOG_PIXEL
        } else {
            continue;
        };
        let _ = buffer.set(cell.column() - bounds.left, cell.row() - bounds.top, pixel);
    }

    buffer
}

/// Renders the static preview of a map: terrain plus resource deposits.
pub fn render_map_preview(map: &Map, ruleset: &Ruleset) -> Result<PixelBuffer, MinimapError> {
    let terrain = terrain_bitmap(map, ruleset, false)?;
    add_static_resources(map, ruleset, &terrain)
}

fn resolve_tileset<'a>(map: &Map, ruleset: &'a Ruleset) -> Result<&'a Tileset, MinimapError> {
    ruleset
        .tileset(map.tileset())
        .ok_or_else(|| MinimapError::MissingTileset {
            tileset: map.tileset().to_owned(),
        })
}

fn terrain_color(tileset: &Tileset, terrain: &TerrainType) -> Result<Color, MinimapError> {
    tileset
        .terrain_info(terrain)
        .map(|info| info.color)
        .ok_or_else(|| MinimapError::MissingTerrainType {
            tileset: tileset.id().to_owned(),
            terrain: terrain.clone(),
        })
}

fn power_of_two_canvas(bounds: Bounds) -> PixelBuffer {
    let side = bounds.power_of_two_side();
    PixelBuffer::new(side, side)
}

fn paint(buffer: &mut PixelBuffer, bounds: Bounds, cell: CellCoord, color: Color) {
    let x = cell.column() - bounds.left;
    let y = cell.row() - bounds.top;
    let _ = buffer.set(x, y, color.to_premultiplied_argb());
}
