#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Minimap rasterization for Skirmish maps and worlds.
//!
//! Every entry point is a pure function that reads the map, rules, or world
//! and returns a freshly allocated [`PixelBuffer`] of premultiplied ARGB
//! pixels. Pixel `(x, y)` always corresponds to cell
//! `(x + bounds.left, y + bounds.top)`.

mod buffer;
mod layers;

use skirmish_core::{TerrainType, TileId};
use thiserror::Error;

pub use buffer::PixelBuffer;
pub use layers::{
    actors_bitmap, add_static_resources, custom_terrain_bitmap, render_map_preview,
    shroud_bitmap, terrain_bitmap, MinimapLayers, FOG_PIXEL, UNEXPLORED_PIXEL,
};

/// Data-integrity failures detected while rasterizing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MinimapError {
    /// The map names a tileset the rules do not define.
    #[error("tileset `{tileset}` is not defined by the rules")]
    MissingTileset {
        /// Tileset identifier named by the map.
        tileset: String,
    },
    /// A cell references a tile the tileset does not define.
    #[error("tile {tile} is not defined by tileset `{tileset}`")]
    MissingTile {
        /// Tileset that was searched.
        tileset: String,
        /// Tile that could not be resolved.
        tile: TileId,
    },
    /// A terrain type has no color in the tileset.
    #[error("terrain type `{terrain}` has no entry in tileset `{tileset}`")]
    MissingTerrainType {
        /// Tileset that was searched.
        tileset: String,
        /// Terrain type that could not be resolved.
        terrain: TerrainType,
    },
}
