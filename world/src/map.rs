//! Tile grid storage for a loaded map.

use skirmish_core::{Bounds, CellCoord, ResourceTile, TerrainType, TileId};
use thiserror::Error;

/// Errors raised while constructing a map grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The playable rectangle does not fit inside the grid.
    #[error("bounds {bounds:?} exceed the {columns}x{rows} grid")]
    BoundsOutsideGrid {
        /// Rejected bounds.
        bounds: Bounds,
        /// Grid columns.
        columns: u32,
        /// Grid rows.
        rows: u32,
    },
}

/// Fixed-size grid of tiles, resources, and custom terrain overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    tileset: String,
    columns: u32,
    rows: u32,
    bounds: Bounds,
    tiles: Vec<TileId>,
    resources: Vec<ResourceTile>,
    custom_terrain: Vec<Option<TerrainType>>,
}

impl Map {
    /// Creates a map whose every cell holds `fill` and no resources.
    pub fn new(
        tileset: impl Into<String>,
        columns: u32,
        rows: u32,
        bounds: Bounds,
        fill: TileId,
    ) -> Result<Self, MapError> {
        let fits_columns = u64::from(bounds.left) + u64::from(bounds.width) <= u64::from(columns);
        let fits_rows = u64::from(bounds.top) + u64::from(bounds.height) <= u64::from(rows);
        if !fits_columns || !fits_rows {
            return Err(MapError::BoundsOutsideGrid {
                bounds,
                columns,
                rows,
            });
        }

        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Ok(Self {
            tileset: tileset.into(),
            columns,
            rows,
            bounds,
            tiles: vec![fill; capacity],
            resources: vec![ResourceTile::default(); capacity],
            custom_terrain: vec![None; capacity],
        })
    }

    /// Identifier of the tileset the map was authored against.
    #[must_use]
    pub fn tileset(&self) -> &str {
        &self.tileset
    }

    /// Full grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Playable rectangle of the map.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Reports whether the cell lies inside the playable bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.bounds.contains(cell)
    }

    /// Tile stored at the provided cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileId> {
        self.index(cell).map(|index| self.tiles[index])
    }

    /// Overwrites the tile at the provided cell. Returns `false` outside the grid.
    pub fn set_tile(&mut self, cell: CellCoord, tile: TileId) -> bool {
        self.index(cell)
            .map(|index| self.tiles[index] = tile)
            .is_some()
    }

    /// Resource deposit stored at the provided cell.
    #[must_use]
    pub fn resource(&self, cell: CellCoord) -> Option<ResourceTile> {
        self.index(cell).map(|index| self.resources[index])
    }

    /// Overwrites the resource deposit at the provided cell.
    pub fn set_resource(&mut self, cell: CellCoord, resource: ResourceTile) -> bool {
        self.index(cell)
            .map(|index| self.resources[index] = resource)
            .is_some()
    }

    /// Custom terrain override at the provided cell, if any.
    #[must_use]
    pub fn custom_terrain(&self, cell: CellCoord) -> Option<&TerrainType> {
        self.index(cell)
            .and_then(|index| self.custom_terrain[index].as_ref())
    }

    /// Sets or clears the custom terrain override at the provided cell.
    pub fn set_custom_terrain(&mut self, cell: CellCoord, terrain: Option<TerrainType>) -> bool {
        self.index(cell)
            .map(|index| self.custom_terrain[index] = terrain)
            .is_some()
    }

    /// Iterates over every cell inside the bounds, column-major like the minimap scan.
    pub fn cells_in_bounds(&self) -> impl Iterator<Item = CellCoord> {
        let bounds = self.bounds;
        (0..bounds.width).flat_map(move |x| {
            (0..bounds.height).map(move |y| CellCoord::new(bounds.left + x, bounds.top + y))
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bounds_outside_grid() {
        let error = Map::new("temperat", 4, 4, Bounds::new(1, 1, 4, 2), TileId::new(0, 0))
            .expect_err("bounds overflow the grid");
        assert!(matches!(error, MapError::BoundsOutsideGrid { .. }));
    }

    #[test]
    fn cell_accessors_reject_cells_outside_grid() {
        let mut map = Map::new("temperat", 3, 2, Bounds::new(0, 0, 3, 2), TileId::new(1, 0))
            .expect("valid map");
        assert!(map.set_tile(CellCoord::new(2, 1), TileId::new(5, 2)));
        assert_eq!(map.tile(CellCoord::new(2, 1)), Some(TileId::new(5, 2)));
        assert!(!map.set_tile(CellCoord::new(3, 0), TileId::new(5, 2)));
        assert_eq!(map.tile(CellCoord::new(0, 2)), None);
        assert!(map.custom_terrain(CellCoord::new(0, 0)).is_none());
    }

    #[test]
    fn cells_in_bounds_honours_offset() {
        let map = Map::new("temperat", 6, 6, Bounds::new(2, 3, 2, 2), TileId::new(0, 0))
            .expect("valid map");
        let cells: Vec<_> = map.cells_in_bounds().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 3),
                CellCoord::new(2, 4),
                CellCoord::new(3, 3),
                CellCoord::new(3, 4),
            ]
        );
    }
}
