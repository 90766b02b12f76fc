//! Read-only reference data: tilesets and resource types.

use std::collections::BTreeMap;

use skirmish_core::{Color, TerrainType, TileId};

/// Display information attached to a terrain type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainInfo {
    /// Color drawn on the minimap for cells of this terrain.
    pub color: Color,
}

/// Maps tile references to terrain types and terrain types to colors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tileset {
    id: String,
    terrain: BTreeMap<TerrainType, TerrainInfo>,
    templates: BTreeMap<u16, Vec<TerrainType>>,
}

impl Tileset {
    /// Creates an empty tileset with the provided identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            terrain: BTreeMap::new(),
            templates: BTreeMap::new(),
        }
    }

    /// Registers the display color of a terrain type.
    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainType, color: Color) -> Self {
        let _ = self.terrain.insert(terrain, TerrainInfo { color });
        self
    }

    /// Registers a template whose tiles map, by index, to the provided terrain types.
    #[must_use]
    pub fn with_template(mut self, template: u16, tiles: Vec<TerrainType>) -> Self {
        let _ = self.templates.insert(template, tiles);
        self
    }

    /// Identifier of the tileset.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Terrain type of the referenced tile, if the template and index exist.
    #[must_use]
    pub fn terrain_type(&self, tile: TileId) -> Option<&TerrainType> {
        self.templates
            .get(&tile.template)
            .and_then(|tiles| tiles.get(usize::from(tile.index)))
    }

    /// Display information for a terrain type, if registered.
    #[must_use]
    pub fn terrain_info(&self, terrain: &TerrainType) -> Option<&TerrainInfo> {
        self.terrain.get(terrain)
    }
}

/// Associates a map resource kind with the terrain type it renders as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceTypeInfo {
    /// Resource kind stored in map cells.
    pub resource_type: u8,
    /// Terrain type whose color represents the resource.
    pub terrain_type: TerrainType,
}

/// World-level rules registry shared by every map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ruleset {
    tilesets: BTreeMap<String, Tileset>,
    resource_types: Vec<ResourceTypeInfo>,
}

impl Ruleset {
    /// Creates an empty ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tileset, replacing any tileset with the same identifier.
    #[must_use]
    pub fn with_tileset(mut self, tileset: Tileset) -> Self {
        let _ = self.tilesets.insert(tileset.id().to_owned(), tileset);
        self
    }

    /// Registers a resource type mapping.
    #[must_use]
    pub fn with_resource_type(mut self, info: ResourceTypeInfo) -> Self {
        self.resource_types.push(info);
        self
    }

    /// Tileset registered under the provided identifier.
    #[must_use]
    pub fn tileset(&self, id: &str) -> Option<&Tileset> {
        self.tilesets.get(id)
    }

    /// Terrain type of the first resource type registered for `kind`.
    #[must_use]
    pub fn resource_terrain(&self, kind: u8) -> Option<&TerrainType> {
        self.resource_types
            .iter()
            .find(|info| info.resource_type == kind)
            .map(|info| &info.terrain_type)
    }
}
