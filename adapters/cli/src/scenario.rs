//! TOML scenario loading: map, rules, players, actors, and initial orders.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skirmish_core::{
    ActorId, Bounds, CellCoord, CellRect, CellRectSize, Color, Command, PlayerId, ResourceTile,
    TerrainType, TileId,
};
use skirmish_system_activities::{Activities, CaptureBuilding, EnterTransport, Wait};
use skirmish_world::{
    self as world, ActorInit, EjectPassengersOnCapture, Map, Player, RadarSignature,
    ResourceTypeInfo, Ruleset, Tileset, World,
};
use tracing::{debug, info};

/// Parsed scenario file, validated lazily as its parts are built.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    map: MapSection,
    #[serde(default)]
    tilesets: Vec<TilesetSection>,
    #[serde(default)]
    resource_types: Vec<ResourceTypeSection>,
    #[serde(default)]
    players: Vec<PlayerSection>,
    local_player: u32,
    #[serde(default)]
    actors: Vec<ActorSection>,
    #[serde(default)]
    orders: Vec<OrderSection>,
    #[serde(default)]
    shroud: ShroudSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapSection {
    tileset: String,
    columns: u32,
    rows: u32,
    bounds: RectSection,
    #[serde(default = "default_fill")]
    fill: String,
    #[serde(default)]
    tiles: Vec<String>,
    #[serde(default)]
    resources: Vec<ResourceSection>,
    #[serde(default)]
    custom_terrain: Vec<CustomTerrainSection>,
}

fn default_fill() -> String {
    "0:0".to_owned()
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RectSection {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceSection {
    cell: [u32; 2],
    kind: u8,
    #[serde(default = "default_density")]
    density: u8,
}

fn default_density() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomTerrainSection {
    cell: [u32; 2],
    terrain: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TilesetSection {
    id: String,
    terrain: BTreeMap<String, String>,
    #[serde(default)]
    templates: Vec<TemplateSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateSection {
    id: u16,
    tiles: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceTypeSection {
    kind: u8,
    terrain: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerSection {
    id: u32,
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActorSection {
    name: String,
    kind: String,
    owner: u32,
    location: [u32; 2],
    footprint: Option<[u32; 2]>,
    #[serde(default)]
    radar: bool,
    radar_color: Option<String>,
    cargo: Option<u32>,
    #[serde(default)]
    eject_on_capture: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum OrderKind {
    Capture,
    Enter,
    Wait,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OrderSection {
    actor: String,
    activity: OrderKind,
    target: Option<String>,
    frames: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShroudSection {
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    visible: Vec<RectSection>,
}

/// Fully constructed simulation state described by a scenario.
#[derive(Debug)]
pub(crate) struct Simulation {
    pub(crate) world: World,
    pub(crate) activities: Activities,
    pub(crate) names: BTreeMap<ActorId, String>,
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Builds the tile grid, resources, and terrain overrides.
    pub(crate) fn build_map(&self) -> Result<Map> {
        let section = &self.map;
        let fill = parse_tile(&section.fill)?;
        let bounds = Bounds::new(
            section.bounds.left,
            section.bounds.top,
            section.bounds.width,
            section.bounds.height,
        );
        let mut map = Map::new(&section.tileset, section.columns, section.rows, bounds, fill)
            .context("map bounds do not fit the grid")?;

        if section.tiles.len() > usize::try_from(section.rows)? {
            bail!(
                "map lists {} tile rows but only has {} rows",
                section.tiles.len(),
                section.rows
            );
        }
        for (row, line) in (0_u32..).zip(&section.tiles) {
            let tiles = line
                .split_whitespace()
                .map(parse_tile)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("invalid tile in map row {row}"))?;
            if tiles.len() != usize::try_from(section.columns)? {
                bail!(
                    "map row {row} lists {} tiles; expected {}",
                    tiles.len(),
                    section.columns
                );
            }
            for (column, tile) in (0_u32..).zip(tiles) {
                let _ = map.set_tile(CellCoord::new(column, row), tile);
            }
        }

        for resource in &section.resources {
            let cell = cell(resource.cell);
            if !map.set_resource(cell, ResourceTile::new(resource.kind, resource.density)) {
                bail!("resource cell {cell:?} lies outside the grid");
            }
        }
        for custom in &section.custom_terrain {
            let cell = cell(custom.cell);
            if !map.set_custom_terrain(cell, Some(TerrainType::new(custom.terrain.as_str()))) {
                bail!("custom terrain cell {cell:?} lies outside the grid");
            }
        }

        Ok(map)
    }

    /// Builds the rules registry from the tileset and resource sections.
    pub(crate) fn build_ruleset(&self) -> Result<Ruleset> {
        let mut ruleset = Ruleset::new();
        let mut seen = Vec::with_capacity(self.tilesets.len());
        for section in &self.tilesets {
            if seen.contains(&section.id.as_str()) {
                bail!("duplicate tileset `{}`", section.id);
            }
            seen.push(section.id.as_str());

            let mut tileset = Tileset::new(section.id.as_str());
            for (terrain, color) in &section.terrain {
                let color = parse_color(color).with_context(|| {
                    format!("invalid color for terrain `{terrain}` in `{}`", section.id)
                })?;
                tileset = tileset.with_terrain(TerrainType::new(terrain.as_str()), color);
            }
            for template in &section.templates {
                let tiles = template
                    .tiles
                    .iter()
                    .map(|terrain| TerrainType::new(terrain.as_str()))
                    .collect();
                tileset = tileset.with_template(template.id, tiles);
            }
            ruleset = ruleset.with_tileset(tileset);
        }

        for resource in &self.resource_types {
            if resource.kind == 0 {
                bail!("resource kind 0 is reserved for empty cells");
            }
            ruleset = ruleset.with_resource_type(ResourceTypeInfo {
                resource_type: resource.kind,
                terrain_type: TerrainType::new(resource.terrain.as_str()),
            });
        }

        Ok(ruleset)
    }

    /// Builds the world, spawns actors, applies the initial shroud, and queues orders.
    pub(crate) fn build(&self) -> Result<Simulation> {
        let local_player = PlayerId::new(self.local_player);
        let mut world = World::new(self.build_map()?, self.build_ruleset()?, local_player);

        for player in &self.players {
            let color = parse_color(&player.color)
                .with_context(|| format!("invalid color for player `{}`", player.name))?;
            world.add_player(Player::new(PlayerId::new(player.id), player.name.as_str(), color));
        }
        if !self.players.iter().any(|player| player.id == self.local_player) {
            bail!("local player {} is not listed in [[players]]", self.local_player);
        }

        let mut ids = HashMap::with_capacity(self.actors.len());
        let mut names = BTreeMap::new();
        for section in &self.actors {
            if !self.players.iter().any(|player| player.id == section.owner) {
                bail!("actor `{}` names unknown owner {}", section.name, section.owner);
            }
            let location = cell(section.location);
            if !world::query::map(&world).contains(location) {
                bail!("actor `{}` starts outside the map bounds", section.name);
            }
            let init = actor_init(section)?;
            let id = world.spawn(init);
            if ids.insert(section.name.as_str(), id).is_some() {
                bail!("duplicate actor name `{}`", section.name);
            }
            let _ = names.insert(id, section.name.clone());
            debug!(%id, name = %section.name, "spawned scenario actor");
        }

        let mut events = Vec::new();
        if self.shroud.disabled {
            world::apply(&mut world, Command::SetShroudDisabled { disabled: true }, &mut events);
        }
        if !self.shroud.visible.is_empty() {
            let visible = self
                .shroud
                .visible
                .iter()
                .flat_map(|rect| {
                    CellRect::from_origin_and_size(
                        CellCoord::new(rect.left, rect.top),
                        CellRectSize::new(rect.width, rect.height),
                    )
                    .cells()
                })
                .collect();
            world::apply(&mut world, Command::UpdateVision { visible }, &mut events);
        }

        let mut activities = Activities::new();
        for order in &self.orders {
            let actor = lookup(&ids, &order.actor)?;
            match order.activity {
                OrderKind::Capture => {
                    let target = lookup(&ids, require(order.target.as_deref(), order)?)?;
                    activities.queue(actor, Box::new(CaptureBuilding::new(target)));
                }
                OrderKind::Enter => {
                    let transport = lookup(&ids, require(order.target.as_deref(), order)?)?;
                    activities.queue(actor, Box::new(EnterTransport::new(transport)));
                }
                OrderKind::Wait => {
                    let Some(frames) = order.frames else {
                        bail!("wait order for `{}` is missing `frames`", order.actor);
                    };
                    activities.queue(actor, Box::new(Wait::new(frames)));
                }
            }
        }

        info!(
            actors = names.len(),
            orders = self.orders.len(),
            "scenario loaded"
        );
        Ok(Simulation {
            world,
            activities,
            names,
        })
    }
}

fn actor_init(section: &ActorSection) -> Result<ActorInit> {
    let mut init = ActorInit::new(
        section.kind.as_str(),
        PlayerId::new(section.owner),
        cell(section.location),
    );
    if let Some([width, height]) = section.footprint {
        init = init.with_footprint(CellRectSize::new(width, height));
    }
    if section.radar || section.radar_color.is_some() {
        let color = section
            .radar_color
            .as_deref()
            .map(parse_color)
            .transpose()
            .with_context(|| format!("invalid radar color for actor `{}`", section.name))?;
        init = init.with_radar_signature(RadarSignature { color });
    }
    if let Some(capacity) = section.cargo {
        init = init.with_cargo(capacity);
    }
    if section.eject_on_capture {
        if section.cargo.is_none() {
            bail!(
                "actor `{}` ejects passengers on capture but has no cargo",
                section.name
            );
        }
        init = init.with_capture_notifier(Box::new(EjectPassengersOnCapture));
    }
    Ok(init)
}

fn lookup(ids: &HashMap<&str, ActorId>, name: &str) -> Result<ActorId> {
    ids.get(name)
        .copied()
        .with_context(|| format!("order references unknown actor `{name}`"))
}

fn require<'a>(target: Option<&'a str>, order: &OrderSection) -> Result<&'a str> {
    match target {
        Some(target) => Ok(target),
        None => bail!(
            "{:?} order for `{}` is missing `target`",
            order.activity,
            order.actor
        ),
    }
}

fn cell([column, row]: [u32; 2]) -> CellCoord {
    CellCoord::new(column, row)
}

fn parse_tile(value: &str) -> Result<TileId> {
    let Some((template, index)) = value.split_once(':') else {
        bail!("tile `{value}` is not in `template:index` form");
    };
    let template = template
        .trim()
        .parse::<u16>()
        .with_context(|| format!("invalid template in tile `{value}`"))?;
    let index = index
        .trim()
        .parse::<u8>()
        .with_context(|| format!("invalid index in tile `{value}`"))?;
    Ok(TileId::new(template, index))
}

fn parse_color(value: &str) -> Result<Color> {
    let Some(hex) = value.strip_prefix('#') else {
        bail!("color `{value}` must start with `#`");
    };
    if !matches!(hex.len(), 6 | 8) {
        bail!("color `{value}` must have 6 or 8 hex digits");
    }
    let channel = |offset: usize| -> Result<u8> {
        let digits = hex
            .get(offset..offset + 2)
            .with_context(|| format!("color `{value}` is truncated"))?;
        u8::from_str_radix(digits, 16).with_context(|| format!("invalid hex digits in `{value}`"))
    };
    let color = Color::from_rgb(channel(0)?, channel(2)?, channel(4)?);
    if hex.len() == 8 {
        return Ok(color.with_alpha(channel(6)?));
    }
    Ok(color)
}
