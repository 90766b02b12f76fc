//! Spatial and ownership indices over actors that are in the world.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::{ActorId, CellCoord, PlayerId};

use crate::actors::Actor;

/// Index keyed on the state an actor had when it joined the world.
///
/// Entries are not refreshed when an actor changes owner or position while in
/// the world; callers detach the actor, mutate it, and attach it again.
#[derive(Clone, Debug)]
pub(crate) struct ActorIndex {
    columns: u32,
    rows: u32,
    cells: Vec<Vec<ActorId>>,
    by_owner: BTreeMap<PlayerId, BTreeSet<ActorId>>,
}

impl ActorIndex {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Vec::new(); capacity],
            by_owner: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, actor: &Actor) {
        for cell in actor.presence_cells() {
            if let Some(index) = self.index(cell) {
                let slot = &mut self.cells[index];
                if !slot.contains(&actor.id()) {
                    slot.push(actor.id());
                }
            }
        }
        let _ = self
            .by_owner
            .entry(actor.owner())
            .or_default()
            .insert(actor.id());
    }

    pub(crate) fn remove(&mut self, actor: &Actor) {
        for cell in actor.presence_cells() {
            if let Some(index) = self.index(cell) {
                self.cells[index].retain(|id| *id != actor.id());
            }
        }
        if let Some(owned) = self.by_owner.get_mut(&actor.owner()) {
            let _ = owned.remove(&actor.id());
            if owned.is_empty() {
                let _ = self.by_owner.remove(&actor.owner());
            }
        }
    }

    pub(crate) fn at(&self, cell: CellCoord) -> &[ActorId] {
        self.index(cell)
            .map(|index| self.cells[index].as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = ActorId> + '_ {
        self.by_owner
            .get(&player)
            .into_iter()
            .flat_map(|owned| owned.iter().copied())
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
