//! Exploration and visibility state for the local player.

use skirmish_core::CellCoord;

/// Per-cell explored/visible flags plus a global full-vision switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shroud {
    columns: u32,
    rows: u32,
    disabled: bool,
    explored: Vec<bool>,
    visible: Vec<bool>,
}

impl Shroud {
    /// Creates a fully unexplored shroud covering the grid.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            disabled: false,
            explored: vec![false; capacity],
            visible: vec![false; capacity],
        }
    }

    /// Reports whether full-vision mode is active.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Reports whether the cell has ever been seen.
    #[must_use]
    pub fn is_explored(&self, cell: CellCoord) -> bool {
        self.disabled || self.index(cell).is_some_and(|index| self.explored[index])
    }

    /// Reports whether the cell is currently in sight.
    #[must_use]
    pub fn is_visible(&self, cell: CellCoord) -> bool {
        self.disabled || self.index(cell).is_some_and(|index| self.visible[index])
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Replaces the visible set, exploring each newly visible cell.
    pub(crate) fn update_vision(&mut self, visible: &[CellCoord]) -> usize {
        self.visible.fill(false);
        let mut count = 0;
        for cell in visible {
            if let Some(index) = self.index(*cell) {
                if !self.visible[index] {
                    count += 1;
                }
                self.visible[index] = true;
                self.explored[index] = true;
            }
        }
        count
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
