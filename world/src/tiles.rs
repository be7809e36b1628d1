//! Dense per-cell visibility flags.

use murder_town_core::{CellCoord, Tile};

#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    rows: u32,
    columns: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid with every tile hidden and unseen.
    pub(crate) fn new(rows: u32, columns: u32) -> Self {
        let count = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
        Self {
            rows,
            columns,
            tiles: vec![Tile::default(); count],
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let row = u32::try_from(cell.row()).ok()?;
        let column = u32::try_from(cell.column()).ok()?;
        if row >= self.rows || column >= self.columns {
            return None;
        }
        usize::try_from(u64::from(row) * u64::from(self.columns) + u64::from(column)).ok()
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell).map(|index| self.tiles[index])
    }

    /// Replaces the visible set, leaving `seen` flags to accumulate.
    pub(crate) fn show_only(&mut self, visible: &[CellCoord]) {
        for tile in &mut self.tiles {
            tile.visible = false;
        }
        for &cell in visible {
            if let Some(index) = self.index(cell) {
                let tile = &mut self.tiles[index];
                tile.visible = true;
                tile.seen = true;
            }
        }
    }

    pub(crate) fn reveal_all(&mut self) {
        for tile in &mut self.tiles {
            tile.visible = true;
            tile.seen = true;
        }
    }

    pub(crate) fn visible_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.visible).count()
    }

    pub(crate) fn seen_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.seen).count()
    }
}
