use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{Point, Rect};
use crate::render::Pixmap;

bitflags! {
    /// Per-cell classification flags. A cell with no flags set is
    /// "empty": it never blocks and draws with no special treatment.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        const GROUND      = 0x01;
        const WALL        = 0x02;
        const DAMAGING    = 0x04;
        const HEALING     = 0x08;
        const TRANSLUCENT = 0x10;
    }
}

impl CellFlags {
    /// Whether a cell with these flags blocks actor movement:
    /// non-empty, and either not walkable ground at all or ground
    /// that doubles as a wall. Plain GROUND never blocks; WALL
    /// blocks whether or not GROUND is also set.
    pub fn blocks(self) -> bool {
        !self.is_empty() && (!self.contains(CellFlags::GROUND) || self.contains(CellFlags::WALL))
    }

    /// Whether an actor may be placed on a cell with these flags.
    /// Stricter than `blocks`: hazards are legal to walk over but
    /// not to spawn on.
    pub fn allows_occupancy(self) -> bool {
        self.contains(CellFlags::GROUND)
            && !self.intersects(CellFlags::WALL | CellFlags::DAMAGING | CellFlags::HEALING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilesetError {
    #[error("cell flag count mismatch: expected {expected}, got {actual}")]
    FlagCountMismatch { expected: usize, actual: usize },
}

/// Immutable per-cell metadata for one cell image sheet. Cell indices
/// address the sheet row-major; index 0 is the top-left cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tileset {
    cell_size: Point,
    flags: Vec<CellFlags>,
    sheet_size_in_cells: Point,
    #[serde(skip)]
    sheet: Pixmap,
}

impl Tileset {
    pub fn new(
        cell_size: Point,
        sheet_size_in_cells: Point,
        flags: Vec<CellFlags>,
    ) -> Result<Self, TilesetError> {
        let expected = sheet_size_in_cells.x as usize * sheet_size_in_cells.y as usize;
        let actual = flags.len();
        if expected != actual {
            return Err(TilesetError::FlagCountMismatch { expected, actual });
        }
        Ok(Self {
            cell_size,
            flags,
            sheet_size_in_cells,
            sheet: Pixmap::default(),
        })
    }

    /// Attaches the decoded cell sheet. The asset layer calls this
    /// once after construction; the core never loads files itself.
    pub fn bind_sheet(&mut self, sheet: Pixmap) {
        self.sheet = sheet;
    }

    pub fn cell_size(&self) -> Point {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.flags.len()
    }

    pub fn sheet(&self) -> &Pixmap {
        &self.sheet
    }

    /// Flags for a cell index. Out-of-range indices read as empty so
    /// a malformed map degrades to non-blocking cells instead of
    /// panicking mid-simulation.
    pub fn cell_flags(&self, index: u16) -> CellFlags {
        self.flags
            .get(index as usize)
            .copied()
            .unwrap_or(CellFlags::empty())
    }

    /// Pixel source rectangle of a cell within the sheet.
    pub fn cell_src_rect(&self, index: u16) -> Rect {
        let columns = self.sheet_size_in_cells.x.max(1);
        let cell_x = index as i32 % columns;
        let cell_y = index as i32 / columns;
        Rect::new(
            cell_x * self.cell_size.x,
            cell_y * self.cell_size.y,
            self.cell_size.x,
            self.cell_size.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_flag_count_mismatch() {
        let err = Tileset::new(
            Point::new(16, 16),
            Point::new(2, 2),
            vec![CellFlags::GROUND; 3],
        )
        .expect_err("err");
        assert_eq!(
            err,
            TilesetError::FlagCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn out_of_range_index_reads_as_empty() {
        let tileset = Tileset::new(
            Point::new(16, 16),
            Point::new(2, 1),
            vec![CellFlags::GROUND, CellFlags::WALL],
        )
        .expect("tileset");
        assert_eq!(tileset.cell_flags(1), CellFlags::WALL);
        assert_eq!(tileset.cell_flags(99), CellFlags::empty());
    }

    #[test]
    fn src_rect_addresses_sheet_row_major() {
        let tileset = Tileset::new(
            Point::new(8, 8),
            Point::new(4, 4),
            vec![CellFlags::empty(); 16],
        )
        .expect("tileset");
        assert_eq!(tileset.cell_src_rect(0), Rect::new(0, 0, 8, 8));
        assert_eq!(tileset.cell_src_rect(3), Rect::new(24, 0, 8, 8));
        assert_eq!(tileset.cell_src_rect(4), Rect::new(0, 8, 8, 8));
        assert_eq!(tileset.cell_src_rect(7), Rect::new(24, 8, 8, 8));
    }

    #[test]
    fn blocking_rule_treats_wall_ground_combinations_normatively() {
        assert!(!CellFlags::empty().blocks());
        assert!(!CellFlags::GROUND.blocks());
        assert!(CellFlags::WALL.blocks());
        assert!((CellFlags::GROUND | CellFlags::WALL).blocks());
        // Non-ground decoration blocks unconditionally.
        assert!(CellFlags::TRANSLUCENT.blocks());
        // Hazards on ground stay walkable.
        assert!(!(CellFlags::GROUND | CellFlags::DAMAGING).blocks());
    }

    #[test]
    fn occupancy_rule_excludes_hazards_and_walls() {
        assert!(CellFlags::GROUND.allows_occupancy());
        assert!((CellFlags::GROUND | CellFlags::TRANSLUCENT).allows_occupancy());
        assert!(!CellFlags::empty().allows_occupancy());
        assert!(!(CellFlags::GROUND | CellFlags::WALL).allows_occupancy());
        assert!(!(CellFlags::GROUND | CellFlags::DAMAGING).allows_occupancy());
        assert!(!(CellFlags::GROUND | CellFlags::HEALING).allows_occupancy());
    }

    #[test]
    fn flags_round_trip_through_json() {
        let tileset = Tileset::new(
            Point::new(16, 16),
            Point::new(2, 1),
            vec![CellFlags::GROUND, CellFlags::GROUND | CellFlags::WALL],
        )
        .expect("tileset");
        let json = serde_json::to_string(&tileset).expect("encode");
        let parsed: Tileset = serde_json::from_str(&json).expect("decode");
        assert_eq!(parsed.cell_flags(1), CellFlags::GROUND | CellFlags::WALL);
        assert_eq!(parsed.cell_size(), Point::new(16, 16));
    }
}
