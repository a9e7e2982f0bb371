use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{Point, Rect};
use crate::tileset::Tileset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("layer {layer} cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },
}

/// One grid-shaped array of cell indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayer {
    pub cells: Vec<u16>,
}

impl MapLayer {
    pub fn filled(size: Point, cell: u16) -> Self {
        Self {
            cells: vec![cell; size.x as usize * size.y as usize],
        }
    }
}

/// Where the level places an actor at load time. `cell` is in grid
/// cells, not pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub actor_type: String,
    pub cell: Point,
    pub layer: usize,
    pub argument: i32,
}

/// A level grid: stacked layers of cell indices plus spawn records.
/// Mutated only by the editor; the runtime treats a loaded map as
/// read-only except for `resize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    size: Point,
    tileset: String,
    layers: Vec<MapLayer>,
    spawns: Vec<Spawn>,
}

impl Map {
    pub fn new(
        size: Point,
        tileset: String,
        layers: Vec<MapLayer>,
        spawns: Vec<Spawn>,
    ) -> Result<Self, MapError> {
        let expected = size.x as usize * size.y as usize;
        for (index, layer) in layers.iter().enumerate() {
            let actual = layer.cells.len();
            if actual != expected {
                return Err(MapError::CellCountMismatch {
                    layer: index,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self {
            size,
            tileset,
            layers,
            spawns,
        })
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn tileset_name(&self) -> &str {
        &self.tileset
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }

    pub fn in_bounds(&self, cell: Point) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.size.x && cell.y < self.size.y
    }

    pub fn cell_at(&self, layer: usize, cell: Point) -> Option<u16> {
        if !self.in_bounds(cell) {
            return None;
        }
        let index = cell.y as usize * self.size.x as usize + cell.x as usize;
        self.layers.get(layer).and_then(|l| l.cells.get(index)).copied()
    }

    /// The map's covered pixel rectangle under a given tileset.
    pub fn pixel_rect(&self, tileset: &Tileset) -> Rect {
        let cell = tileset.cell_size();
        Rect::new(0, 0, self.size.x * cell.x, self.size.y * cell.y)
    }

    /// Grows or shrinks the grid. Cell values are preserved
    /// positionally: cell (x, y) keeps its index wherever both the
    /// old and new grid contain it; new cells read as index 0.
    pub fn resize(&mut self, new_size: Point) {
        let new_size = Point::new(new_size.x.max(0), new_size.y.max(0));
        if new_size == self.size {
            return;
        }
        let old_size = self.size;
        for layer in &mut self.layers {
            let mut cells = vec![0u16; new_size.x as usize * new_size.y as usize];
            let copy_w = old_size.x.min(new_size.x) as usize;
            let copy_h = old_size.y.min(new_size.y) as usize;
            for y in 0..copy_h {
                let old_row = y * old_size.x as usize;
                let new_row = y * new_size.x as usize;
                cells[new_row..new_row + copy_w]
                    .copy_from_slice(&layer.cells[old_row..old_row + copy_w]);
            }
            layer.cells = cells;
        }
        self.size = new_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_map(size: Point, layers: Vec<MapLayer>) -> Map {
        Map::new(size, "terrain".to_string(), layers, Vec::new()).expect("map")
    }

    #[test]
    fn new_rejects_layer_with_wrong_cell_count() {
        let err = Map::new(
            Point::new(3, 2),
            "terrain".to_string(),
            vec![
                MapLayer::filled(Point::new(3, 2), 0),
                MapLayer {
                    cells: vec![0; 5],
                },
            ],
            Vec::new(),
        )
        .expect_err("err");
        assert_eq!(
            err,
            MapError::CellCountMismatch {
                layer: 1,
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn cell_at_reads_row_major_and_rejects_out_of_bounds() {
        let mut layer = MapLayer::filled(Point::new(3, 2), 0);
        layer.cells[5] = 7; // row 1, column 2
        let map = grid_map(Point::new(3, 2), vec![layer]);

        assert_eq!(map.cell_at(0, Point::new(2, 1)), Some(7));
        assert_eq!(map.cell_at(0, Point::new(0, 0)), Some(0));
        assert_eq!(map.cell_at(0, Point::new(3, 0)), None);
        assert_eq!(map.cell_at(0, Point::new(0, 2)), None);
        assert_eq!(map.cell_at(0, Point::new(-1, 0)), None);
        assert_eq!(map.cell_at(1, Point::new(0, 0)), None);
    }

    #[test]
    fn resize_preserves_cells_positionally() {
        let mut layer = MapLayer::filled(Point::new(3, 3), 0);
        for y in 0..3 {
            for x in 0..3 {
                layer.cells[y * 3 + x] = (y * 3 + x) as u16;
            }
        }
        let mut map = grid_map(Point::new(3, 3), vec![layer]);

        map.resize(Point::new(2, 4));
        assert_eq!(map.size(), Point::new(2, 4));
        // Surviving cells keep their values by position.
        assert_eq!(map.cell_at(0, Point::new(0, 0)), Some(0));
        assert_eq!(map.cell_at(0, Point::new(1, 2)), Some(7));
        // Padded cells read as index 0.
        assert_eq!(map.cell_at(0, Point::new(0, 3)), Some(0));

        map.resize(Point::new(3, 3));
        assert_eq!(map.cell_at(0, Point::new(1, 1)), Some(4));
        // The column truncated away did not survive the round trip.
        assert_eq!(map.cell_at(0, Point::new(2, 1)), Some(0));
    }

    #[test]
    fn map_round_trips_through_json() {
        let map = Map::new(
            Point::new(2, 2),
            "terrain".to_string(),
            vec![MapLayer {
                cells: vec![1, 2, 3, 4],
            }],
            vec![Spawn {
                actor_type: "player".to_string(),
                cell: Point::new(1, 0),
                layer: 0,
                argument: 0,
            }],
        )
        .expect("map");
        let json = serde_json::to_string(&map).expect("encode");
        let parsed: Map = serde_json::from_str(&json).expect("decode");
        assert_eq!(parsed, map);
    }
}
