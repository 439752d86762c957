use std::collections::HashMap;

use crate::types::Vec2;

/// Uniform grid over body centres. Two bodies closer than `cell_size` always
/// land in the same or adjacent cells.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    neighbors: Vec<usize>,
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            neighbors: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn set_cell_size(&mut self, cell_size: f64) {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        self.cell_size = cell_size;
        self.cells.clear();
    }

    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.cells.clear();
        for (idx, pos) in positions.iter().enumerate() {
            let key = self.cell_key(*pos);
            self.cells.entry(key).or_default().push(idx);
        }
    }

    /// Moves `idx` from the cell holding `from` to the cell holding `to`.
    pub fn relocate(&mut self, idx: usize, from: Vec2, to: Vec2) {
        let old = self.cell_key(from);
        let new = self.cell_key(to);
        if old == new {
            return;
        }
        if let Some(indices) = self.cells.get_mut(&old) {
            indices.retain(|&i| i != idx);
            if indices.is_empty() {
                self.cells.remove(&old);
            }
        }
        self.cells.entry(new).or_default().push(idx);
    }

    pub fn query_neighbors(&self, pos: Vec2, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_key(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(indices);
                }
            }
        }
    }

    /// Every `(i, j)` with `i < j` whose cells touch, in ascending
    /// lexicographic order (the same order a nested all-pairs loop visits).
    pub fn candidate_pairs(&mut self, positions: &[Vec2], out: &mut Vec<(usize, usize)>) {
        out.clear();
        self.rebuild(positions);
        let mut neighbors = std::mem::take(&mut self.neighbors);
        for (i, pos) in positions.iter().enumerate() {
            self.query_neighbors(*pos, &mut neighbors);
            out.extend(neighbors.iter().filter(|&&j| j > i).map(|&j| (i, j)));
        }
        self.neighbors = neighbors;
        out.sort_unstable();
    }

    fn cell_key(&self, pos: Vec2) -> (i64, i64) {
        let cx = (pos.x / self.cell_size).floor() as i64;
        let cy = (pos.y / self.cell_size).floor() as i64;
        (cx, cy)
    }
}
