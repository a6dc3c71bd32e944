use std::collections::{HashMap, HashSet};

use glam::DVec3;

use crate::core::store::BodyId;

type CellCoord = (i32, i32, i32);

/// Uniform-grid broadphase. Each body AABB is registered in every grid cell
/// it overlaps; candidate pairs are emitted per cell and deduplicated with
/// an unordered pair key.
///
/// Emission order depends only on insertion order and cell traversal order
/// (touched cells are walked in first-touch order), so the candidate list
/// is deterministic for a fixed body insertion sequence.
pub struct UniformGridBroadphase {
    cell_size: f64,
    cells: HashMap<CellCoord, Vec<BodyId>>,
    touched: Vec<CellCoord>,
    touched_set: HashSet<CellCoord>,
}

impl UniformGridBroadphase {
    /// `cell_size` should be around the average object diameter.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-6),
            cells: HashMap::new(),
            touched: Vec::new(),
            touched_set: HashSet::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Empties all cells before a rebuild.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.touched.clear();
        self.touched_set.clear();
    }

    fn cell_of(&self, v: f64) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Registers a body in every cell covered by its world-space AABB.
    pub fn insert(&mut self, id: BodyId, min: DVec3, max: DVec3) {
        let (x0, y0, z0) = (self.cell_of(min.x), self.cell_of(min.y), self.cell_of(min.z));
        let (x1, y1, z1) = (self.cell_of(max.x), self.cell_of(max.y), self.cell_of(max.z));

        for x in x0..=x1 {
            for y in y0..=y1 {
                for z in z0..=z1 {
                    let key = (x, y, z);
                    self.cells.entry(key).or_default().push(id);
                    if self.touched_set.insert(key) {
                        self.touched.push(key);
                    }
                }
            }
        }
    }

    /// Emits all unordered candidate pairs: no `(a, a)`, no duplicates, one
    /// entry even when two bodies share several cells.
    pub fn compute_pairs(&self) -> Vec<(BodyId, BodyId)> {
        let mut seen: HashSet<(BodyId, BodyId)> = HashSet::new();
        let mut pairs = Vec::new();

        for key in &self.touched {
            let Some(entries) = self.cells.get(key) else {
                continue;
            };
            if entries.len() < 2 {
                continue;
            }

            for i in 0..entries.len() {
                for j in (i + 1)..entries.len() {
                    let (a, b) = (entries[i], entries[j]);
                    if a == b {
                        continue;
                    }
                    let pair_key = if a < b { (a, b) } else { (b, a) };
                    if seen.insert(pair_key) {
                        pairs.push((a, b));
                    }
                }
            }
        }

        pairs
    }
}
