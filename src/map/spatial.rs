use crate::map::geometry::Bounds;
use std::collections::HashMap;

/// Spatial index over region bounding boxes.
/// Each region is inserted into every cell its bbox overlaps, so a point query
/// never misses the region containing it; false positives are removed by the
/// exact polygon test in [`crate::map::RegionLayer::hit_test`].
#[derive(Debug)]
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes, indexed by iteration order
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bboxes.enumerate() {
            let min_cell = grid.to_cell(b.min.x, b.min.y);
            let max_cell = grid.to_cell(b.max.x, b.max.y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate features whose bbox may contain (lon, lat)
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn bbox(x0: f64, y0: f64, x1: f64, y1: f64) -> Bounds {
        Bounds {
            min: DVec2::new(x0, y0),
            max: DVec2::new(x1, y1),
        }
    }

    #[test]
    fn test_point_query_finds_overlapping_boxes() {
        let boxes = [bbox(70.0, 20.0, 74.0, 24.0), bbox(73.5, 23.5, 80.0, 30.0)];
        let grid = FeatureGrid::build(boxes.iter(), 1.0);

        assert_eq!(grid.query_point(71.2, 21.7), [0]);
        assert_eq!(grid.query_point(73.9, 23.9), [0, 1]);
        assert_eq!(grid.query_point(79.5, 29.5), [1]);
        assert!(grid.query_point(10.0, 10.0).is_empty());
    }
}
