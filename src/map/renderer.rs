use crate::braille::BrailleCanvas;
use crate::map::geometry::{fill_rings, rings_contain, stroke_rings, Bounds, Ring};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use glam::DVec2;
use rayon::prelude::*;
use std::collections::HashMap;

/// Grid cell size in degrees for region hit testing
const HIT_GRID_CELL: f64 = 1.0;

/// One named, clickable polygon (possibly multi-part, possibly with holes)
#[derive(Clone, Debug)]
pub struct RegionShape {
    pub name: String,
    /// Rings in (lon, lat) degrees, combined with the even-odd rule
    pub rings: Vec<Ring>,
    pub bounds: Bounds,
}

/// Braille layers for one frame, drawn back to front
pub struct MapLayers {
    pub fill: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub outline: BrailleCanvas,
}

/// The choropleth: region polygons plus decorative outlines
#[derive(Debug)]
pub struct RegionLayer {
    regions: Vec<RegionShape>,
    outlines: Vec<Ring>,
    by_name: HashMap<String, usize>,
    grid: FeatureGrid,
}

impl RegionLayer {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            outlines: Vec::new(),
            by_name: HashMap::new(),
            grid: FeatureGrid::new(HIT_GRID_CELL),
        }
    }

    /// Add a region. Parts of a region split across several features are merged.
    pub fn add_region(&mut self, name: &str, rings: Vec<Ring>) {
        let rings: Vec<Ring> = rings.into_iter().filter(|r| r.len() >= 3).collect();
        let Some(bounds) = Bounds::of_rings(&rings) else {
            return;
        };

        match self.by_name.get(name) {
            Some(&idx) => {
                let region = &mut self.regions[idx];
                region.rings.extend(rings);
                region.bounds = region.bounds.union(bounds);
            }
            None => {
                self.by_name.insert(name.to_string(), self.regions.len());
                self.regions.push(RegionShape {
                    name: name.to_string(),
                    rings,
                    bounds,
                });
            }
        }
    }

    /// Add an outline that is drawn but never hit
    pub fn add_outline(&mut self, ring: Ring) {
        if ring.len() >= 2 {
            self.outlines.push(ring);
        }
    }

    /// Rebuild the hit-test index; call after the last `add_region`
    pub fn build_index(&mut self) {
        self.grid = FeatureGrid::build(self.regions.iter().map(|r| &r.bounds), HIT_GRID_CELL);
    }

    pub fn regions(&self) -> &[RegionShape] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn has_data(&self) -> bool {
        !self.regions.is_empty() || !self.outlines.is_empty()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.regions.get(idx).map(|r| r.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Bounds of everything drawn, in degrees
    pub fn bounds(&self) -> Option<Bounds> {
        let outlines = Bounds::of_rings(&self.outlines);
        self.regions
            .iter()
            .map(|r| r.bounds)
            .chain(outlines)
            .reduce(Bounds::union)
    }

    /// Region containing (lon, lat), lowest index first when shapes overlap
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<usize> {
        let p = DVec2::new(lon, lat);
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .filter(|&idx| {
                let region = &self.regions[idx];
                region.bounds.contains(p) && rings_contain(&region.rings, p)
            })
            .min()
    }

    /// Rasterise all regions into braille layers.
    /// `highlighted` regions go to the highlight layer instead of the fill layer.
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, highlighted: &[usize]) -> MapLayers {
        let mut layers = MapLayers {
            fill: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
            outline: BrailleCanvas::new(width, height),
        };

        let visible = viewport.visible_bounds();
        let project = |ring: &Ring| -> Ring { ring.iter().map(|&p| viewport.project_point(p)).collect() };

        // Projection dominates frame time at high detail; regions are independent
        let mut projected: Vec<(usize, Vec<Ring>)> = self
            .regions
            .par_iter()
            .enumerate()
            .filter(|(_, r)| r.bounds.intersects(&visible))
            .map(|(idx, r)| (idx, r.rings.iter().map(&project).collect()))
            .collect();
        projected.sort_unstable_by_key(|(idx, _)| *idx);

        for (idx, rings) in &projected {
            let target = if highlighted.contains(idx) {
                &mut layers.highlight
            } else {
                &mut layers.fill
            };
            fill_rings(target, rings);
            stroke_rings(&mut layers.outline, rings);
        }

        let outlines: Vec<Ring> = self.outlines.par_iter().map(&project).collect();
        stroke_rings(&mut layers.outline, &outlines);

        layers
    }
}

impl Default for RegionLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]
    }

    fn layer() -> RegionLayer {
        let mut layer = RegionLayer::new();
        layer.add_region("Punjab", vec![rect(73.8, 29.5, 76.9, 32.5)]);
        layer.add_region("Rajasthan", vec![rect(69.5, 23.0, 78.2, 29.5)]);
        // A second, separate part of Rajasthan
        layer.add_region("Rajasthan", vec![rect(69.5, 21.0, 71.0, 22.5)]);
        layer.build_index();
        layer
    }

    #[test]
    fn test_hit_test_finds_containing_region() {
        let layer = layer();
        assert_eq!(layer.hit_test(75.0, 31.0).and_then(|i| layer.name(i)), Some("Punjab"));
        assert_eq!(layer.hit_test(72.0, 26.0).and_then(|i| layer.name(i)), Some("Rajasthan"));
        assert_eq!(layer.hit_test(70.0, 22.0).and_then(|i| layer.name(i)), Some("Rajasthan"));
        assert_eq!(layer.hit_test(90.0, 10.0), None);
    }

    #[test]
    fn test_parts_merge_under_one_name() {
        let layer = layer();
        assert_eq!(layer.len(), 2);
        let rajasthan = &layer.regions()[layer.index_of("Rajasthan").unwrap()];
        assert_eq!(rajasthan.rings.len(), 2);
        assert_eq!(rajasthan.bounds.min, DVec2::new(69.5, 21.0));
    }

    #[test]
    fn test_degenerate_rings_are_dropped() {
        let mut layer = RegionLayer::new();
        layer.add_region("Nowhere", vec![vec![DVec2::ZERO, DVec2::ONE]]);
        assert!(layer.is_empty());
        assert!(!layer.has_data());
    }

    #[test]
    fn test_render_routes_highlighted_region() {
        let layer = layer();
        let bounds = layer.bounds().unwrap();
        let vp = Viewport::fit(bounds, 80, 80, 0.9);

        let plain = layer.render(40, 20, &vp, &[]);
        assert!(plain.fill.glyphs().next().is_some());
        assert!(plain.highlight.glyphs().next().is_none());
        assert!(plain.outline.glyphs().next().is_some());

        let punjab = layer.index_of("Punjab").unwrap();
        let lit = layer.render(40, 20, &vp, &[punjab]);
        assert!(lit.highlight.glyphs().next().is_some());
        assert!(lit.fill.glyphs().count() < plain.fill.glyphs().count());
    }

    #[test]
    fn test_bounds_cover_outlines() {
        let mut layer = RegionLayer::new();
        layer.add_outline(rect(60.0, 0.0, 100.0, 40.0));
        assert!(layer.has_data());
        let b = layer.bounds().unwrap();
        assert_eq!(b.min, DVec2::new(60.0, 0.0));
        assert_eq!(b.max, DVec2::new(100.0, 40.0));
    }
}
