use crate::braille::BrailleCanvas;
use glam::DVec2;

/// A closed ring of points (first point need not be repeated)
pub type Ring = Vec<DVec2>;

/// Axis-aligned bounds in whatever space the points live in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn of_rings<'a>(rings: impl IntoIterator<Item = &'a Ring>) -> Option<Self> {
        let mut points = rings.into_iter().flatten();
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline(always)]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Stroke every ring edge, including the closing edge
pub fn stroke_rings(canvas: &mut BrailleCanvas, rings: &[Ring]) {
    for ring in rings {
        if ring.len() < 2 {
            continue;
        }
        let closing = std::iter::once((ring[ring.len() - 1], ring[0]));
        for (a, b) in ring.windows(2).map(|w| (w[0], w[1])).chain(closing) {
            draw_line(
                canvas,
                a.x.round() as i32,
                a.y.round() as i32,
                b.x.round() as i32,
                b.y.round() as i32,
            );
        }
    }
}

/// Scanline fill with the even-odd rule, so holes stay empty.
/// Points are in braille pixel space; pixel (x, y) is lit when its
/// center (x + 0.5, y + 0.5) is inside.
pub fn fill_rings(canvas: &mut BrailleCanvas, rings: &[Ring]) {
    let Some(bounds) = Bounds::of_rings(rings) else {
        return;
    };

    let y_start = (bounds.min.y.floor() as i32).max(0);
    let y_end = (bounds.max.y.ceil() as i32).min(canvas.pixel_height() as i32 - 1);
    let mut crossings: Vec<f64> = Vec::new();

    for y in y_start..=y_end {
        let sy = y as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                // Half-open test so shared vertices are counted once
                if (a.y <= sy) != (b.y <= sy) {
                    crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
        }

        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).floor() as i32;
            if x0 <= x1 {
                canvas.fill_span(y, x0, x1);
            }
        }
    }
}

/// Even-odd point-in-polygon over all rings
pub fn rings_contain(rings: &[Ring], p: DVec2) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0 + size, y0),
            DVec2::new(x0 + size, y0 + size),
            DVec2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_square_covers_cells() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_rings(&mut canvas, &[square(0.0, 0.0, 4.0)]);
        assert_eq!(canvas.to_string(), "⣿⣿");
    }

    #[test]
    fn test_fill_respects_holes() {
        let mut canvas = BrailleCanvas::new(3, 3);
        // 6x12 pixels; hole knocks out the middle cell column
        let outer = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(6.0, 0.0),
            DVec2::new(6.0, 12.0),
            DVec2::new(0.0, 12.0),
        ];
        let hole = vec![
            DVec2::new(2.0, 4.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(4.0, 8.0),
            DVec2::new(2.0, 8.0),
        ];
        fill_rings(&mut canvas, &[outer, hole]);
        assert_eq!(canvas.to_string(), "⣿⣿⣿\n⣿\u{2800}⣿\n⣿⣿⣿");
    }

    #[test]
    fn test_fill_offscreen_is_noop() {
        let mut canvas = BrailleCanvas::new(2, 2);
        fill_rings(&mut canvas, &[square(100.0, 100.0, 5.0)]);
        fill_rings(&mut canvas, &[]);
        assert!(canvas.glyphs().next().is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let rings = [square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)];
        assert!(rings_contain(&rings, DVec2::new(1.0, 1.0)));
        assert!(!rings_contain(&rings, DVec2::new(5.0, 5.0)));
        assert!(!rings_contain(&rings, DVec2::new(11.0, 5.0)));
    }

    #[test]
    fn test_stroke_closes_ring() {
        let mut canvas = BrailleCanvas::new(2, 1);
        stroke_rings(&mut canvas, &[square(0.0, 0.0, 3.0)]);
        // Outline of a 4x4 box: left and right columns plus top and bottom rows
        assert_eq!(canvas.to_string(), "⣏⣹");
    }

    #[test]
    fn test_bounds() {
        let rings = [square(1.0, 2.0, 3.0), square(-1.0, 0.0, 1.0)];
        let b = Bounds::of_rings(&rings).unwrap();
        assert_eq!(b.min, DVec2::new(-1.0, 0.0));
        assert_eq!(b.max, DVec2::new(4.0, 5.0));
        assert!(b.contains(DVec2::new(0.0, 3.0)));
        assert!(b.intersects(&Bounds::of_rings(&[square(3.5, 4.5, 2.0)]).unwrap()));
        assert!(!b.intersects(&Bounds::of_rings(&[square(4.5, 0.0, 1.0)]).unwrap()));
        assert!(Bounds::of_rings(&Vec::<Ring>::new()).is_none());
    }
}
