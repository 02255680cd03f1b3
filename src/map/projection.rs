use crate::map::geometry::Bounds;
use glam::DVec2;
use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 400.0;
const ZOOM_STEP: f64 = 1.5;

/// Viewport over a Web Mercator map, sized in braille pixels
#[derive(Clone, Debug)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
}

/// Normalized Web Mercator coordinates in [0, 1]
#[inline(always)]
fn mercator(lon: f64, lat: f64) -> DVec2 {
    let lat_rad = lat.clamp(-85.0, 85.0) * PI / 180.0;
    DVec2::new(
        (lon + 180.0) / 360.0,
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0,
    )
}

/// Inverse of [`mercator`], back to (lon, lat) degrees
#[inline(always)]
fn inverse_mercator(norm: DVec2) -> DVec2 {
    let lon = norm.x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * norm.y)).sinh().atan() * 180.0 / PI;
    DVec2::new(lon, lat)
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Viewport centered on `bounds` (lon/lat degrees) and zoomed so they fill
    /// `margin` of the smaller screen dimension
    pub fn fit(bounds: Bounds, width: usize, height: usize, margin: f64) -> Self {
        let center = bounds.center();
        let mut vp = Self::new(center.x, center.y, 1.0, width, height);
        vp.refit(bounds, margin);
        vp
    }

    /// Re-center and re-zoom onto `bounds`, keeping the pixel size
    pub fn refit(&mut self, bounds: Bounds, margin: f64) {
        let a = mercator(bounds.min.x, bounds.max.y);
        let b = mercator(bounds.max.x, bounds.min.y);
        let span = (b - a).abs().max(DVec2::splat(1e-9));
        let center = bounds.center();

        // scale = zoom * width pixels per normalized unit
        let fit_x = self.width as f64 / span.x;
        let fit_y = self.height as f64 / span.y;
        let scale = fit_x.min(fit_y) * margin;

        self.center_lon = center.x;
        self.center_lat = center.y;
        self.zoom = (scale / self.width.max(1) as f64).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.zoom * self.width.max(1) as f64;
        let center = mercator(self.center_lon, self.center_lat) + DVec2::new(dx as f64, dy as f64) / scale;
        let lonlat = inverse_mercator(center);

        // Wrap longitude
        self.center_lon = if lonlat.x > 180.0 {
            lonlat.x - 360.0
        } else if lonlat.x < -180.0 {
            lonlat.x + 360.0
        } else {
            lonlat.x
        };
        self.center_lat = lonlat.y.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Zoom by factor, keeping the geographic point under (px, py) in place
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let p = self.unproject_point(DVec2::new(px as f64, py as f64));
        (p.x, p.y)
    }

    /// Sub-pixel inverse of [`Viewport::project_point`]
    pub fn unproject_point(&self, pixel: DVec2) -> DVec2 {
        let scale = self.zoom * self.width as f64;
        let center = mercator(self.center_lon, self.center_lat);
        let half = DVec2::new(self.width as f64, self.height as f64) / 2.0;
        inverse_mercator((pixel - half) / scale + center)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_point(DVec2::new(lon, lat));
        (p.x as i32, p.y as i32)
    }

    /// Project (lon, lat) to fractional braille pixels
    #[inline(always)]
    pub fn project_point(&self, lonlat: DVec2) -> DVec2 {
        let scale = self.zoom * self.width as f64;
        let center = mercator(self.center_lon, self.center_lat);
        let half = DVec2::new(self.width as f64, self.height as f64) / 2.0;
        (mercator(lonlat.x, lonlat.y) - center) * scale + half
    }

    /// Geographic bounds in view, for culling
    pub fn visible_bounds(&self) -> Bounds {
        let nw = self.unproject_point(DVec2::ZERO);
        let se = self.unproject_point(DVec2::new(self.width as f64, self.height as f64));
        Bounds {
            min: DVec2::new(nw.x, se.y),
            max: DVec2::new(se.x, nw.y),
        }
    }
}
