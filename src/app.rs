use crate::map::geometry::Bounds;
use crate::map::{RegionLayer, Viewport};
use crate::selection::{Activation, FlowVariant, Host, SelectionFlow};
use crate::ui;
use crate::ui::theme::Theme;
use crate::viewer::DocumentViewer;
use crossterm::event::KeyCode;
use glam::DVec2;
use ratatui::layout::{Position, Rect};
use url::Url;

/// Share of the map pane India fills after a refit
const FIT_MARGIN: f64 = 0.92;

/// Used when neither geodata nor the outline gives bounds
const INDIA_BOUNDS: Bounds = Bounds {
    min: DVec2::new(68.1, 6.7),
    max: DVec2::new(97.4, 35.5),
};

/// Which part of the overlay receives arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Subtypes,
}

/// Cursor state for the region overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub focus: Focus,
    pub category_cursor: usize,
    pub subtype_cursor: usize,
}

impl Overlay {
    fn for_variant(variant: FlowVariant) -> Self {
        Self {
            focus: match variant {
                FlowVariant::Flat => Focus::Subtypes,
                FlowVariant::ByCategory => Focus::Categories,
            },
            category_cursor: 0,
            subtype_cursor: 0,
        }
    }
}

/// Routes selection-flow side effects to the viewer and the notice modal
struct Shell<'a> {
    viewer: &'a mut dyn DocumentViewer,
    notice: &'a mut Option<String>,
}

impl Host for Shell<'_> {
    fn open_document(&mut self, url: &Url) {
        if let Err(e) = self.viewer.open(url) {
            tracing::error!(%url, error = %e, "document viewer failed");
            *self.notice = Some(format!("Could not open {url}: {e}"));
        }
    }

    fn notify(&mut self, message: &str) {
        *self.notice = Some(message.to_string());
    }
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map: RegionLayer,
    pub selection: SelectionFlow,
    pub theme: Theme,
    pub overlay: Overlay,
    /// Blocking message; all input dismisses it first
    pub notice: Option<String>,
    /// Map region under the mouse (or the keyboard cursor)
    pub hovered: Option<usize>,
    /// Catalog index for keyboard region picking
    pub region_cursor: Option<usize>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker and tooltip
    pub mouse_pos: Option<(u16, u16)>,
    dragged: bool,
    screen: Rect,
    viewer: Box<dyn DocumentViewer>,
}

impl App {
    pub fn new(
        width: u16,
        height: u16,
        map: RegionLayer,
        selection: SelectionFlow,
        theme: Theme,
        viewer: Box<dyn DocumentViewer>,
    ) -> Self {
        let screen = Rect::new(0, 0, width, height);
        let inner = ui::screen_layout(screen).map_inner;
        let bounds = map.bounds().unwrap_or(INDIA_BOUNDS);
        let overlay = Overlay::for_variant(selection.variant());

        Self {
            viewport: Viewport::fit(bounds, inner.width as usize * 2, inner.height as usize * 4, FIT_MARGIN),
            map,
            selection,
            theme,
            overlay,
            notice: None,
            hovered: None,
            region_cursor: None,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
            screen,
            viewer,
        }
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        let inner = ui::screen_layout(self.screen).map_inner;
        self.viewport.width = inner.width as usize * 2;
        self.viewport.height = inner.height as usize * 4;
    }

    /// Fit the whole map back into view
    pub fn refit(&mut self) {
        let bounds = self.map.bounds().unwrap_or(INDIA_BOUNDS);
        self.viewport.refit(bounds, FIT_MARGIN);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.cell_to_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.cell_to_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Map input is blocked while the overlay or a notice is up
    pub fn map_interactive(&self) -> bool {
        self.notice.is_none() && self.selection.region().is_none()
    }

    /// Braille pixel at the center of a terminal cell, if the cell is on the map
    pub fn cell_to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let inner = ui::screen_layout(self.screen).map_inner;
        if !inner.contains(Position::new(col, row)) {
            return None;
        }
        let px = (col - inner.x) as i32 * 2 + 1;
        let py = (row - inner.y) as i32 * 4 + 2;
        Some((px, py))
    }

    /// Region polygon under a terminal cell
    pub fn region_at(&self, col: u16, row: u16) -> Option<usize> {
        let (px, py) = self.cell_to_pixel(col, row)?;
        let (lon, lat) = self.viewport.unproject(px, py);
        self.map.hit_test(lon, lat)
    }

    pub fn hovered_name(&self) -> Option<&str> {
        self.hovered.and_then(|idx| self.map.name(idx))
    }

    /// Regions drawn in the hover colour: the hovered one and the selected one
    pub fn highlighted(&self) -> Vec<usize> {
        let selected = self.selection.region().and_then(|r| self.map.index_of(&r.name));
        let mut regions: Vec<usize> = self.hovered.into_iter().chain(selected).collect();
        regions.dedup();
        regions
    }

    /// Track the pointer for the tooltip and hover fill
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if self.map_interactive() {
            self.hovered = self.region_at(col, row);
        }
    }

    /// Left button down: start a potential drag
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Pan with the mouse; a drag never counts as a click
    pub fn drag(&mut self, col: u16, row: u16) {
        if !self.map_interactive() {
            return;
        }
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Left button up: a click if the pointer did not drag
    pub fn release(&mut self, col: u16, row: u16) {
        let was_drag = self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if !was_drag {
            self.click(col, row);
        }
    }

    /// Dispatch a click to whichever layer is on top
    pub fn click(&mut self, col: u16, row: u16) {
        if self.notice.is_some() {
            self.dismiss_notice();
            return;
        }

        let at = Position::new(col, row);
        if let Some(layout) = ui::popup::layout(self.screen, self) {
            if layout.close.contains(at) {
                self.dismiss();
            } else if let Some(i) = layout.category_rows.iter().position(|r| r.contains(at)) {
                self.overlay.category_cursor = i;
                self.select_category_at(i);
            } else if let Some(i) = layout.buttons.iter().position(|r| r.contains(at)) {
                self.overlay.focus = Focus::Subtypes;
                self.overlay.subtype_cursor = i;
                self.activate_subtype_at(i);
            }
            return;
        }

        let hit = self.region_at(col, row).and_then(|idx| self.map.name(idx)).map(str::to_string);
        if let Some(name) = hit {
            self.activate_region(&name);
        }
    }

    /// The map's hit callback: open the overlay for `name`
    pub fn activate_region(&mut self, name: &str) {
        match self.selection.select_region(name) {
            Ok(_) => {
                self.overlay = Overlay::for_variant(self.selection.variant());
                self.region_cursor = self.selection.catalog().region_index(name);
                self.hovered = self.map.index_of(name);
            }
            Err(e) => {
                tracing::warn!(region = name, error = %e, "region activation rejected");
                self.notice = Some(format!("No livestock records for {name}."));
            }
        }
    }

    /// Choose the `idx`th category of the selected region
    pub fn select_category_at(&mut self, idx: usize) {
        let Some(name) = self
            .selection
            .region()
            .and_then(|r| r.categories.get(idx))
            .map(|c| c.name.clone())
        else {
            return;
        };

        match self.selection.select_category(&name) {
            Ok(()) => {
                self.overlay.subtype_cursor = 0;
                if self.selection.displayed_len() > 0 {
                    self.overlay.focus = Focus::Subtypes;
                }
            }
            Err(e) => tracing::warn!(category = %name, error = %e, "category selection rejected"),
        }
    }

    /// Activate the `idx`th displayed subtype
    pub fn activate_subtype_at(&mut self, idx: usize) -> Option<Activation> {
        let (_, subtype) = self.selection.displayed(idx)?;
        let mut shell = Shell {
            viewer: self.viewer.as_mut(),
            notice: &mut self.notice,
        };
        Some(self.selection.activate_subtype(subtype, &mut shell))
    }

    /// Close the overlay and clear the selection; hover follows the pointer again
    pub fn dismiss(&mut self) {
        self.selection.dismiss();
        self.overlay = Overlay::for_variant(self.selection.variant());
        self.hovered = self.mouse_pos.and_then(|(col, row)| self.region_at(col, row));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Step the keyboard region cursor through the catalog
    pub fn cycle_region(&mut self, delta: isize) {
        let len = self.selection.catalog().len();
        if len == 0 {
            return;
        }
        let next = match self.region_cursor {
            Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.region_cursor = Some(next);
        self.hovered = self
            .selection
            .catalog()
            .get(next)
            .and_then(|r| self.map.index_of(&r.name));
    }

    pub fn cursor_region_name(&self) -> Option<&str> {
        self.region_cursor
            .and_then(|i| self.selection.catalog().get(i))
            .map(|r| r.name.as_str())
    }

    fn select_cursor_region(&mut self) {
        if let Some(name) = self.cursor_region_name().map(str::to_string) {
            self.activate_region(&name);
        }
    }

    fn category_count(&self) -> usize {
        self.selection.region().map_or(0, |r| r.categories.len())
    }

    /// Arrow keys inside the overlay; subtypes are laid out two per row
    fn overlay_move(&mut self, dx: isize, dy: isize) {
        match self.overlay.focus {
            Focus::Categories => {
                let n = self.category_count();
                if n > 0 {
                    let next = self.overlay.category_cursor as isize + dy;
                    self.overlay.category_cursor = next.clamp(0, n as isize - 1) as usize;
                }
            }
            Focus::Subtypes => {
                let n = self.selection.displayed_len();
                if n > 0 {
                    let next = self.overlay.subtype_cursor as isize + dx + dy * 2;
                    self.overlay.subtype_cursor = next.clamp(0, n as isize - 1) as usize;
                }
            }
        }
    }

    fn overlay_toggle_focus(&mut self) {
        if self.selection.variant() == FlowVariant::Flat {
            return;
        }
        self.overlay.focus = match self.overlay.focus {
            Focus::Categories if self.selection.displayed_len() > 0 => Focus::Subtypes,
            Focus::Categories => Focus::Categories,
            Focus::Subtypes => Focus::Categories,
        };
    }

    fn overlay_choose(&mut self) {
        match self.overlay.focus {
            Focus::Categories => self.select_category_at(self.overlay.category_cursor),
            Focus::Subtypes => {
                self.activate_subtype_at(self.overlay.subtype_cursor);
            }
        }
    }

    /// Keyboard input, routed to the notice, the overlay or the map
    pub fn handle_key(&mut self, code: KeyCode) {
        if self.notice.is_some() {
            self.dismiss_notice();
            return;
        }

        if self.selection.region().is_some() {
            match code {
                KeyCode::Esc | KeyCode::Char('x') => self.dismiss(),
                KeyCode::Char('q') => self.quit(),
                KeyCode::Up | KeyCode::Char('k') => self.overlay_move(0, -1),
                KeyCode::Down | KeyCode::Char('j') => self.overlay_move(0, 1),
                KeyCode::Left | KeyCode::Char('h') => self.overlay_move(-1, 0),
                KeyCode::Right | KeyCode::Char('l') => self.overlay_move(1, 0),
                KeyCode::Tab | KeyCode::BackTab => self.overlay_toggle_focus(),
                KeyCode::Enter | KeyCode::Char(' ') => self.overlay_choose(),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),

            // Pan with hjkl or arrow keys
            KeyCode::Left | KeyCode::Char('h') => self.pan(-10, 0),
            KeyCode::Right | KeyCode::Char('l') => self.pan(10, 0),
            KeyCode::Up | KeyCode::Char('k') => self.pan(0, -6),
            KeyCode::Down | KeyCode::Char('j') => self.pan(0, 6),

            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom_out(),

            KeyCode::Char('r') | KeyCode::Char('0') => self.refit(),

            // Keyboard region picking
            KeyCode::Char(']') | KeyCode::Char('n') => self.cycle_region(1),
            KeyCode::Char('[') | KeyCode::Char('p') => self.cycle_region(-1),
            KeyCode::Enter => self.select_cursor_region(),

            _ => {}
        }
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}
