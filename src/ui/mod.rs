pub mod popup;
pub mod theme;

use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use theme::Theme;

pub const TITLE: &str = "Livestock India 2024";
pub const DATA_SOURCE: &str = "Animal Genetic Resources of India";
pub const DATA_SOURCE_URL: &str = "http://14.139.252.116:8080/appangr/openagr.htm";

/// Screen regions, shared by rendering and mouse hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title: Rect,
    pub map: Rect,
    /// Drawable area inside the map border
    pub map_inner: Rect,
    pub status: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Footer
        ])
        .split(area);

    ScreenLayout {
        title: chunks[0],
        map: chunks[1],
        map_inner: Block::default().borders(Borders::ALL).inner(chunks[1]),
        status: chunks[2],
        footer: chunks[3],
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = screen_layout(frame.area());

    render_title(frame, app, layout.title);
    render_map(frame, app, layout.map);
    render_status_bar(frame, app, layout.status);
    render_footer(frame, layout.footer);

    if let Some(popup) = popup::layout(frame.area(), app) {
        popup::render(frame, app, &popup);
    }
    if let Some(message) = &app.notice {
        popup::render_notice(frame, &app.theme, message);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(Span::styled(
        TITLE,
        Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.frame))
        .title(Span::styled(
            " India ",
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app
        .map
        .render(inner.width as usize, inner.height as usize, &app.viewport, &app.highlighted());

    let interactive = app.map_interactive();
    let cursor_pos = app
        .mouse_pos
        .filter(|&(col, row)| interactive && inner.contains((col, row).into()))
        .map(|(col, row)| (col - inner.x, row - inner.y));
    let tooltip = if interactive { app.hovered_name().map(str::to_string) } else { None };

    let map_widget = MapWidget {
        layers,
        theme: app.theme,
        dimmed: !interactive,
        cursor_pos,
        tooltip,
    };
    frame.render_widget(map_widget, inner);
}

/// Braille choropleth with the hover tooltip overlaid
struct MapWidget {
    layers: MapLayers,
    theme: Theme,
    /// Drawn behind a modal
    dimmed: bool,
    cursor_pos: Option<(u16, u16)>,
    tooltip: Option<String>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let color = if self.dimmed { Color::DarkGray } else { color };
        for (col, row, ch) in canvas.glyphs() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let (x, y) = (area.x + col as u16, area.y + row as u16);
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: fills, the hovered or selected state, then borders
        self.render_layer(&self.layers.fill, self.theme.fill, area, buf);
        self.render_layer(&self.layers.highlight, self.theme.hover, area, buf);
        self.render_layer(&self.layers.outline, self.theme.stroke, area, buf);

        let Some((cx, cy)) = self.cursor_pos else {
            return;
        };
        let x = area.x + cx;
        let y = area.y + cy;
        buf[(x, y)].set_char('╋').set_fg(Color::Red);

        if let Some(name) = &self.tooltip {
            let style = Style::default().fg(Color::White).bg(Color::Black);
            let text = format!(" {name} ");
            let right = area.x + area.width;
            // Flip to the left of the cursor near the right edge
            let width = text.chars().count() as u16;
            let start = if x + 2 + width <= right { x + 2 } else { x.saturating_sub(width + 1).max(area.x) };
            for (i, ch) in text.chars().enumerate() {
                let px = start + i as u16;
                if px < right {
                    buf[(px, y)].set_char(ch).set_style(style);
                }
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(app.theme.accent)),
    ];

    if let Some(region) = app.selection.region() {
        spans.push(Span::styled(" | State: ", dim));
        spans.push(Span::styled(region.name.clone(), Style::default().fg(Color::Green)));
        if let Some(category) = app.selection.category() {
            spans.push(Span::styled(" > ", dim));
            spans.push(Span::styled(category.name.clone(), Style::default().fg(Color::Green)));
        }
    } else {
        if let Some(name) = app.hovered_name() {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::styled(name.to_string(), Style::default().fg(app.theme.hover)));
        }
        if let Some(name) = app.cursor_region_name() {
            spans.push(Span::styled(" | Pick: ", dim));
            spans.push(Span::styled(name.to_string(), Style::default().fg(Color::Magenta)));
        }
    }

    let keys = if app.map_interactive() {
        " | hjkl:pan +/-:zoom click:select []:cycle enter:open r:reset q:quit"
    } else {
        " | arrows:move tab:switch enter:choose esc:close"
    };
    spans.push(Span::styled(keys, dim));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Line::from(vec![
        Span::styled("Data source: ", Style::default().fg(Color::DarkGray)),
        Span::styled(DATA_SOURCE, Style::default().fg(Color::White)),
        Span::styled(
            format!(" ({DATA_SOURCE_URL})"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::UNDERLINED),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout_rows() {
        let layout = screen_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.title, Rect::new(0, 0, 80, 1));
        assert_eq!(layout.map, Rect::new(0, 1, 80, 21));
        assert_eq!(layout.map_inner, Rect::new(1, 2, 78, 19));
        assert_eq!(layout.status.y, 22);
        assert_eq!(layout.footer.y, 23);
    }
}
