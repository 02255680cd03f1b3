//! Region overlay and notice modal.
//!
//! [`layout`] is the single source of widget geometry: the renderer draws into
//! it and [`App::click`](crate::app::App::click) hit-tests against it.

use crate::app::{App, Focus};
use crate::selection::FlowVariant;
use crate::ui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
    Frame,
};

pub const PROMPT: &str = "Select Livestock:";
pub const PLACEHOLDER: &str = "-- Choose Livestock --";
const EMPTY_CATEGORY: &str = "No breeds recorded for this species.";
const EMPTY_REGION: &str = "No livestock recorded for this state.";

const POPUP_WIDTH: u16 = 60;
const BUTTON_HEIGHT: u16 = 3;
const NOTICE_WIDTH: u16 = 52;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLayout {
    pub area: Rect,
    pub close: Rect,
    pub prompt: Option<Rect>,
    pub list: Option<Rect>,
    /// One per category, clipped to what fits
    pub category_rows: Vec<Rect>,
    pub heading: Option<Rect>,
    /// One per displayed subtype, two per row, clipped to what fits
    pub buttons: Vec<Rect>,
    pub note: Option<(Rect, &'static str)>,
}

/// Hands out full-width rows top to bottom, refusing what would overflow
struct Rows {
    area: Rect,
    y: u16,
}

impl Rows {
    fn take(&mut self, height: u16) -> Option<Rect> {
        if self.y.saturating_add(height) > self.area.bottom() {
            return None;
        }
        let rect = Rect::new(self.area.x, self.y, self.area.width, height);
        self.y += height;
        Some(rect)
    }

    /// Like `take`, but shrinks to the rows left as long as `min` rows remain
    fn take_at_most(&mut self, height: u16, min: u16) -> Option<Rect> {
        let left = self.area.bottom().saturating_sub(self.y);
        if left < min {
            return None;
        }
        self.take(height.min(left))
    }
}

fn centered(screen: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

/// Overlay geometry, or `None` when no region is selected
pub fn layout(screen: Rect, app: &App) -> Option<PopupLayout> {
    let region = app.selection.region()?;
    let by_category = app.selection.variant() == FlowVariant::ByCategory;
    let category_count = u16::try_from(region.categories.len()).unwrap_or(u16::MAX);
    let subtype_count = app.selection.displayed_len();
    let show_subtypes = !by_category || app.selection.category().is_some();

    let mut content: u16 = 0;
    if by_category {
        content = content.saturating_add(category_count.max(1).saturating_add(3));
    }
    if show_subtypes {
        let grid = match subtype_count {
            0 => 1,
            n => u16::try_from(n.div_ceil(2))
                .unwrap_or(u16::MAX)
                .saturating_mul(BUTTON_HEIGHT),
        };
        content = content.saturating_add(1).saturating_add(grid);
    }

    let area = centered(screen, POPUP_WIDTH, content.saturating_add(2));
    let close = Rect::new(area.right().saturating_sub(4), area.y, 3, 1).intersection(area);
    let mut rows = Rows {
        area: Block::bordered().inner(area),
        y: area.y + 1,
    };

    let mut popup = PopupLayout {
        area,
        close,
        prompt: None,
        list: None,
        category_rows: Vec::new(),
        heading: None,
        buttons: Vec::new(),
        note: None,
    };

    if by_category {
        popup.prompt = rows.take(1);
        popup.list = rows.take_at_most(category_count.max(1).saturating_add(2), 3);
        if let Some(list) = popup.list {
            let inner = Block::bordered().inner(list);
            popup.category_rows = (0..category_count.min(inner.height))
                .map(|i| Rect::new(inner.x, inner.y + i, inner.width, 1))
                .collect();
        }
    }

    if show_subtypes {
        popup.heading = rows.take(1);
        if subtype_count == 0 {
            let message = if by_category { EMPTY_CATEGORY } else { EMPTY_REGION };
            popup.note = rows.take(1).map(|r| (r, message));
        } else {
            let column = rows.area.width.saturating_sub(1) / 2;
            for row in 0..subtype_count.div_ceil(2) {
                let Some(strip) = rows.take(BUTTON_HEIGHT) else {
                    break;
                };
                for col in 0..2 {
                    if row * 2 + col < subtype_count {
                        let x = strip.x + col as u16 * (column + 1);
                        popup.buttons.push(Rect::new(x, strip.y, column, BUTTON_HEIGHT));
                    }
                }
            }
        }
    }

    Some(popup)
}

pub fn render(frame: &mut Frame, app: &App, popup: &PopupLayout) {
    let Some(region) = app.selection.region() else {
        return;
    };
    let theme = &app.theme;
    let dim = Style::default().fg(Color::DarkGray);

    frame.render_widget(Clear, popup.area);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.frame))
        .title(
            Line::from(Span::styled(
                format!(" {} ", region.name),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
    frame.render_widget(block, popup.area);
    frame.render_widget(
        Paragraph::new(Span::styled("[x]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
        popup.close,
    );

    if let Some(area) = popup.prompt {
        frame.render_widget(Paragraph::new(PROMPT).style(Style::default().add_modifier(Modifier::BOLD)), area);
    }

    if let Some(area) = popup.list {
        let focused = app.overlay.focus == Focus::Categories;
        let title = app.selection.category().map_or(PLACEHOLDER, |c| c.name.as_str());
        let list = Block::bordered()
            .border_style(if focused { Style::default().fg(theme.accent) } else { dim })
            .title(format!(" {title} "));
        frame.render_widget(list, area);

        for (i, (row, category)) in popup.category_rows.iter().zip(&region.categories).enumerate() {
            let chosen = app.selection.category_index() == Some(i);
            let mut style = Style::default();
            if chosen {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            }
            if focused && app.overlay.category_cursor == i {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let marker = if chosen { "● " } else { "  " };
            frame.render_widget(Paragraph::new(format!("{marker}{}", category.name)).style(style), *row);
        }
    }

    if let Some(area) = popup.heading {
        frame.render_widget(Paragraph::new(Span::styled("Subtypes:", dim)), area);
    }

    for (i, rect) in popup.buttons.iter().enumerate() {
        let Some((category, subtype)) = app.selection.displayed(i) else {
            continue;
        };
        let label = match app.selection.variant() {
            FlowVariant::Flat => format!("{} ({category})", subtype.name),
            FlowVariant::ByCategory => subtype.name.clone(),
        };

        let focused = app.overlay.focus == Focus::Subtypes && app.overlay.subtype_cursor == i;
        let mut style = Style::default()
            .fg(theme.button_fg)
            .bg(theme.button_bg)
            .add_modifier(Modifier::BOLD);
        if focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        let border = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.button_bg)
        };

        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::bordered().border_type(BorderType::Rounded).border_style(border));
        frame.render_widget(button, *rect);
    }

    if let Some((area, message)) = popup.note {
        frame.render_widget(
            Paragraph::new(Span::styled(message, dim.add_modifier(Modifier::ITALIC))),
            area,
        );
    }
}

/// Blocking message box; the caller routes the next input to dismiss it
pub fn render_notice(frame: &mut Frame, theme: &Theme, message: &str) {
    let width = NOTICE_WIDTH.min(frame.area().width);
    let text_width = width.saturating_sub(4).max(1) as usize;
    let lines = message.chars().count().div_ceil(text_width).max(1) as u16;
    let area = centered(frame.area(), width, lines + 4);

    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(" Notice ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));

    let text = vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled("press any key", Style::default().fg(Color::DarkGray))),
    ];
    let body = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, area);
}
