use ratatui::style::Color;

/// Polygon and overlay colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub fill: Color,
    pub hover: Color,
    pub stroke: Color,
    pub frame: Color,
    pub button_bg: Color,
    pub button_fg: Color,
    pub accent: Color,
}

impl Theme {
    /// Pale green states, darker green on hover, white borders
    pub fn meadow() -> Self {
        Self {
            fill: Color::Rgb(0xb0, 0xdb, 0xa7),
            hover: Color::Rgb(0x74, 0xb2, 0x66),
            stroke: Color::White,
            frame: Color::Rgb(0xf9, 0xa8, 0xd4),
            button_bg: Color::Rgb(0xb2, 0x33, 0x25),
            button_fg: Color::White,
            accent: Color::Cyan,
        }
    }

    /// Saturated green states, white on hover, black borders
    pub fn contrast() -> Self {
        Self {
            fill: Color::Rgb(0x74, 0xb2, 0x66),
            hover: Color::White,
            stroke: Color::Black,
            frame: Color::Rgb(0xf9, 0xa8, 0xd4),
            button_bg: Color::Rgb(0x64, 0x74, 0x8b),
            button_fg: Color::White,
            accent: Color::Yellow,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::meadow()
    }
}
