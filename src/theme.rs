use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme from config. Only the first call has an effect.
pub fn init(config: &ThemeConfig) {
    let _ = THEME.set(config.to_theme());
}

/// The active theme, or the default one if `init` never ran.
pub fn current() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub accent: Style,
    pub alert: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            accent: Style::default().fg(Color::Cyan),
            alert: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    pub fn preset(name: &str) -> Self {
        match name {
            "dracula" => Self::from_palette(Palette {
                fg: Color::Rgb(248, 248, 242),
                dim: Color::Rgb(98, 114, 164),
                surface: Color::Rgb(68, 71, 90),
                accent: Color::Rgb(139, 233, 253),
                alert: Color::Rgb(255, 121, 198),
            }),
            "gruvbox" => Self::from_palette(Palette {
                fg: Color::Rgb(235, 219, 178),
                dim: Color::Rgb(146, 131, 116),
                surface: Color::Rgb(80, 73, 69),
                accent: Color::Rgb(131, 165, 152),
                alert: Color::Rgb(250, 189, 47),
            }),
            "nord" => Self::from_palette(Palette {
                fg: Color::Rgb(229, 233, 240),
                dim: Color::Rgb(76, 86, 106),
                surface: Color::Rgb(67, 76, 94),
                accent: Color::Rgb(136, 192, 208),
                alert: Color::Rgb(235, 203, 139),
            }),
            _ => Self::default(),
        }
    }

    fn from_palette(p: Palette) -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(p.accent),
            header: Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(p.dim),
            border: Style::default().fg(p.surface),
            status: Style::default().fg(p.fg).bg(p.surface),
            accent: Style::default().fg(p.accent),
            alert: Style::default().fg(p.alert).add_modifier(Modifier::BOLD),
        }
    }
}

struct Palette {
    fg: Color,
    dim: Color,
    surface: Color,
    accent: Color,
    alert: Color,
}

// ── [theme] config section ──

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: Option<String>,
    pub selected_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub header_fg: Option<String>,
    pub dim_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
    pub accent_fg: Option<String>,
    pub alert_fg: Option<String>,
}

impl ThemeConfig {
    pub fn to_theme(&self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        let fg = |style: &mut Style, value: &Option<String>| {
            if let Some(c) = value.as_deref().and_then(parse_color) {
                *style = style.fg(c);
            }
        };
        fg(&mut theme.selected, &self.selected_fg);
        fg(&mut theme.header, &self.header_fg);
        fg(&mut theme.dim, &self.dim_fg);
        fg(&mut theme.border, &self.border_fg);
        fg(&mut theme.status, &self.status_fg);
        fg(&mut theme.accent, &self.accent_fg);
        fg(&mut theme.alert, &self.alert_fg);

        if let Some(c) = self.selected_bg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = self.status_bg.as_deref().and_then(parse_color) {
            theme.status = theme.status.bg(c);
        }

        theme
    }
}

/// Parse `#rrggbb` or a named terminal colour.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = ThemeConfig {
            preset: Some("nord".to_string()),
            alert_fg: Some("#102030".to_string()),
            status_bg: Some("blue".to_string()),
            ..ThemeConfig::default()
        };
        let theme = config.to_theme();
        assert_eq!(theme.alert.fg, Some(Color::Rgb(16, 32, 48)));
        assert_eq!(theme.status.bg, Some(Color::Blue));
        assert_eq!(theme.accent.fg, Some(Color::Rgb(136, 192, 208)));
    }

    #[test]
    fn bad_colours_are_ignored() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color("chartreuse"), None);
        assert_eq!(parse_color(" Cyan "), Some(Color::Cyan));
    }

    #[test]
    fn unknown_preset_is_default() {
        assert_eq!(Theme::preset("solarized").accent, Theme::default().accent);
    }
}
