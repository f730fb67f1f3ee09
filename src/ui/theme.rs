use ratatui::style::Color;

use crate::band::Band;
use crate::config::ColorsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

/// Hex overrides for the three band colors, `#rrggbb`.
#[derive(Debug, Clone)]
pub struct BandOverrides {
    pub nominal: String,
    pub elevated: String,
    pub critical: String,
}

impl BandOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            nominal: colors.nominal.clone(),
            elevated: colors.elevated.clone(),
            critical: colors.critical.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub tab_active_bg: Color,
    pub tab_active_fg: Color,
    pub selection_bg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_unfilled: Color,
    pub cpu_line: Color,
    pub ram_line: Color,
    /// nominal, elevated, critical
    pub band_colors: [Color; 3],
}

impl Theme {
    pub fn from_config(theme_name: &str, bands: &BandOverrides, support: ColorSupport) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "colorblind" => Self::colorblind(),
            _ => Self::dark(),
        };
        // colorblind keeps its own palette
        if theme.name != "colorblind" {
            theme.apply_band_overrides(bands);
        }
        theme.apply_color_support(support);
        theme
    }

    pub fn band_color(&self, band: Band) -> Color {
        match band {
            Band::Nominal => self.band_colors[0],
            Band::Elevated => self.band_colors[1],
            Band::Critical => self.band_colors[2],
        }
    }

    fn apply_band_overrides(&mut self, bands: &BandOverrides) {
        for (slot, hex) in [&bands.nominal, &bands.elevated, &bands.critical]
            .into_iter()
            .enumerate()
        {
            if let Some(color) = parse_hex_color(hex) {
                self.band_colors[slot] = color;
            }
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.tab_active_bg = map(self.tab_active_bg);
        self.tab_active_fg = map(self.tab_active_fg);
        self.selection_bg = map(self.selection_bg);
        self.status_ok = map(self.status_ok);
        self.status_err = map(self.status_err);
        self.statusbar_bg = map(self.statusbar_bg);
        self.overlay_border = map(self.overlay_border);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.accent = map(self.accent);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.gauge_unfilled = map(self.gauge_unfilled);
        self.cpu_line = map(self.cpu_line);
        self.ram_line = map(self.ram_line);
        self.band_colors = self.band_colors.map(map);
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            tab_active_bg: Color::Rgb(103, 232, 249),
            tab_active_fg: Color::Black,
            selection_bg: Color::Rgb(49, 50, 68),
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Rgb(103, 232, 249),
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::DarkGray,
            cpu_line: Color::Rgb(96, 165, 250),
            ram_line: Color::Rgb(251, 146, 60),
            band_colors: [
                Color::Rgb(76, 175, 80),
                Color::Rgb(255, 152, 0),
                Color::Rgb(244, 67, 54),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            tab_active_bg: Color::Blue,
            tab_active_fg: Color::White,
            selection_bg: Color::Rgb(200, 200, 200),
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            accent: Color::Blue,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            gauge_unfilled: Color::Rgb(200, 200, 200),
            cpu_line: Color::Rgb(70, 130, 180),
            ram_line: Color::Rgb(200, 120, 40),
            band_colors: [
                Color::Rgb(60, 160, 60),
                Color::Rgb(220, 150, 30),
                Color::Rgb(200, 60, 60),
            ],
        }
    }

    pub fn colorblind() -> Self {
        Theme {
            name: "colorblind",
            tab_active_bg: Color::Rgb(0, 114, 178),
            tab_active_fg: Color::White,
            selection_bg: Color::Rgb(70, 70, 70),
            status_ok: Color::Rgb(0, 158, 115),
            status_err: Color::Rgb(213, 94, 0),
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::Rgb(86, 180, 233),
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Rgb(86, 180, 233),
            pill_key_bg: Color::Rgb(230, 159, 0),
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::DarkGray,
            cpu_line: Color::Rgb(86, 180, 233),
            ram_line: Color::Rgb(230, 159, 0),
            band_colors: [
                Color::Rgb(0, 114, 178),
                Color::Rgb(230, 159, 0),
                Color::Rgb(213, 94, 0),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            tab_active_bg: Color::White,
            tab_active_fg: Color::Black,
            selection_bg: Color::DarkGray,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Black,
            overlay_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            gauge_unfilled: Color::Black,
            cpu_line: Color::White,
            ram_line: Color::Gray,
            band_colors: [Color::Gray, Color::White, Color::White],
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}
