use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub log_bg: Color,
    pub input_bg: Color,
    pub popup_bg: Color,
    pub status_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub active_fg: Color,
    pub active_bg: Color,
    pub chip_fg: Color,
    pub chip_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            log_bg: Color::Rgb(54, 54, 54),
            input_bg: Color::Rgb(62, 62, 62),
            popup_bg: Color::Rgb(44, 44, 44),
            status_bg: Color::Rgb(36, 36, 36),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(185, 185, 185),
            active_fg: Color::Rgb(255, 255, 255),
            active_bg: Color::Rgb(90, 145, 200),
            chip_fg: Color::Rgb(20, 40, 70),
            chip_bg: Color::Rgb(160, 200, 240),
        }
    }
}

impl Theme {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(theme) => theme,
                Err(err) => {
                    tracing::warn!(
                        path = %path_ref.display(),
                        error = %err,
                        "failed to parse theme file, using defaults"
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    path = %path_ref.display(),
                    error = %err,
                    "failed to read theme file, using defaults"
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        let defaults = Self::default();
        let colors = cfg.colors;
        let pick = |value: Option<RgbToml>, fallback: Color| value.map_or(fallback, |rgb| rgb.to_color());
        Ok(Self {
            log_bg: pick(colors.log_bg, defaults.log_bg),
            input_bg: pick(colors.input_bg, defaults.input_bg),
            popup_bg: pick(colors.popup_bg, defaults.popup_bg),
            status_bg: pick(colors.status_bg, defaults.status_bg),
            text_fg: pick(colors.text_fg, defaults.text_fg),
            muted_fg: pick(colors.muted_fg, defaults.muted_fg),
            active_fg: pick(colors.active_fg, defaults.active_fg),
            active_bg: pick(colors.active_bg, defaults.active_bg),
            chip_fg: pick(colors.chip_fg, defaults.chip_fg),
            chip_bg: pick(colors.chip_bg, defaults.chip_bg),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    colors: ThemeColorsToml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeColorsToml {
    log_bg: Option<RgbToml>,
    input_bg: Option<RgbToml>,
    popup_bg: Option<RgbToml>,
    status_bg: Option<RgbToml>,
    text_fg: Option<RgbToml>,
    muted_fg: Option<RgbToml>,
    active_fg: Option<RgbToml>,
    active_bg: Option<RgbToml>,
    chip_fg: Option<RgbToml>,
    chip_bg: Option<RgbToml>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
