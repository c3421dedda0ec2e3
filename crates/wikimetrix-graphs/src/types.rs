//! Graph configuration and styling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wikimetrix_common::{MetrixError, Result};

/// Graph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub style: StyleConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            width: 1200,
            height: 600,
            x_label: None,
            y_label: None,
            style: StyleConfig::default(),
        }
    }
}

impl GraphConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        theme.apply(&mut self);
        self
    }

    /// Use `color` for the main line or bars, keeping the rest of the palette
    pub fn with_primary_color(mut self, color: &str) -> Self {
        match &mut self.style.color_scheme {
            ColorScheme::Custom(colors) if !colors.is_empty() => colors[0] = color.to_string(),
            _ => {
                self.style.color_scheme = ColorScheme::Custom(vec![
                    color.to_string(),
                    "#ff7f0e".to_string(),
                    "#2ca02c".to_string(),
                    "#d62728".to_string(),
                    "#9467bd".to_string(),
                    "#8c564b".to_string(),
                ]);
            }
        }
        self
    }

    pub fn with_background_color(mut self, color: &str) -> Self {
        self.style.background_color = Some(color.to_string());
        self
    }

    pub fn with_weekend_highlights(mut self, highlight: bool) -> Self {
        self.style.highlight_weekends = highlight;
        self
    }
}

/// Color scheme for graphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorScheme {
    Default,
    Dark,
    Monochrome,
    Custom(Vec<String>),
}

/// Font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 12,
        }
    }
}

/// Margin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginConfig {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            top: 20,
            right: 20,
            bottom: 40,
            left: 60,
        }
    }
}

/// Grid line configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub show_x: bool,
    pub show_y: bool,
    pub color: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            show_x: true,
            show_y: true,
            color: None,
        }
    }
}

/// Styling shared by all graphs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub color_scheme: ColorScheme,
    pub background_color: Option<String>,
    pub title_font: FontConfig,
    pub axis_font: FontConfig,
    pub margins: MarginConfig,
    pub grid: GridConfig,
    /// Mark Saturdays and Sundays on daily time series
    pub highlight_weekends: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Default,
            background_color: Some("#FFFFFF".to_string()),
            title_font: FontConfig {
                family: "sans-serif".to_string(),
                size: 20,
            },
            axis_font: FontConfig::default(),
            margins: MarginConfig::default(),
            grid: GridConfig::default(),
            highlight_weekends: true,
        }
    }
}

/// Preset looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Small, print-friendly charts with muted colors
    Report,
}

impl Theme {
    pub fn apply(&self, config: &mut GraphConfig) {
        let style = &mut config.style;
        match self {
            Self::Light => {
                style.color_scheme = ColorScheme::Default;
                style.background_color = Some("#ffffff".to_string());
                style.grid.color = Some("#e0e0e0".to_string());
            }
            Self::Dark => {
                style.color_scheme = ColorScheme::Dark;
                style.background_color = Some("#2b2b2b".to_string());
                style.grid.color = Some("#404040".to_string());
            }
            Self::Report => {
                style.color_scheme = ColorScheme::Monochrome;
                style.background_color = Some("#ffffff".to_string());
                style.grid.color = Some("#dee2e6".to_string());
                style.title_font.size = 16;
                style.axis_font.size = 10;
                style.margins = MarginConfig {
                    top: 40,
                    right: 30,
                    bottom: 50,
                    left: 60,
                };
                config.width = 800;
                config.height = 500;
            }
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Report => "report",
        })
    }
}

impl FromStr for Theme {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "report" => Ok(Self::Report),
            other => Err(MetrixError::validation_field(
                format!("unknown theme '{other}', expected light, dark or report"),
                "theme",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_color_replaces_first_palette_entry() {
        let config = GraphConfig::new("Views").with_primary_color("#3366cc");
        match &config.style.color_scheme {
            ColorScheme::Custom(colors) => assert_eq!(colors[0], "#3366cc"),
            other => panic!("unexpected scheme {other:?}"),
        }

        let again = config.with_primary_color("#000000");
        assert!(matches!(&again.style.color_scheme, ColorScheme::Custom(c) if c[0] == "#000000" && c.len() == 6));
    }

    #[test]
    fn test_themes() {
        let dark = GraphConfig::default().with_theme(Theme::Dark);
        assert_eq!(dark.style.color_scheme, ColorScheme::Dark);
        assert_eq!(dark.style.background_color.as_deref(), Some("#2b2b2b"));

        let report = GraphConfig::default().with_theme(Theme::Report);
        assert_eq!((report.width, report.height), (800, 500));
        assert_eq!("Report".parse::<Theme>().unwrap(), Theme::Report);
        assert!("neon".parse::<Theme>().is_err());
    }
}
