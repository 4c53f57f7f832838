use ratatui::prelude::Color;
use serde::{Deserialize, Serialize};

/// The twelve selectable background themes. `gradient-purple` is the
/// default and the fallback for any identifier we do not recognize, so
/// resolving a theme can never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundTheme {
    #[default]
    GradientPurple,
    GradientBlue,
    GradientGreen,
    GradientOrange,
    GradientPink,
    GradientSunset,
    GradientOcean,
    GradientForest,
    SolidGray,
    SolidBlue,
    SolidGreen,
    SolidPurple,
}

/// Presentation tokens for one theme. No other module keeps its own copy of
/// these mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTokens {
    pub background: Color,
    pub button: Color,
    pub icon: Color,
}

pub const ALL_THEMES: [BackgroundTheme; 12] = [
    BackgroundTheme::GradientPurple,
    BackgroundTheme::GradientBlue,
    BackgroundTheme::GradientGreen,
    BackgroundTheme::GradientOrange,
    BackgroundTheme::GradientPink,
    BackgroundTheme::GradientSunset,
    BackgroundTheme::GradientOcean,
    BackgroundTheme::GradientForest,
    BackgroundTheme::SolidGray,
    BackgroundTheme::SolidBlue,
    BackgroundTheme::SolidGreen,
    BackgroundTheme::SolidPurple,
];

impl BackgroundTheme {
    /// Identifier as persisted and shown on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundTheme::GradientPurple => "gradient-purple",
            BackgroundTheme::GradientBlue => "gradient-blue",
            BackgroundTheme::GradientGreen => "gradient-green",
            BackgroundTheme::GradientOrange => "gradient-orange",
            BackgroundTheme::GradientPink => "gradient-pink",
            BackgroundTheme::GradientSunset => "gradient-sunset",
            BackgroundTheme::GradientOcean => "gradient-ocean",
            BackgroundTheme::GradientForest => "gradient-forest",
            BackgroundTheme::SolidGray => "solid-gray",
            BackgroundTheme::SolidBlue => "solid-blue",
            BackgroundTheme::SolidGreen => "solid-green",
            BackgroundTheme::SolidPurple => "solid-purple",
        }
    }

    /// Unknown identifiers fall back to the default theme.
    pub fn parse(raw: &str) -> Self {
        ALL_THEMES
            .into_iter()
            .find(|t| t.as_str() == raw.trim())
            .unwrap_or_default()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BackgroundTheme::GradientPurple => "Purple Gradient",
            BackgroundTheme::GradientBlue => "Blue Gradient",
            BackgroundTheme::GradientGreen => "Green Gradient",
            BackgroundTheme::GradientOrange => "Orange Gradient",
            BackgroundTheme::GradientPink => "Pink Gradient",
            BackgroundTheme::GradientSunset => "Sunset Gradient",
            BackgroundTheme::GradientOcean => "Ocean Gradient",
            BackgroundTheme::GradientForest => "Forest Gradient",
            BackgroundTheme::SolidGray => "Minimal Gray",
            BackgroundTheme::SolidBlue => "Soft Blue",
            BackgroundTheme::SolidGreen => "Soft Green",
            BackgroundTheme::SolidPurple => "Soft Purple",
        }
    }

    pub fn resolve(self) -> ThemeTokens {
        match self {
            BackgroundTheme::GradientPurple => ThemeTokens {
                background: Color::Rgb(30, 18, 46),
                button: Color::Magenta,
                icon: Color::LightMagenta,
            },
            BackgroundTheme::GradientBlue => ThemeTokens {
                background: Color::Rgb(14, 24, 48),
                button: Color::Blue,
                icon: Color::LightBlue,
            },
            BackgroundTheme::GradientGreen => ThemeTokens {
                background: Color::Rgb(12, 36, 24),
                button: Color::Green,
                icon: Color::LightGreen,
            },
            BackgroundTheme::GradientOrange => ThemeTokens {
                background: Color::Rgb(46, 26, 10),
                button: Color::Rgb(230, 126, 34),
                icon: Color::LightYellow,
            },
            BackgroundTheme::GradientPink => ThemeTokens {
                background: Color::Rgb(44, 16, 34),
                button: Color::Rgb(231, 84, 128),
                icon: Color::LightMagenta,
            },
            BackgroundTheme::GradientSunset => ThemeTokens {
                background: Color::Rgb(44, 20, 36),
                button: Color::Rgb(240, 128, 70),
                icon: Color::LightYellow,
            },
            BackgroundTheme::GradientOcean => ThemeTokens {
                background: Color::Rgb(10, 30, 44),
                button: Color::Cyan,
                icon: Color::LightCyan,
            },
            BackgroundTheme::GradientForest => ThemeTokens {
                background: Color::Rgb(14, 34, 28),
                button: Color::Rgb(46, 160, 110),
                icon: Color::LightGreen,
            },
            BackgroundTheme::SolidGray => ThemeTokens {
                background: Color::Rgb(24, 26, 30),
                button: Color::Gray,
                icon: Color::White,
            },
            BackgroundTheme::SolidBlue => ThemeTokens {
                background: Color::Rgb(18, 26, 40),
                button: Color::LightBlue,
                icon: Color::LightBlue,
            },
            BackgroundTheme::SolidGreen => ThemeTokens {
                background: Color::Rgb(18, 34, 24),
                button: Color::LightGreen,
                icon: Color::LightGreen,
            },
            BackgroundTheme::SolidPurple => ThemeTokens {
                background: Color::Rgb(28, 22, 40),
                button: Color::LightMagenta,
                icon: Color::LightMagenta,
            },
        }
    }

    /// Next theme in the settings order, wrapping around.
    pub fn next(self) -> Self {
        let idx = ALL_THEMES.iter().position(|t| *t == self).unwrap_or(0);
        ALL_THEMES[(idx + 1) % ALL_THEMES.len()]
    }
}

impl Serialize for BackgroundTheme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackgroundTheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(BackgroundTheme::parse(&raw))
    }
}
