//! Colour palettes for the terminal view.

use derive_getters::Getters;
use ratatui::style::Color;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, instrument};

/// Named palette selectable from the options screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Palette {
    /// Dark blue and cyan, after the k9s terminal UI.
    #[default]
    K9s,
    /// Dracula theme.
    Dracula,
    /// Monokai theme.
    Monokai,
    /// Ultramarine and imperial gold.
    Warhammer,
    /// Night Lords blue and tactical turquoise.
    #[strum(serialize = "killteam")]
    KillTeam,
}

impl Palette {
    /// Resolves a palette by name, falling back to [`Palette::K9s`].
    #[instrument]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!(name, "Unknown palette name, using default");
            Self::default()
        })
    }

    /// Names of every palette in display order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|p| p.to_string()).collect()
    }

    /// Returns the palette after this one, wrapping around.
    pub fn next(self) -> Self {
        let all: Vec<_> = Self::iter().collect();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Returns the palette before this one, wrapping around.
    pub fn previous(self) -> Self {
        let all: Vec<_> = Self::iter().collect();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

    /// Returns the colour table for this palette.
    pub fn colors(self) -> ColorTable {
        match self {
            Self::K9s => ColorTable {
                blue: Color::Rgb(36, 96, 146),
                cyan: Color::Rgb(0, 183, 235),
                white: Color::Rgb(255, 255, 255),
                dim_white: Color::Rgb(180, 180, 180),
                yellow: Color::Rgb(253, 185, 19),
                green: Color::Rgb(0, 200, 83),
                red: Color::Rgb(255, 0, 0),
                black: Color::Rgb(0, 0, 0),
            },
            Self::Dracula => ColorTable {
                blue: Color::Rgb(189, 147, 249),
                cyan: Color::Rgb(139, 233, 253),
                white: Color::Rgb(248, 248, 242),
                dim_white: Color::Rgb(174, 174, 169),
                yellow: Color::Rgb(241, 250, 140),
                green: Color::Rgb(80, 250, 123),
                red: Color::Rgb(255, 85, 85),
                black: Color::Rgb(40, 42, 54),
            },
            Self::Monokai => ColorTable {
                blue: Color::Rgb(102, 217, 239),
                cyan: Color::Rgb(102, 217, 239),
                white: Color::Rgb(248, 248, 242),
                dim_white: Color::Rgb(174, 174, 169),
                yellow: Color::Rgb(230, 219, 116),
                green: Color::Rgb(166, 226, 46),
                red: Color::Rgb(249, 38, 114),
                black: Color::Rgb(39, 40, 34),
            },
            Self::Warhammer => ColorTable {
                blue: Color::Rgb(38, 57, 132),
                cyan: Color::Rgb(23, 155, 215),
                white: Color::Rgb(255, 250, 240),
                dim_white: Color::Rgb(180, 170, 150),
                yellow: Color::Rgb(245, 180, 26),
                green: Color::Rgb(0, 120, 50),
                red: Color::Rgb(190, 0, 0),
                black: Color::Rgb(10, 10, 10),
            },
            Self::KillTeam => ColorTable {
                blue: Color::Rgb(63, 81, 153),
                cyan: Color::Rgb(0, 169, 157),
                white: Color::Rgb(230, 230, 230),
                dim_white: Color::Rgb(150, 150, 150),
                yellow: Color::Rgb(255, 193, 0),
                green: Color::Rgb(76, 99, 25),
                red: Color::Rgb(200, 40, 40),
                black: Color::Rgb(5, 5, 5),
            },
        }
    }
}

/// The eight colours a palette assigns to UI roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ColorTable {
    blue: Color,
    cyan: Color,
    white: Color,
    dim_white: Color,
    yellow: Color,
    green: Color,
    red: Color,
    black: Color,
}
