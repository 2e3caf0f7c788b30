//! Theme palettes for the pixel ring

use crate::color::{self, Rgb};

/// A named set of colours to theme the ring from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Palette {
    /// Every visible named colour
    #[default]
    All,
    Cool,
    Warm,
    Wild,
    Grey,
    Dark,
}

const COOL: &[Rgb] = &[
    color::BLUE,
    color::CYAN,
    color::DARK_BLUE,
    color::DARK_CYAN,
    color::CORNFLOWER,
    color::INDIGO,
    color::VIOLET,
    color::DEEP_CYAN,
    color::PURPLE,
    color::SKY_BLUE,
];

const WARM: &[Rgb] = &[
    color::RED,
    color::YELLOW,
    color::DARK_RED,
    color::DARK_YELLOW,
    color::ORANGE,
    color::TANGERINE,
    color::PINK,
    color::FUCHSIA,
    color::AMBER,
];

const WILD: &[Rgb] = &[
    color::MAGENTA,
    color::DARK_MAGENTA,
    color::CORNFLOWER,
    color::INDIGO,
    color::RED,
    color::VIOLET,
    color::PINK,
    color::FUCHSIA,
    color::PURPLE,
    color::SKY_BLUE,
    color::WHITE,
    color::APPLE,
    color::EMERALD,
    color::TANGERINE,
    color::AMBER,
];

const GREY: &[Rgb] = &[
    color::WHITE,
    color::GREY_0,
    color::GREY_1,
    color::GREY_2,
    color::GREY_3,
    color::GREY_4,
    color::GREY_5,
    color::GREY_6,
    color::GREY_7,
];

const DARK: &[Rgb] = &[
    color::DARK_RED,
    color::DARK_GREEN,
    color::DARK_BLUE,
    color::DARK_CYAN,
    color::DARK_MAGENTA,
    color::DARK_YELLOW,
    color::PURPLE,
];

impl Palette {
    /// Parse a palette name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(Palette::All),
            "cool" => Some(Palette::Cool),
            "warm" => Some(Palette::Warm),
            "wild" => Some(Palette::Wild),
            "grey" => Some(Palette::Grey),
            "dark" => Some(Palette::Dark),
            _ => None,
        }
    }

    /// Number of colours in the palette
    pub fn len(&self) -> usize {
        match self {
            Palette::All => color::visible().count(),
            other => other.fixed().len(),
        }
    }

    /// Palettes are never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Colour at `index` (wrapping)
    pub fn get(&self, index: usize) -> Rgb {
        match self {
            Palette::All => {
                let count = color::visible().count();
                color::visible()
                    .nth(index % count)
                    .map(|c| c.rgb)
                    .unwrap_or(color::WHITE)
            }
            other => {
                let colors = other.fixed();
                colors[index % colors.len()]
            }
        }
    }

    fn fixed(&self) -> &'static [Rgb] {
        match self {
            Palette::All => &[],
            Palette::Cool => COOL,
            Palette::Warm => WARM,
            Palette::Wild => WILD,
            Palette::Grey => GREY,
            Palette::Dark => DARK,
        }
    }
}
