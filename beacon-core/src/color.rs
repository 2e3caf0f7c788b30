//! Named colour table
//!
//! Colours are looked up by lowercase name. Multi-word names use a single
//! space (`dark cyan`, `sky blue`); underscores are accepted in their place.

pub use beacon_hal::Rgb;

/// A colour with its lookup name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: Rgb,
}

const fn named(name: &'static str, r: u8, g: u8, b: u8) -> NamedColor {
    NamedColor {
        name,
        rgb: Rgb::new(r, g, b),
    }
}

pub const BLACK: Rgb = Rgb::BLACK;
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const RED: Rgb = Rgb::new(255, 0, 0);
pub const GREEN: Rgb = Rgb::new(0, 255, 0);
pub const BLUE: Rgb = Rgb::new(0, 0, 255);
pub const CYAN: Rgb = Rgb::new(0, 255, 255);
pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
pub const YELLOW: Rgb = Rgb::new(250, 150, 0);
pub const GREY: Rgb = Rgb::new(40, 40, 40);
pub const DARK_RED: Rgb = Rgb::new(22, 0, 0);
pub const DARK_GREEN: Rgb = Rgb::new(0, 24, 0);
pub const DARK_BLUE: Rgb = Rgb::new(0, 0, 32);
pub const DARK_CYAN: Rgb = Rgb::new(0, 28, 28);
pub const DARK_MAGENTA: Rgb = Rgb::new(28, 0, 28);
pub const DARK_YELLOW: Rgb = Rgb::new(50, 20, 0);
pub const DARK_GREY: Rgb = Rgb::new(10, 10, 10);
pub const AMBER: Rgb = Rgb::new(255, 90, 0);
pub const ORANGE: Rgb = Rgb::new(240, 53, 0);
pub const TANGERINE: Rgb = Rgb::new(100, 11, 0);
pub const FUCHSIA: Rgb = Rgb::new(158, 16, 99);
pub const APPLE: Rgb = Rgb::new(70, 100, 0);
pub const EMERALD: Rgb = Rgb::new(0, 90, 10);
pub const MEDIUM_CYAN: Rgb = Rgb::new(0, 128, 128);
pub const DEEP_CYAN: Rgb = Rgb::new(0, 11, 11);
pub const CORNFLOWER: Rgb = Rgb::new(60, 90, 142);
pub const SKY_BLUE: Rgb = Rgb::new(9, 25, 190);
pub const INDIGO: Rgb = Rgb::new(0, 16, 50);
pub const LAVENDER: Rgb = Rgb::new(24, 11, 130);
pub const VIOLET: Rgb = Rgb::new(138, 43, 226);
pub const PURPLE: Rgb = Rgb::new(14, 0, 56);
pub const PINK: Rgb = Rgb::new(255, 50, 40);
pub const GREY_0: Rgb = Rgb::new(11, 11, 10);
pub const GREY_1: Rgb = Rgb::new(15, 15, 10);
pub const GREY_2: Rgb = Rgb::new(20, 20, 15);
pub const GREY_3: Rgb = Rgb::new(30, 30, 20);
pub const GREY_4: Rgb = Rgb::new(40, 40, 30);
pub const GREY_5: Rgb = Rgb::new(50, 50, 40);
pub const GREY_6: Rgb = Rgb::new(70, 70, 60);
pub const GREY_7: Rgb = Rgb::new(130, 130, 110);

/// Every named colour, black first
pub static COLORS: &[NamedColor] = &[
    named("black", 0, 0, 0),
    named("white", 255, 255, 255),
    named("red", 255, 0, 0),
    named("green", 0, 255, 0),
    named("blue", 0, 0, 255),
    named("cyan", 0, 255, 255),
    named("magenta", 255, 0, 255),
    named("yellow", 250, 150, 0),
    named("grey", 40, 40, 40),
    named("dark red", 22, 0, 0),
    named("dark green", 0, 24, 0),
    named("dark blue", 0, 0, 32),
    named("dark cyan", 0, 28, 28),
    named("dark magenta", 28, 0, 28),
    named("dark yellow", 50, 20, 0),
    named("dark grey", 10, 10, 10),
    named("amber", 255, 90, 0),
    named("orange", 240, 53, 0),
    named("tangerine", 100, 11, 0),
    named("fuchsia", 158, 16, 99),
    named("apple", 70, 100, 0),
    named("emerald", 0, 90, 10),
    named("medium cyan", 0, 128, 128),
    named("deep cyan", 0, 11, 11),
    named("cornflower", 60, 90, 142),
    named("sky blue", 9, 25, 190),
    named("indigo", 0, 16, 50),
    named("lavender", 24, 11, 130),
    named("violet", 138, 43, 226),
    named("purple", 14, 0, 56),
    named("pink", 255, 50, 40),
    named("grey 0", 11, 11, 10),
    named("grey 1", 15, 15, 10),
    named("grey 2", 20, 20, 15),
    named("grey 3", 30, 30, 20),
    named("grey 4", 40, 40, 30),
    named("grey 5", 50, 50, 40),
    named("grey 6", 70, 70, 60),
    named("grey 7", 130, 130, 110),
];

fn name_matches(stored: &str, key: &str) -> bool {
    stored.len() == key.len()
        && stored.bytes().zip(key.bytes()).all(|(s, k)| {
            let k = if k == b'_' { b' ' } else { k.to_ascii_lowercase() };
            s == k
        })
}

/// Look up a colour by its full name
pub fn lookup(name: &str) -> Option<Rgb> {
    COLORS
        .iter()
        .find(|c| name_matches(c.name, name))
        .map(|c| c.rgb)
}

/// Look up a colour given as one or two command tokens (`red`, `dark cyan`)
pub fn lookup_tokens(first: &str, second: Option<&str>) -> Option<Rgb> {
    match second {
        None => lookup(first),
        Some(second) => {
            let mut joined: heapless::String<32> = heapless::String::new();
            joined.push_str(first).ok()?;
            joined.push(' ').ok()?;
            joined.push_str(second).ok()?;
            lookup(&joined)
        }
    }
}

/// Colours usable for theming: everything except black
pub fn visible() -> impl Iterator<Item = &'static NamedColor> {
    COLORS.iter().filter(|c| !c.rgb.is_black())
}
