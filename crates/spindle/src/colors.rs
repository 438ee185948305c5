use derive_more::{Deref, From, Into};
use palette::Srgb;
use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    #[default]
    #[strum(to_string = "classic", serialize = "default")]
    Classic,
    #[strum(to_string = "pastel")]
    Pastel,
    #[strum(to_string = "mono", serialize = "monochrome")]
    Mono,
}

/// One segment fill colour, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct Swatch(Srgb<u8>);

impl Swatch {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }
}

impl FromStr for Swatch {
    type Err = palette::rgb::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::<u8>::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

const CLASSIC: &[Swatch] = &[
    Swatch::rgb(0xFF, 0x63, 0x84),
    Swatch::rgb(0x36, 0xA2, 0xEB),
    Swatch::rgb(0xFF, 0xCE, 0x56),
    Swatch::rgb(0x4B, 0xC0, 0xC0),
    Swatch::rgb(0x99, 0x66, 0xFF),
    Swatch::rgb(0xFF, 0x9F, 0x40),
    Swatch::rgb(0xE7, 0xE9, 0xED),
    Swatch::rgb(0x76, 0xD7, 0xC4),
];

const PASTEL: &[Swatch] = &[
    Swatch::rgb(0xFF, 0xB3, 0xBA),
    Swatch::rgb(0xFF, 0xDF, 0xBA),
    Swatch::rgb(0xFF, 0xFF, 0xBA),
    Swatch::rgb(0xBA, 0xFF, 0xC9),
    Swatch::rgb(0xBA, 0xE1, 0xFF),
    Swatch::rgb(0xD7, 0xBA, 0xFF),
];

const MONO: &[Swatch] = &[
    Swatch::rgb(0x33, 0x33, 0x33),
    Swatch::rgb(0x77, 0x77, 0x77),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    pub fn named(name: PaletteName) -> Self {
        let swatches = match name {
            PaletteName::Classic => CLASSIC,
            PaletteName::Pastel => PASTEL,
            PaletteName::Mono => MONO,
        };
        Self {
            swatches: swatches.to_vec(),
        }
    }

    /// Custom swatches win over the named palette unless there are none.
    pub fn resolve(name: PaletteName, custom: &[Swatch]) -> Self {
        if custom.is_empty() {
            Self::named(name)
        } else {
            Self {
                swatches: custom.to_vec(),
            }
        }
    }

    pub fn color_of(&self, index: usize) -> Swatch {
        self.swatches[index % self.swatches.len()]
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::named(PaletteName::default())
    }
}
