//! RGBA color values and the built-in named palette.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from color construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    /// The palette has no entry for this name.
    #[error("unknown color name: {0}")]
    UnknownName(String),

    /// A channel value fell outside `[0, 1]`.
    #[error("color channel {channel} out of range: {value}")]
    ChannelOutOfRange {
        /// Which channel was out of range (`r`, `g`, `b`, or `a`).
        channel: char,
        /// The offending value.
        value: f64,
    },
}

/// An RGBA color with each channel in `[0, 1]`.
///
/// Immutable once constructed. Construct from a palette name with
/// [`Rgba::from_name`], or from explicit channels with [`Rgba::new`]
/// (opaque) or [`Rgba::with_alpha`]. Deserialization runs the same
/// channel validation as the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RgbaChannels")]
pub struct Rgba {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

/// Unvalidated wire form of [`Rgba`].
#[derive(Deserialize)]
struct RgbaChannels {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl TryFrom<RgbaChannels> for Rgba {
    type Error = ColorError;

    fn try_from(c: RgbaChannels) -> Result<Self, ColorError> {
        Self::with_alpha(c.r, c.g, c.b, c.a)
    }
}

/// Named palette, matching the common exchange-kernel color names.
/// Lookup is case-insensitive.
const PALETTE: &[(&str, [f64; 3])] = &[
    ("black", [0.0, 0.0, 0.0]),
    ("white", [1.0, 1.0, 1.0]),
    ("red", [1.0, 0.0, 0.0]),
    ("green", [0.0, 1.0, 0.0]),
    ("blue", [0.0, 0.0, 1.0]),
    ("yellow", [1.0, 1.0, 0.0]),
    ("cyan", [0.0, 1.0, 1.0]),
    ("magenta", [1.0, 0.0, 1.0]),
    ("orange", [1.0, 0.648, 0.0]),
    ("gray", [0.752, 0.752, 0.752]),
    ("grey", [0.752, 0.752, 0.752]),
    ("brown", [0.647, 0.164, 0.164]),
    ("purple", [0.627, 0.125, 0.941]),
    ("pink", [1.0, 0.752, 0.796]),
    ("gold", [1.0, 0.843, 0.0]),
    ("silver", [0.752, 0.752, 0.752]),
    ("beige", [0.960, 0.960, 0.862]),
    ("navy", [0.0, 0.0, 0.501]),
    ("olive", [0.501, 0.501, 0.0]),
    ("teal", [0.0, 0.501, 0.501]),
    ("maroon", [0.690, 0.188, 0.376]),
];

fn check(channel: char, value: f64) -> Result<f64, ColorError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ColorError::ChannelOutOfRange { channel, value })
    }
}

impl Rgba {
    /// Opaque color from red, green, and blue channels (alpha = 1).
    pub fn new(r: f64, g: f64, b: f64) -> Result<Self, ColorError> {
        Self::with_alpha(r, g, b, 1.0)
    }

    /// Color from all four channels, preserved exactly.
    pub fn with_alpha(r: f64, g: f64, b: f64, a: f64) -> Result<Self, ColorError> {
        Ok(Self {
            r: check('r', r)?,
            g: check('g', g)?,
            b: check('b', b)?,
            a: check('a', a)?,
        })
    }

    /// Look up an opaque color by palette name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, ColorError> {
        let lower = name.to_ascii_lowercase();
        PALETTE
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, [r, g, b])| Self {
                r: *r,
                g: *g,
                b: *b,
                a: 1.0,
            })
            .ok_or_else(|| ColorError::UnknownName(name.to_string()))
    }

    /// Red channel.
    pub fn r(&self) -> f64 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Alpha channel (1 = opaque).
    pub fn a(&self) -> f64 {
        self.a
    }
}
