//! Color values handed to the QR renderer

use serde::{Deserialize, Serialize};
use std::fmt;

use super::keys::qr;

/// Hue/saturation/lightness triple with integer components.
///
/// Rendered as CSS `hsl(H, S%, L%)`, which is also the string stored in the
/// assignment table. Two colors are "the same" when their strings match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self { hue, saturation, lightness }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Background/foreground pair for one QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrColors {
    pub background: String,
    pub foreground: String,
}

impl QrColors {
    /// Black on white, used when no wallet is loaded
    pub fn neutral() -> Self {
        Self { background: qr::NEUTRAL_BACKGROUND.into(), foreground: qr::NEUTRAL_FOREGROUND.into() }
    }

    /// Gold on cobalt, reserved for developer addresses
    pub fn privileged() -> Self {
        Self { background: qr::PRIVILEGED_BACKGROUND.into(), foreground: qr::PRIVILEGED_FOREGROUND.into() }
    }

    /// An assigned color on the neutral background
    pub fn assigned(color: impl Into<String>) -> Self {
        Self { background: qr::NEUTRAL_BACKGROUND.into(), foreground: color.into() }
    }
}
