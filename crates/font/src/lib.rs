//! Font abstractions and types
//!
//! The typesetting engine does not read font files itself.
//! Instead it asks a value implementing [Metrics] about the glyphs it places.
//! Every question is optional: an engine asking about a glyph the font
//! does not know gets [None] back and carries on with zero dimensions.

use dimen::{Glue, Scaled};
use std::collections::HashMap;

/// Trait satisfied by font formats (like .tfm files).
pub trait Format: Sized {
    const DEFAULT_FILE_EXTENSION: &'static str;
    type Error: std::error::Error + 'static;

    /// Parse binary data into a font.
    fn parse(b: &[u8]) -> Result<Self, Self::Error>;
}

/// Dimensions of a single glyph.
///
/// Described in TeX.2021.543.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlyphBox {
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub italic_correction: Scaled,
}

/// Read-only access to font metrics.
///
/// Fonts are identified by a number.
/// What the number means is up to the implementation.
pub trait Metrics {
    /// Returns the dimensions of a glyph, if the font has it.
    fn glyph_box(&self, font: u32, c: char) -> Option<GlyphBox>;

    /// Returns the kern to insert between two adjacent glyphs.
    fn kern(&self, font: u32, left: char, right: char) -> Option<Scaled> {
        _ = (font, left, right);
        None
    }

    /// Returns the glyph that replaces two adjacent glyphs.
    fn ligature(&self, font: u32, left: char, right: char) -> Option<char> {
        _ = (font, left, right);
        None
    }

    /// Returns the inter-word glue of the font.
    fn space(&self, font: u32) -> Option<Glue> {
        _ = font;
        None
    }
}

/// Metrics of the null font.
///
/// The null font has no glyphs, no kerns, no ligatures and no inter-word space.
/// Described in TeX.2021.552.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFont;

impl Metrics for NullFont {
    fn glyph_box(&self, _: u32, _: char) -> Option<GlyphBox> {
        None
    }
}

/// Metrics for one font in a [FontTable].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontData {
    /// Glyphs of the font.
    pub glyphs: HashMap<char, GlyphBox>,
    /// Box used for every glyph not listed in `glyphs`.
    pub default_glyph: Option<GlyphBox>,
    /// Kerns, keyed by the pair of glyphs.
    pub kerns: Vec<(char, char, Scaled)>,
    /// Ligatures: the first two glyphs are replaced by the third.
    pub ligatures: Vec<(char, char, char)>,
    /// Inter-word glue.
    pub space: Option<Glue>,
}

/// Table-driven font metrics.
///
/// With the `serde` feature the table can be read from JSON.
/// Dimensions are given in scaled points:
///
/// ```json
/// {
///   "0": {
///     "default_glyph": {"width": 327680},
///     "kerns": [["A", "V", -65536]],
///     "ligatures": [["f", "i", "ﬁ"]],
///     "space": {"width": 218453, "stretch": 109226, "shrink": 72818}
///   }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FontTable {
    fonts: HashMap<u32, FontData>,
}

impl FontTable {
    pub fn new() -> FontTable {
        Default::default()
    }

    /// Gives every glyph of the font the same box.
    pub fn with_default_glyph(mut self, font: u32, glyph: GlyphBox) -> FontTable {
        self.fonts.entry(font).or_default().default_glyph = Some(glyph);
        self
    }

    pub fn with_glyph(mut self, font: u32, c: char, glyph: GlyphBox) -> FontTable {
        self.fonts.entry(font).or_default().glyphs.insert(c, glyph);
        self
    }

    pub fn with_kern(mut self, font: u32, left: char, right: char, kern: Scaled) -> FontTable {
        self.fonts
            .entry(font)
            .or_default()
            .kerns
            .push((left, right, kern));
        self
    }

    pub fn with_ligature(mut self, font: u32, left: char, right: char, lig: char) -> FontTable {
        self.fonts
            .entry(font)
            .or_default()
            .ligatures
            .push((left, right, lig));
        self
    }

    pub fn with_space(mut self, font: u32, space: Glue) -> FontTable {
        self.fonts.entry(font).or_default().space = Some(space);
        self
    }

    /// Returns the metrics of a single font.
    pub fn font(&self, font: u32) -> Option<&FontData> {
        self.fonts.get(&font)
    }
}

impl Metrics for FontTable {
    fn glyph_box(&self, font: u32, c: char) -> Option<GlyphBox> {
        let data = self.fonts.get(&font)?;
        data.glyphs.get(&c).copied().or(data.default_glyph)
    }

    fn kern(&self, font: u32, left: char, right: char) -> Option<Scaled> {
        self.fonts
            .get(&font)?
            .kerns
            .iter()
            .find(|(l, r, _)| *l == left && *r == right)
            .map(|(_, _, k)| *k)
    }

    fn ligature(&self, font: u32, left: char, right: char) -> Option<char> {
        self.fonts
            .get(&font)?
            .ligatures
            .iter()
            .find(|(l, r, _)| *l == left && *r == right)
            .map(|(_, _, c)| *c)
    }

    fn space(&self, font: u32) -> Option<Glue> {
        self.fonts.get(&font)?.space
    }
}

#[cfg(feature = "serde")]
impl Format for FontTable {
    const DEFAULT_FILE_EXTENSION: &'static str = "json";
    type Error = serde_json::Error;

    fn parse(b: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice(b)
    }
}
