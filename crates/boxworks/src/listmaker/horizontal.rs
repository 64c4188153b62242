use super::{Frame, Locator};
use crate::error::Error;
use crate::node::*;
use crate::params::Parameters;
use dimen::Scaled;
use font::Metrics;

const MAX_SPACE_FACTOR: i32 = 32767;

/// Largest language number; other values select language 0.
///
/// Described in TeX.2021.1034.
const MAX_LANGUAGE: i32 = 255;

/// List maker for horizontal and restricted horizontal mode.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalListMaker {
    pub(crate) frame: Frame,
    list: NodeList,
    space_factor: i32,
    language: u32,
    indented: bool,
}

impl HorizontalListMaker {
    pub fn new(indented: bool, entered_at: Locator) -> Self {
        Self {
            frame: Frame::new(entered_at),
            list: NodeList::horizontal(),
            space_factor: 1000,
            language: 0,
            indented,
        }
    }

    pub fn list(&self) -> &NodeList {
        &self.list
    }

    pub fn space_factor(&self) -> i32 {
        self.space_factor
    }

    /// Sets the space factor, which must lie in 1..=32767.
    ///
    /// Described in TeX.2021.1243.
    pub fn set_space_factor(&mut self, space_factor: i32) -> Result<(), Error> {
        if !(1..=MAX_SPACE_FACTOR).contains(&space_factor) {
            return Err(Error::BadSpaceFactor(space_factor));
        }
        self.space_factor = space_factor;
        Ok(())
    }

    pub fn language(&self) -> u32 {
        self.language
    }

    /// Sets the current language.
    pub fn set_language(&mut self, language: i32) {
        self.language = match u32::try_from(language) {
            Ok(l) if language <= MAX_LANGUAGE => l,
            _ => 0,
        };
    }

    /// Whether the paragraph started with an indentation box.
    pub fn indented(&self) -> bool {
        self.indented
    }

    /// Adds a node; the space factor is reset to 1000.
    pub fn add_node(&mut self, node: Node) {
        self.list.push(node);
        self.space_factor = 1000;
    }

    /// Adds a character, forming ligatures and inserting kerns from the font.
    ///
    /// If the previous node is a character or ligature in the same font and the
    /// font has a ligature for the pair, the previous node is replaced by the ligature.
    /// Ligatures chain: the new ligature may itself combine with the next character.
    /// Otherwise, if the font has a kern for the pair, it is placed between the characters.
    ///
    /// This is a simplified version of TeX's main loop (TeX.2021.1034-1040).
    pub fn append_char(&mut self, c: char, font: u32, metrics: &dyn Metrics) {
        self.adjust_space_factor(c);
        let previous = match self.list.last() {
            Some(Node::Char(prev)) if prev.font == font => Some((prev.char, vec![prev.char])),
            Some(Node::Ligature(prev)) if prev.font == font => {
                Some((prev.char, prev.original_chars.clone()))
            }
            _ => None,
        };
        let Some((left, mut original_chars)) = previous else {
            self.list.push(Char::new(c, font, metrics));
            return;
        };
        if let Some(lig) = metrics.ligature(font, left, c) {
            // The last node is known to exist.
            _ = self.list.remove_last();
            original_chars.push(c);
            let glyph = Char::new(lig, font, metrics);
            self.list.push(Ligature {
                char: lig,
                font,
                original_chars,
                width: glyph.width,
                height: glyph.height,
                depth: glyph.depth,
            });
            return;
        }
        if let Some(kern) = metrics.kern(font, left, c) {
            self.list.push(Kern::new(kern));
        }
        self.list.push(Char::new(c, font, metrics));
    }

    /// Updates the space factor after a character.
    ///
    /// INITEX gives uppercase letters a space factor code of 999 and every
    /// other character 1000 (TeX.2021.232).
    ///
    /// Described in TeX.2021.1034.
    fn adjust_space_factor(&mut self, c: char) {
        let sf_code = if c.is_uppercase() { 999 } else { 1000 };
        if sf_code == 1000 {
            self.space_factor = 1000;
        } else if sf_code < 1000 {
            self.space_factor = sf_code;
        } else if self.space_factor < 1000 {
            self.space_factor = 1000;
        } else {
            self.space_factor = sf_code;
        }
    }

    /// Adds inter-word glue.
    ///
    /// The glue is `\spaceskip` if it is non-zero and the space of the font otherwise.
    /// With a space factor of 2000 or more a non-zero `\xspaceskip` is used instead.
    /// With any other space factor different from 1000 the stretch is multiplied by
    /// _f_/1000 and the shrink by 1000/_f_.
    ///
    /// Described in TeX.2021.1041-1044.
    pub fn add_space(&mut self, font: u32, metrics: &dyn Metrics, params: &Parameters) {
        let (param, base) = if params.space_skip.is_zero() {
            (None, metrics.space(font).unwrap_or_default())
        } else {
            (Some(GlueParam::SpaceSkip), params.space_skip)
        };
        let sf = self.space_factor;
        let glue = if sf == 1000 {
            Glue {
                kind: param.map(GlueKind::Parameter).unwrap_or(GlueKind::Normal),
                value: base,
            }
        } else if sf >= 2000 && !params.xspace_skip.is_zero() {
            Glue::from_param(GlueParam::XSpaceSkip, params.xspace_skip)
        } else {
            let scale = |s: Scaled, n: i32, d: i32| s.xn_over_d(n, d).map(|(q, _)| q).unwrap_or(s);
            Glue::new(dimen::Glue {
                stretch: scale(base.stretch, sf, 1000),
                shrink: scale(base.shrink, 1000, sf),
                ..base
            })
        };
        self.list.push(glue);
    }

    pub fn remove_last(&mut self) -> Result<Node, Error> {
        self.list.remove_last()
    }

    pub fn finish(self) -> NodeList {
        self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::{FontTable, GlyphBox};

    fn pt(n: i32) -> Scaled {
        Scaled::ONE * n
    }

    fn fonts() -> FontTable {
        FontTable::new()
            .with_default_glyph(
                0,
                GlyphBox {
                    width: pt(10),
                    height: pt(7),
                    ..Default::default()
                },
            )
            .with_glyph(
                0,
                'ﬀ',
                GlyphBox {
                    width: pt(12),
                    ..Default::default()
                },
            )
            .with_ligature(0, 'f', 'f', 'ﬀ')
            .with_ligature(0, 'ﬀ', 'i', 'ﬃ')
            .with_kern(0, 'A', 'V', -pt(1))
            .with_space(
                0,
                dimen::Glue {
                    width: pt(4),
                    stretch: pt(2),
                    shrink: pt(1),
                    ..Default::default()
                },
            )
    }

    fn type_codes(h: &HorizontalListMaker) -> Vec<i32> {
        h.list().iter().map(Node::type_code).collect()
    }

    #[test]
    fn kern_between_chars() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.append_char('A', 0, &fonts());
        h.append_char('V', 0, &fonts());
        assert_eq!(type_codes(&h), vec![0, 12, 0]);
        assert_eq!(h.list().width(), pt(19));
    }

    #[test]
    fn kern_only_within_same_font() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.append_char('A', 0, &fonts());
        h.append_char('V', 1, &fonts());
        assert_eq!(type_codes(&h), vec![0, 0]);
    }

    #[test]
    fn ligatures_chain() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.append_char('f', 0, &fonts());
        h.append_char('f', 0, &fonts());
        assert_eq!(type_codes(&h), vec![7]);
        assert_eq!(h.list().width(), pt(12));
        h.append_char('i', 0, &fonts());
        match h.list().nodes() {
            [Node::Ligature(lig)] => {
                assert_eq!(lig.char, 'ﬃ');
                assert_eq!(lig.original_chars, vec!['f', 'f', 'i']);
            }
            other => panic!("unexpected list {other:?}"),
        }
    }

    #[test]
    fn uppercase_letters_lower_space_factor() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.append_char('A', 0, &fonts());
        assert_eq!(h.space_factor(), 999);
        h.append_char('a', 0, &fonts());
        assert_eq!(h.space_factor(), 1000);
    }

    #[test]
    fn bad_space_factor() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        assert_eq!(h.set_space_factor(0), Err(Error::BadSpaceFactor(0)));
        assert_eq!(h.set_space_factor(-5), Err(Error::BadSpaceFactor(-5)));
        assert_eq!(h.set_space_factor(32768), Err(Error::BadSpaceFactor(32768)));
        assert_eq!(h.set_space_factor(100000), Err(Error::BadSpaceFactor(100000)));
        h.set_space_factor(32767).unwrap();
        assert_eq!(h.space_factor(), 32767);
        h.set_space_factor(1000).unwrap();
        assert_eq!(h.space_factor(), 1000);
    }

    #[test]
    fn language_out_of_range_is_zero() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.set_language(7);
        assert_eq!(h.language(), 7);
        h.set_language(256);
        assert_eq!(h.language(), 0);
        h.set_language(255);
        assert_eq!(h.language(), 255);
        h.set_language(-1);
        assert_eq!(h.language(), 0);
    }

    fn space_with_factor(sf: i32, params: &Parameters) -> Glue {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.set_space_factor(sf).unwrap();
        h.add_space(0, &fonts(), params);
        match h.list().last() {
            Some(Node::Glue(g)) => *g,
            other => panic!("not glue: {other:?}"),
        }
    }

    #[test]
    fn space_from_font() {
        let glue = space_with_factor(1000, &Parameters::default());
        assert_eq!(glue.kind, GlueKind::Normal);
        assert_eq!(glue.value.width, pt(4));
    }

    #[test]
    fn space_factor_scales_stretch_and_shrink() {
        let glue = space_with_factor(2000, &Parameters::default());
        assert_eq!(glue.value.width, pt(4));
        assert_eq!(glue.value.stretch, pt(4));
        assert_eq!(glue.value.shrink, pt(1) / 2);
    }

    #[test]
    fn xspaceskip_for_large_space_factors() {
        let params = Parameters {
            xspace_skip: dimen::Glue::fixed(pt(6)),
            ..Default::default()
        };
        let glue = space_with_factor(3000, &params);
        assert_eq!(
            glue,
            Glue::from_param(GlueParam::XSpaceSkip, dimen::Glue::fixed(pt(6)))
        );
        let glue = space_with_factor(1999, &params);
        assert_eq!(glue.kind, GlueKind::Normal);
    }

    #[test]
    fn spaceskip_overrides_font() {
        let params = Parameters {
            space_skip: dimen::Glue::fixed(pt(5)),
            ..Default::default()
        };
        let glue = space_with_factor(1000, &params);
        assert_eq!(
            glue,
            Glue::from_param(GlueParam::SpaceSkip, dimen::Glue::fixed(pt(5)))
        );
    }

    #[test]
    fn add_node_resets_space_factor() {
        let mut h = HorizontalListMaker::new(true, Locator::default());
        h.set_space_factor(3000).unwrap();
        h.add_node(Penalty { value: 0 }.into());
        assert_eq!(h.space_factor(), 1000);
    }
}
