//! Math lists.
//!
//! In math mode TeX doesn't build nodes directly; it builds a list of
//! noads (TeX.2021.680) which are converted to nodes when the formula ends.
//! Only ordinary atoms without sub- or superscripts are converted here.
//! Formulas that need script layout fail with an
//! [unsupported operation error](Error::UnsupportedOperation).

use crate::error::Error;
use crate::node::{self, HList, Kern, Node, NodeList, Penalty};
use dimen::Scaled;

/// An item of a math list.
#[derive(Debug, Clone, PartialEq)]
pub enum Noad {
    /// An ordinary atom.
    ///
    /// Described in TeX.2021.682.
    Ord(Atom),
    Glue(dimen::Glue),
    Kern(Scaled),
    Penalty(i32),
}

/// A nucleus with optional sub- and superscripts.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Atom {
    pub nucleus: Field,
    pub subscript: Field,
    pub superscript: Field,
}

impl Atom {
    pub fn new(nucleus: Field) -> Atom {
        Atom {
            nucleus,
            ..Default::default()
        }
    }
}

/// A field of an atom.
///
/// Described in TeX.2021.681.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Field {
    #[default]
    Empty,
    Char {
        char: char,
        font: u32,
    },
    /// A sub-formula, like `{a+b}`.
    List(Vec<Noad>),
}

impl Field {
    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Empty)
    }
}

/// Converts a math list into a horizontal list.
pub fn convert(noads: Vec<Noad>, metrics: &dyn font::Metrics) -> Result<NodeList, Error> {
    let mut list = NodeList::horizontal();
    for noad in noads {
        match noad {
            Noad::Ord(atom) => {
                if !atom.subscript.is_empty() || !atom.superscript.is_empty() {
                    return Err(Error::unsupported("sub/superscript layout"));
                }
                match atom.nucleus {
                    Field::Empty => {}
                    Field::Char { char, font } => {
                        list.push(node::Char::new(char, font, metrics));
                    }
                    Field::List(inner) => {
                        list.push(HList::new(convert(inner, metrics)?));
                    }
                }
            }
            Noad::Glue(glue) => list.push(node::Glue::new(glue)),
            Noad::Kern(width) => list.push(Kern::explicit(width)),
            Noad::Penalty(value) => list.push(Penalty { value }),
        }
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::{FontTable, GlyphBox};

    fn fonts() -> FontTable {
        FontTable::new().with_default_glyph(
            0,
            GlyphBox {
                width: Scaled::ONE * 5,
                height: Scaled::ONE * 6,
                ..Default::default()
            },
        )
    }

    fn ord(c: char) -> Noad {
        Noad::Ord(Atom::new(Field::Char { char: c, font: 0 }))
    }

    #[test]
    fn convert_chars_and_glue() {
        let list = convert(
            vec![ord('x'), Noad::Glue(dimen::Glue::fixed(Scaled::ONE)), ord('y')],
            &fonts(),
        )
        .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.width(), Scaled::ONE * 11);
    }

    #[test]
    fn convert_sub_formula() {
        let list = convert(
            vec![Noad::Ord(Atom::new(Field::List(vec![ord('a'), ord('b')])))],
            &fonts(),
        )
        .unwrap();
        assert!(matches!(list.nodes(), [Node::HList(b)] if b.list.len() == 2));
        assert_eq!(list.width(), Scaled::ONE * 10);
    }

    #[test]
    fn empty_nucleus_produces_nothing() {
        let list = convert(vec![Noad::Ord(Atom::default())], &fonts()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn scripts_are_unsupported() {
        let atom = Atom {
            superscript: Field::Char { char: '2', font: 0 },
            ..Atom::new(Field::Char { char: 'x', font: 0 })
        };
        assert!(matches!(
            convert(vec![Noad::Ord(atom)], &fonts()),
            Err(Error::UnsupportedOperation { .. })
        ));
    }
}
