//! Parameters of the typesetting engine.
//!
//! In TeX these live in the table of equivalents and are set with
//! primitives like `\hsize=6in`.
//! Here they are plain values owned by the [crate::Typesetter].
//! The defaults are the values INITEX starts with (TeX.2021.240):
//! every dimension and glue is zero and `\hangafter` is 1.

use dimen::{Glue, Scaled};

/// Parameters used when building lists and breaking paragraphs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Parameters {
    /// Width of lines in a paragraph.
    ///
    /// If this is [None] and no other paragraph shape is available,
    /// breaking a paragraph fails.
    pub hsize: Option<Scaled>,
    /// Width of the indentation box at the start of indented paragraphs.
    pub par_indent: Scaled,
    /// Glue placed before every line of a paragraph.
    pub interline_skip: Glue,
    /// Glue placed before a paragraph.
    pub leading_skip: Glue,
    /// Glue placed after a paragraph.
    pub trailing_skip: Glue,
    pub baseline_skip: Glue,
    pub line_skip: Glue,
    pub line_skip_limit: Scaled,
    /// Inter-word glue overriding the font's space, if non-zero.
    pub space_skip: Glue,
    /// Inter-word glue used after sentences, if non-zero.
    pub xspace_skip: Glue,
    pub hang_indent: Scaled,
    pub hang_after: i32,
    /// Explicit shape of the next paragraph, as (indent, length) pairs.
    pub par_shape: Vec<(Scaled, Scaled)>,
    pub above_display_skip: Glue,
    pub below_display_skip: Glue,
    pub pre_display_penalty: i32,
    pub post_display_penalty: i32,
    /// Log every line of every paragraph at info level.
    pub tracing_paragraphs: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            hsize: None,
            par_indent: Scaled::ZERO,
            interline_skip: Glue::default(),
            leading_skip: Glue::default(),
            trailing_skip: Glue::default(),
            baseline_skip: Glue::default(),
            line_skip: Glue::default(),
            line_skip_limit: Scaled::ZERO,
            space_skip: Glue::default(),
            xspace_skip: Glue::default(),
            hang_indent: Scaled::ZERO,
            hang_after: 1,
            par_shape: vec![],
            above_display_skip: Glue::default(),
            below_display_skip: Glue::default(),
            pre_display_penalty: 0,
            post_display_penalty: 0,
            tracing_paragraphs: false,
        }
    }
}

impl Parameters {
    /// Returns the paragraph shape determined by the parameters.
    ///
    /// An explicit `\parshape` wins over hanging indentation,
    /// which wins over a rectangular paragraph of width `\hsize`.
    ///
    /// Described in TeX.2021.848.
    pub fn paragraph_shape(&self) -> Option<ParagraphShape> {
        if !self.par_shape.is_empty() {
            return Some(ParagraphShape::Explicit(self.par_shape.clone()));
        }
        let hsize = self.hsize?;
        Some(if self.hang_indent == Scaled::ZERO {
            ParagraphShape::Fixed(hsize)
        } else {
            ParagraphShape::Hanging {
                hsize,
                indent: self.hang_indent,
                after: self.hang_after,
            }
        })
    }

    /// Resets the parameters that only apply to a single paragraph.
    ///
    /// Described in TeX.2021.1070.
    pub fn reset_paragraph_shape(&mut self) {
        self.hang_indent = Scaled::ZERO;
        self.hang_after = 1;
        self.par_shape.clear();
    }
}

/// Shape of a paragraph: the left indent and width of every line.
///
/// Lines are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphShape {
    /// Every line has the same width and no indent.
    Fixed(Scaled),
    /// Lines are indented by `\hangindent`, either after the first
    /// `after` lines or, if `after` is negative, for the first `-after` lines.
    ///
    /// A negative indent is applied on the right.
    Hanging {
        hsize: Scaled,
        indent: Scaled,
        after: i32,
    },
    /// Explicit (indent, length) of each line.
    /// The last pair applies to all remaining lines.
    Explicit(Vec<(Scaled, Scaled)>),
}

impl ParagraphShape {
    fn is_hanging_line(after: i32, line: usize) -> bool {
        let line = line as i64;
        let after = after as i64;
        if after >= 0 {
            line > after
        } else {
            line <= -after
        }
    }

    /// Left indent of the line.
    pub fn indent(&self, line: usize) -> Scaled {
        match self {
            ParagraphShape::Fixed(_) => Scaled::ZERO,
            ParagraphShape::Hanging { indent, after, .. } => {
                if Self::is_hanging_line(*after, line) && *indent > Scaled::ZERO {
                    *indent
                } else {
                    Scaled::ZERO
                }
            }
            ParagraphShape::Explicit(pairs) => explicit_pair(pairs, line).0,
        }
    }

    /// Width of the line.
    pub fn width(&self, line: usize) -> Scaled {
        match self {
            ParagraphShape::Fixed(hsize) => *hsize,
            ParagraphShape::Hanging {
                hsize,
                indent,
                after,
            } => {
                if Self::is_hanging_line(*after, line) {
                    *hsize - indent.abs()
                } else {
                    *hsize
                }
            }
            ParagraphShape::Explicit(pairs) => explicit_pair(pairs, line).1,
        }
    }
}

fn explicit_pair(pairs: &[(Scaled, Scaled)], line: usize) -> (Scaled, Scaled) {
    let i = line.max(1).min(pairs.len()).saturating_sub(1);
    pairs.get(i).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(n: i32) -> Scaled {
        Scaled::ONE * n
    }

    fn hanging(indent: i32, after: i32) -> ParagraphShape {
        ParagraphShape::Hanging {
            hsize: pt(100),
            indent: pt(indent),
            after,
        }
    }

    macro_rules! shape_tests {
        ( $( ($name: ident, $shape: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let shape = $shape;
                    let want: Vec<(i32, i32)> = $want;
                    let got: Vec<(i32, i32)> = (1..=want.len())
                        .map(|line| (shape.indent(line).integer_part(), shape.width(line).integer_part()))
                        .collect();
                    assert_eq!(got, want);
                }
            )+
        };
    }

    shape_tests!(
        (fixed, ParagraphShape::Fixed(pt(100)), vec![(0, 100), (0, 100)]),
        (
            hanging_after_two_lines,
            hanging(10, 2),
            vec![(0, 100), (0, 100), (10, 90), (10, 90)]
        ),
        (
            hanging_first_two_lines,
            hanging(10, -2),
            vec![(10, 90), (10, 90), (0, 100), (0, 100)]
        ),
        (
            hanging_on_the_right,
            hanging(-10, 0),
            vec![(0, 90), (0, 90)]
        ),
        (
            explicit_repeats_last_pair,
            ParagraphShape::Explicit(vec![(pt(5), pt(50)), (pt(0), pt(80))]),
            vec![(5, 50), (0, 80), (0, 80)]
        ),
    );

    #[test]
    fn shape_resolution_order() {
        let mut params = Parameters::default();
        assert_eq!(params.paragraph_shape(), None);
        params.hsize = Some(pt(100));
        assert_eq!(params.paragraph_shape(), Some(ParagraphShape::Fixed(pt(100))));
        params.hang_indent = pt(10);
        assert_eq!(params.paragraph_shape(), Some(hanging(10, 1)));
        params.par_shape = vec![(pt(1), pt(2))];
        assert_eq!(
            params.paragraph_shape(),
            Some(ParagraphShape::Explicit(vec![(pt(1), pt(2))]))
        );
        params.reset_paragraph_shape();
        assert_eq!(params.paragraph_shape(), Some(ParagraphShape::Fixed(pt(100))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_with_defaults() {
        let params: Parameters =
            serde_json::from_str(r#"{"hsize": 6553600, "hang_after": -2}"#).unwrap();
        assert_eq!(params.hsize, Some(pt(100)));
        assert_eq!(params.hang_after, -2);
        assert_eq!(params.par_indent, Scaled::ZERO);
    }
}
