//! List makers.
//!
//! A list maker accumulates the list of the current mode together with the
//! mode's auxiliary state, like the space factor in horizontal mode or the
//! previous depth in vertical mode.
//! TeX keeps this state in its semantic nest (TeX.2021.211-213);
//! here there is one variant of [ListMaker] per mode.

mod alignment;
mod horizontal;
mod math;
mod vertical;

pub use alignment::{AlignmentListMaker, ColumnTemplate};
pub use horizontal::HorizontalListMaker;
pub use math::MathListMaker;
pub use vertical::VerticalListMaker;

use crate::error::Error;
use crate::node::{Node, NodeList};

/// Position in the source that drives the typesetter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub line: usize,
}

impl Locator {
    pub fn new(line: usize) -> Locator {
        Locator { line }
    }
}

/// The modes of TeX.
///
/// Described in TeX.2021.211.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Vertical,
    InternalVertical,
    Horizontal,
    RestrictedHorizontal,
    Math,
    DisplayMath,
    Alignment,
}

impl Mode {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Mode::Vertical | Mode::InternalVertical)
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Mode::Horizontal | Mode::RestrictedHorizontal)
    }

    pub fn is_math(&self) -> bool {
        matches!(self, Mode::Math | Mode::DisplayMath)
    }
}

impl std::fmt::Display for Mode {
    // TeX.2021.211
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Mode::*;
        let s = match self {
            Vertical => "vertical mode",
            InternalVertical => "internal vertical mode",
            Horizontal => "horizontal mode",
            RestrictedHorizontal => "restricted horizontal mode",
            Math => "math mode",
            DisplayMath => "display math mode",
            Alignment => "alignment mode",
        };
        write!(f, "{s}")
    }
}

/// State shared by all list makers.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Frame {
    pub(crate) entered_at: Locator,
    open_groups: usize,
}

impl Frame {
    pub(crate) fn new(entered_at: Locator) -> Frame {
        Frame {
            entered_at,
            open_groups: 0,
        }
    }

    fn left_brace(&mut self) {
        self.open_groups += 1;
    }

    fn right_brace(&mut self) -> Result<(), Error> {
        if self.open_groups == 0 {
            return Err(Error::ExtraRightBrace);
        }
        self.open_groups -= 1;
        Ok(())
    }
}

/// A list maker for one of the modes.
#[derive(Debug, Clone, PartialEq)]
pub enum ListMaker {
    /// Outer or internal vertical mode.
    Vertical(VerticalListMaker),
    /// Paragraph building.
    Horizontal(HorizontalListMaker),
    /// The contents of an `\hbox`.
    RestrictedHorizontal(HorizontalListMaker),
    Math(MathListMaker),
    DisplayMath(MathListMaker),
    /// The body of an `\halign`.
    Alignment(AlignmentListMaker),
}

impl ListMaker {
    pub fn mode(&self) -> Mode {
        use ListMaker::*;
        match self {
            Vertical(v) => {
                if v.is_inner() {
                    Mode::InternalVertical
                } else {
                    Mode::Vertical
                }
            }
            Horizontal(_) => Mode::Horizontal,
            RestrictedHorizontal(_) => Mode::RestrictedHorizontal,
            Math(_) => Mode::Math,
            DisplayMath(_) => Mode::DisplayMath,
            Alignment(_) => Mode::Alignment,
        }
    }

    /// Line at which this list maker was created.
    pub fn entered_at(&self) -> Locator {
        use ListMaker::*;
        match self {
            Vertical(v) => v.frame.entered_at,
            Horizontal(h) | RestrictedHorizontal(h) => h.frame.entered_at,
            Math(m) | DisplayMath(m) => m.frame.entered_at,
            Alignment(a) => a.frame.entered_at,
        }
    }

    /// The list being built, or [None] for math lists.
    ///
    /// For alignments this is the list of the current cell.
    pub fn list(&self) -> Option<&NodeList> {
        use ListMaker::*;
        match self {
            Vertical(v) => Some(v.list()),
            Horizontal(h) | RestrictedHorizontal(h) => Some(h.list()),
            Math(_) | DisplayMath(_) => None,
            Alignment(a) => Some(a.cell().list()),
        }
    }

    pub fn last_node(&self) -> Option<&Node> {
        self.list()?.last()
    }

    pub fn remove_last_node(&mut self) -> Result<Node, Error> {
        use ListMaker::*;
        match self {
            Vertical(v) => v.remove_last(),
            Horizontal(h) | RestrictedHorizontal(h) => h.remove_last(),
            Math(_) | DisplayMath(_) => Err(Error::unsupported("removing nodes from math lists")),
            Alignment(a) => a.cell_mut().remove_last(),
        }
    }

    pub fn left_brace(&mut self) {
        use ListMaker::*;
        match self {
            Vertical(v) => v.frame.left_brace(),
            Horizontal(h) | RestrictedHorizontal(h) => h.frame.left_brace(),
            Math(m) | DisplayMath(m) => m.left_brace(),
            Alignment(a) => a.frame.left_brace(),
        }
    }

    pub fn right_brace(&mut self) -> Result<(), Error> {
        use ListMaker::*;
        match self {
            Vertical(v) => v.frame.right_brace(),
            Horizontal(h) | RestrictedHorizontal(h) => h.frame.right_brace(),
            Math(m) | DisplayMath(m) => m.right_brace(),
            Alignment(a) => a.frame.right_brace(),
        }
    }

    /// Finishes the list maker and returns its list.
    ///
    /// Math lists are converted to horizontal lists.
    /// Alignments return a vertical list with one hbox per row.
    pub fn finish(self, metrics: &dyn font::Metrics) -> Result<NodeList, Error> {
        use ListMaker::*;
        match self {
            Vertical(v) => Ok(v.finish()),
            Horizontal(h) | RestrictedHorizontal(h) => Ok(h.finish()),
            Math(m) | DisplayMath(m) => m.finish(metrics),
            Alignment(a) => Ok(a.finish()),
        }
    }
}
