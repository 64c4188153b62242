//! Breaking paragraphs into lines.
//!
//! This is a greedy line breaker: each line takes as many nodes as fit
//! within the line's width, and the first node that doesn't fit starts the
//! next line.
//! It does not implement Knuth and Plass's optimal-fit algorithm
//! (TeX.2021.813 onwards), and lines are not stretched or shrunk to their
//! target widths.
//!
//! The output is a vertical list of the form
//!
//! ```txt
//! leading skip
//! interline skip, line 1
//! interline skip, line 2
//! ...
//! trailing skip
//! ```
//!
//! where every line is an hbox shifted right by its indent.

use crate::node::*;
use crate::params::{ParagraphShape, Parameters};
use dimen::Scaled;

/// Source of the width of each line of a paragraph.
///
/// Lines are numbered from 1.
pub trait LineWidth {
    /// Returns the width of the line, or [None] if it can't be determined.
    fn width(&self, line: usize) -> Option<Scaled>;

    /// Returns how far the line is shifted to the right.
    fn indent(&self, line: usize) -> Scaled {
        _ = line;
        Scaled::ZERO
    }
}

impl<F: Fn(usize) -> Option<Scaled>> LineWidth for F {
    fn width(&self, line: usize) -> Option<Scaled> {
        self(line)
    }
}

impl LineWidth for ParagraphShape {
    fn width(&self, line: usize) -> Option<Scaled> {
        Some(ParagraphShape::width(self, line))
    }

    fn indent(&self, line: usize) -> Scaled {
        ParagraphShape::indent(self, line)
    }
}

/// Breaks a finished horizontal list into lines.
pub fn break_lines(
    paragraph: NodeList,
    indented: bool,
    shape: &dyn LineWidth,
    params: &Parameters,
) -> NodeList {
    let level = if params.tracing_paragraphs {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    let mut nodes = paragraph.into_nodes();
    // TeX.2021.816: a final glue node is discarded.
    if let Some(Node::Glue(_)) = nodes.last() {
        nodes.pop();
    }
    let mut output = NodeList::vertical();
    output.push(Glue::from_param(GlueParam::LeadingSkip, params.leading_skip));
    if nodes.is_empty() {
        log::log!(level, "@empty paragraph");
        output.push(Glue::from_param(GlueParam::TrailingSkip, params.trailing_skip));
        return output;
    }
    // TeX.2021.1091
    if indented && params.par_indent != Scaled::ZERO {
        nodes.insert(0, indent_box(params.par_indent).into());
    }

    let width = |line: usize| {
        shape.width(line).unwrap_or_else(|| {
            log::warn!("no width for line {line}; using 0pt");
            Scaled::ZERO
        })
    };
    let mut breaker = Breaker {
        output,
        line: NodeList::horizontal(),
        line_number: 1,
        shape,
        params,
        level,
    };
    let total: Scaled = nodes.iter().map(Node::width).sum();
    if total > Scaled::MAX_DIMEN {
        log::warn!("paragraph is wider than the largest dimension ({total})");
    }
    if total <= width(1) {
        log::log!(level, "@paragraph fits on one line ({total} <= {})", width(1));
        breaker.line.extend(nodes);
    } else {
        let mut target = width(1);
        for node in nodes {
            // A line always accepts its first node, so breaking terminates.
            if !breaker.line.is_empty() && breaker.line.width() + node.width() > target {
                breaker.emit_line();
                target = width(breaker.line_number);
            }
            breaker.line.push(node);
        }
    }
    breaker.emit_line();
    let mut output = breaker.output;
    output.push(Glue::from_param(GlueParam::TrailingSkip, params.trailing_skip));
    output
}

/// The empty box of width `\parindent` that starts an indented paragraph.
pub(crate) fn indent_box(width: Scaled) -> HList {
    let mut list = NodeList::horizontal();
    list.push(Kern::new(width));
    HList::new(list)
}

struct Breaker<'a> {
    output: NodeList,
    line: NodeList,
    line_number: usize,
    shape: &'a dyn LineWidth,
    params: &'a Parameters,
    level: log::Level,
}

impl<'a> Breaker<'a> {
    fn emit_line(&mut self) {
        let line = self.line.take();
        log::log!(
            self.level,
            "@line {} with {} nodes and width {}",
            self.line_number,
            line.len(),
            line.width()
        );
        self.output.push(Glue::from_param(
            GlueParam::InterlineSkip,
            self.params.interline_skip,
        ));
        let mut b = HList::new(line);
        b.shift_amount = self.shape.indent(self.line_number);
        self.output.push(b);
        self.line_number += 1;
    }
}
