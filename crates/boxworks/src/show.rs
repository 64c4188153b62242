//! Displaying boxes the way TeX does.
//!
//! The format follows TeX.2021.173-198: every node is printed on its own line,
//! prefixed by one `.` per level of box nesting.
//! Lists nested deeper than the depth limit are abbreviated to ` []`,
//! and lists with more nodes than the breadth limit end with `etc.`.

use crate::math::{Field, Noad};
use crate::node::*;
use dimen::Scaled;
use std::fmt::Write;

/// Limits applied when displaying boxes.
///
/// These correspond to TeX's `\showboxdepth` and `\showboxbreadth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub depth: usize,
    pub breadth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            depth: usize::MAX,
            breadth: usize::MAX,
        }
    }
}

/// Returns a display of a single node.
pub fn show_box(node: &Node, limits: Limits) -> String {
    let mut s = String::new();
    let mut printer = Printer::new(&mut s, limits);
    // Writing to a string can't fail.
    _ = printer.show_list(std::slice::from_ref(node));
    s
}

/// Returns a display of every node in a list.
pub fn show_list(list: &NodeList, limits: Limits) -> String {
    let mut s = String::new();
    let mut printer = Printer::new(&mut s, limits);
    _ = printer.show_list(list.nodes());
    s
}

/// Writes TeX-style displays to a buffer.
pub(crate) struct Printer<'w, W> {
    w: &'w mut W,
    prefix: String,
    limits: Limits,
    at_start: bool,
}

impl<'w, W: Write> Printer<'w, W> {
    pub(crate) fn new(w: &'w mut W, limits: Limits) -> Self {
        Printer {
            w,
            prefix: String::new(),
            // TeX.2021.236: a non-positive breadth means 5.
            limits: Limits {
                breadth: if limits.breadth == 0 {
                    5
                } else {
                    limits.breadth
                },
                ..limits
            },
            at_start: true,
        }
    }

    /// Starts a new line, unless nothing has been written yet.
    ///
    /// Described in TeX.2021.62.
    pub(crate) fn print_nl(&mut self) -> std::fmt::Result {
        if !self.at_start {
            self.w.write_char('\n')?;
        }
        self.at_start = false;
        Ok(())
    }

    pub(crate) fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.at_start = false;
        self.w.write_str(s)
    }

    /// Displays a list.
    ///
    /// Described in TeX.2021.182.
    pub(crate) fn show_list(&mut self, nodes: &[Node]) -> std::fmt::Result {
        if self.prefix.len() > self.limits.depth {
            if !nodes.is_empty() {
                self.write_str(" []")?;
            }
            return Ok(());
        }
        for (n, node) in nodes.iter().enumerate() {
            self.print_nl()?;
            self.w.write_str(&self.prefix)?;
            if n >= self.limits.breadth {
                return self.write_str("etc.");
            }
            self.show_node(node)?;
        }
        Ok(())
    }

    fn nested(&mut self, c: char, nodes: &[Node]) -> std::fmt::Result {
        self.prefix.push(c);
        let result = self.show_list(nodes);
        self.prefix.pop();
        result
    }

    /// Displays a math list.
    ///
    /// Described in TeX.2021.690-696.
    pub(crate) fn show_noads(&mut self, noads: &[Noad]) -> std::fmt::Result {
        if self.prefix.len() > self.limits.depth {
            if !noads.is_empty() {
                self.write_str(" []")?;
            }
            return Ok(());
        }
        for (n, noad) in noads.iter().enumerate() {
            self.print_nl()?;
            self.w.write_str(&self.prefix)?;
            if n >= self.limits.breadth {
                return self.write_str("etc.");
            }
            match noad {
                Noad::Ord(atom) => {
                    self.write_str("\\mathord")?;
                    self.show_field('.', &atom.nucleus)?;
                    self.show_field('^', &atom.superscript)?;
                    self.show_field('_', &atom.subscript)?;
                }
                Noad::Glue(g) => self.show_node(&Glue::new(*g).into())?,
                Noad::Kern(k) => self.show_node(&Kern::explicit(*k).into())?,
                Noad::Penalty(value) => self.show_node(&Penalty { value: *value }.into())?,
            }
        }
        Ok(())
    }

    // TeX.2021.692
    fn show_field(&mut self, c: char, field: &Field) -> std::fmt::Result {
        if self.prefix.len() >= self.limits.depth {
            if !field.is_empty() {
                self.write_str(" []")?;
            }
            return Ok(());
        }
        self.prefix.push(c);
        let result = match field {
            Field::Empty => Ok(()),
            Field::Char { char, font } => {
                self.print_nl()?;
                self.w.write_str(&self.prefix)?;
                write!(self.w, "\\fam{font} {char}")
            }
            Field::List(noads) if noads.is_empty() => {
                self.print_nl()?;
                self.w.write_str(&self.prefix)?;
                self.write_str("{}")
            }
            Field::List(noads) => self.show_noads(noads),
        };
        self.prefix.pop();
        result
    }

    fn show_node(&mut self, node: &Node) -> std::fmt::Result {
        let w = &mut *self.w;
        match node {
            // TeX.2021.176
            Node::Char(c) => write!(w, "\\font{} {}", c.font, c.char),
            // TeX.2021.184
            Node::HList(b) => {
                write_box(w, "hbox", node, b.shift_amount)?;
                self.nested('.', b.list.nodes())
            }
            Node::VList(b) => {
                write_box(w, "vbox", node, b.shift_amount)?;
                self.nested('.', b.list.nodes())
            }
            // TeX.2021.187
            Node::Rule(r) => {
                write!(w, "\\rule(")?;
                rule_dimen(w, r.height)?;
                write!(w, "+")?;
                rule_dimen(w, r.depth)?;
                write!(w, ")x")?;
                rule_dimen(w, r.width)
            }
            // TeX.2021.188
            Node::Insertion(ins) => {
                write!(
                    w,
                    "\\insert{}, natural size {}; split({},{}); float cost {}",
                    ins.box_number,
                    ins.height.no_units(),
                    SpecNoUnits(ins.split_top_skip),
                    ins.split_max_depth.no_units(),
                    ins.float_penalty
                )?;
                self.nested('.', ins.list.nodes())
            }
            // TeX.2021.1356
            Node::Whatsit(wh) => write!(w, "\\{}{{{}}}", wh.name, wh.payload),
            // TeX.2021.189
            Node::Glue(g) => {
                write!(w, "\\glue")?;
                match g.kind {
                    GlueKind::Normal => write!(w, " {}", SpecNoUnits(g.value)),
                    GlueKind::Parameter(p) => {
                        write!(w, "(\\{}) {}", p.name(), SpecNoUnits(g.value))
                    }
                    GlueKind::ConditionalMath => write!(w, "(\\nonscript)"),
                    GlueKind::Math => write!(w, "(\\mskip) {}", MuSpec(g.value)),
                }
            }
            // TeX.2021.191
            Node::Kern(k) => match k.kind {
                KernKind::Normal => write!(w, "\\kern{}", k.width.no_units()),
                KernKind::Explicit => write!(w, "\\kern {}", k.width.no_units()),
                KernKind::Accent => write!(w, "\\kern {} (for accent)", k.width.no_units()),
                KernKind::Math => write!(w, "\\mkern{}mu", k.width.no_units()),
            },
            // TeX.2021.192
            Node::Math(Math::Before) => write!(w, "\\mathon"),
            Node::Math(Math::After) => write!(w, "\\mathoff"),
            // TeX.2021.193
            Node::Ligature(l) => {
                write!(w, "\\font{} {} (ligature ", l.font, l.char)?;
                for c in &l.original_chars {
                    w.write_char(*c)?;
                }
                write!(w, ")")
            }
            // TeX.2021.194
            Node::Penalty(p) => write!(w, "\\penalty {}", p.value),
            // TeX.2021.195
            Node::Discretionary(d) => {
                write!(w, "\\discretionary")?;
                self.nested('.', d.pre_break.nodes())?;
                self.nested('|', d.post_break.nodes())?;
                self.nested(':', d.no_break.nodes())
            }
            // TeX.2021.196
            Node::Mark(m) => {
                if m.class == 0 {
                    write!(w, "\\mark{{{}}}", m.payload)
                } else {
                    write!(w, "\\marks{}{{{}}}", m.class, m.payload)
                }
            }
            // TeX.2021.197
            Node::Adjust(a) => {
                write!(w, "\\vadjust")?;
                self.nested('.', a.list.nodes())
            }
        }
    }
}

fn write_box<W: Write>(w: &mut W, name: &str, node: &Node, shift: Scaled) -> std::fmt::Result {
    write!(
        w,
        "\\{name}({}+{})x{}",
        node.height().no_units(),
        node.depth().no_units(),
        node.width().no_units()
    )?;
    if shift != Scaled::ZERO {
        write!(w, ", shifted {}", shift.no_units())?;
    }
    Ok(())
}

// TeX.2021.176
fn rule_dimen<W: Write>(w: &mut W, d: Scaled) -> std::fmt::Result {
    if d == Rule::RUNNING {
        w.write_char('*')
    } else {
        write!(w, "{}", d.no_units())
    }
}

struct SpecNoUnits(dimen::Glue);

impl std::fmt::Display for SpecNoUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.display_spec(f, "")
    }
}

struct MuSpec(dimen::Glue);

impl std::fmt::Display for MuSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.display_spec(f, "mu")
    }
}
