//! Data structures for boxes
//!
//! This module implements TeX.2021 part 10, data structures
//! for boxes and their friends, plus the node lists that hold them.
//!
//! Every node has a width, height and depth.
//! Control nodes like penalties and marks have zero dimensions.
//! The dimensions of a [NodeList] are derived from its nodes
//! using the composition rule of its [Orientation].

use crate::error::{Error, Underflow};
use dimen::Scaled;

/// A node in a horizontal or vertical list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Char(Char),
    HList(HList),
    VList(VList),
    Rule(Rule),
    Mark(Mark),
    Insertion(Insertion),
    Adjust(Adjust),
    Ligature(Ligature),
    Discretionary(Discretionary),
    Whatsit(Whatsit),
    Math(Math),
    Glue(Glue),
    Kern(Kern),
    Penalty(Penalty),
}

/// A character in a specific font.
///
/// The dimensions of the glyph are resolved from the font when the node is created.
/// Glyphs the font doesn't know about have zero dimensions.
///
/// Described in TeX.2021.134.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Char {
    pub char: char,
    pub font: u32,
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
}

impl Char {
    /// Creates a char node using the metrics of the font.
    pub fn new(char: char, font: u32, metrics: &dyn font::Metrics) -> Char {
        let glyph = metrics.glyph_box(font, char).unwrap_or_else(|| {
            log::warn!("missing character: there is no {char} in font {font}");
            Default::default()
        });
        Char {
            char,
            font,
            width: glyph.width,
            height: glyph.height,
            depth: glyph.depth,
        }
    }
}

/// A box made from a horizontal list.
///
/// The width, height and depth of the box are those of its list.
///
/// Described in TeX.2021.135.
#[derive(Debug, Clone, PartialEq)]
pub struct HList {
    /// How much this box should be lowered (if it appears in a horizontal list),
    /// or how much it should be moved to the right (if it appears in a vertical
    /// list).
    pub shift_amount: Scaled,
    pub list: NodeList,
}

impl HList {
    pub fn new(list: NodeList) -> Self {
        debug_assert_eq!(list.orientation(), Orientation::Horizontal);
        Self {
            shift_amount: Scaled::ZERO,
            list,
        }
    }

    /// Returns a hlist node corresponding to the TeX snippet `\hbox{}`.
    ///
    /// Described in TeX.2021.136.
    pub fn new_null_box() -> Self {
        Self::new(NodeList::horizontal())
    }

    pub fn width(&self) -> Scaled {
        self.list.width()
    }

    pub fn height(&self) -> Scaled {
        self.list.height()
    }

    pub fn depth(&self) -> Scaled {
        self.list.depth()
    }
}

impl Default for HList {
    fn default() -> Self {
        Self::new_null_box()
    }
}

/// A box made from a vertical list.
///
/// This is the same as [HList], except the list inside is vertical.
///
/// Described in TeX.2021.137.
#[derive(Debug, Clone, PartialEq)]
pub struct VList {
    pub shift_amount: Scaled,
    pub list: NodeList,
}

impl VList {
    pub fn new(list: NodeList) -> Self {
        debug_assert_eq!(list.orientation(), Orientation::Vertical);
        Self {
            shift_amount: Scaled::ZERO,
            list,
        }
    }

    pub fn width(&self) -> Scaled {
        self.list.width()
    }

    pub fn height(&self) -> Scaled {
        self.list.height()
    }

    pub fn depth(&self) -> Scaled {
        self.list.depth()
    }
}

impl Default for VList {
    fn default() -> Self {
        Self::new(NodeList::vertical())
    }
}

/// A rule stands for a solid black rectangle.
///
/// It has width, depth and height fields.
/// However if any of these dimensions is -2^30, the actual value will be
/// determined by running rule up to the boundary of the innermost, enclosing box.
/// This is called a "running dimension".
/// Running dimensions count as zero when the enclosing list is measured.
///
/// Described in TeX.2021.138.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub height: Scaled,
    pub width: Scaled,
    pub depth: Scaled,
}

impl Rule {
    pub const RUNNING: Scaled = Scaled(-(1 << 30));

    /// Creates a new rule.
    ///
    /// All of the dimensions are running.
    ///
    /// Described in TeX.2021.139.
    pub fn new() -> Self {
        Self {
            height: Self::RUNNING,
            width: Self::RUNNING,
            depth: Self::RUNNING,
        }
    }

    fn resolved(s: Scaled) -> Scaled {
        if s == Self::RUNNING {
            Scaled::ZERO
        } else {
            s
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical material to be inserted.
///
/// This node is related to the TeX primitive `\insert`.
///
/// Described in TeX.2021.140.
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub box_number: u8,
    /// Slightly misnamed: it actually holds the natural height plus depth
    /// of the vertical list being inserted.
    pub height: Scaled,
    /// Used in case this insertion is split.
    pub split_max_depth: Scaled,
    pub split_top_skip: dimen::Glue,
    /// Penalty to be used if this insertion floats to a subsequent
    /// page after a split insertion of the same class.
    pub float_penalty: i32,
    pub list: NodeList,
}

/// Contents of a user's `\mark` text.
///
/// Described in TeX.2021.141.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub class: u32,
    pub payload: String,
}

/// Specifies material that will be moved out into the surrounding vertical list.
///
/// E.g., used to implement the TeX primitive `\vadjust`.
///
/// Described in TeX.2021.142.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjust {
    pub list: NodeList,
}

/// A ligature.
///
/// Described in TeX.2021.143.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ligature {
    pub char: char,
    pub font: u32,
    /// The original characters that were replaced by the ligature.
    /// This is used if the engine needs to break apart the ligature
    /// in order to perform hyphenation.
    pub original_chars: Vec<char>,
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
}

/// A discretionary break.
///
/// Unlike Knuth's node, which skips a number of subsequent nodes if the break
/// occurs, the material used when no break occurs lives inside the node.
/// The dimensions of the node are those of this no-break material.
///
/// Described in TeX.2021.145.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretionary {
    /// Material to insert before this node, if the break occurs here.
    pub pre_break: NodeList,
    /// Material to insert after this node, if the break occurs here.
    pub post_break: NodeList,
    /// Material to use if no break occurs here.
    pub no_break: NodeList,
}

impl Discretionary {
    pub fn new() -> Self {
        Self {
            pre_break: NodeList::horizontal(),
            post_break: NodeList::horizontal(),
            no_break: NodeList::horizontal(),
        }
    }
}

impl Default for Discretionary {
    fn default() -> Self {
        Self::new()
    }
}

/// A whatsit node.
///
/// This is used to facilitate extensions to TeX, like `\write` and `\special`.
/// The engine never looks inside the payload; it is passed through to the backend.
///
/// Described in TeX.2021.146.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whatsit {
    pub name: String,
    pub payload: String,
}

/// A marker placed before or after math mode.
///
/// Described in TeX.2021.147.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Math {
    Before,
    After,
}

/// A piece of glue.
///
/// Described in TeX.2021.149.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glue {
    pub kind: GlueKind,
    pub value: dimen::Glue,
}

impl Glue {
    pub fn new(value: dimen::Glue) -> Glue {
        Glue {
            kind: GlueKind::Normal,
            value,
        }
    }

    pub fn from_param(param: GlueParam, value: dimen::Glue) -> Glue {
        Glue {
            kind: GlueKind::Parameter(param),
            value,
        }
    }
}

/// The kind of a glue node.
///
/// Described in TeX.2021.149.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueKind {
    Normal,
    /// Glue that came from a parameter.
    Parameter(GlueParam),
    ConditionalMath,
    Math,
}

/// The glue parameters that the engine inserts glue from.
///
/// Described in TeX.2021.224.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueParam {
    LineSkip,
    BaselineSkip,
    InterlineSkip,
    LeadingSkip,
    TrailingSkip,
    AboveDisplaySkip,
    BelowDisplaySkip,
    SpaceSkip,
    XSpaceSkip,
}

impl GlueParam {
    /// Name of the parameter, as shown in box displays.
    ///
    /// Described in TeX.2021.225.
    pub fn name(&self) -> &'static str {
        use GlueParam::*;
        match self {
            LineSkip => "lineskip",
            BaselineSkip => "baselineskip",
            InterlineSkip => "interlineskip",
            LeadingSkip => "leadingskip",
            TrailingSkip => "trailingskip",
            AboveDisplaySkip => "abovedisplayskip",
            BelowDisplaySkip => "belowdisplayskip",
            SpaceSkip => "spaceskip",
            XSpaceSkip => "xspaceskip",
        }
    }
}

/// A kern.
///
/// Described in TeX.2021.155.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kern {
    pub kind: KernKind,
    pub width: Scaled,
}

impl Kern {
    pub fn new(width: Scaled) -> Kern {
        Kern {
            kind: KernKind::Normal,
            width,
        }
    }

    pub fn explicit(width: Scaled) -> Kern {
        Kern {
            kind: KernKind::Explicit,
            width,
        }
    }
}

/// The kind of a kern node.
///
/// Described in TeX.2021.155.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernKind {
    /// Inserted from font information or math mode calculations.
    Normal,
    /// Inserted using e.g. TeX's `\kern` primitive.
    Explicit,
    /// Inserted from non-math accents.
    Accent,
    /// Inserted from e.g. `\mkern` specifications in math formulas.
    Math,
}

/// A penalty.
///
/// Described in TeX.2021.157.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub value: i32,
}

impl Penalty {
    /// Any penalty bigger than this is considered infinite and no
    /// break will be allowed for such high values.
    pub const INFINITE: i32 = 10000;

    /// Any penalty smaller than this will result in a forced break.
    pub const EJECT: i32 = -10000;
}

macro_rules! node_from {
    ( $( $variant: ident, )+ ) => {
        $(
            impl From<$variant> for Node {
                fn from(value: $variant) -> Self {
                    Node::$variant(value)
                }
            }
        )+
    };
}

node_from!(
    Char,
    HList,
    VList,
    Rule,
    Mark,
    Insertion,
    Adjust,
    Ligature,
    Discretionary,
    Whatsit,
    Math,
    Glue,
    Kern,
    Penalty,
);

impl Node {
    /// Width of the node.
    ///
    /// For glue this is the natural width and for kerns the kern amount.
    /// Running rule dimensions are zero.
    pub fn width(&self) -> Scaled {
        use Node::*;
        match self {
            Char(c) => c.width,
            HList(b) => b.width(),
            VList(b) => b.width(),
            Rule(r) => self::Rule::resolved(r.width),
            Ligature(l) => l.width,
            Discretionary(d) => d.no_break.width(),
            Glue(g) => g.value.natural(),
            Kern(k) => k.width,
            Mark(_) | Insertion(_) | Adjust(_) | Whatsit(_) | Math(_) | Penalty(_) => Scaled::ZERO,
        }
    }

    pub fn height(&self) -> Scaled {
        use Node::*;
        match self {
            Char(c) => c.height,
            HList(b) => b.height(),
            VList(b) => b.height(),
            Rule(r) => self::Rule::resolved(r.height),
            Ligature(l) => l.height,
            Discretionary(d) => d.no_break.height(),
            Mark(_) | Insertion(_) | Adjust(_) | Whatsit(_) | Math(_) | Glue(_) | Kern(_)
            | Penalty(_) => Scaled::ZERO,
        }
    }

    pub fn depth(&self) -> Scaled {
        use Node::*;
        match self {
            Char(c) => c.depth,
            HList(b) => b.depth(),
            VList(b) => b.depth(),
            Rule(r) => self::Rule::resolved(r.depth),
            Ligature(l) => l.depth,
            Discretionary(d) => d.no_break.depth(),
            Mark(_) | Insertion(_) | Adjust(_) | Whatsit(_) | Math(_) | Glue(_) | Kern(_)
            | Penalty(_) => Scaled::ZERO,
        }
    }

    /// Returns the shift amount of box nodes and zero for every other node.
    pub fn shift_amount(&self) -> Scaled {
        match self {
            Node::HList(b) => b.shift_amount,
            Node::VList(b) => b.shift_amount,
            _ => Scaled::ZERO,
        }
    }

    /// Code of the node type, as reported by `\lastnodetype`.
    ///
    /// Empty lists report [NodeList::EMPTY_TYPE_CODE].
    pub fn type_code(&self) -> i32 {
        use Node::*;
        match self {
            Char(_) => 0,
            HList(_) => 1,
            VList(_) => 2,
            Rule(_) => 3,
            Insertion(_) => 4,
            Mark(_) => 5,
            Adjust(_) => 6,
            Ligature(_) => 7,
            Discretionary(_) => 8,
            Whatsit(_) => 9,
            Math(self::Math::Before) => 10,
            Glue(_) => 11,
            Kern(_) => 12,
            Penalty(_) => 13,
            Math(self::Math::After) => 15,
        }
    }

    /// Whether a glue node that comes after this node may be broken.
    ///
    /// For char nodes, this function is essentially undefined in Knuth's
    /// TeX. More specifically, the value depends on the exact character code.
    /// In TeX this function is never called for char nodes which is why this
    /// is not a problem. Here, we return `true` for char nodes.
    ///
    /// This function is defined in TeX.2021.148.
    pub fn precedes_break(&self) -> bool {
        use Node::*;
        matches!(
            self,
            Char(_)
                | HList(_)
                | VList(_)
                | Rule(_)
                | Mark(_)
                | Insertion(_)
                | Adjust(_)
                | Ligature(_)
                | Discretionary(_)
                | Whatsit(_)
        )
    }

    /// Whether this node is discarded after a break.
    ///
    /// This function is defined in TeX.2021.148.
    pub fn is_discardable(&self) -> bool {
        !self.precedes_break()
    }
}

/// The direction in which the nodes of a list are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Width, height and depth of a list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
}

impl Dimensions {
    /// Adds a node to the end of a list with these dimensions.
    ///
    /// Horizontal lists add widths and take the maximum height and depth.
    /// Box shifts are applied as in TeX.2021.653.
    ///
    /// Vertical lists add heights plus depths and take the maximum width;
    /// their depth is always zero.
    /// Box shifts are applied as in TeX.2021.669.
    fn compose(mut self, orientation: Orientation, node: &Node) -> Dimensions {
        let shift = node.shift_amount();
        match orientation {
            Orientation::Horizontal => {
                self.width += node.width();
                self.height = self.height.max(node.height() - shift);
                self.depth = self.depth.max(node.depth() + shift);
            }
            Orientation::Vertical => {
                let extent = match node {
                    Node::Glue(_) | Node::Kern(_) => node.width(),
                    _ => node.height() + node.depth(),
                };
                let width = match node {
                    Node::Glue(_) | Node::Kern(_) => Scaled::ZERO,
                    _ => node.width() + shift,
                };
                self.height += extent;
                self.width = self.width.max(width);
            }
        }
        self
    }
}

/// An ordered sequence of nodes with a fixed orientation.
///
/// The dimensions of the list are maintained incrementally as nodes are added.
/// They always agree with [NodeList::derive_dimensions].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeList {
    orientation: Orientation,
    nodes: Vec<Node>,
    dimensions: Dimensions,
}

impl NodeList {
    /// Type code reported by `\lastnodetype` for an empty list.
    pub const EMPTY_TYPE_CODE: i32 = -1;

    pub fn new(orientation: Orientation) -> NodeList {
        NodeList {
            orientation,
            nodes: vec![],
            dimensions: Default::default(),
        }
    }

    pub fn horizontal() -> NodeList {
        NodeList::new(Orientation::Horizontal)
    }

    pub fn vertical() -> NodeList {
        NodeList::new(Orientation::Vertical)
    }

    /// Builds a list from existing nodes.
    pub fn from_nodes(orientation: Orientation, nodes: Vec<Node>) -> NodeList {
        let dimensions = NodeList::derive_dimensions(orientation, &nodes);
        NodeList {
            orientation,
            nodes,
            dimensions,
        }
    }

    /// Computes the dimensions of a list of nodes in a single pass.
    pub fn derive_dimensions(orientation: Orientation, nodes: &[Node]) -> Dimensions {
        nodes
            .iter()
            .fold(Dimensions::default(), |d, node| d.compose(orientation, node))
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Appends a node to the end of the list.
    pub fn push<N: Into<Node>>(&mut self, node: N) {
        let node = node.into();
        self.dimensions = self.dimensions.compose(self.orientation, &node);
        self.nodes.push(node);
    }

    /// Removes the last node of the list.
    pub fn remove_last(&mut self) -> Result<Node, Error> {
        let node = self
            .nodes
            .pop()
            .ok_or(Error::StackUnderflow(Underflow::NodeList))?;
        self.dimensions = NodeList::derive_dimensions(self.orientation, &self.nodes);
        Ok(node)
    }

    pub fn last(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> Scaled {
        self.dimensions.width
    }

    pub fn height(&self) -> Scaled {
        self.dimensions.height
    }

    pub fn depth(&self) -> Scaled {
        self.dimensions.depth
    }

    /// Type code of the last node, or [NodeList::EMPTY_TYPE_CODE].
    pub fn last_type_code(&self) -> i32 {
        self.last()
            .map(Node::type_code)
            .unwrap_or(NodeList::EMPTY_TYPE_CODE)
    }

    /// Removes all nodes, returning them.
    pub fn take(&mut self) -> NodeList {
        let empty = NodeList::new(self.orientation);
        std::mem::replace(self, empty)
    }
}

impl Extend<Node> for NodeList {
    fn extend<T: IntoIterator<Item = Node>>(&mut self, iter: T) {
        for node in iter {
            self.push(node);
        }
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;
    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for NodeList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;
    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn char(c: char, width: i32) -> Node {
        Char {
            char: c,
            font: 0,
            width: Scaled::ONE * width,
            height: Scaled::ONE * 7,
            depth: Scaled::ONE,
        }
        .into()
    }

    pub fn glue(width: i32) -> Node {
        Glue::new(dimen::Glue::fixed(Scaled::ONE * width)).into()
    }

    fn rule(width: i32, height: i32, depth: i32) -> Node {
        Rule {
            width: Scaled::ONE * width,
            height: Scaled::ONE * height,
            depth: Scaled::ONE * depth,
        }
        .into()
    }

    #[test]
    fn n_chars_have_n_times_the_width() {
        for n in 0..20 {
            let mut list = NodeList::horizontal();
            for _ in 0..n {
                list.push(char('a', 10));
            }
            assert_eq!(list.width(), Scaled::ONE * 10 * n);
        }
    }

    #[test]
    fn horizontal_composition() {
        let list = NodeList::from_nodes(
            Orientation::Horizontal,
            vec![
                char('a', 10),
                glue(5),
                rule(3, 12, 2),
                Kern::new(-Scaled::ONE).into(),
                Penalty { value: 100 }.into(),
            ],
        );
        assert_eq!(
            list.dimensions(),
            Dimensions {
                width: Scaled::ONE * 17,
                height: Scaled::ONE * 12,
                depth: Scaled::ONE * 2,
            }
        );
    }

    #[test]
    fn vertical_composition() {
        let mut line = NodeList::horizontal();
        line.push(char('a', 10));
        let mut list = NodeList::vertical();
        list.push(glue(4));
        list.push(HList::new(line.clone()));
        list.push(Kern::new(Scaled::ONE * 2));
        let mut shifted = HList::new(line);
        shifted.shift_amount = Scaled::ONE * 5;
        list.push(shifted);
        assert_eq!(
            list.dimensions(),
            Dimensions {
                width: Scaled::ONE * 15,
                height: Scaled::ONE * (4 + 8 + 2 + 8),
                depth: Scaled::ZERO,
            }
        );
    }

    #[test]
    fn running_rule_counts_as_zero() {
        let mut list = NodeList::horizontal();
        list.push(Rule::new());
        assert_eq!(list.dimensions(), Dimensions::default());
    }

    #[test]
    fn negative_heights_are_floored() {
        let mut list = NodeList::horizontal();
        list.push(rule(1, -4, -3));
        assert_eq!(list.height(), Scaled::ZERO);
        assert_eq!(list.depth(), Scaled::ZERO);
    }

    #[test]
    fn remove_last_recomputes() {
        let mut list = NodeList::horizontal();
        list.push(char('a', 10));
        list.push(rule(1, 20, 0));
        assert_eq!(list.height(), Scaled::ONE * 20);
        let removed = list.remove_last().unwrap();
        assert_eq!(removed.type_code(), 3);
        assert_eq!(list.height(), Scaled::ONE * 7);
        assert_eq!(
            list.dimensions(),
            NodeList::derive_dimensions(list.orientation(), list.nodes())
        );
    }

    #[test]
    fn remove_last_on_empty_list() {
        let mut list = NodeList::vertical();
        assert_eq!(
            list.remove_last(),
            Err(Error::StackUnderflow(Underflow::NodeList))
        );
    }

    #[test]
    fn missing_glyph_has_zero_dimensions() {
        let c = Char::new('x', 0, &font::NullFont);
        assert_eq!(Node::from(c).width(), Scaled::ZERO);
    }

    macro_rules! type_code_tests {
        ( $( ($name: ident, $node: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let node: Node = $node.into();
                    assert_eq!(node.type_code(), $want);
                }
            )+
        };
    }

    type_code_tests!(
        (type_code_char, char('a', 1), 0),
        (type_code_hlist, HList::new_null_box(), 1),
        (type_code_vlist, VList::default(), 2),
        (type_code_rule, Rule::new(), 3),
        (
            type_code_mark,
            Mark {
                class: 0,
                payload: "".into()
            },
            5
        ),
        (type_code_discretionary, Discretionary::new(), 8),
        (type_code_math_before, Math::Before, 10),
        (type_code_glue, glue(1), 11),
        (type_code_kern, Kern::new(Scaled::ONE), 12),
        (type_code_penalty, Penalty { value: 0 }, 13),
        (type_code_math_after, Math::After, 15),
    );

    #[test]
    fn empty_list_type_code() {
        assert_eq!(NodeList::horizontal().last_type_code(), -1);
    }
}
