use super::{Frame, Locator};
use crate::error::Error;
use crate::node::*;
use crate::params::Parameters;
use dimen::Scaled;

/// List maker for outer and internal vertical mode.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalListMaker {
    pub(crate) frame: Frame,
    list: NodeList,
    prev_depth: Scaled,
    inner: bool,
}

impl VerticalListMaker {
    /// Value of the previous depth that suppresses interline glue before the next box.
    ///
    /// Described in TeX.2021.212.
    pub const IGNORE_DEPTH: Scaled = Scaled(-65536000);

    /// The list maker for the main vertical list.
    pub fn outer() -> Self {
        Self::new(false, Locator::default())
    }

    /// A list maker for the contents of a `\vbox`.
    pub fn inner(entered_at: Locator) -> Self {
        Self::new(true, entered_at)
    }

    fn new(inner: bool, entered_at: Locator) -> Self {
        Self {
            frame: Frame::new(entered_at),
            list: NodeList::vertical(),
            prev_depth: Self::IGNORE_DEPTH,
            inner,
        }
    }

    pub fn is_inner(&self) -> bool {
        self.inner
    }

    pub fn list(&self) -> &NodeList {
        &self.list
    }

    pub fn prev_depth(&self) -> Scaled {
        self.prev_depth
    }

    pub fn set_prev_depth(&mut self, prev_depth: Scaled) {
        self.prev_depth = prev_depth;
    }

    /// Adds a node to the list.
    ///
    /// Boxes get interline glue as in [Self::append_box].
    /// Rules suppress the interline glue before the next box (TeX.2021.1056).
    pub fn add_node(&mut self, node: Node, params: &Parameters) {
        match node {
            Node::HList(_) | Node::VList(_) => self.append_box(node, params),
            Node::Rule(_) => {
                self.list.push(node);
                self.prev_depth = Self::IGNORE_DEPTH;
            }
            _ => self.list.push(node),
        }
    }

    /// Appends a box, preceded by interline glue.
    ///
    /// The glue is `\baselineskip` reduced so that the baselines of this box and
    /// the previous box are `\baselineskip` apart, or `\lineskip` if that
    /// would bring the boxes closer than `\lineskiplimit`.
    ///
    /// Described in TeX.2021.679.
    pub fn append_box(&mut self, node: Node, params: &Parameters) {
        if self.prev_depth > Self::IGNORE_DEPTH {
            let d = params.baseline_skip.width - self.prev_depth - node.height();
            let glue = if d < params.line_skip_limit {
                Glue::from_param(GlueParam::LineSkip, params.line_skip)
            } else {
                Glue::from_param(
                    GlueParam::BaselineSkip,
                    dimen::Glue {
                        width: d,
                        ..params.baseline_skip
                    },
                )
            };
            self.list.push(glue);
        }
        self.prev_depth = node.depth();
        self.list.push(node);
    }

    /// Appends material that already contains its interline glue,
    /// like the lines of a broken paragraph.
    pub fn splice(&mut self, material: NodeList) {
        for node in material {
            if matches!(node, Node::HList(_) | Node::VList(_)) {
                self.prev_depth = node.depth();
            }
            self.list.push(node);
        }
    }

    pub fn remove_last(&mut self) -> Result<Node, Error> {
        self.list.remove_last()
    }

    /// Removes the material built so far, leaving the auxiliary state intact.
    pub fn take_list(&mut self) -> NodeList {
        self.list.take()
    }

    pub fn finish(self) -> NodeList {
        self.list
    }
}
