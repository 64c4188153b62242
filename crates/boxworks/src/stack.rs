//! The list-maker stack.
//!
//! TeX calls this the semantic nest (TeX.2021.211-219).
//! The bottom of the stack is the outer vertical list maker, which is never removed.

use crate::error::{Error, Underflow};
use crate::listmaker::{ListMaker, Mode, VerticalListMaker};
use crate::node::NodeList;

/// Stack of list makers.
///
/// The stack is never empty: the outer vertical list maker is kept outside of
/// the vector of nested list makers so that this holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Manager {
    outer: ListMaker,
    nested: Vec<ListMaker>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Manager {
        Manager {
            outer: ListMaker::Vertical(VerticalListMaker::outer()),
            nested: vec![],
        }
    }

    /// Makes a new list maker active.
    ///
    /// Described in TeX.2021.216.
    pub fn push(&mut self, list_maker: ListMaker) {
        log::trace!(
            "entering {} at depth {}",
            list_maker.mode(),
            self.depth() + 1
        );
        self.nested.push(list_maker);
    }

    /// Removes the active list maker and returns it.
    ///
    /// Described in TeX.2021.217.
    pub fn pop(&mut self) -> Result<ListMaker, Error> {
        match self.nested.pop() {
            None => Err(Error::StackUnderflow(Underflow::ListMakerStack)),
            Some(list_maker) => {
                log::trace!("leaving {} at depth {}", list_maker.mode(), self.depth() + 1);
                Ok(list_maker)
            }
        }
    }

    /// Removes the active list maker and finishes it.
    ///
    /// The list maker is off the stack before it is finished,
    /// so the stack is consistent even if finishing fails.
    pub fn complete(&mut self, metrics: &dyn font::Metrics) -> Result<NodeList, Error> {
        self.pop()?.finish(metrics)
    }

    pub fn top(&self) -> &ListMaker {
        self.nested.last().unwrap_or(&self.outer)
    }

    pub fn top_mut(&mut self) -> &mut ListMaker {
        self.nested.last_mut().unwrap_or(&mut self.outer)
    }

    /// The outer vertical list maker.
    pub fn outer(&self) -> &ListMaker {
        &self.outer
    }

    pub fn outer_mut(&mut self) -> &mut ListMaker {
        &mut self.outer
    }

    /// Number of list makers on the stack, counting the outer one.
    pub fn depth(&self) -> usize {
        self.nested.len() + 1
    }

    pub fn mode(&self) -> Mode {
        self.top().mode()
    }

    /// Iterates over the list makers from the active one to the outer one.
    pub fn iter(&self) -> impl Iterator<Item = &ListMaker> {
        self.nested
            .iter()
            .rev()
            .chain(std::iter::once(&self.outer))
    }
}
