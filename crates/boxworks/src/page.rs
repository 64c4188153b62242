//! Interface to the page builder.
//!
//! The typesetter hands finished material of the outer vertical list to a
//! [PageBuilder].
//! Breaking the material into pages is out of scope for this crate;
//! [PageCollector] simply keeps everything it is given.

use crate::node::{NodeList, VList};

/// Receiver of the material produced by the typesetter.
pub trait PageBuilder {
    /// Receives material that has reached the outer vertical list.
    fn contribute(&mut self, material: NodeList);

    /// Receives a box that was explicitly shipped out.
    fn ship_out(&mut self, page: VList);

    /// Called when the input ends.
    fn finish(&mut self) {}
}

/// A page builder that collects pages in memory.
///
/// Contributions accumulate in the current page.
/// The current page is closed by an explicit ship out, which first closes
/// the current page if it is non-empty, and when the input ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCollector {
    current: NodeList,
    pages: Vec<VList>,
}

impl Default for PageCollector {
    fn default() -> Self {
        Self {
            current: NodeList::vertical(),
            pages: vec![],
        }
    }
}

impl PageCollector {
    pub fn new() -> Self {
        Default::default()
    }

    /// Material contributed since the last page was closed.
    pub fn current(&self) -> &NodeList {
        &self.current
    }

    pub fn pages(&self) -> &[VList] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<VList> {
        self.pages
    }

    fn close_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let page = VList::new(self.current.take());
        log::info!(
            "page {} closed with height {}",
            self.pages.len() + 1,
            page.height()
        );
        self.pages.push(page);
    }
}

impl PageBuilder for PageCollector {
    fn contribute(&mut self, material: NodeList) {
        self.current.extend(material);
    }

    fn ship_out(&mut self, page: VList) {
        self.close_page();
        log::info!("page {} shipped out", self.pages.len() + 1);
        self.pages.push(page);
    }

    fn finish(&mut self) {
        self.close_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::tests::glue;

    fn material(n: usize) -> NodeList {
        let mut list = NodeList::vertical();
        for _ in 0..n {
            list.push(glue(1));
        }
        list
    }

    #[test]
    fn contributions_accumulate() {
        let mut p = PageCollector::new();
        p.contribute(material(2));
        p.contribute(material(1));
        assert_eq!(p.current().len(), 3);
        assert!(p.pages().is_empty());
        p.finish();
        assert_eq!(p.pages().len(), 1);
        assert_eq!(p.pages()[0].list.len(), 3);
    }

    #[test]
    fn ship_out_closes_current_page() {
        let mut p = PageCollector::new();
        p.contribute(material(2));
        p.ship_out(VList::new(material(5)));
        p.finish();
        let lengths: Vec<usize> = p.pages().iter().map(|page| page.list.len()).collect();
        assert_eq!(lengths, vec![2, 5]);
    }

    #[test]
    fn finish_without_material_adds_no_page() {
        let mut p = PageCollector::new();
        p.finish();
        assert!(p.into_pages().is_empty());
    }
}
