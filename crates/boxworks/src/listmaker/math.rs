use super::{Frame, Locator};
use crate::error::{Error, Script};
use crate::math::{self, Atom, Field, Noad};
use crate::node::NodeList;

/// List maker for inline and display math mode.
///
/// Groups opened inside the formula become sub-formulas.
/// The enclosing lists are kept on a stack while a group is open,
/// together with the script the group is the argument of, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MathListMaker {
    pub(crate) frame: Frame,
    noads: Vec<Noad>,
    open: Vec<(Vec<Noad>, Option<Script>)>,
    pending: Option<Script>,
}

impl MathListMaker {
    pub fn new(entered_at: Locator) -> Self {
        Self {
            frame: Frame::new(entered_at),
            noads: vec![],
            open: vec![],
            pending: None,
        }
    }

    /// The noads of the innermost open group.
    pub fn noads(&self) -> &[Noad] {
        &self.noads
    }

    /// Number of groups opened inside the formula and not yet closed.
    pub fn open_groups(&self) -> usize {
        self.open.len()
    }

    /// Adds a letter.
    ///
    /// If a `^` or `_` is pending the letter becomes its script.
    /// Otherwise the letter is the nucleus of a new ordinary atom.
    pub fn add_letter(&mut self, c: char, font: u32) {
        self.attach(Field::Char { char: c, font });
    }

    /// Adds glue, a kern or a penalty.
    pub fn add_noad(&mut self, noad: Noad) {
        if let Some(script) = self.pending.take() {
            log::warn!("missing {script} argument; the {script} is left empty");
        }
        self.noads.push(noad);
    }

    /// Handles a `^` or `_`.
    ///
    /// The script attaches to the previous atom, or to a new empty atom if
    /// the previous item is not an atom.
    ///
    /// Described in TeX.2021.1176-1177.
    pub fn script(&mut self, script: Script) -> Result<(), Error> {
        if self.pending.is_some() {
            return Err(Error::DoubleScript(script));
        }
        let taken = match self.noads.last() {
            Some(Noad::Ord(atom)) => !Self::field(atom, script).is_empty(),
            _ => false,
        };
        if taken {
            return Err(Error::DoubleScript(script));
        }
        if !matches!(self.noads.last(), Some(Noad::Ord(_))) {
            self.noads.push(Noad::Ord(Atom::default()));
        }
        self.pending = Some(script);
        Ok(())
    }

    fn field(atom: &Atom, script: Script) -> &Field {
        match script {
            Script::Subscript => &atom.subscript,
            Script::Superscript => &atom.superscript,
        }
    }

    fn attach(&mut self, field: Field) {
        let pending = self.pending.take();
        if let (Some(script), Some(Noad::Ord(atom))) = (pending, self.noads.last_mut()) {
            match script {
                Script::Subscript => atom.subscript = field,
                Script::Superscript => atom.superscript = field,
            }
            return;
        }
        self.noads.push(Noad::Ord(Atom::new(field)));
    }

    pub fn left_brace(&mut self) {
        let outer = std::mem::take(&mut self.noads);
        self.open.push((outer, self.pending.take()));
    }

    pub fn right_brace(&mut self) -> Result<(), Error> {
        let Some((outer, pending)) = self.open.pop() else {
            return Err(Error::ExtraRightBrace);
        };
        if let Some(script) = self.pending.take() {
            log::warn!("missing {script} argument; the {script} is left empty");
        }
        let inner = std::mem::replace(&mut self.noads, outer);
        self.pending = pending;
        self.attach(Field::List(inner));
        Ok(())
    }

    /// Converts the formula into a horizontal list.
    ///
    /// Groups that are still open are closed first.
    /// A `^` or `_` still waiting for its argument leaves the script empty.
    pub fn finish(mut self, metrics: &dyn font::Metrics) -> Result<NodeList, Error> {
        while !self.open.is_empty() {
            self.right_brace()?;
        }
        if let Some(script) = self.pending.take() {
            log::warn!("missing {script} argument; the {script} is left empty");
        }
        math::convert(self.noads, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimen::Scaled;

    fn ord(c: char) -> Noad {
        Noad::Ord(Atom::new(Field::Char { char: c, font: 0 }))
    }

    fn m() -> MathListMaker {
        MathListMaker::new(Locator::default())
    }

    #[test]
    fn letters_become_ordinary_atoms() {
        let mut m = m();
        m.add_letter('x', 0);
        m.add_noad(Noad::Kern(Scaled::ONE));
        m.add_letter('y', 0);
        assert_eq!(m.noads(), &[ord('x'), Noad::Kern(Scaled::ONE), ord('y')]);
    }

    #[test]
    fn superscript_attaches_to_previous_atom() {
        let mut m = m();
        m.add_letter('x', 0);
        m.script(Script::Superscript).unwrap();
        m.add_letter('2', 0);
        assert_eq!(
            m.noads(),
            &[Noad::Ord(Atom {
                superscript: Field::Char { char: '2', font: 0 },
                ..Atom::new(Field::Char { char: 'x', font: 0 })
            })]
        );
    }

    #[test]
    fn script_without_nucleus_gets_empty_atom() {
        let mut m = m();
        m.script(Script::Subscript).unwrap();
        m.add_letter('i', 0);
        assert_eq!(
            m.noads(),
            &[Noad::Ord(Atom {
                subscript: Field::Char { char: 'i', font: 0 },
                ..Default::default()
            })]
        );
    }

    #[test]
    fn double_superscript() {
        let mut m = m();
        m.add_letter('x', 0);
        m.script(Script::Superscript).unwrap();
        m.add_letter('2', 0);
        assert_eq!(
            m.script(Script::Superscript),
            Err(Error::DoubleScript(Script::Superscript))
        );
        assert_eq!(m.script(Script::Subscript), Ok(()));
        assert_eq!(
            m.script(Script::Subscript),
            Err(Error::DoubleScript(Script::Subscript))
        );
    }

    #[test]
    fn groups_become_sub_formulas() {
        let mut m = m();
        m.left_brace();
        m.add_letter('a', 0);
        m.add_letter('b', 0);
        assert_eq!(m.open_groups(), 1);
        m.right_brace().unwrap();
        assert_eq!(
            m.noads(),
            &[Noad::Ord(Atom::new(Field::List(vec![ord('a'), ord('b')])))]
        );
    }

    #[test]
    fn group_as_script_argument() {
        let mut m = m();
        m.add_letter('x', 0);
        m.script(Script::Subscript).unwrap();
        m.left_brace();
        m.add_letter('i', 0);
        m.right_brace().unwrap();
        assert_eq!(
            m.noads(),
            &[Noad::Ord(Atom {
                subscript: Field::List(vec![ord('i')]),
                ..Atom::new(Field::Char { char: 'x', font: 0 })
            })]
        );
    }

    #[test]
    fn extra_right_brace() {
        let mut m = m();
        assert_eq!(m.right_brace(), Err(Error::ExtraRightBrace));
    }

    #[test]
    fn finish_closes_open_groups() {
        let mut m = m();
        m.add_letter('x', 0);
        m.left_brace();
        m.add_letter('y', 0);
        let list = m.finish(&font::NullFont).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn finish_with_script_missing_its_argument() {
        let mut sup = m();
        sup.add_letter('x', 0);
        sup.script(Script::Superscript).unwrap();
        let list = sup.finish(&font::NullFont).unwrap();
        assert_eq!(list.len(), 1);

        let mut sub = m();
        sub.script(Script::Subscript).unwrap();
        let list = sub.finish(&font::NullFont).unwrap();
        assert_eq!(list.len(), 0);
    }
}
