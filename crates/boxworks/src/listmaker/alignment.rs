use super::{Frame, HorizontalListMaker, Locator, Mode};
use crate::error::Error;
use crate::node::*;
use dimen::Scaled;

/// Template of one column of an alignment preamble.
///
/// The material before the `#` is inserted at the start of every cell in
/// the column and the material after it at the end, unless the cell
/// starts with `\omit`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnTemplate {
    pub pre: Vec<Node>,
    pub post: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    list: NodeList,
    column: usize,
    span: usize,
}

/// List maker for the body of an `\halign`.
///
/// Cells are built in restricted horizontal mode.
/// When the alignment finishes every column gets the width of its widest
/// cell and each row becomes an hbox.
///
/// This follows TeX.2021.768-812 without `\tabskip` glue or glue setting:
/// cells are padded to their column width with a kern.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentListMaker {
    pub(crate) frame: Frame,
    preamble: Vec<ColumnTemplate>,
    column: usize,
    span: usize,
    cell: HorizontalListMaker,
    // Whether the `pre` material of the current template part has been inserted.
    started: bool,
    omitted: bool,
    row: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl AlignmentListMaker {
    pub fn new(preamble: Vec<ColumnTemplate>, entered_at: Locator) -> Self {
        let preamble = if preamble.is_empty() {
            vec![ColumnTemplate::default()]
        } else {
            preamble
        };
        Self {
            frame: Frame::new(entered_at),
            preamble,
            column: 0,
            span: 1,
            cell: HorizontalListMaker::new(false, entered_at),
            started: false,
            omitted: false,
            row: vec![],
            rows: vec![],
        }
    }

    pub fn columns(&self) -> usize {
        self.preamble.len()
    }

    /// Zero-based index of the column the current cell starts in.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of rows finished so far.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self) -> &HorizontalListMaker {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut HorizontalListMaker {
        &mut self.cell
    }

    /// Returns the current cell for adding material,
    /// inserting the template's `pre` material first if this is the first material.
    pub fn content(&mut self) -> &mut HorizontalListMaker {
        self.start();
        &mut self.cell
    }

    fn template(&self) -> &ColumnTemplate {
        // The index is kept in range by tab and span.
        &self.preamble[self.column + self.span - 1]
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        if !self.omitted {
            for node in self.template().pre.clone() {
                self.cell.add_node(node);
            }
        }
    }

    fn end_template_part(&mut self) {
        self.start();
        if !self.omitted {
            for node in self.template().post.clone() {
                self.cell.add_node(node);
            }
        }
    }

    fn at_row_start(&self) -> bool {
        self.row.is_empty() && self.column == 0 && self.span == 1 && !self.started && !self.omitted
    }

    /// Handles `\omit`, which must come before any material of the cell.
    ///
    /// Described in TeX.2021.788.
    pub fn omit(&mut self) -> Result<(), Error> {
        if self.started {
            return Err(Error::mode("\\omit", Mode::Alignment));
        }
        self.omitted = true;
        Ok(())
    }

    /// Handles `&`: finishes the current cell and moves to the next column.
    ///
    /// Described in TeX.2021.791.
    pub fn tab(&mut self) -> Result<(), Error> {
        if self.column + self.span >= self.columns() {
            return Err(Error::ExtraAlignmentTab);
        }
        self.finish_cell();
        Ok(())
    }

    /// Handles `\span`: the current cell continues into the next column.
    ///
    /// Described in TeX.2021.789.
    pub fn span(&mut self) -> Result<(), Error> {
        if self.column + self.span >= self.columns() {
            return Err(Error::ExtraAlignmentTab);
        }
        self.end_template_part();
        self.span += 1;
        self.started = false;
        self.omitted = false;
        Ok(())
    }

    /// Handles `\cr`: finishes the current cell and the current row.
    pub fn cr(&mut self) {
        self.finish_cell();
        self.column = 0;
        self.rows.push(std::mem::take(&mut self.row));
    }

    /// Handles `\crcr`, which is a `\cr` unless the row has just ended.
    ///
    /// Described in TeX.2021.785.
    pub fn crcr(&mut self) {
        if !self.at_row_start() {
            self.cr();
        }
    }

    fn finish_cell(&mut self) {
        self.end_template_part();
        let cell = std::mem::replace(
            &mut self.cell,
            HorizontalListMaker::new(false, self.frame.entered_at),
        );
        self.row.push(Cell {
            list: cell.finish(),
            column: self.column,
            span: self.span,
        });
        self.column += self.span;
        self.span = 1;
        self.started = false;
        self.omitted = false;
    }

    /// Computes the column widths.
    ///
    /// A column is as wide as its widest cell.
    /// A spanned cell that is wider than its columns widens the last of them.
    fn widths(&self) -> Vec<Scaled> {
        let mut widths = vec![Scaled::ZERO; self.columns()];
        let cells = || self.rows.iter().flatten();
        for cell in cells().filter(|c| c.span == 1) {
            widths[cell.column] = std::cmp::max(widths[cell.column], cell.list.width());
        }
        let mut spanned: Vec<&Cell> = cells().filter(|c| c.span > 1).collect();
        spanned.sort_by_key(|c| c.column + c.span);
        for cell in spanned {
            let last = cell.column + cell.span - 1;
            let total: Scaled = widths[cell.column..=last].iter().copied().sum();
            if cell.list.width() > total {
                widths[last] += cell.list.width() - total;
            }
        }
        widths
    }

    /// Finishes the alignment.
    ///
    /// An unfinished row is ended as if by `\cr`.
    /// The result is a vertical list containing one hbox per row.
    pub fn finish(mut self) -> NodeList {
        if !self.at_row_start() {
            self.cr();
        }
        let widths = self.widths();
        let mut output = NodeList::vertical();
        for (i, row) in std::mem::take(&mut self.rows).into_iter().enumerate() {
            let mut row_list = NodeList::horizontal();
            for cell in row {
                let target: Scaled = widths[cell.column..cell.column + cell.span]
                    .iter()
                    .copied()
                    .sum();
                let mut list = cell.list;
                let padding = target - list.width();
                if padding > Scaled::ZERO {
                    list.push(Kern::new(padding));
                }
                row_list.push(HList::new(list));
            }
            log::debug!("alignment row {} has width {}", i + 1, row_list.width());
            output.push(HList::new(row_list));
        }
        output
    }
}
