//! The typesetter.
//!
//! The [Typesetter] receives commands from an interpreter (a TeX engine, or
//! the script runner in `boxworks-lang`) and routes them to the list maker
//! of the current mode.
//! It changes modes as TeX does: a letter in vertical mode starts a
//! paragraph, `\par` breaks the paragraph into lines, math shifts open and
//! close formulas, and so on.
//!
//! Whenever the stack is back to just the outer vertical list, the material
//! on that list is handed to the [PageBuilder].
//!
//! After any error the stack is consistent and more commands can be run.

use crate::error::{Error, Script, Underflow};
use crate::linebreak::{self, LineWidth};
use crate::listmaker::*;
use crate::math::Noad;
use crate::node::{self, *};
use crate::page::{PageBuilder, PageCollector};
use crate::params::{ParagraphShape, Parameters};
use crate::show::{Limits, Printer};
use dimen::Scaled;

/// The typesetting engine.
pub struct Typesetter<P: PageBuilder = PageCollector> {
    manager: crate::Manager,
    params: Parameters,
    fonts: Box<dyn font::Metrics>,
    page_builder: P,
    shape_override: Option<ParagraphShape>,
    line_width: Option<Box<dyn LineWidth>>,
    shipout_mark: bool,
    locator: Locator,
}

impl Typesetter<PageCollector> {
    /// Returns a typesetter that collects pages in memory.
    pub fn new(params: Parameters, fonts: Box<dyn font::Metrics>) -> Self {
        Typesetter::with_page_builder(params, fonts, PageCollector::new())
    }
}

impl<P: PageBuilder> Typesetter<P> {
    pub fn with_page_builder(
        params: Parameters,
        fonts: Box<dyn font::Metrics>,
        page_builder: P,
    ) -> Self {
        Typesetter {
            manager: Default::default(),
            params,
            fonts,
            page_builder,
            shape_override: None,
            line_width: None,
            shipout_mark: false,
            locator: Locator::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.manager.mode()
    }

    /// Number of list makers on the stack, counting the outer vertical list maker.
    pub fn depth(&self) -> usize {
        self.manager.depth()
    }

    pub fn manager(&self) -> &crate::Manager {
        &self.manager
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn page_builder(&self) -> &P {
        &self.page_builder
    }

    pub fn page_builder_mut(&mut self) -> &mut P {
        &mut self.page_builder
    }

    pub fn into_page_builder(self) -> P {
        self.page_builder
    }

    /// Sets the source position reported for list makers created from now on.
    pub fn set_locator(&mut self, locator: Locator) {
        self.locator = locator;
    }

    /// Sets the shape of the next paragraph, overriding the parameters.
    ///
    /// The override is cleared when the paragraph ends.
    pub fn set_paragraph_shape(&mut self, shape: ParagraphShape) {
        self.shape_override = Some(shape);
    }

    /// Installs the line width function used when no paragraph shape is available.
    pub fn set_line_width<L: LineWidth + 'static>(&mut self, line_width: L) {
        self.line_width = Some(Box::new(line_width));
    }

    /// Runs a command and then hands any finished material to the page builder.
    fn run<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        let result = f(self);
        self.contribute();
        result
    }

    fn contribute(&mut self) {
        if self.manager.depth() != 1 {
            return;
        }
        if let ListMaker::Vertical(v) = self.manager.outer_mut() {
            if !v.list().is_empty() {
                let material = v.take_list();
                log::debug!("contributing {} nodes to the page builder", material.len());
                self.page_builder.contribute(material);
            }
        }
    }

    /// Appends a node to the list of the current mode.
    fn append(&mut self, node: Node) -> Result<(), Error> {
        use ListMaker::*;
        match self.manager.top_mut() {
            Vertical(v) => v.add_node(node, &self.params),
            Horizontal(h) | RestrictedHorizontal(h) => h.add_node(node),
            Alignment(a) => a.content().add_node(node),
            Math(_) | DisplayMath(_) => {
                return Err(Error::unsupported("arbitrary nodes in math lists"))
            }
        }
        Ok(())
    }

    fn begin_paragraph(&mut self, indented: bool) {
        self.manager.push(ListMaker::Horizontal(HorizontalListMaker::new(
            indented,
            self.locator,
        )));
    }

    /// Adds a letter.
    ///
    /// In vertical mode this starts an indented paragraph first.
    pub fn add_letter(&mut self, c: char, font: u32, locator: Locator) -> Result<(), Error> {
        self.locator = locator;
        self.run(|t| {
            if t.mode().is_vertical() {
                t.begin_paragraph(true);
            }
            let fonts = &*t.fonts;
            use ListMaker::*;
            match t.manager.top_mut() {
                Horizontal(h) | RestrictedHorizontal(h) => h.append_char(c, font, fonts),
                Alignment(a) => a.content().append_char(c, font, fonts),
                Math(m) | DisplayMath(m) => m.add_letter(c, font),
                Vertical(_) => {}
            }
            Ok(())
        })
    }

    /// Adds inter-word glue. Spaces are ignored in vertical and math modes.
    pub fn add_space(&mut self, font: u32) -> Result<(), Error> {
        self.run(|t| {
            let fonts = &*t.fonts;
            let params = &t.params;
            use ListMaker::*;
            match t.manager.top_mut() {
                Horizontal(h) | RestrictedHorizontal(h) => h.add_space(font, fonts, params),
                Alignment(a) => a.content().add_space(font, fonts, params),
                Vertical(_) | Math(_) | DisplayMath(_) => {}
            }
            Ok(())
        })
    }

    pub fn add_glue(&mut self, glue: dimen::Glue) -> Result<(), Error> {
        self.run(|t| match t.manager.top_mut() {
            ListMaker::Math(m) | ListMaker::DisplayMath(m) => {
                m.add_noad(Noad::Glue(glue));
                Ok(())
            }
            _ => t.append(node::Glue::new(glue).into()),
        })
    }

    /// Adds an explicit kern.
    pub fn add_kern(&mut self, width: Scaled) -> Result<(), Error> {
        self.run(|t| match t.manager.top_mut() {
            ListMaker::Math(m) | ListMaker::DisplayMath(m) => {
                m.add_noad(Noad::Kern(width));
                Ok(())
            }
            _ => t.append(Kern::explicit(width).into()),
        })
    }

    pub fn add_penalty(&mut self, value: i32) -> Result<(), Error> {
        self.run(|t| match t.manager.top_mut() {
            ListMaker::Math(m) | ListMaker::DisplayMath(m) => {
                m.add_noad(Noad::Penalty(value));
                Ok(())
            }
            _ => t.append(Penalty { value }.into()),
        })
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<(), Error> {
        self.add_node(rule.into())
    }

    /// Adds an arbitrary node. Math lists accept no nodes.
    pub fn add_node(&mut self, node: Node) -> Result<(), Error> {
        self.run(|t| t.append(node))
    }

    /// Handles `$`: opens or closes an inline formula.
    pub fn math_shift(&mut self) -> Result<(), Error> {
        self.run(|t| match t.mode() {
            Mode::Vertical | Mode::InternalVertical => {
                t.begin_paragraph(true);
                t.manager
                    .push(ListMaker::Math(MathListMaker::new(t.locator)));
                Ok(())
            }
            Mode::Horizontal | Mode::RestrictedHorizontal | Mode::Alignment => {
                t.manager
                    .push(ListMaker::Math(MathListMaker::new(t.locator)));
                Ok(())
            }
            Mode::Math => t.close_math(false),
            Mode::DisplayMath => Err(Error::mode("$", Mode::DisplayMath)),
        })
    }

    /// Handles `$$`: opens or closes a display.
    ///
    /// Opening a display breaks the paragraph so far into lines.
    /// Closing it appends the centred formula to the vertical list and resumes
    /// the paragraph without indentation.
    ///
    /// Described in TeX.2021.1138-1145 and 1199-1206.
    pub fn display_math_shift(&mut self) -> Result<(), Error> {
        self.run(|t| match t.mode() {
            Mode::Vertical | Mode::InternalVertical => {
                t.check_line_width()?;
                t.begin_paragraph(true);
                t.open_display()
            }
            Mode::Horizontal => t.open_display(),
            Mode::DisplayMath => t.close_math(true),
            mode => Err(Error::mode("$$", mode)),
        })
    }

    fn open_display(&mut self) -> Result<(), Error> {
        self.end_paragraph(false)?;
        self.manager
            .push(ListMaker::DisplayMath(MathListMaker::new(self.locator)));
        Ok(())
    }

    /// Closes the formula on top of the stack.
    ///
    /// If `resume` is true a display is followed by a new paragraph.
    fn close_math(&mut self, resume: bool) -> Result<(), Error> {
        let list_maker = self.manager.pop()?;
        let display = list_maker.mode() == Mode::DisplayMath;
        let formula = list_maker.finish(&*self.fonts)?;
        if !display {
            let mut nodes = vec![Node::Math(node::Math::Before)];
            nodes.extend(formula);
            nodes.push(Node::Math(node::Math::After));
            for node in nodes {
                self.append(node)?;
            }
            return Ok(());
        }
        let mut display = HList::new(formula);
        match self.current_line_width() {
            Some(width) => {
                let shift = (width - display.width()) / 2;
                if shift > Scaled::ZERO {
                    display.shift_amount = shift;
                }
            }
            None => log::warn!("no line width for the display; it is not centred"),
        }
        self.append(
            Penalty {
                value: self.params.pre_display_penalty,
            }
            .into(),
        )?;
        self.append(
            node::Glue::from_param(GlueParam::AboveDisplaySkip, self.params.above_display_skip)
                .into(),
        )?;
        self.append(display.into())?;
        self.append(
            Penalty {
                value: self.params.post_display_penalty,
            }
            .into(),
        )?;
        self.append(
            node::Glue::from_param(GlueParam::BelowDisplaySkip, self.params.below_display_skip)
                .into(),
        )?;
        if resume {
            self.begin_paragraph(false);
        }
        Ok(())
    }

    /// Handles `\par`.
    ///
    /// In horizontal modes the list is broken into lines which are added to the
    /// enclosing list.
    /// In math modes this is an error, and the formula is closed anyway.
    pub fn par(&mut self) -> Result<(), Error> {
        self.run(|t| match t.mode() {
            Mode::Vertical | Mode::InternalVertical => {
                t.reset_paragraph();
                Ok(())
            }
            Mode::Horizontal | Mode::RestrictedHorizontal => t.end_paragraph(true),
            Mode::Alignment => Ok(()),
            mode @ (Mode::Math | Mode::DisplayMath) => {
                if let Err(err) = t.close_math(false) {
                    log::warn!("formula dropped while closing it: {err}");
                }
                Err(Error::mode("\\par", mode))
            }
        })
    }

    fn reset_paragraph(&mut self) {
        self.shape_override = None;
        self.params.reset_paragraph_shape();
    }

    fn current_shape(&self) -> Option<ParagraphShape> {
        self.shape_override
            .clone()
            .or_else(|| self.params.paragraph_shape())
    }

    fn check_line_width(&self) -> Result<(), Error> {
        if self.current_shape().is_none() && self.line_width.is_none() {
            return Err(Error::ConfigurationLookup("hsize"));
        }
        Ok(())
    }

    fn current_line_width(&self) -> Option<Scaled> {
        match (self.current_shape(), &self.line_width) {
            (Some(shape), _) => Some(shape.width(1)),
            (None, Some(line_width)) => line_width.width(1),
            (None, None) => None,
        }
    }

    fn break_paragraph(&self, paragraph: NodeList, indented: bool) -> Result<NodeList, Error> {
        let shape = self.current_shape();
        let line_width: &dyn LineWidth = match (&shape, &self.line_width) {
            (Some(shape), _) => shape,
            (None, Some(line_width)) => &**line_width,
            (None, None) => return Err(Error::ConfigurationLookup("hsize")),
        };
        Ok(linebreak::break_lines(
            paragraph,
            indented,
            line_width,
            &self.params,
        ))
    }

    /// Closes the horizontal list on top of the stack and breaks it into lines.
    ///
    /// The stack is unchanged if no line width is available.
    fn end_paragraph(&mut self, reset: bool) -> Result<(), Error> {
        self.check_line_width()?;
        let list_maker = self.manager.pop()?;
        let indented = matches!(&list_maker, ListMaker::Horizontal(h) if h.indented());
        let paragraph = list_maker.finish(&*self.fonts)?;
        let lines = self.break_paragraph(paragraph, indented)?;
        if reset {
            self.reset_paragraph();
        }
        if let ListMaker::Vertical(v) = self.manager.top_mut() {
            v.splice(lines);
            return Ok(());
        }
        self.append(VList::new(lines).into())
    }

    pub fn left_brace(&mut self) -> Result<(), Error> {
        self.run(|t| {
            t.manager.top_mut().left_brace();
            Ok(())
        })
    }

    pub fn right_brace(&mut self) -> Result<(), Error> {
        self.run(|t| t.manager.top_mut().right_brace())
    }

    fn alignment(&mut self, operation: &'static str) -> Result<&mut AlignmentListMaker, Error> {
        let mode = self.mode();
        match self.manager.top_mut() {
            ListMaker::Alignment(a) => Ok(a),
            _ => Err(Error::mode(operation, mode)),
        }
    }

    fn math(&mut self, operation: &'static str) -> Result<&mut MathListMaker, Error> {
        let mode = self.mode();
        match self.manager.top_mut() {
            ListMaker::Math(m) | ListMaker::DisplayMath(m) => Ok(m),
            _ => Err(Error::mode(operation, mode)),
        }
    }

    /// Handles an alignment tab `&`.
    pub fn tab(&mut self) -> Result<(), Error> {
        self.run(|t| t.alignment("&")?.tab())
    }

    pub fn subscript_mark(&mut self) -> Result<(), Error> {
        self.run(|t| t.math("_")?.script(Script::Subscript))
    }

    pub fn superscript_mark(&mut self) -> Result<(), Error> {
        self.run(|t| t.math("^")?.script(Script::Superscript))
    }

    pub fn cr(&mut self) -> Result<(), Error> {
        self.run(|t| {
            t.alignment("\\cr")?.cr();
            Ok(())
        })
    }

    pub fn crcr(&mut self) -> Result<(), Error> {
        self.run(|t| {
            t.alignment("\\crcr")?.crcr();
            Ok(())
        })
    }

    pub fn span(&mut self) -> Result<(), Error> {
        self.run(|t| t.alignment("\\span")?.span())
    }

    pub fn omit(&mut self) -> Result<(), Error> {
        self.run(|t| t.alignment("\\omit")?.omit())
    }

    /// Opens an `\hbox`.
    pub fn begin_hbox(&mut self) -> Result<(), Error> {
        self.run(|t| {
            if t.mode().is_math() {
                return Err(Error::unsupported("boxes in math lists"));
            }
            t.manager
                .push(ListMaker::RestrictedHorizontal(HorizontalListMaker::new(
                    false, t.locator,
                )));
            Ok(())
        })
    }

    /// Opens a `\vbox`.
    pub fn begin_vbox(&mut self) -> Result<(), Error> {
        self.run(|t| {
            if t.mode().is_math() {
                return Err(Error::unsupported("boxes in math lists"));
            }
            t.manager
                .push(ListMaker::Vertical(VerticalListMaker::inner(t.locator)));
            Ok(())
        })
    }

    /// Closes the innermost box and adds it to the enclosing list.
    ///
    /// A paragraph open inside a `\vbox` is ended first.
    ///
    /// Described in TeX.2021.1085-1086.
    pub fn end_box(&mut self) -> Result<(), Error> {
        self.run(|t| {
            t.prepare_box_end()?;
            t.close_box()
        })
    }

    /// Closes the innermost box and returns its contents instead of adding
    /// the box to the enclosing list.
    ///
    /// This is how preamble templates and shipped out pages are built.
    pub fn take_box_contents(&mut self) -> Result<NodeList, Error> {
        self.run(|t| {
            t.prepare_box_end()?;
            t.pop_box()
        })
    }

    fn prepare_box_end(&mut self) -> Result<(), Error> {
        let modes: Vec<Mode> = self.manager.iter().take(2).map(ListMaker::mode).collect();
        match (modes.first().copied(), modes.get(1).copied()) {
            (Some(Mode::Horizontal), Some(Mode::InternalVertical)) => self.end_paragraph(true),
            (Some(Mode::Horizontal), _) | (Some(Mode::Vertical), _) => {
                Err(Error::StackUnderflow(Underflow::ListMakerStack))
            }
            (Some(mode @ (Mode::Math | Mode::DisplayMath | Mode::Alignment)), _) => {
                Err(Error::mode("end of box", mode))
            }
            _ => Ok(()),
        }
    }

    fn pop_box(&mut self) -> Result<NodeList, Error> {
        match self.manager.pop()? {
            ListMaker::RestrictedHorizontal(h) => Ok(h.finish()),
            ListMaker::Vertical(v) => Ok(v.finish()),
            other => {
                let mode = other.mode();
                self.manager.push(other);
                Err(Error::mode("end of box", mode))
            }
        }
    }

    fn close_box(&mut self) -> Result<(), Error> {
        let list = self.pop_box()?;
        let node: Node = match list.orientation() {
            Orientation::Horizontal => HList::new(list).into(),
            Orientation::Vertical => VList::new(list).into(),
        };
        self.append(node)
    }

    /// Starts an `\halign` with the given preamble.
    ///
    /// In horizontal mode the paragraph is ended first.
    pub fn begin_alignment(&mut self, preamble: Vec<ColumnTemplate>) -> Result<(), Error> {
        self.run(|t| {
            match t.mode() {
                Mode::Vertical | Mode::InternalVertical => {}
                Mode::Horizontal => t.end_paragraph(true)?,
                Mode::Math | Mode::DisplayMath => {
                    return Err(Error::unsupported("alignments in math lists"))
                }
                mode => return Err(Error::mode("\\halign", mode)),
            }
            t.manager
                .push(ListMaker::Alignment(AlignmentListMaker::new(
                    preamble, t.locator,
                )));
            Ok(())
        })
    }

    /// Ends the alignment, adding one box per row to the enclosing vertical list.
    pub fn end_alignment(&mut self) -> Result<(), Error> {
        self.run(|t| {
            t.alignment("end of alignment")?;
            t.close_alignment()
        })
    }

    fn close_alignment(&mut self) -> Result<(), Error> {
        let rows = self.manager.complete(&*self.fonts)?;
        for row in rows {
            self.append(row)?;
        }
        Ok(())
    }

    /// Handles `\indent` and `\noindent`.
    ///
    /// In vertical mode this starts a paragraph.
    /// In horizontal modes `\indent` adds an indentation box.
    pub fn start_paragraph(&mut self, indent: bool) -> Result<(), Error> {
        self.run(|t| {
            let mode = t.mode();
            if mode.is_vertical() {
                t.begin_paragraph(indent);
                return Ok(());
            }
            if !indent {
                return Ok(());
            }
            if mode.is_math() {
                return Err(Error::unsupported("boxes in math lists"));
            }
            t.append(linebreak::indent_box(t.params.par_indent).into())
        })
    }

    /// Sets the space factor of the current horizontal list.
    pub fn set_space_factor(&mut self, space_factor: i32) -> Result<(), Error> {
        self.run(|t| {
            let mode = t.mode();
            match t.manager.top_mut() {
                ListMaker::Horizontal(h) | ListMaker::RestrictedHorizontal(h) => {
                    h.set_space_factor(space_factor)
                }
                ListMaker::Alignment(a) => a.cell_mut().set_space_factor(space_factor),
                _ => Err(Error::mode("\\spacefactor", mode)),
            }
        })
    }

    /// Sets the language of the current horizontal list.
    ///
    /// Numbers outside 0..=255 select language 0.
    pub fn set_language(&mut self, language: i32) -> Result<(), Error> {
        self.run(|t| {
            let mode = t.mode();
            match t.manager.top_mut() {
                ListMaker::Horizontal(h) | ListMaker::RestrictedHorizontal(h) => {
                    h.set_language(language);
                    Ok(())
                }
                ListMaker::Alignment(a) => {
                    a.cell_mut().set_language(language);
                    Ok(())
                }
                _ => Err(Error::mode("\\setlanguage", mode)),
            }
        })
    }

    /// Sets the depth of the last box on the current vertical list.
    pub fn set_prev_depth(&mut self, prev_depth: Scaled) -> Result<(), Error> {
        self.run(|t| {
            let mode = t.mode();
            match t.manager.top_mut() {
                ListMaker::Vertical(v) => {
                    v.set_prev_depth(prev_depth);
                    Ok(())
                }
                _ => Err(Error::mode("\\prevdepth", mode)),
            }
        })
    }

    /// Ships out a box directly, bypassing the current list.
    pub fn shipout(&mut self, page: VList) {
        self.contribute();
        self.page_builder.ship_out(page);
        self.shipout_mark = true;
    }

    /// Whether a box has been shipped out since the mark was last cleared.
    pub fn shipout_mark(&self) -> bool {
        self.shipout_mark
    }

    /// Returns and clears the shipout mark.
    pub fn take_shipout_mark(&mut self) -> bool {
        std::mem::take(&mut self.shipout_mark)
    }

    /// The last node of the current list; math lists have none.
    pub fn last_node(&self) -> Option<&Node> {
        self.manager.top().last_node()
    }

    /// Type code of the last node, as reported by `\lastnodetype`.
    pub fn last_node_type(&self) -> i32 {
        self.last_node()
            .map_or(NodeList::EMPTY_TYPE_CODE, Node::type_code)
    }

    /// Removes and returns the last node of the current list, like `\unskip` and friends.
    pub fn remove_last_node(&mut self) -> Result<Node, Error> {
        self.manager.top_mut().remove_last_node()
    }

    /// Writes every list on the stack, innermost first.
    ///
    /// Boxes are shown to `depth` levels and at most `breadth` items are shown per list.
    ///
    /// Described in TeX.2021.218-219.
    pub fn show_lists<W: std::fmt::Write>(
        &self,
        w: &mut W,
        depth: usize,
        breadth: usize,
    ) -> std::fmt::Result {
        let mut printer = Printer::new(w, Limits { depth, breadth });
        for list_maker in self.manager.iter() {
            printer.print_nl()?;
            printer.write_str(&format![
                "### {} entered at line {}",
                list_maker.mode(),
                list_maker.entered_at().line
            ])?;
            use ListMaker::*;
            match list_maker {
                Vertical(v) => {
                    printer.show_list(v.list().nodes())?;
                    printer.print_nl()?;
                    if v.prev_depth() <= VerticalListMaker::IGNORE_DEPTH {
                        printer.write_str("prevdepth ignored")?;
                    } else {
                        printer.write_str(&format!["prevdepth {}", v.prev_depth().no_units()])?;
                    }
                }
                Horizontal(h) | RestrictedHorizontal(h) => {
                    printer.show_list(h.list().nodes())?;
                    printer.print_nl()?;
                    printer.write_str(&format!["spacefactor {}", h.space_factor()])?;
                    if h.language() != 0 {
                        printer.write_str(&format![", current language {}", h.language()])?;
                    }
                }
                Math(m) | DisplayMath(m) => printer.show_noads(m.noads())?,
                Alignment(a) => {
                    printer.show_list(a.cell().list().nodes())?;
                    printer.print_nl()?;
                    printer.write_str(&format![
                        "alignment row {}, column {}",
                        a.rows() + 1,
                        a.column() + 1
                    ])?;
                }
            }
        }
        Ok(())
    }

    /// Ends the input.
    ///
    /// An open paragraph is ended.
    /// Any other open list maker is closed and reported as an error;
    /// the first such error is returned.
    /// Then the page builder is told that the input has ended.
    pub fn finish(&mut self) -> Result<(), Error> {
        let result = self.close_until(1, "\\end");
        self.contribute();
        self.page_builder.finish();
        result
    }

    /// Closes every list maker above the given depth the way [Typesetter::finish] does,
    ///     adding each closed list to the one below it.
    ///
    /// This recovers from a box whose content left math, an alignment or
    ///     another box open.
    /// Returns the first error raised while closing.
    pub fn close_to_depth(&mut self, depth: usize) -> Result<(), Error> {
        self.run(|t| t.close_until(depth.max(1), "end of box"))
    }

    fn close_until(&mut self, target: usize, context: &'static str) -> Result<(), Error> {
        let mut first_error = None;
        while self.manager.depth() > target {
            let depth = self.manager.depth();
            let mode = self.mode();
            let result = match mode {
                Mode::Horizontal => self.end_paragraph(true),
                Mode::Math | Mode::DisplayMath => self
                    .close_math(false)
                    .and(Err(Error::mode(context, mode))),
                Mode::Alignment => self
                    .close_alignment()
                    .and(Err(Error::mode(context, mode))),
                Mode::RestrictedHorizontal | Mode::InternalVertical | Mode::Vertical => self
                    .close_box()
                    .and(Err(Error::mode(context, mode))),
            };
            if let Err(err) = result {
                log::error!("{err}");
                first_error.get_or_insert(err);
            }
            if self.manager.depth() >= depth {
                if let Ok(list_maker) = self.manager.pop() {
                    log::warn!(
                        "discarding {} entered at line {}",
                        list_maker.mode(),
                        list_maker.entered_at().line
                    );
                }
            }
        }
        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::{FontTable, GlyphBox};

    fn pt(n: i32) -> Scaled {
        Scaled::ONE * n
    }

    fn fonts() -> FontTable {
        FontTable::new()
            .with_default_glyph(
                0,
                GlyphBox {
                    width: pt(10),
                    height: pt(7),
                    depth: pt(1),
                    ..Default::default()
                },
            )
            .with_space(0, dimen::Glue::fixed(pt(5)))
    }

    fn typesetter(hsize: Option<i32>) -> Typesetter {
        let params = Parameters {
            hsize: hsize.map(pt),
            ..Default::default()
        };
        Typesetter::new(params, Box::new(fonts()))
    }

    fn text(t: &mut Typesetter, s: &str) {
        for c in s.chars() {
            if c == ' ' {
                t.add_space(0).unwrap();
            } else {
                t.add_letter(c, 0, Locator::new(1)).unwrap();
            }
        }
    }

    fn contributed(t: &Typesetter) -> &[Node] {
        t.page_builder().current().nodes()
    }

    fn line_widths(nodes: &[Node]) -> Vec<i32> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::HList(b) => Some(b.width().integer_part()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn letter_in_vertical_mode_starts_paragraph() {
        let mut t = typesetter(Some(100));
        assert_eq!(t.mode(), Mode::Vertical);
        text(&mut t, "a");
        assert_eq!(t.mode(), Mode::Horizontal);
        assert_eq!(t.depth(), 2);
        assert_eq!(t.last_node_type(), 0);
    }

    #[test]
    fn paragraph_on_one_line() {
        let mut t = typesetter(Some(100));
        text(&mut t, "ab c");
        t.par().unwrap();
        assert_eq!(t.depth(), 1);
        assert_eq!(line_widths(contributed(&t)), vec![35]);
        assert_eq!(contributed(&t).len(), 4);
    }

    #[test]
    fn paragraph_on_two_lines() {
        let mut t = typesetter(Some(20));
        text(&mut t, "ab c");
        t.par().unwrap();
        assert_eq!(line_widths(contributed(&t)), vec![20, 15]);
    }

    #[test]
    fn paragraph_without_line_width() {
        let mut t = typesetter(None);
        text(&mut t, "ab");
        assert_eq!(t.par(), Err(Error::ConfigurationLookup("hsize")));
        assert_eq!(t.depth(), 2);
        t.set_line_width(|_: usize| Some(pt(100)));
        t.par().unwrap();
        assert_eq!(line_widths(contributed(&t)), vec![20]);
    }

    #[test]
    fn paragraph_shape_override_lasts_one_paragraph() {
        let mut t = typesetter(Some(100));
        t.set_paragraph_shape(ParagraphShape::Fixed(pt(20)));
        text(&mut t, "ab c");
        t.par().unwrap();
        text(&mut t, "ab c");
        t.par().unwrap();
        assert_eq!(line_widths(contributed(&t)), vec![20, 15, 35]);
    }

    #[test]
    fn hanging_indentation_lasts_one_paragraph() {
        let mut t = typesetter(Some(25));
        t.params_mut().hang_indent = pt(5);
        text(&mut t, "ab c");
        t.par().unwrap();
        assert_eq!(t.params().hang_indent, Scaled::ZERO);
        assert_eq!(line_widths(contributed(&t)), vec![25, 10]);
    }

    #[test]
    fn script_marks_outside_math() {
        let mut t = typesetter(Some(100));
        assert_eq!(t.subscript_mark(), Err(Error::mode("_", Mode::Vertical)));
        assert_eq!(t.depth(), 1);
        text(&mut t, "a");
        assert_eq!(
            t.superscript_mark(),
            Err(Error::mode("^", Mode::Horizontal))
        );
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn inline_math() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.math_shift().unwrap();
        assert_eq!(t.mode(), Mode::Math);
        assert_eq!(t.last_node(), None);
        text(&mut t, "x");
        t.math_shift().unwrap();
        assert_eq!(t.mode(), Mode::Horizontal);
        let types: Vec<i32> = t
            .manager()
            .top()
            .list()
            .unwrap()
            .iter()
            .map(Node::type_code)
            .collect();
        assert_eq!(types, vec![0, 10, 0, 15]);
    }

    #[test]
    fn math_shift_in_vertical_mode_starts_paragraph() {
        let mut t = typesetter(Some(100));
        t.math_shift().unwrap();
        assert_eq!(t.depth(), 3);
        t.math_shift().unwrap();
        assert_eq!(t.mode(), Mode::Horizontal);
    }

    #[test]
    fn par_in_math_mode() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.math_shift().unwrap();
        text(&mut t, "x");
        assert_eq!(t.depth(), 3);
        assert_eq!(t.par(), Err(Error::mode("\\par", Mode::Math)));
        assert_eq!(t.depth(), 2);
        assert_eq!(t.last_node_type(), 15);
    }

    #[test]
    fn superscript_layout_is_unsupported() {
        let mut t = typesetter(Some(100));
        t.math_shift().unwrap();
        text(&mut t, "x");
        t.superscript_mark().unwrap();
        text(&mut t, "2");
        assert!(matches!(
            t.math_shift(),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert_eq!(t.mode(), Mode::Horizontal);
    }

    #[test]
    fn wrong_kind_of_math_shift() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.display_math_shift().unwrap();
        assert_eq!(t.math_shift(), Err(Error::mode("$", Mode::DisplayMath)));
        assert_eq!(t.mode(), Mode::DisplayMath);
        t.display_math_shift().unwrap();
        t.math_shift().unwrap();
        assert_eq!(
            t.display_math_shift(),
            Err(Error::mode("$$", Mode::Math))
        );
        assert_eq!(t.mode(), Mode::Math);
    }

    #[test]
    fn display_in_restricted_mode() {
        let mut t = typesetter(Some(100));
        t.begin_hbox().unwrap();
        assert_eq!(
            t.display_math_shift(),
            Err(Error::mode("$$", Mode::RestrictedHorizontal))
        );
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn display_math_is_centred() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.display_math_shift().unwrap();
        assert_eq!(t.depth(), 2);
        assert_eq!(t.mode(), Mode::DisplayMath);
        text(&mut t, "x");
        t.display_math_shift().unwrap();
        assert_eq!(t.mode(), Mode::Horizontal);
        assert_eq!(t.depth(), 2);
        text(&mut t, "b");
        t.par().unwrap();
        let shifts: Vec<Scaled> = contributed(&t)
            .iter()
            .filter_map(|n| match n {
                Node::HList(b) => Some(b.shift_amount),
                _ => None,
            })
            .collect();
        assert_eq!(shifts, vec![Scaled::ZERO, pt(45), Scaled::ZERO]);
    }

    #[test]
    fn display_material_order() {
        let mut t = typesetter(Some(100));
        t.params_mut().pre_display_penalty = 10000;
        t.display_math_shift().unwrap();
        t.display_math_shift().unwrap();
        let types: Vec<i32> = t
            .manager()
            .outer()
            .list()
            .unwrap()
            .iter()
            .map(Node::type_code)
            .collect();
        // leading skip, trailing skip, penalty, above skip, box, penalty, below skip
        assert_eq!(types, vec![11, 11, 13, 11, 1, 13, 11]);
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn hbox_in_vertical_mode() {
        let mut t = typesetter(Some(100));
        t.begin_hbox().unwrap();
        assert_eq!(t.mode(), Mode::RestrictedHorizontal);
        text(&mut t, "ab");
        t.end_box().unwrap();
        assert_eq!(t.depth(), 1);
        assert_eq!(line_widths(contributed(&t)), vec![20]);
    }

    #[test]
    fn vbox_ends_open_paragraph() {
        let mut t = typesetter(Some(100));
        t.begin_vbox().unwrap();
        text(&mut t, "ab");
        assert_eq!(t.depth(), 3);
        t.end_box().unwrap();
        assert_eq!(t.depth(), 1);
        assert!(matches!(contributed(&t), [Node::VList(_)]));
    }

    #[test]
    fn take_box_contents() {
        let mut t = typesetter(Some(100));
        t.begin_hbox().unwrap();
        text(&mut t, "ab");
        let list = t.take_box_contents().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.orientation(), Orientation::Horizontal);
        assert_eq!(t.depth(), 1);
        assert!(contributed(&t).is_empty());
    }

    #[test]
    fn take_vbox_contents_ends_open_paragraph() {
        let mut t = typesetter(Some(100));
        t.begin_vbox().unwrap();
        text(&mut t, "ab");
        let list = t.take_box_contents().unwrap();
        assert_eq!(list.orientation(), Orientation::Vertical);
        assert_eq!(line_widths(list.nodes()), vec![20]);
        assert_eq!(t.depth(), 1);
        assert!(contributed(&t).is_empty());
    }

    #[test]
    fn close_to_depth_keeps_the_box() {
        let mut t = typesetter(Some(100));
        t.begin_hbox().unwrap();
        t.math_shift().unwrap();
        text(&mut t, "x");
        assert_eq!(t.end_box(), Err(Error::mode("end of box", Mode::Math)));
        assert_eq!(t.depth(), 3);
        assert_eq!(
            t.close_to_depth(1),
            Err(Error::mode("end of box", Mode::Math))
        );
        assert_eq!(t.depth(), 1);
        assert!(matches!(contributed(&t), [Node::HList(_)]));
        t.close_to_depth(0).unwrap();
        assert_eq!(t.depth(), 1);
    }

    #[test]
    fn end_box_without_box() {
        let mut t = typesetter(Some(100));
        assert_eq!(
            t.end_box(),
            Err(Error::StackUnderflow(Underflow::ListMakerStack))
        );
        text(&mut t, "a");
        assert_eq!(
            t.end_box(),
            Err(Error::StackUnderflow(Underflow::ListMakerStack))
        );
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn boxes_in_math_are_unsupported() {
        let mut t = typesetter(Some(100));
        t.math_shift().unwrap();
        assert!(matches!(
            t.begin_hbox(),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            t.add_rule(Rule::new()),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert_eq!(t.end_box(), Err(Error::mode("end of box", Mode::Math)));
    }

    fn columns() -> Vec<ColumnTemplate> {
        vec![ColumnTemplate::default(), ColumnTemplate::default()]
    }

    #[test]
    fn alignment() {
        let mut t = typesetter(Some(100));
        t.begin_alignment(columns()).unwrap();
        assert_eq!(t.mode(), Mode::Alignment);
        text(&mut t, "a");
        t.tab().unwrap();
        text(&mut t, "bb");
        t.cr().unwrap();
        text(&mut t, "ccc");
        t.tab().unwrap();
        text(&mut t, "d");
        t.crcr().unwrap();
        t.par().unwrap();
        t.end_alignment().unwrap();
        assert_eq!(t.depth(), 1);
        assert_eq!(line_widths(contributed(&t)), vec![50, 50]);
    }

    #[test]
    fn alignment_ends_paragraph() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.begin_alignment(columns()).unwrap();
        assert_eq!(t.depth(), 2);
        let outer = t.manager().outer().list().unwrap();
        assert_eq!(line_widths(outer.nodes()), vec![10]);
    }

    #[test]
    fn alignment_commands_outside_alignment() {
        let mut t = typesetter(Some(100));
        assert_eq!(t.tab(), Err(Error::mode("&", Mode::Vertical)));
        assert_eq!(t.cr(), Err(Error::mode("\\cr", Mode::Vertical)));
        assert_eq!(t.span(), Err(Error::mode("\\span", Mode::Vertical)));
        assert_eq!(t.omit(), Err(Error::mode("\\omit", Mode::Vertical)));
        assert_eq!(
            t.end_alignment(),
            Err(Error::mode("end of alignment", Mode::Vertical))
        );
        t.begin_hbox().unwrap();
        assert_eq!(
            t.begin_alignment(columns()),
            Err(Error::mode("\\halign", Mode::RestrictedHorizontal))
        );
    }

    #[test]
    fn remove_last_node() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a ");
        assert_eq!(t.last_node_type(), 11);
        assert!(matches!(t.remove_last_node(), Ok(Node::Glue(_))));
        assert_eq!(t.last_node_type(), 0);
        t.remove_last_node().unwrap();
        assert_eq!(t.last_node_type(), NodeList::EMPTY_TYPE_CODE);
        assert_eq!(
            t.remove_last_node(),
            Err(Error::StackUnderflow(Underflow::NodeList))
        );
    }

    #[test]
    fn space_factor_only_in_horizontal_mode() {
        let mut t = typesetter(Some(100));
        assert_eq!(
            t.set_space_factor(2000),
            Err(Error::mode("\\spacefactor", Mode::Vertical))
        );
        t.set_prev_depth(pt(2)).unwrap();
        text(&mut t, "a");
        t.set_space_factor(2000).unwrap();
        assert_eq!(
            t.set_prev_depth(pt(2)),
            Err(Error::mode("\\prevdepth", Mode::Horizontal))
        );
    }

    #[test]
    fn shipout_mark() {
        let mut t = typesetter(Some(100));
        assert!(!t.shipout_mark());
        t.shipout(VList::default());
        assert!(t.shipout_mark());
        assert!(t.take_shipout_mark());
        assert!(!t.take_shipout_mark());
        assert_eq!(t.page_builder().pages().len(), 1);
    }

    #[test]
    fn show_lists() {
        let mut t = typesetter(Some(100));
        t.add_letter('a', 0, Locator::new(3)).unwrap();
        let mut s = String::new();
        t.show_lists(&mut s, 10, 10).unwrap();
        similar_asserts::assert_eq!(
            s,
            "### horizontal mode entered at line 3\n\
             \\font0 a\n\
             spacefactor 1000\n\
             ### vertical mode entered at line 0\n\
             prevdepth ignored"
        );
    }

    #[test]
    fn show_lists_with_language() {
        let mut t = typesetter(Some(100));
        assert_eq!(
            t.set_language(3),
            Err(Error::mode("\\setlanguage", Mode::Vertical))
        );
        t.add_letter('a', 0, Locator::new(3)).unwrap();
        t.set_language(3).unwrap();
        let mut s = String::new();
        t.show_lists(&mut s, 10, 10).unwrap();
        similar_asserts::assert_eq!(
            s,
            "### horizontal mode entered at line 3\n\
             \\font0 a\n\
             spacefactor 1000, current language 3\n\
             ### vertical mode entered at line 0\n\
             prevdepth ignored"
        );
    }

    #[test]
    fn show_lists_in_math_mode() {
        let mut t = typesetter(Some(100));
        t.math_shift().unwrap();
        t.add_letter('x', 2, Locator::new(4)).unwrap();
        let mut s = String::new();
        t.show_lists(&mut s, 10, 10).unwrap();
        similar_asserts::assert_eq!(
            s,
            "### math mode entered at line 0\n\
             \\mathord\n\
             .\\fam2 x\n\
             ### horizontal mode entered at line 0\n\
             spacefactor 1000\n\
             ### vertical mode entered at line 0\n\
             prevdepth ignored"
        );
    }

    #[test]
    fn finish_closes_everything() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        t.begin_hbox().unwrap();
        text(&mut t, "b");
        assert_eq!(
            t.finish(),
            Err(Error::mode("\\end", Mode::RestrictedHorizontal))
        );
        assert_eq!(t.depth(), 1);
        let pages = t.into_page_builder().into_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(line_widths(pages[0].list.nodes()), vec![20]);
    }

    #[test]
    fn finish_without_line_width_discards_paragraph() {
        let mut t = typesetter(None);
        text(&mut t, "a");
        assert_eq!(t.finish(), Err(Error::ConfigurationLookup("hsize")));
        assert_eq!(t.depth(), 1);
    }

    #[test]
    fn braces() {
        let mut t = typesetter(Some(100));
        assert_eq!(t.right_brace(), Err(Error::ExtraRightBrace));
        t.left_brace().unwrap();
        text(&mut t, "a");
        t.left_brace().unwrap();
        t.right_brace().unwrap();
        assert_eq!(t.right_brace(), Err(Error::ExtraRightBrace));
    }

    #[test]
    fn depth_returns_after_matching_pairs() {
        let mut t = typesetter(Some(100));
        text(&mut t, "a");
        let depth = t.depth();
        t.begin_hbox().unwrap();
        t.math_shift().unwrap();
        t.math_shift().unwrap();
        t.end_box().unwrap();
        t.begin_vbox().unwrap();
        t.end_box().unwrap();
        assert_eq!(t.depth(), depth);
    }
}
