//! Running Box programs
//!
//! Each [Statement] becomes one or more calls on a [Typesetter].
//! Errors raised by the typesetter are collected and, unless
//!     [Options::halt_on_error] is set, the program keeps running;
//!     the typesetter leaves its list-maker stack consistent after every error.

use crate::ast::{Command, Statement};
use crate::Error;
use boxworks::listmaker::ColumnTemplate;
use boxworks::node::{self, Node, VList};
use boxworks::page::PageBuilder;
use boxworks::{Locator, Typesetter};

/// Options for [run].
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// Stop at the first error.
    pub halt_on_error: bool,
}

/// What running a program produced, besides the pages.
#[derive(Debug, Default)]
pub struct Outcome<'a> {
    /// Output of the `showlists` commands.
    pub output: String,
    /// Every error, in the order they occurred.
    pub errors: Vec<Error<'a>>,
    /// Whether the program stopped early because of an error.
    pub halted: bool,
}

/// Runs the statements against the typesetter.
///
/// The typesetter is not finished, so more statements can be run afterwards.
pub fn run<'a, P: PageBuilder>(
    statements: &[Statement<'a>],
    typesetter: &mut Typesetter<P>,
    options: Options,
) -> Outcome<'a> {
    let mut runner = Runner {
        typesetter,
        options,
        outcome: Default::default(),
    };
    if runner.run_all(statements).is_err() {
        runner.outcome.halted = true;
    }
    runner.outcome
}

/// Signals that the run stopped because of an error.
struct Halt;

struct Runner<'t, 'a, P: PageBuilder> {
    typesetter: &'t mut Typesetter<P>,
    options: Options,
    outcome: Outcome<'a>,
}

impl<'t, 'a, P: PageBuilder> Runner<'t, 'a, P> {
    fn run_all(&mut self, statements: &[Statement<'a>]) -> Result<(), Halt> {
        for statement in statements {
            self.run_statement(statement)?;
        }
        Ok(())
    }

    fn report(&mut self, error: Error<'a>) -> Result<(), Halt> {
        log::debug!("{error}");
        self.outcome.errors.push(error);
        if self.options.halt_on_error {
            Err(Halt)
        } else {
            Ok(())
        }
    }

    fn check<T>(
        &mut self,
        statement: &Statement<'a>,
        result: Result<T, boxworks::Error>,
    ) -> Result<Option<T>, Halt> {
        match result {
            Ok(t) => Ok(Some(t)),
            Err(error) => {
                self.report(Error::Typesetting {
                    function_name: statement.func_name.clone(),
                    error,
                })?;
                Ok(None)
            }
        }
    }

    fn misplaced(&mut self, statement: &Statement<'a>, allowed_in: &'static str) -> Result<(), Halt> {
        self.report(Error::MisplacedFunction {
            function_name: statement.func_name.clone(),
            allowed_in,
        })
    }

    fn run_statement(&mut self, statement: &Statement<'a>) -> Result<(), Halt> {
        let locator = Locator::new(statement.func_name.line());
        self.typesetter.set_locator(locator);
        use Command::*;
        let t = &mut *self.typesetter;
        let result = match &statement.command {
            Text(args) => {
                let font = u32::try_from(args.font.value).unwrap_or(0);
                let mut result = Ok(());
                for c in args.content.value.chars() {
                    result = if c.is_whitespace() {
                        t.add_space(font)
                    } else {
                        t.add_letter(c, font, locator)
                    };
                    if result.is_err() {
                        break;
                    }
                }
                result
            }
            Glue(args) => t.add_glue(dimen::Glue {
                width: args.width.value,
                stretch: args.stretch.value.0,
                stretch_order: args.stretch.value.1,
                shrink: args.shrink.value.0,
                shrink_order: args.shrink.value.1,
            }),
            Kern(args) => t.add_kern(args.width.value),
            Penalty(args) => t.add_penalty(args.value.value),
            Rule(args) => t.add_rule(node::Rule {
                width: args.width.value.unwrap_or(node::Rule::RUNNING),
                height: args.height.value.unwrap_or(node::Rule::RUNNING),
                depth: args.depth.value.unwrap_or(node::Rule::RUNNING),
            }),
            Mark(args) => t.add_node(
                node::Mark {
                    class: u32::try_from(args.class.value).unwrap_or(0),
                    payload: args.content.value.to_string(),
                }
                .into(),
            ),
            Hbox(args) => return self.run_box(statement, true, &args.content.value),
            Vbox(args) => return self.run_box(statement, false, &args.content.value),
            Halign(args) => {
                return self.run_alignment(statement, &args.preamble.value, &args.content.value)
            }
            Column(_) => return self.misplaced(statement, "the preamble of `halign`"),
            ParShape(args) => {
                let mut lines = vec![];
                for line in &args.lines.value {
                    match &line.command {
                        Line(l) => lines.push((l.indent.value, l.length.value)),
                        _ => self.misplaced(line, "command lists, not in `parshape`")?,
                    }
                }
                self.typesetter.params_mut().par_shape = lines;
                Ok(())
            }
            Line(_) => return self.misplaced(statement, "the lines of `parshape`"),
            HangIndent(args) => {
                let params = t.params_mut();
                params.hang_indent = args.indent.value;
                params.hang_after = args.after.value.unwrap_or(1);
                Ok(())
            }
            SpaceFactor(args) => t.set_space_factor(args.value.value),
            Language(args) => t.set_language(args.value.value),
            PrevDepth(args) => t.set_prev_depth(args.depth.value),
            Shipout(args) => return self.run_shipout(statement, &args.content.value),
            ShowLists(args) => {
                let limit =
                    |v: Option<i32>| v.map_or(usize::MAX, |v| usize::try_from(v).unwrap_or(0));
                let output = &mut self.outcome.output;
                if !output.is_empty() {
                    output.push('\n');
                }
                // Writing to a string can't fail.
                _ = t.show_lists(output, limit(args.depth.value), limit(args.breadth.value));
                Ok(())
            }
            Par => t.par(),
            Indent => t.start_paragraph(true),
            NoIndent => t.start_paragraph(false),
            Math => t.math_shift(),
            DisplayMath => t.display_math_shift(),
            BeginGroup => t.left_brace(),
            EndGroup => t.right_brace(),
            Subscript => t.subscript_mark(),
            Superscript => t.superscript_mark(),
            Tab => t.tab(),
            Cr => t.cr(),
            Crcr => t.crcr(),
            Span => t.span(),
            Omit => t.omit(),
            Unskip => t.remove_last_node().map(|_| ()),
        };
        self.check(statement, result).map(|_| ())
    }

    fn run_box(
        &mut self,
        statement: &Statement<'a>,
        horizontal: bool,
        content: &[Statement<'a>],
    ) -> Result<(), Halt> {
        let entry = self.typesetter.depth();
        let begin = if horizontal {
            self.typesetter.begin_hbox()
        } else {
            self.typesetter.begin_vbox()
        };
        if self.check(statement, begin)?.is_none() {
            return Ok(());
        }
        self.run_all(content)?;
        let end = self.typesetter.end_box();
        if self.check(statement, end)?.is_none() {
            // Errors while closing are logged; the one above is reported.
            _ = self.typesetter.close_to_depth(entry);
        }
        Ok(())
    }

    /// Typesets the content in a temporary box and returns what the box holds.
    fn build_list(
        &mut self,
        statement: &Statement<'a>,
        horizontal: bool,
        content: &[Statement<'a>],
    ) -> Result<Option<node::NodeList>, Halt> {
        let entry = self.typesetter.depth();
        let begin = if horizontal {
            self.typesetter.begin_hbox()
        } else {
            self.typesetter.begin_vbox()
        };
        if self.check(statement, begin)?.is_none() {
            return Ok(None);
        }
        self.run_all(content)?;
        let list = self.typesetter.take_box_contents();
        match self.check(statement, list)? {
            Some(list) => Ok(Some(list)),
            None if self.typesetter.depth() > entry => {
                _ = self.typesetter.close_to_depth(entry + 1);
                Ok(self.typesetter.take_box_contents().ok())
            }
            None => Ok(None),
        }
    }

    fn run_alignment(
        &mut self,
        statement: &Statement<'a>,
        preamble: &[Statement<'a>],
        content: &[Statement<'a>],
    ) -> Result<(), Halt> {
        let mut templates = vec![];
        for column in preamble {
            let Command::Column(args) = &column.command else {
                self.misplaced(column, "command lists, not in an `halign` preamble")?;
                continue;
            };
            let pre: Vec<Node> = self
                .build_list(column, true, &args.pre.value)?
                .map(node::NodeList::into_nodes)
                .unwrap_or_default();
            let post: Vec<Node> = self
                .build_list(column, true, &args.post.value)?
                .map(node::NodeList::into_nodes)
                .unwrap_or_default();
            templates.push(ColumnTemplate { pre, post });
        }
        let begin = self.typesetter.begin_alignment(templates);
        if self.check(statement, begin)?.is_none() {
            return Ok(());
        }
        // Beginning an alignment may end a paragraph first.
        let entry = self.typesetter.depth() - 1;
        self.run_all(content)?;
        let end = self.typesetter.end_alignment();
        if self.check(statement, end)?.is_none() {
            _ = self.typesetter.close_to_depth(entry);
        }
        Ok(())
    }

    fn run_shipout(&mut self, statement: &Statement<'a>, content: &[Statement<'a>]) -> Result<(), Halt> {
        if let Some(list) = self.build_list(statement, false, content)? {
            self.typesetter.shipout(VList::new(list));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxworks::page::PageCollector;
    use boxworks::Parameters;
    use dimen::Scaled;
    use font::{FontTable, GlyphBox};

    fn new_typesetter() -> Typesetter {
        let fonts = FontTable::new()
            .with_default_glyph(
                0,
                GlyphBox {
                    width: Scaled::ONE * 5,
                    height: Scaled::ONE * 7,
                    depth: Scaled::ONE * 2,
                    ..Default::default()
                },
            )
            .with_space(
                0,
                dimen::Glue {
                    width: Scaled::ONE * 5,
                    stretch: Scaled::ONE * 2,
                    shrink: Scaled::ONE,
                    ..Default::default()
                },
            );
        let params = Parameters {
            hsize: Some(Scaled::ONE * 100),
            ..Default::default()
        };
        Typesetter::new(params, Box::new(fonts))
    }

    fn run_source(source: &str, options: Options) -> (Outcome, Typesetter<PageCollector>) {
        let statements = crate::parse(source).expect("source parses");
        let mut typesetter = new_typesetter();
        let outcome = run(&statements, &mut typesetter, options);
        (outcome, typesetter)
    }

    #[test]
    fn text_builds_a_paragraph() {
        let (outcome, typesetter) = run_source(r#"text("ab cd")"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(typesetter.mode(), boxworks::Mode::Horizontal);
        assert_eq!(typesetter.depth(), 2);
    }

    fn contributed(typesetter: &Typesetter) -> &[Node] {
        typesetter.page_builder().current().nodes()
    }

    #[test]
    fn hbox_is_contributed() {
        let (outcome, typesetter) =
            run_source(r#"hbox([text("ab") kern(1pt)])"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(typesetter.depth(), 1);
        let [Node::HList(hlist)] = contributed(&typesetter) else {
            panic!("expected one hlist, got {:?}", contributed(&typesetter));
        };
        assert_eq!(hlist.width(), Scaled::ONE * 11);
    }

    #[test]
    fn unskip_removes_last_node() {
        let (outcome, typesetter) =
            run_source(r#"hbox([kern(1pt) kern(2pt) unskip()])"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        let [Node::HList(hlist)] = contributed(&typesetter) else {
            panic!("expected one hlist, got {:?}", contributed(&typesetter));
        };
        assert_eq!(hlist.width(), Scaled::ONE);
    }

    #[test]
    fn typesetting_errors_are_collected() {
        let (outcome, typesetter) = run_source("egroup() kern(1pt) egroup()", Default::default());
        assert_eq!(outcome.errors.len(), 2);
        assert!(!outcome.halted);
        assert!(matches!(
            &outcome.errors[0],
            Error::Typesetting {
                error: boxworks::Error::ExtraRightBrace,
                ..
            }
        ));
        assert!(matches!(contributed(&typesetter), [Node::Kern(_)]));
    }

    #[test]
    fn unclosed_math_in_box_is_closed() {
        let (outcome, typesetter) =
            run_source(r#"hbox([math() text("x")]) kern(1pt)"#, Default::default());
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            &outcome.errors[0],
            Error::Typesetting {
                error: boxworks::Error::Mode { .. },
                ..
            }
        ));
        assert_eq!(typesetter.depth(), 1);
        assert!(matches!(
            contributed(&typesetter),
            [Node::HList(_), Node::Kern(_)]
        ));
    }

    #[test]
    fn unclosed_math_in_template_is_closed() {
        let (outcome, typesetter) = run_source(
            r#"halign([column(pre=[math() text("x")])], [text("a") cr()]) kern(1pt)"#,
            Default::default(),
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(typesetter.depth(), 1);
        assert!(matches!(contributed(&typesetter).last(), Some(Node::Kern(_))));
    }

    #[test]
    fn unclosed_math_in_alignment_is_closed() {
        let (outcome, typesetter) = run_source(
            r#"text("a") halign([column()], [math() text("x")]) kern(1pt)"#,
            Default::default(),
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(typesetter.depth(), 1);
        assert!(matches!(contributed(&typesetter).last(), Some(Node::Kern(_))));
    }

    #[test]
    fn language_is_shown() {
        let (outcome, _) =
            run_source(r#"text("a") language(2) showlists()"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        assert!(outcome.output.contains("spacefactor 1000, current language 2"));
    }

    #[test]
    fn halt_on_error() {
        let options = Options {
            halt_on_error: true,
        };
        let (outcome, typesetter) = run_source("egroup() kern(1pt) egroup()", options);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.halted);
        assert!(contributed(&typesetter).is_empty());
    }

    #[test]
    fn misplaced_functions() {
        let (outcome, _) = run_source(
            "column() line() parshape([kern(1pt)]) halign([text(\"a\")], [])",
            Default::default(),
        );
        let names: Vec<&str> = outcome
            .errors
            .iter()
            .map(|err| match err {
                Error::MisplacedFunction { function_name, .. } => function_name.str(),
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["column", "line", "kern", "text"]);
    }

    #[test]
    fn parshape_sets_parameter() {
        let (outcome, typesetter) = run_source(
            "parshape([line(1pt, 10pt) line(2pt, 20pt)]) hangindent(3pt, -2)",
            Default::default(),
        );
        assert_eq!(outcome.errors, vec![]);
        let params = typesetter.params();
        assert_eq!(
            params.par_shape,
            vec![
                (Scaled::ONE, Scaled::ONE * 10),
                (Scaled::ONE * 2, Scaled::ONE * 20)
            ]
        );
        assert_eq!(params.hang_indent, Scaled::ONE * 3);
        assert_eq!(params.hang_after, -2);
    }

    #[test]
    fn shipout_sends_a_page() {
        let (outcome, typesetter) =
            run_source(r#"shipout([hbox([text("a")])])"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(typesetter.depth(), 1);
        assert!(contributed(&typesetter).is_empty());
        let pages = typesetter.page_builder().pages();
        assert_eq!(pages.len(), 1);
        assert!(matches!(pages[0].list.nodes(), [Node::HList(_)]));
    }

    #[test]
    fn showlists_output() {
        let (outcome, _) = run_source(r#"showlists()"#, Default::default());
        assert_eq!(outcome.errors, vec![]);
        assert!(outcome.output.starts_with("### vertical mode entered at line 0"));
    }

    #[test]
    fn halign_with_template() {
        let (outcome, typesetter) = run_source(
            r#"halign(
                [column(pre=[kern(1pt)]) column()],
                [text("a") tab() text("b") cr()]
            )"#,
            Default::default(),
        );
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(typesetter.depth(), 1);
        assert!(matches!(contributed(&typesetter), [Node::HList(_)]));
    }
}
