use boxworks::show::{self, Limits};
use boxworks::{Parameters, Typesetter};
use boxworks_lang as bwl;
use clap::Parser;
use dimen::{Glue, Scaled};
use font::{FontTable, Format, GlyphBox};
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    if let Err(err) = Cli::parse().run() {
        if !err.is_empty() {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}

/// Box: a CLI for Boxworks
#[derive(Debug, Parser)]
#[command(name = "box", version, about, max_term_width(100))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn run(self) -> Result<(), String> {
        match self.command {
            Command::Check(check) => check.run(),
            Command::Fmt(format) => format.run(),
            Command::Run(run) => run.run(),
        }
    }
}

#[derive(Clone, Debug, clap::Subcommand)]
enum Command {
    /// Check that a Box file is valid.
    Check(Check),

    /// Format a Box file.
    Fmt(Fmt),

    /// Typeset a Box file and print the pages it produces.
    ///
    /// Every page, whether shipped out explicitly with `shipout` or
    ///     collected from the main vertical list when the file ends,
    ///     is printed the way TeX displays boxes.
    /// Output of `showlists` commands is printed before the pages.
    ///
    /// Errors are reported with the location of the command that raised them
    ///     and typesetting continues, unless `--halt-on-error` is passed.
    ///
    /// Without `--fonts` fonts 0 to 15 are monospaced fonts with 5pt wide glyphs;
    ///     without `--params` lines are 100pt wide.
    Run(Run),
}

#[derive(Clone, Debug, Parser)]
struct Check {
    /// Path to the Box file.
    path: PathBuf,
}

impl Check {
    fn run(&self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        if let Err(errs) = bwl::parse(&source) {
            report_errors(&self.path, &source, &errs);
            return Err(format!("Input file had {} errors", errs.len()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Parser)]
struct Fmt {
    /// Path to the Box file.
    path: PathBuf,

    /// Write the formatted source back to the file instead of printing it.
    #[arg(short, long)]
    write: bool,
}

impl Fmt {
    fn run(&self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        let formatted = match bwl::format(&source) {
            Ok(formatted) => formatted,
            Err(errs) => {
                report_errors(&self.path, &source, &errs);
                return Err(format!("Input file had {} errors", errs.len()));
            }
        };
        if self.write {
            if let Err(err) = fs::write(&self.path, formatted) {
                return Err(format!("Failed to write `{}`: {}", self.path.display(), err));
            }
        } else {
            print!("{formatted}");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Parser)]
struct Run {
    /// Path to the Box file.
    path: PathBuf,

    /// JSON file with typesetting parameters.
    ///
    /// Parameters missing from the file take their default values.
    /// Dimensions are given in scaled points:
    ///
    ///     {"hsize": 6553600, "par_indent": 1310720}
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// JSON file with font metrics.
    #[arg(short, long)]
    fonts: Option<PathBuf>,

    /// Print every list being built when the file ends.
    #[arg(short, long)]
    show_lists: bool,

    /// Stop at the first error.
    #[arg(long)]
    halt_on_error: bool,
}

impl Run {
    fn run(&self) -> Result<(), String> {
        let source = read_source(&self.path)?;
        let statements = match bwl::parse(&source) {
            Ok(statements) => statements,
            Err(errs) => {
                report_errors(&self.path, &source, &errs);
                return Err(format!("Input file had {} errors", errs.len()));
            }
        };
        let params = match &self.params {
            None => Parameters {
                hsize: Some(Scaled::ONE * 100),
                ..Default::default()
            },
            Some(path) => {
                let data = read_source(path)?;
                serde_json::from_str(&data)
                    .map_err(|err| format!("Failed to parse `{}`: {}", path.display(), err))?
            }
        };
        let fonts = match &self.fonts {
            None => monospaced_font(),
            Some(path) => {
                let data = match fs::read(path) {
                    Ok(data) => data,
                    Err(err) => return Err(format!("Failed to read `{}`: {}", path.display(), err)),
                };
                FontTable::parse(&data)
                    .map_err(|err| format!("Failed to parse `{}`: {}", path.display(), err))?
            }
        };

        let mut typesetter = Typesetter::new(params, Box::new(fonts));
        let outcome = bwl::run(
            &statements,
            &mut typesetter,
            bwl::Options {
                halt_on_error: self.halt_on_error,
            },
        );
        report_errors(&self.path, &source, &outcome.errors);
        if outcome.halted {
            return Err("Typesetting halted after an error".into());
        }
        if !outcome.output.is_empty() {
            println!("{}", outcome.output);
        }
        if self.show_lists {
            let mut s = String::new();
            // Writing to a string can't fail.
            _ = typesetter.show_lists(&mut s, usize::MAX, usize::MAX);
            println!("{s}");
        }
        let finish_error = typesetter.finish().err();
        if let Some(err) = &finish_error {
            eprintln!("Error at the end of the file: {err}");
        }

        let pages = typesetter.into_page_builder().into_pages();
        log::info!("typeset {} pages", pages.len());
        for (i, page) in pages.into_iter().enumerate() {
            println!("### page {}", i + 1);
            println!("{}", show::show_box(&page.into(), Limits::default()));
        }

        let num_errors = outcome.errors.len() + usize::from(finish_error.is_some());
        if num_errors > 0 {
            return Err(format!("Typesetting had {num_errors} errors"));
        }
        Ok(())
    }
}

/// Font metrics used when no fonts file is given.
///
/// Every font has glyphs 5pt wide, 7pt high and 2pt deep,
///     and spaces of 5pt plus 2pt minus 1pt.
fn monospaced_font() -> FontTable {
    let mut table = FontTable::new();
    for font in 0..16 {
        table = table
            .with_default_glyph(
                font,
                GlyphBox {
                    width: Scaled::ONE * 5,
                    height: Scaled::ONE * 7,
                    depth: Scaled::ONE * 2,
                    ..Default::default()
                },
            )
            .with_space(
                font,
                Glue {
                    width: Scaled::ONE * 5,
                    stretch: Scaled::ONE * 2,
                    shrink: Scaled::ONE,
                    ..Default::default()
                },
            );
    }
    table
}

fn read_source(path: &Path) -> Result<String, String> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(err) => Err(format!("Failed to read `{}`: {}", path.display(), err)),
    }
}

fn report_errors(path: &Path, source: &str, errs: &[bwl::Error]) {
    let path = path.to_string_lossy();
    let cache: (&str, _) = (&path, ariadne::Source::from(source));
    for err in errs {
        if let Err(io_err) = err.ariadne_report(&path).eprint(cache.clone()) {
            log::error!("failed to print error report: {io_err}");
            eprintln!("{err}");
        }
    }
}
