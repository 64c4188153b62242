//! # Boxworks language
//!
//! This crate defines a small command language, the Box language,
//!     that drives the [Boxworks typesetter](boxworks::Typesetter).
//! A Box program is a script of commands like "typeset this text",
//!     "add this glue" or "end the paragraph".
//! Each command is turned into one or more calls on the typesetter,
//!     so the language can exercise the engine without a TeX interpreter in front of it.
//!
//! ```
//! use boxworks_lang as bwl;
//!
//! let source = r#"
//!     ## The text() function typesets some text.
//!     ## Spaces become interword glue from the font.
//!     text("Box Lang")
//!     ## Or glue can be added manually.
//!     glue(1pt, 5fil, 0.075in)
//!     par()
//! "#;
//! let statements = bwl::parse(source).unwrap();
//! assert_eq!(statements.len(), 3);
//! ```
//!
//! ## Language specification
//!
//! A Boxworks language program is a sequence of a function calls
//! like `text("ABC")` or `glue(10pt, 3pt, 2pt)`.
//! Functions that take no arguments are written with empty parentheses,
//! like `par()`.
//! Everything from a `#` to the end of the line is a comment.
//!
//! ### Function arguments
//!
//! Each function accepts a number of arguments.
//! Every argument to every function is optional.
//!
//! Arguments can be provided positionally, like `text("A", 1)`,
//! or by keyword, potentially out of order, like `text(font=2, content="B")`,
//! or by a combination of both, like `text("C", font=3)`.
//! However, all positional arguments must be provided before
//! keyword arguments:
//!
//! ```
//! # use boxworks_lang as bwl;
//! let errs = bwl::parse(r#"text(content="C", 3)"#).unwrap_err();
//! assert![matches![
//!     errs[0],
//!     bwl::Error::PositionalArgAfterKeywordArg{..}
//! ]];
//! ```
//!
//! ### Function argument types
//!
//! | Name | Description | Examples
//! |------|-------------|---------
//! | String | UTF-8 characters between double quotes. The escapes `\"`, `\\`, `\n` and `\u{..}` are recognized. | `"a string"`
//! | Integer | Decimal integer in the range (-2^31,2^31). | `123`, `-456`
//! | Dimension | Decimal number with a unit attached. The format and the allowable units are the same as in TeX. | `1pt`, `2.04in`, `-10sp`
//! | Glue stretch or shrink | A dimension where the unit can alternatively be an infinite stretch/shrink unit. | `1fil`, `-2fill`, `3filll`
//! | List | A sequence of function calls between square brackets. | `[text("A") kern(1pt)]`
//!
//! ### Available functions
//!
//! | Function | Arguments | Typesetter operation
//! |----------|-----------|---------------------
//! | `text` | `content`: string, `font`: integer | a letter for each character, and a space for each whitespace character
//! | `glue` | `width`: dimension, `stretch` and `shrink`: glue stretch or shrink | add glue
//! | `kern` | `width`: dimension | add an explicit kern
//! | `penalty` | `value`: integer | add a penalty
//! | `rule` | `width`, `height`, `depth`: dimensions, running when omitted | add a rule
//! | `mark` | `content`: string, `class`: integer | add a mark
//! | `hbox`, `vbox` | `content`: list | typeset the content in a new box
//! | `halign` | `preamble`: list of `column`, `content`: list | typeset an alignment
//! | `column` | `pre`, `post`: lists | a column template of `halign`
//! | `parshape` | `lines`: list of `line` | set the shape of the next paragraph
//! | `line` | `indent`, `length`: dimensions | one line of `parshape`
//! | `hangindent` | `indent`: dimension, `after`: integer | set hanging indentation
//! | `spacefactor` | `value`: integer | set the space factor
//! | `language` | `value`: integer | set the language of the current paragraph
//! | `prevdepth` | `depth`: dimension | set the previous depth
//! | `shipout` | `content`: list | typeset the content in a vbox and ship it out
//! | `showlists` | `depth`, `breadth`: integers | display every list being built
//! | `par` | | end the paragraph
//! | `indent`, `noindent` | | start a paragraph
//! | `math`, `display` | | a math shift or display math shift
//! | `bgroup`, `egroup` | | a left or right brace
//! | `sub`, `sup` | | a subscript or superscript mark
//! | `tab`, `cr`, `crcr`, `span`, `omit` | | alignment commands
//! | `unskip` | | remove the last node of the current list

pub mod ast;
mod error;
pub mod lexer;
pub mod parse;
pub mod run;

pub use ast::parse;
pub use error::{Error, ErrorLabel};
pub use run::{run, Options, Outcome};

/// A piece of Box source code.
///
/// The full source is kept so that the position of the piece can be reported.
#[derive(Debug, Clone)]
pub struct Str<'a> {
    value: &'a str,
    start: usize,
    end: usize,
}

impl<'a> Str<'a> {
    fn new(value: &'a str) -> Str<'a> {
        Str {
            value,
            start: 0,
            end: value.len(),
        }
    }

    /// Byte range of this piece within the source.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// The piece itself.
    pub fn str(&self) -> &'a str {
        &self.value[self.span()]
    }

    /// Line of the source on which the piece starts, counting from 1.
    pub fn line(&self) -> usize {
        self.value[..self.start].matches('\n').count() + 1
    }
}

impl<'a> From<&'a str> for Str<'a> {
    fn from(value: &'a str) -> Self {
        Str::new(value)
    }
}

impl<'a> std::fmt::Display for Str<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.str())
    }
}

impl<'a> PartialEq for Str<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.str() == other.str()
    }
}

impl<'a> Eq for Str<'a> {}

/// Pretty-format Box source code.
///
/// Comments are preserved.
pub fn format(source: &str) -> Result<String, Vec<error::Error>> {
    let mut l = lexer::Lexer::new(source);
    let func_calls = parse::parse_list(&mut l);
    l.check_errors()?;
    let mut s = String::new();
    for func_call in func_calls {
        s.push_str(&func_call.to_string());
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let input = r#"hbox

        (

    content = [ glue(  1.0pt, shrink =2.0pt

    )

    text("Hello", font =

    0) text("World")] ,

)
"#;
        let want = r#"hbox(
  content=[
    glue(1.0pt, shrink=2.0pt)
    text("Hello", font=0)
    text("World")
  ],
)
"#;
        let got = format(&input).unwrap();
        similar_asserts::assert_eq!(got, want);
    }

    #[test]
    fn line_numbers() {
        let source = "par()\n\ntext(\"a\")\n";
        let statements = parse(source).unwrap();
        assert_eq!(statements[0].func_name.line(), 1);
        assert_eq!(statements[1].func_name.line(), 3);
    }
}
