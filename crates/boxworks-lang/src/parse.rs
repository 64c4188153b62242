//! Box language parse tree.
//!
//! The parser never stops at the first error.
//! After a malformed function call it skips to the end of the call and continues,
//! so that one run reports as many errors as possible.

use std::borrow::Cow;

use super::lexer::{self, Token, TokenValue};
use super::Error;
use super::Str;

/// An argument to a function.
#[derive(Debug, PartialEq, Eq)]
pub struct Arg<'a> {
    pub comments: Vec<&'a str>,
    pub value: Value<'a>,
    pub source: Str<'a>,
}

/// The value of an argument to a function.
#[derive(Debug, PartialEq, Eq)]
pub enum Value<'a> {
    Integer(i32),
    Scaled(dimen::Scaled),
    InfiniteGlue(dimen::Scaled, dimen::GlueOrder),
    String(Cow<'a, str>),
    List(Vec<FuncCall<'a>>),
}

impl<'a> Value<'a> {
    pub fn description(&self) -> &'static str {
        use Value::*;
        match self {
            Integer(_) => "an integer",
            Scaled(_) => "a number",
            InfiniteGlue(_, _) => "an infinite glue component",
            String(_) => "a string",
            List(_) => "a list",
        }
    }
    fn display(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        use Value::*;
        match self {
            Integer(i) => write!(f, "{i}"),
            Scaled(scaled) => write!(f, "{scaled}"),
            InfiniteGlue(scaled, glue_order) => {
                scaled.display_no_units(f)?;
                write!(f, "{glue_order}")
            }
            String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' | '\\' => write!(f, "\\{c}")?,
                        '\n' => write!(f, "\\n")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            List(func_calls) => {
                let indent = " ".repeat(depth);
                writeln!(f, "[")?;
                for call in func_calls {
                    call.display(f, depth + 2)?;
                }
                write!(f, "{indent}]")?;
                Ok(())
            }
        }
    }
}

impl<'a> std::fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

impl<'a> Arg<'a> {
    fn parse(l: &mut lexer::Lexer<'a>, mut comments: Vec<&'a str>) -> Option<Self> {
        let token = l.peek(&mut comments)?;
        let value = match token.value {
            TokenValue::String(s) => Value::String(s),
            TokenValue::Integer(n) => Value::Integer(n),
            TokenValue::Scaled(n) => Value::Scaled(n),
            TokenValue::InfiniteGlue(s, o) => Value::InfiniteGlue(s, o),
            TokenValue::SquareOpen { .. } => {
                l.next(&mut comments);
                return Some(Arg {
                    comments,
                    value: Value::List(parse_items(l, true)),
                    source: Str {
                        end: l.cur_pos(),
                        ..token.source
                    },
                });
            }
            _ => {
                unexpected(l, token, "a value");
                recover(l);
                return None;
            }
        };
        l.next(&mut comments);
        Some(Arg {
            comments,
            value,
            source: token.source,
        })
    }
}

/// A function call.
#[derive(Debug, PartialEq, Eq)]
pub struct FuncCall<'a> {
    /// Comments before the function call.
    pub comments: Vec<&'a str>,
    /// Name of the function.
    pub func_name: Str<'a>,
    /// Arguments to the function.
    ///
    /// For each element, the first part of the tuple is [`None`]
    /// if it's a positional argument, or the argument name if it's a
    /// keyword argument.
    /// The second element of the tuple is the value of the argument.
    pub args: Vec<(Option<Str<'a>>, Arg<'a>)>,
    /// Comments between the last argument and the closing parenthesis.
    pub trailing_comments: Vec<&'a str>,
}

impl<'a> FuncCall<'a> {
    fn display(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = " ".repeat(depth);
        for comment in &self.comments {
            writeln!(f, "{indent}#{comment}")?;
        }
        write!(f, "{indent}{}(", self.func_name)?;
        let multiline = {
            let many_args = self.args.len() > 4;
            let has_list_arg = self
                .args
                .iter()
                .any(|(_, arg)| matches!(arg.value, Value::List(_)));
            let has_arg_comments = self.args.iter().any(|(_, arg)| !arg.comments.is_empty());
            many_args || has_list_arg || has_arg_comments || !self.trailing_comments.is_empty()
        };
        if multiline {
            for (keyword, arg) in &self.args {
                for comment in &arg.comments {
                    write!(f, "\n{indent}  #{comment}")?;
                }
                write!(f, "\n{indent}  ")?;
                if let Some(keyword) = keyword {
                    write!(f, "{keyword}=")?;
                }
                arg.value.display(f, depth + 2)?;
                write!(f, ",")?;
            }
            for comment in &self.trailing_comments {
                write!(f, "\n{indent}  #{comment}")?;
            }
            writeln!(f, "\n{indent})")?;
        } else {
            let mut remaining_args = self.args.len();
            for (keyword, arg) in &self.args {
                if let Some(keyword) = keyword {
                    write!(f, "{keyword}=")?;
                }
                arg.value.display(f, depth + 2)?;
                remaining_args = remaining_args.saturating_sub(1);
                if remaining_args > 0 {
                    write!(f, ", ")?;
                }
            }
            writeln!(f, ")")?;
        }

        Ok(())
    }
}

impl<'a> std::fmt::Display for FuncCall<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

/// Parses a sequence of function calls that runs to the end of the input.
pub fn parse_list<'a>(l: &mut lexer::Lexer<'a>) -> Vec<FuncCall<'a>> {
    parse_items(l, false)
}

/// Parses function calls until the end of the input or,
/// if `nested` is true, until a closing `]`.
fn parse_items<'a>(l: &mut lexer::Lexer<'a>, nested: bool) -> Vec<FuncCall<'a>> {
    let mut v = vec![];
    // After an error, stray tokens up to the next function name are skipped silently.
    let mut skipping = false;
    loop {
        let mut comments = vec![];
        let Some(next) = l.next(&mut comments) else {
            // A missing `]` has already been reported by the lexer.
            return v;
        };
        match next.value {
            TokenValue::Keyword => {}
            TokenValue::SquareClose if nested => return v,
            _ => {
                if !skipping {
                    unexpected(l, next, "a function name");
                }
                skipping = true;
                continue;
            }
        }
        match parse_call(l, comments, next.source) {
            Some(func_call) => {
                skipping = false;
                v.push(func_call);
            }
            None => skipping = true,
        }
    }
}

fn parse_call<'a>(
    l: &mut lexer::Lexer<'a>,
    comments: Vec<&'a str>,
    func_name: Str<'a>,
) -> Option<FuncCall<'a>> {
    let mut func_call = FuncCall {
        comments,
        func_name,
        args: vec![],
        trailing_comments: vec![],
    };
    // parse (
    match l.peek(&mut func_call.comments) {
        Some(Token {
            value: TokenValue::RoundOpen { .. },
            ..
        }) => {
            l.next(&mut func_call.comments);
        }
        Some(token) => {
            unexpected(l, token, "`(`");
            return None;
        }
        None => {
            let end = l.end_of_input();
            l.errs_mut().push(Error::UnexpectedEndOfInput {
                end,
                expected: "`(`",
            });
            return None;
        }
    }
    // parse the arguments
    loop {
        let mut comments = vec![];
        let next = l.peek(&mut comments)?;
        let mut arg = match next.value {
            // no more arguments
            TokenValue::RoundClose => {
                // consume the token
                l.next(&mut comments);
                func_call.trailing_comments = comments;
                break;
            }
            // key=value argument
            TokenValue::Keyword => {
                l.next(&mut comments);
                match l.peek(&mut comments)? {
                    Token {
                        value: TokenValue::Equal,
                        ..
                    } => {
                        l.next(&mut comments);
                    }
                    token => {
                        unexpected(l, token, "`=`");
                        recover(l);
                        return None;
                    }
                }
                let value = Arg::parse(l, comments)?;
                (Some(next.source), value)
            }
            // positional argument
            _ => {
                let value = Arg::parse(l, comments)?;
                (None, value)
            }
        };
        let mut comments = vec![];
        let token = l.peek(&mut comments)?;
        match token.value {
            TokenValue::RoundClose => {
                l.next(&mut comments);
                func_call.args.push(arg);
                func_call.trailing_comments = comments;
                break;
            }
            TokenValue::Comma => {
                l.next(&mut comments);
                arg.1.comments.extend_from_slice(&comments);
                func_call.args.push(arg);
                continue;
            }
            _ => {
                unexpected(l, token, "`,` or `)`");
                recover(l);
                return None;
            }
        }
    }
    Some(func_call)
}

fn unexpected<'a>(l: &mut lexer::Lexer<'a>, token: Token<'a>, expected: &'static str) {
    l.errs_mut().push(Error::UnexpectedToken {
        token: token.source,
        expected,
    });
}

/// Skips tokens up to and including the `)` that closes the current function call.
///
/// A `]` that closes an enclosing list is not consumed.
fn recover(l: &mut lexer::Lexer) {
    let mut depth = 0_usize;
    let mut comments = vec![];
    while let Some(token) = l.peek(&mut comments) {
        match token.value {
            TokenValue::RoundOpen { .. } | TokenValue::SquareOpen { .. } => depth += 1,
            TokenValue::RoundClose | TokenValue::SquareClose if depth > 0 => depth -= 1,
            TokenValue::RoundClose => {
                l.next(&mut comments);
                return;
            }
            TokenValue::SquareClose => return,
            _ => {}
        }
        l.next(&mut comments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_parse_test(input: &str, want: Vec<FuncCall>) {
        let mut l = lexer::Lexer::new(input);
        let got = parse_list(&mut l);
        assert_eq!(got, want);
        assert_eq!(Ok(()), l.check_errors());
    }

    macro_rules! parse_tests {
        ( $( (
            $name: ident,
            $input: expr,
            $want: expr,
        ), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let input = $input;
                    let want = $want;
                    run_parse_test(&input, want);
                }
            )+
        };
    }

    parse_tests!(
        (
            basic_case,
            "a(b=[c()])",
            vec![FuncCall {
                comments: vec![],
                func_name: "a".into(),
                args: vec![(
                    Some("b".into()),
                    Arg {
                        comments: vec![],
                        value: Value::List(vec![FuncCall {
                            comments: vec![],
                            func_name: "c".into(),
                            args: vec![],
                            trailing_comments: vec![],
                        }]),
                        source: "[c()]".into(),
                    },
                )],
                trailing_comments: vec![],
            }],
        ),
        (
            two_calls,
            "par() kern(1pt)",
            vec![
                FuncCall {
                    comments: vec![],
                    func_name: "par".into(),
                    args: vec![],
                    trailing_comments: vec![],
                },
                FuncCall {
                    comments: vec![],
                    func_name: "kern".into(),
                    args: vec![(
                        None,
                        Arg {
                            comments: vec![],
                            value: Value::Scaled(dimen::Scaled::ONE),
                            source: "1pt".into(),
                        },
                    )],
                    trailing_comments: vec![],
                },
            ],
        ),
    );

    fn run_comments_test(
        input: &str,
        func_comments: Vec<&'static str>,
        arg_1_comments: Vec<&'static str>,
        arg_2_comments: Vec<&'static str>,
        trailing_comments: Vec<&'static str>,
    ) {
        let want = vec![FuncCall {
            comments: func_comments,
            func_name: "f".into(),
            args: vec![
                (
                    None,
                    Arg {
                        comments: arg_1_comments,
                        value: Value::Integer(3),
                        source: "3".into(),
                    },
                ),
                (
                    Some("key".into()),
                    Arg {
                        comments: arg_2_comments,
                        value: Value::Integer(4),
                        source: "4".into(),
                    },
                ),
            ],
            trailing_comments,
        }];
        run_parse_test(input, want);
    }

    macro_rules! comment_tests {
        ( $( (
            $name: ident,
            $input: expr,
            $(
                func_comments: $func_comments: expr,
            )?
            $(
                arg_1_comments: $arg_1_comments: expr,
            )?
            $(
                arg_2_comments: $arg_2_comments: expr,
            )?
            $(
                trailing_comments: $trailing_comments: expr,
            )?
        ), )+ ) => {
            $(
                #[test]
                #[allow(unused_assignments, unused_mut)]
                fn $name() {
                    let input = $input;
                    let mut func_comments = vec![];
                    $(
                        func_comments = $func_comments;
                    )?
                    let mut arg_1_comments = vec![];
                    $(
                        arg_1_comments = $arg_1_comments;
                    )?
                    let mut arg_2_comments = vec![];
                    $(
                        arg_2_comments = $arg_2_comments;
                    )?
                    let mut trailing_comments = vec![];
                    $(
                        trailing_comments = $trailing_comments;
                    )?
                    run_comments_test(&input, func_comments, arg_1_comments, arg_2_comments, trailing_comments);
                }
            )+
        };
    }

    comment_tests!(
        (
            comment_0,
            "f(3,key=4,)",
        ),
        (
            comment_1,
            "#X\nf(3,key=4,)",
            func_comments: vec!["X"],
        ),
        (
            comment_2,
            "f#X\n(3,key=4,)",
            func_comments: vec!["X"],
        ),
        (
            comment_3,
            "f(#X\n3,key=4,)",
            arg_1_comments: vec!["X"],
        ),
        (
            comment_4,
            "f(3#X\n,key=4,)",
            arg_1_comments: vec!["X"],
        ),
        (
            comment_5,
            "f(3,#X\nkey=4,)",
            arg_2_comments: vec!["X"],
        ),
        (
            comment_6,
            "f(3,key#X\n=4,)",
            arg_2_comments: vec!["X"],
        ),
        (
            comment_7,
            "f(3,key=#X\n4,)",
            arg_2_comments: vec!["X"],
        ),
        (
            comment_8,
            "f(3,key=4#X\n,)",
            arg_2_comments: vec!["X"],
        ),
        (
            comment_9,
            "f(3,key=4,#X\n)",
            trailing_comments: vec!["X"],
        ),
        (
            comment_10,
            "f(3,key=4#X\n)",
            trailing_comments: vec!["X"],
        ),
    );

    fn parse_with_errors(input: &str) -> (Vec<&str>, usize) {
        let mut l = lexer::Lexer::new(input);
        let got: Vec<&str> = parse_list(&mut l)
            .iter()
            .map(|call| call.func_name.str())
            .collect();
        let errs = l.check_errors().err().unwrap_or_default();
        (got, errs.len())
    }

    macro_rules! recovery_tests {
        ( $( ($name: ident, $input: expr, $want_calls: expr, $want_errs: expr,), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let (got, errs) = parse_with_errors($input);
                    assert_eq!(got, $want_calls);
                    assert_eq!(errs, $want_errs);
                }
            )+
        };
    }

    recovery_tests!(
        (missing_comma, "a(1 2) b()", vec!["b"], 1,),
        (missing_value, "a(x=) b()", vec!["b"], 1,),
        (missing_equals, "a(x 1) b()", vec!["b"], 1,),
        (missing_paren, "a 1 2 b()", vec!["b"], 1,),
        (stray_close, "a() ] b()", vec!["a", "b"], 1,),
        (error_inside_list, "a([b(1 2) c()]) d()", vec!["a", "d"], 1,),
    );
}
