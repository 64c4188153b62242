use super::Str;

/// Error encountered when parsing or running Box language.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<'a> {
    /// A character that cannot start any token.
    InvalidCharacter { char: Str<'a> },

    /// A number with more than one decimal point, like `1.2.3pt`.
    MultipleDecimalPoints { point: Str<'a> },

    /// A dimension with an unknown unit.
    InvalidDimensionUnit {
        dimension: Str<'a>,
        unit: Str<'a>,
    },

    /// A decimal number without units.
    NumberWithoutUnits { number: Str<'a> },

    /// An integer or dimension that is out of range.
    NumberTooLarge { number: Str<'a> },

    /// A string that is not closed before the end of the input.
    UnterminatedString { string: Str<'a> },

    /// An escape sequence in a string that is not supported.
    InvalidEscape { escape: Str<'a> },

    /// An opening bracket with no closing bracket.
    UnmatchedOpeningBracket { open: Str<'a> },

    /// An opening bracket closed by a bracket of the other kind.
    MismatchedBrackets { open: Str<'a>, close: Str<'a> },

    /// A token that does not fit the grammar.
    UnexpectedToken {
        token: Str<'a>,
        expected: &'static str,
    },

    /// The input ended in the middle of a function call.
    UnexpectedEndOfInput {
        end: Str<'a>,
        expected: &'static str,
    },

    /// No function with this name exists.
    NoSuchFunction { function_name: Str<'a> },

    /// A positional argument appears after a keyword argument.
    ///
    /// This is an error, just like in Python.
    /// The problem is that it's ambiguous which parameter the
    /// positional argument should apply to.
    PositionalArgAfterKeywordArg {
        positional_arg: Str<'a>,
        keyword_arg: Str<'a>,
    },

    /// A function argument has the wrong type.
    IncorrectType {
        wanted_type: &'static str,
        got_type: &'static str,
        got_raw_value: Str<'a>,
        function_name: Str<'a>,
        parameter_name: &'a str,
    },

    /// Too many positional arguments provided.
    TooManyPositionalArgs {
        extra_positional_args: Vec<Str<'a>>,
        function_name: Str<'a>,
        max_positional_args: usize,
    },

    /// No such argument to this function.
    NoSuchArgument {
        function_name: Str<'a>,
        argument: Str<'a>,
    },

    /// The same argument was provided multiple times.
    DuplicateArgument {
        parameter_name: &'a str,
        first_assignment: Str<'a>,
        second_assignment: Str<'a>,
    },

    /// A function that may only appear inside the argument of another function.
    MisplacedFunction {
        function_name: Str<'a>,
        allowed_in: &'static str,
    },

    /// The typesetter rejected a command.
    Typesetting {
        function_name: Str<'a>,
        error: boxworks::Error,
    },
}

impl<'a> Error<'a> {
    pub fn message(&self) -> String {
        use Error::*;
        match self {
            InvalidCharacter { char } => format!["Invalid character `{char}`"],
            MultipleDecimalPoints { .. } => "A number has more than one decimal point".into(),
            InvalidDimensionUnit { unit, .. } => format!["Invalid dimension unit `{unit}`"],
            NumberWithoutUnits { .. } => "A decimal number has no units".into(),
            NumberTooLarge { .. } => "A number is too large".into(),
            UnterminatedString { .. } => "A string is not terminated".into(),
            InvalidEscape { escape } => format!["Invalid escape sequence `{escape}` in a string"],
            UnmatchedOpeningBracket { .. } => "An opening bracket is never closed".into(),
            MismatchedBrackets { .. } => "Mismatched brackets".into(),
            UnexpectedToken { token, .. } => format!["Unexpected `{token}`"],
            UnexpectedEndOfInput { .. } => "Unexpected end of input".into(),
            NoSuchFunction { function_name } => {
                format!["No function with name `{function_name}`"]
            }
            PositionalArgAfterKeywordArg { .. } => {
                "A positional argument appears after a keyword argument".into()
            }
            IncorrectType { .. } => "An argument has the wrong type".into(),
            TooManyPositionalArgs { .. } => "Too many positional arguments provided".into(),
            NoSuchArgument { .. } => "No such argument to this function".into(),
            DuplicateArgument { parameter_name, .. } => {
                format!["The `{parameter_name}` argument was provided multiple times"]
            }
            MisplacedFunction { function_name, .. } => {
                format!["The `{function_name}` function cannot be used here"]
            }
            Typesetting { error, .. } => first_upper(&error.to_string()),
        }
    }

    pub fn main_span(&self) -> std::ops::Range<usize> {
        use Error::*;
        match self {
            InvalidCharacter { char } => char.span(),
            MultipleDecimalPoints { point } => point.span(),
            InvalidDimensionUnit { unit, .. } => unit.span(),
            NumberWithoutUnits { number } | NumberTooLarge { number } => number.span(),
            UnterminatedString { string } => string.span(),
            InvalidEscape { escape } => escape.span(),
            UnmatchedOpeningBracket { open } | MismatchedBrackets { open, .. } => open.span(),
            UnexpectedToken { token, .. } => token.span(),
            UnexpectedEndOfInput { end, .. } => end.span(),
            NoSuchFunction { function_name } => function_name.span(),
            PositionalArgAfterKeywordArg { positional_arg, .. } => positional_arg.span(),
            IncorrectType { got_raw_value, .. } => got_raw_value.span(),
            TooManyPositionalArgs {
                extra_positional_args,
                function_name,
                ..
            } => match (extra_positional_args.first(), extra_positional_args.last()) {
                (Some(first), Some(last)) => first.start..last.end,
                _ => function_name.span(),
            },
            NoSuchArgument { argument, .. } => argument.span(),
            DuplicateArgument {
                first_assignment, ..
            } => first_assignment.span(),
            MisplacedFunction { function_name, .. } | Typesetting { function_name, .. } => {
                function_name.span()
            }
        }
    }

    pub fn labels(&self) -> Vec<ErrorLabel> {
        use Error::*;
        match self {
            InvalidCharacter { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "this character cannot appear here".into(),
            }],
            MultipleDecimalPoints { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "a second decimal point appears here".into(),
            }],
            InvalidDimensionUnit { dimension, unit } => vec![
                ErrorLabel {
                    span: unit.span(),
                    text: "unknown unit".into(),
                },
                ErrorLabel {
                    span: dimension.span(),
                    text: "in this dimension".into(),
                },
            ],
            NumberWithoutUnits { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "a unit like `pt` must follow a decimal number".into(),
            }],
            NumberTooLarge { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "this number is out of range".into(),
            }],
            UnterminatedString { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "the string starts here".into(),
            }],
            InvalidEscape { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "unsupported escape sequence".into(),
            }],
            UnmatchedOpeningBracket { open } => vec![ErrorLabel {
                span: open.span(),
                text: "this bracket is not closed".into(),
            }],
            MismatchedBrackets { open, close } => vec![
                ErrorLabel {
                    span: open.span(),
                    text: "the bracket opened here".into(),
                },
                ErrorLabel {
                    span: close.span(),
                    text: "is closed by a bracket of a different kind here".into(),
                },
            ],
            UnexpectedToken { expected, .. } | UnexpectedEndOfInput { expected, .. } => {
                vec![ErrorLabel {
                    span: self.main_span(),
                    text: format!["expected {expected}"],
                }]
            }
            NoSuchFunction { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "unknown function".into(),
            }],
            PositionalArgAfterKeywordArg {
                positional_arg,
                keyword_arg,
            } => {
                vec![
                    ErrorLabel {
                        span: positional_arg.span(),
                        text: "The positional argument appears here".into(),
                    },
                    ErrorLabel {
                        span: keyword_arg.span(),
                        text: "The keyword argument appears here".into(),
                    },
                ]
            }
            IncorrectType {
                wanted_type,
                got_type: got,
                got_raw_value,
                function_name,
                parameter_name,
            } => vec![
                ErrorLabel {
                    span: got_raw_value.span(),
                    text: format!["The provided argument is {got}"],
                },
                ErrorLabel {
                    span: function_name.span(),
                    text: format![
                        "The `{parameter_name}` parameter of the `{}` function requires {wanted_type}",
                        function_name.str()
                    ],
                },
            ],
            TooManyPositionalArgs { extra_positional_args, function_name, max_positional_args } => vec![
                ErrorLabel {
                    span: self.main_span(),
                    text: format![
                        "{} extra arguments were provided",
                        extra_positional_args.len(),
                    ],
                },
                ErrorLabel {
                    span: function_name.span(),
                    text: format![
                        "The `{}` function accepts up to {max_positional_args} arguments",
                        function_name.str()
                    ],
                },
            ],
            NoSuchArgument { function_name, argument } => vec![
                ErrorLabel {
                    span: self.main_span(),
                    text: format![
                        "an argument with name `{}` appears here",
                        argument.str(),
                    ],
                },
                ErrorLabel {
                    span: function_name.span(),
                    text: format![
                        "The `{}` function does not have a parameter with name `{}`",
                        function_name.str(),
                        argument.str(),
                    ],
                },
            ],
            DuplicateArgument { parameter_name: _, first_assignment, second_assignment } => vec![
                ErrorLabel {
                    span: first_assignment.span(),
                    text: "the first value appears here".to_string(),
                },
                ErrorLabel {
                    span: second_assignment.span(),
                    text: "the second value appears here".to_string(),
                },
            ],
            MisplacedFunction { allowed_in, .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: format!["this function may only appear in {allowed_in}"],
            }],
            Typesetting { error, .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: format!["{error}"],
            }],
        }
    }

    pub fn notes(&self) -> Vec<String> {
        use Error::*;
        match self {
            PositionalArgAfterKeywordArg { .. } => {
                vec![
                    "Positional arguments must appear before keyword arguments (as in Python)"
                        .to_string(),
                ]
            }
            NumberTooLarge { .. } => vec![
                "Integers must be less than 2^31 in absolute value and dimensions less than 16384pt"
                    .to_string(),
            ],
            Typesetting {
                error: boxworks::Error::UnsupportedOperation { .. },
                ..
            } => vec!["This feature is not implemented by the typesetter".to_string()],
            _ => vec![],
        }
    }
}

fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

impl<'a> std::fmt::Display for Error<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl<'a> std::error::Error for Error<'a> {}

/// Label on an error message.
///
/// A label identifies a particular piece of source code and some
/// information about it.
pub struct ErrorLabel {
    pub span: std::ops::Range<usize>,
    pub text: String,
}

impl<'a> Error<'a> {
    #[cfg(feature = "ariadne")]
    pub fn ariadne_report(
        &self,
        file_name: &'a str,
    ) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
        let mut report =
            ariadne::Report::build(ariadne::ReportKind::Error, (file_name, self.main_span()))
                .with_message(self.message());
        let mut color = ariadne::Color::BrightRed;
        for label in self.labels() {
            report = report.with_label(
                ariadne::Label::new((file_name, label.span))
                    .with_message(label.text)
                    .with_color(color),
            );
            color = ariadne::Color::BrightYellow;
        }
        for note in self.notes() {
            report = report.with_note(note);
        }
        report.finish()
    }
}
