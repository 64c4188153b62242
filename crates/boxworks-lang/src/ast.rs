//! Box language abstract syntax tree
//!
//! Every function call in the parse tree is converted into a [Statement]
//! whose [Command] has strongly typed arguments.

use super::error::Error;
use super::lexer;
use super::parse as cst;
use super::Str;
use dimen::{GlueOrder, Scaled};
use std::borrow::Cow;

/// A function call with typed arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct Statement<'a> {
    /// Name of the function in the source, used for error reporting.
    pub func_name: Str<'a>,
    pub command: Command<'a>,
}

/// Parse Box language source code into a list of statements.
pub fn parse(source: &str) -> Result<Vec<Statement>, Vec<Error>> {
    let mut lexer = lexer::Lexer::new(source);
    let calls = cst::parse_list(&mut lexer);
    let v = convert(&calls, lexer.errs_mut());
    lexer.check_errors()?;
    Ok(v)
}

fn convert<'a>(calls: &[cst::FuncCall<'a>], errs: &mut Vec<Error<'a>>) -> Vec<Statement<'a>> {
    let mut v: Vec<Statement> = vec![];
    for call in calls {
        if let Some(elem) = convert_call(call, errs) {
            v.push(elem);
        }
    }
    v
}

macro_rules! functions {
    (
        $( (
            struct $name: ident <$lifetime: lifetime>  {
                $(
                    $field_name: ident : $field_type: ty,
                )+
            }
            impl Command {
                func_name: $func_name: literal,
                variant: $variant: ident,
            }
        ), )+
        without_args: [
            $( ($simple_func_name: literal, $simple_variant: ident), )+
        ],
    ) => {
        /// A command of the Box language.
        #[derive(Debug, PartialEq, Eq)]
        pub enum Command<'a> {
            $(
                $variant($name<'a>),
            )+
            $(
                $simple_variant,
            )+
        }

        $(
        #[derive(Debug, Default, PartialEq, Eq)]
        pub struct $name <$lifetime> {
            $(
                pub $field_name : Arg<$lifetime, $field_type>,
            )+
        }
        impl<$lifetime> Args<$lifetime> for $name <$lifetime> {
            const FIELD_NAMES: &'static[&'static str] = &[ $( stringify!($field_name), )+];
            fn assign_to_field(&mut self, field_name: Str<$lifetime>, arg: &cst::Arg<$lifetime>, call: &cst::FuncCall<$lifetime>, errs: &mut Vec<Error<$lifetime>>)
            {
                match field_name.str() {
                $(
                    stringify!($field_name) => {
                        self.$field_name.assign(arg, field_name.str(), call, errs);
                    }
                )+
                    _ => {
                        errs.push(Error::NoSuchArgument{function_name: call.func_name.clone(), argument: field_name });
                    }
                }
            }
        }
        )+

        /// Names of all functions in the language.
        pub const FUNCTION_NAMES: &[&str] = &[ $( $func_name, )+ $( $simple_func_name, )+ ];

        fn convert_call<'a>(
            call: &cst::FuncCall<'a>,
            errs: &mut Vec<Error<'a>>,
        ) -> Option<Statement<'a>> {
            let command = match call.func_name.str() {
                $(
                    $func_name => Command::$variant($name::build(&call, errs)?),
                )+
                $(
                    $simple_func_name => {
                        NoArgs::build(&call, errs)?;
                        Command::$simple_variant
                    }
                )+
                _ => {
                    errs.push(Error::NoSuchFunction {
                        function_name: call.func_name.clone(),
                    });
                    return None;
                }
            };
            Some(Statement {
                func_name: call.func_name.clone(),
                command,
            })
        }
    };
}

/// Concrete strongly-type arguments to a function.
trait Args<'b>: Default {
    const FIELD_NAMES: &'static [&'static str];
    fn assign_to_field(
        &mut self,
        field_name: Str<'b>,
        arg: &cst::Arg<'b>,
        call: &cst::FuncCall<'b>,
        errs: &mut Vec<Error<'b>>,
    );

    fn build(call: &cst::FuncCall<'b>, errs: &mut Vec<Error<'b>>) -> Option<Self> {
        let mut p: Self = Default::default();
        let start = errs.len();
        let mut field_names = Self::FIELD_NAMES.iter();
        let mut extra_positional_args: Vec<Str<'b>> = vec![];
        let mut first_keyword_arg: Option<Str<'b>> = None;
        for (keyword, arg) in &call.args {
            if let Some(keyword) = keyword {
                if first_keyword_arg.is_none() {
                    first_keyword_arg = Some(keyword.clone());
                }
                p.assign_to_field(keyword.clone(), arg, call, errs);
                continue;
            }
            if let Some(keyword_arg) = &first_keyword_arg {
                errs.push(Error::PositionalArgAfterKeywordArg {
                    positional_arg: arg.source.clone(),
                    keyword_arg: keyword_arg.clone(),
                });
                continue;
            }
            match field_names.next() {
                Some(field_name) => p.assign_to_field(Str::new(field_name), arg, call, errs),
                None => extra_positional_args.push(arg.source.clone()),
            }
        }
        if !extra_positional_args.is_empty() {
            errs.push(Error::TooManyPositionalArgs {
                extra_positional_args,
                function_name: call.func_name.clone(),
                max_positional_args: Self::FIELD_NAMES.len(),
            });
        }
        if errs.len() == start {
            Some(p)
        } else {
            None
        }
    }
}

/// Arguments of a function that takes none.
#[derive(Debug, Default)]
struct NoArgs;

impl<'b> Args<'b> for NoArgs {
    const FIELD_NAMES: &'static [&'static str] = &[];
    fn assign_to_field(
        &mut self,
        field_name: Str<'b>,
        _: &cst::Arg<'b>,
        call: &cst::FuncCall<'b>,
        errs: &mut Vec<Error<'b>>,
    ) {
        errs.push(Error::NoSuchArgument {
            function_name: call.func_name.clone(),
            argument: field_name,
        });
    }
}

functions!(
    (
        struct TextArgs<'a> {
            content: Cow<'a, str>,
            font: i32,
        }
        impl Command {
            func_name: "text",
            variant: Text,
        }
    ),
    (
        struct GlueArgs<'a> {
            width: Scaled,
            stretch: (Scaled, GlueOrder),
            shrink: (Scaled, GlueOrder),
        }
        impl Command {
            func_name: "glue",
            variant: Glue,
        }
    ),
    (
        struct KernArgs<'a> {
            width: Scaled,
        }
        impl Command {
            func_name: "kern",
            variant: Kern,
        }
    ),
    (
        struct PenaltyArgs<'a> {
            value: i32,
        }
        impl Command {
            func_name: "penalty",
            variant: Penalty,
        }
    ),
    (
        struct RuleArgs<'a> {
            width: Option<Scaled>,
            height: Option<Scaled>,
            depth: Option<Scaled>,
        }
        impl Command {
            func_name: "rule",
            variant: Rule,
        }
    ),
    (
        struct MarkArgs<'a> {
            content: Cow<'a, str>,
            class: i32,
        }
        impl Command {
            func_name: "mark",
            variant: Mark,
        }
    ),
    (
        struct HboxArgs<'a> {
            content: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "hbox",
            variant: Hbox,
        }
    ),
    (
        struct VboxArgs<'a> {
            content: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "vbox",
            variant: Vbox,
        }
    ),
    (
        struct HalignArgs<'a> {
            preamble: Vec<Statement<'a>>,
            content: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "halign",
            variant: Halign,
        }
    ),
    (
        struct ColumnArgs<'a> {
            pre: Vec<Statement<'a>>,
            post: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "column",
            variant: Column,
        }
    ),
    (
        struct SpaceFactorArgs<'a> {
            value: i32,
        }
        impl Command {
            func_name: "spacefactor",
            variant: SpaceFactor,
        }
    ),
    (
        struct LanguageArgs<'a> {
            value: i32,
        }
        impl Command {
            func_name: "language",
            variant: Language,
        }
    ),
    (
        struct PrevDepthArgs<'a> {
            depth: Scaled,
        }
        impl Command {
            func_name: "prevdepth",
            variant: PrevDepth,
        }
    ),
    (
        struct HangIndentArgs<'a> {
            indent: Scaled,
            after: Option<i32>,
        }
        impl Command {
            func_name: "hangindent",
            variant: HangIndent,
        }
    ),
    (
        struct ParShapeArgs<'a> {
            lines: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "parshape",
            variant: ParShape,
        }
    ),
    (
        struct LineArgs<'a> {
            indent: Scaled,
            length: Scaled,
        }
        impl Command {
            func_name: "line",
            variant: Line,
        }
    ),
    (
        struct ShipoutArgs<'a> {
            content: Vec<Statement<'a>>,
        }
        impl Command {
            func_name: "shipout",
            variant: Shipout,
        }
    ),
    (
        struct ShowListsArgs<'a> {
            depth: Option<i32>,
            breadth: Option<i32>,
        }
        impl Command {
            func_name: "showlists",
            variant: ShowLists,
        }
    ),
    without_args: [
        ("par", Par),
        ("indent", Indent),
        ("noindent", NoIndent),
        ("math", Math),
        ("display", DisplayMath),
        ("bgroup", BeginGroup),
        ("egroup", EndGroup),
        ("sub", Subscript),
        ("sup", Superscript),
        ("tab", Tab),
        ("cr", Cr),
        ("crcr", Crcr),
        ("span", Span),
        ("omit", Omit),
        ("unskip", Unskip),
    ],
);

/// An argument of type `T` to a function.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Arg<'a, T> {
    /// Value of the argument.
    pub value: T,
    /// Source of the argument in Box source code.
    ///
    /// If this is [`None`], a value was not provided in source
    ///     code and the default value is being used.
    pub source: Option<Str<'a>>,
}

impl<'a, T> Arg<'a, T>
where
    T: TryCast<'a>,
{
    fn assign(
        &mut self,
        arg: &cst::Arg<'a>,
        field_name: &'a str,
        call: &cst::FuncCall<'a>,
        errs: &mut Vec<Error<'a>>,
    ) {
        if let Some(first_assignment) = &self.source {
            errs.push(Error::DuplicateArgument {
                parameter_name: field_name,
                first_assignment: first_assignment.clone(),
                second_assignment: arg.source.clone(),
            });
            return;
        }
        match T::try_cast(&arg.value, errs) {
            Ok(val) => {
                self.value = val;
                self.source = Some(arg.source.clone());
            }
            Err(err) => errs.push(Error::IncorrectType {
                wanted_type: err.want,
                got_type: err.got,
                got_raw_value: arg.source.clone(),
                function_name: call.func_name.clone(),
                parameter_name: field_name,
            }),
        }
    }
}

/// Types that can possibly be obtained from a [`cst::Value`].
pub trait TryCast<'a>: Sized {
    /// Try to cast the value to this type.
    ///
    /// Errors inside nested lists are added to `errs`.
    fn try_cast(value: &cst::Value<'a>, errs: &mut Vec<Error<'a>>)
        -> Result<Self, TryCastError>;
}

/// Error created when casting a value to a concrete type fails.
pub struct TryCastError {
    pub got: &'static str,
    pub want: &'static str,
}

impl<'a> TryCast<'a> for Cow<'a, str> {
    fn try_cast(value: &cst::Value<'a>, _: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        match value {
            cst::Value::String(s) => Ok(s.clone()),
            _ => Err(TryCastError {
                got: value.description(),
                want: "a string",
            }),
        }
    }
}

impl<'a> TryCast<'a> for i32 {
    fn try_cast(value: &cst::Value<'a>, _: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        match value {
            cst::Value::Integer(i) => Ok(*i),
            _ => Err(TryCastError {
                got: value.description(),
                want: "an integer",
            }),
        }
    }
}

impl<'a> TryCast<'a> for Scaled {
    fn try_cast(value: &cst::Value<'a>, _: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        match value {
            cst::Value::Scaled(i) => Ok(*i),
            _ => Err(TryCastError {
                got: value.description(),
                want: "a number",
            }),
        }
    }
}

impl<'a> TryCast<'a> for (Scaled, GlueOrder) {
    fn try_cast(value: &cst::Value<'a>, _: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        match value {
            cst::Value::Scaled(i) => Ok((*i, GlueOrder::Normal)),
            cst::Value::InfiniteGlue(s, o) => Ok((*s, *o)),
            _ => Err(TryCastError {
                got: value.description(),
                want: "a stretch or shrink glue component",
            }),
        }
    }
}

/// Optional arguments distinguish a missing value from the type's default.
impl<'a, T: TryCast<'a>> TryCast<'a> for Option<T> {
    fn try_cast(value: &cst::Value<'a>, errs: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        T::try_cast(value, errs).map(Some)
    }
}

impl<'a> TryCast<'a> for Vec<Statement<'a>> {
    fn try_cast(value: &cst::Value<'a>, errs: &mut Vec<Error<'a>>) -> Result<Self, TryCastError> {
        match value {
            cst::Value::List(l) => Ok(convert(l, errs)),
            _ => Err(TryCastError {
                got: value.description(),
                want: "a list",
            }),
        }
    }
}
