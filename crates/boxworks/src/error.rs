use crate::listmaker::Mode;

/// Errors raised by the typesetting engine.
///
/// After any of these errors the list-maker stack is in a consistent state
/// and the engine can keep accepting commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The operation is not allowed in the current mode.
    #[error("you can't use `{operation}' in {mode}")]
    Mode {
        operation: &'static str,
        mode: Mode,
    },

    /// Something was removed from a container that was already empty.
    #[error("{0}")]
    StackUnderflow(Underflow),

    /// The operation is recognized but deliberately not implemented.
    #[error("unsupported operation: {feature}")]
    UnsupportedOperation { feature: &'static str },

    /// A required external hook or parameter is missing.
    #[error("configuration lookup failed: no value for `{0}'")]
    ConfigurationLookup(&'static str),

    /// Space factors must lie between 1 and 32767.
    ///
    /// Described in TeX.2021.1243.
    #[error("bad space factor ({0})")]
    BadSpaceFactor(i32),

    /// A tab appeared after the last column of the preamble.
    ///
    /// Described in TeX.2021.792.
    #[error("extra alignment tab has been changed to \\cr")]
    ExtraAlignmentTab,

    /// A nucleus got two subscripts or two superscripts.
    ///
    /// Described in TeX.2021.1177.
    #[error("double {0}")]
    DoubleScript(Script),

    /// A right brace closed a group that was never opened.
    ///
    /// Described in TeX.2021.1069.
    #[error("too many }}'s")]
    ExtraRightBrace,
}

/// Which container underflowed in a [Error::StackUnderflow].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underflow {
    /// The list-maker stack only holds the outer vertical list.
    ListMakerStack,
    /// The node list is empty.
    NodeList,
}

impl std::fmt::Display for Underflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Underflow::ListMakerStack => write!(f, "the outer vertical list cannot be closed"),
            Underflow::NodeList => write!(f, "the current list is empty"),
        }
    }
}

/// A sub- or superscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Subscript,
    Superscript,
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Script::Subscript => write!(f, "subscript"),
            Script::Superscript => write!(f, "superscript"),
        }
    }
}

impl Error {
    pub(crate) fn mode(operation: &'static str, mode: Mode) -> Error {
        Error::Mode { operation, mode }
    }

    pub(crate) fn unsupported(feature: &'static str) -> Error {
        Error::UnsupportedOperation { feature }
    }
}
