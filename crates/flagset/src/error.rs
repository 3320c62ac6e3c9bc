//! Error types for flag registration, parsing, and lookup.
//!
//! Registration failures (`DuplicateName`, `DuplicateShorthand`,
//! `InvalidFlagName`, `InvalidShorthand`, `EmptyString`) surface to the
//! registrar immediately and are never recovered automatically. Input
//! failures (`UnknownFlag`, `MissingArgument`, `InvalidArgument`,
//! `CannotParse`) surface per-token during [`FlagSet::parse`].
//! [`Error::HelpRequested`] is a signal, not a failure: usage text has
//! already been written and the caller should treat it as an early,
//! successful exit path.
//!
//! [`FlagSet::parse`]: crate::FlagSet::parse

use thiserror::Error;

use crate::value::ValueError;

/// Errors reported by a [`FlagSet`](crate::FlagSet).
#[derive(Debug, Error)]
pub enum Error {
    /// A flag with this name or alias is already registered.
    #[error("flag redefined: --{0}")]
    DuplicateName(String),

    /// This shorthand letter is already taken by another flag.
    #[error("shorthand redefined: -{0}")]
    DuplicateShorthand(char),

    /// Flag names start with an alphabetic character and continue with
    /// alphanumerics, `-`, or `_`.
    #[error("invalid flag name: {0:?}")]
    InvalidFlagName(String),

    /// Shorthands are a single alphabetic character.
    #[error("invalid shorthand: {0:?}")]
    InvalidShorthand(char),

    /// An empty string where a name or message is required.
    #[error("empty string")]
    EmptyString,

    /// The argument list referenced a flag that was never registered.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// A value-taking flag appeared as the last token with nothing after it.
    #[error("flag needs an argument: {0}")]
    MissingArgument(String),

    /// The value text was rejected by the flag's codec.
    #[error("invalid argument {value:?} for {flag}: {source}")]
    InvalidArgument {
        flag: String,
        value: String,
        #[source]
        source: ValueError,
    },

    /// A token that is syntactically not a flag, e.g. `--=x` or `---x`.
    #[error("bad flag syntax: {0}")]
    CannotParse(String),

    /// A typed accessor asked for a type other than the one registered.
    #[error("type mismatch for {flag}: requested {requested}, stored {stored}")]
    TypeMismatch {
        flag: String,
        requested: String,
        stored: String,
    },

    /// Usage text was rendered in response to `--help`/`-h`. Not a failure.
    #[error("help requested")]
    HelpRequested,
}

impl Error {
    /// Whether this is the help signal rather than a real failure.
    pub fn is_help(&self) -> bool {
        matches!(self, Error::HelpRequested)
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
