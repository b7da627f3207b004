//! Error taxonomy for the exact-arithmetic core and the expression parser.
//!
//! Every fallible operation in this crate returns `Result<_, Error>`. Nothing
//! is recovered locally: a caller that can recover (e.g. retry with a smaller
//! `max_denominator`) does so by inspecting the variant.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("domain error: {0}")]
    DomainError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("invalid digit '{ch}' for base {base}")]
    InvalidDigit { ch: char, base: u32 },

    #[error("bounds exceeded: {0}")]
    BoundsExceeded(String),

    #[error("0 ** 0 is not a multiplicative power")]
    MultPowZero,

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("empty expression")]
    EmptyExpression,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("missing parenthesis")]
    MissingParenthesis,

    #[error("invalid literal shape: {0}")]
    InvalidLiteralShape(String),

    #[error("ambiguous power of zero")]
    PowerOfZeroAmbiguity,

    #[error("invalid continued-fraction term: {0}")]
    CFInvalidTerm(String),

    #[error("continued-fraction literal has an empty body")]
    CFEmptyBody,

    #[error("the `value[base]` bracket form is deprecated; use prefix notation (0x.., 0b.., ...)")]
    BracketBaseDeprecated,
}

impl Error {
    pub fn domain(reason: impl Into<String>) -> Self {
        Error::DomainError(reason.into())
    }

    pub fn invalid_literal(reason: impl Into<String>) -> Self {
        Error::InvalidLiteral(reason.into())
    }

    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Error::TypeMismatch(reason.into())
    }
}

