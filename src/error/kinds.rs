use std::{fmt, io};

/// Crate-wide `Result` type using [`DocQueryError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, DocQueryError>;

/// Top-level error type for docquery.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum DocQueryError {
    /// A builder method was called in a state that does not allow it.
    Builder(BuilderError),

    /// Chain script parsing errors.
    Parse(ParseError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),

    /// BSON serialization errors.
    Bson(bson::ser::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Invalid-call errors raised by guarded builder methods.
///
/// These are raised before any state is touched, so the builder can be
/// reused after calling the missing prerequisite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// The method only applies to a geoNear command.
    RequiresGeoNear { method: &'static str },

    /// The method only applies to a group or mapReduce command.
    RequiresAggregation { method: &'static str },
}

/// Chain script parsing errors.
#[derive(Debug)]
pub enum ParseError {
    /// The script document itself is malformed.
    InvalidScript(String),

    /// Unknown chain method.
    UnknownMethod(String),

    /// A required argument was not supplied.
    MissingArgument { method: String, index: usize },

    /// An argument has the wrong shape.
    InvalidArgument {
        method: String,
        index: usize,
        expected: &'static str,
    },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for DocQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocQueryError::Builder(e) => write!(f, "Invalid call: {e}"),
            DocQueryError::Parse(e) => write!(f, "{e}"),
            DocQueryError::Config(e) => write!(f, "Configuration error: {e}"),
            DocQueryError::Io(e) => write!(f, "I/O error: {e}"),
            DocQueryError::Json(e) => write!(f, "JSON error: {e}"),
            DocQueryError::Bson(e) => write!(f, "BSON error: {e}"),
            DocQueryError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::RequiresGeoNear { method } => {
                write!(f, "{method}() requires geoNear() first")
            }
            BuilderError::RequiresAggregation { method } => {
                write!(f, "mapReduce(), map() or group() must precede {method}()")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidScript(msg) => write!(f, "Invalid chain script: {msg}"),
            ParseError::UnknownMethod(name) => write!(f, "Unknown chain method: {name}"),
            ParseError::MissingArgument { method, index } => {
                write!(f, "{method}() is missing argument #{}", index + 1)
            }
            ParseError::InvalidArgument {
                method,
                index,
                expected,
            } => write!(
                f,
                "{method}() argument #{} must be {expected}",
                index + 1
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for DocQueryError {}
impl std::error::Error for BuilderError {}
impl std::error::Error for ParseError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to DocQueryError ========================= */

impl From<io::Error> for DocQueryError {
    fn from(err: io::Error) -> Self {
        DocQueryError::Io(err)
    }
}

impl From<serde_json::Error> for DocQueryError {
    fn from(err: serde_json::Error) -> Self {
        DocQueryError::Json(err)
    }
}

impl From<bson::ser::Error> for DocQueryError {
    fn from(err: bson::ser::Error) -> Self {
        DocQueryError::Bson(err)
    }
}

impl From<BuilderError> for DocQueryError {
    fn from(err: BuilderError) -> Self {
        DocQueryError::Builder(err)
    }
}

impl From<ParseError> for DocQueryError {
    fn from(err: ParseError) -> Self {
        DocQueryError::Parse(err)
    }
}

impl From<ConfigError> for DocQueryError {
    fn from(err: ConfigError) -> Self {
        DocQueryError::Config(err)
    }
}

impl From<String> for DocQueryError {
    fn from(msg: String) -> Self {
        DocQueryError::Generic(msg)
    }
}

impl From<&str> for DocQueryError {
    fn from(msg: &str) -> Self {
        DocQueryError::Generic(msg.to_owned())
    }
}
