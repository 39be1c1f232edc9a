//! The Errors that may occur within the crate.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = crate::Error> = std::result::Result<T, E>;

/// A structural invariant of an automaton that failed to hold at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Start state {0} not in states")]
    StartNotInStates(String),
    #[error("Accept states must be subset of states, found {0}")]
    AcceptNotSubset(String),
    #[error("State {0} in transition not in states")]
    BadTransitionState(String),
    #[error("Symbol {0} in transition not in alphabet")]
    BadTransitionSymbol(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    // Wire format errors
    #[error("DFA configuration is required")]
    MissingDfa,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid transition format: {0}. Expected [from, symbol, to]")]
    MalformedTransition(String),
    #[error("Invalid transition key format: {0}")]
    MalformedTransitionKey(String),
    #[error("Symbols must be single characters, found '{0}'")]
    InvalidSymbol(String),
    #[error("Transition table must have at least header and one data row")]
    EmptyTable,
    #[error("Transition table row for state {0} has {1} cells, expected {2}")]
    RaggedTable(String, usize, usize),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    // Limit errors
    #[error("Too many states (max {0})")]
    TooManyStates(usize),
    #[error("Alphabet too large (max {0} symbols)")]
    AlphabetTooLarge(usize),
    #[error("Input string too long (max {0} characters)")]
    InputTooLong(usize),
    // Catalog errors
    #[error("Invalid example name: {0}")]
    InvalidExampleName(String),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    // Process errors
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Failed to install logger: {0}")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),
    #[error("Failed to render configuration: {0}")]
    ConfigDump(#[from] toml::ser::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was caused by the request itself rather than the environment.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Io { .. }
                | Self::Config(_)
                | Self::LogFilter(_)
                | Self::LogInit(_)
                | Self::ConfigDump(_)
        )
    }
}

#[cfg(feature = "python-bindings")]
impl From<Error> for pyo3::PyErr {
    fn from(e: Error) -> Self {
        use pyo3::exceptions::PyValueError;
        use pyo3::PyErr;
        PyErr::new::<PyValueError, _>(e.to_string())
    }
}

#[cfg(feature = "python-bindings")]
impl From<ValidationError> for pyo3::PyErr {
    fn from(e: ValidationError) -> Self {
        Error::from(e).into()
    }
}
