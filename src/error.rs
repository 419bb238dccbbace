use core::{error::Error, fmt};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LispError {
    /// Unbalanced or stray parentheses, an empty program or an unterminated string
    SyntaxError(String),
    UndefinedSymbol(String),
    NotCallable(String),
    /// A procedure received the wrong count or kind of arguments
    ArityOrTypeError(String),
    /// Evaluation nested deeper than the configured limit
    StackOverflow(usize),
    /// The println sink could not be written to
    OutputError(String),
}

impl LispError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SyntaxError(_) => "SyntaxError",
            Self::UndefinedSymbol(_) => "UndefinedSymbol",
            Self::NotCallable(_) => "NotCallable",
            Self::ArityOrTypeError(_) => "ArityOrTypeError",
            Self::StackOverflow(_) => "StackOverflow",
            Self::OutputError(_) => "OutputError",
        }
    }

    pub(crate) fn arity(message: impl Into<String>) -> Self {
        Self::ArityOrTypeError(message.into())
    }

    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::SyntaxError(message.into())
    }
}

impl fmt::Display for LispError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SyntaxError(message) => write!(f, "SyntaxError: {}", message),
            Self::UndefinedSymbol(name) => write!(f, "UndefinedSymbol: '{}' is not defined", name),
            Self::NotCallable(value) => write!(f, "NotCallable: {} is not a procedure", value),
            Self::ArityOrTypeError(message) => write!(f, "ArityOrTypeError: {}", message),
            Self::StackOverflow(depth) => write!(f, "StackOverflow: evaluation exceeded depth {}", depth),
            Self::OutputError(message) => write!(f, "OutputError: {}", message),
        }
    }
}

impl Error for LispError {}
