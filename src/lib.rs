mod builtin;
mod context;
mod environment;
mod error;
mod interpreter;
mod parser;
mod value;

#[cfg(test)]
mod test_utils;

pub use context::{evaluate, Config, EvaluationContext};
pub use environment::Environment;
pub use error::LispError;
pub use interpreter::{EvaluationResult, UserFunction};
pub use parser::{atom, parse, tokenize, Sexp, Token};
pub use value::{Builtin, Function, Value};
