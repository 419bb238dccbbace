use core::fmt;
use std::rc::Rc;

use itertools::Itertools;
use log::trace;

use crate::{context::EvaluationContext, interpreter::{EvaluationResult, UserFunction}};


/// Signature shared by every primitive. Arguments arrive already evaluated, left to right
pub type Builtin = fn(Vec<Value>, &mut EvaluationContext) -> EvaluationResult;

#[derive(Clone)]
pub enum Function {
    Builtin(&'static str, Builtin),
    User(Rc<UserFunction>),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(name, _) => name,
            Self::User(function) => function.name(),
        }
    }

    pub fn call(&self, values: Vec<Value>, ctx: &mut EvaluationContext) -> EvaluationResult {
        trace!("calling {} with {} argument(s)", self.name(), values.len());

        match self {
            Self::Builtin(_, builtin) => builtin(values, ctx),
            Self::User(function) => function.call(values, ctx),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(name, _) => write!(f, "Builtin({})", name),
            Self::User(function) => write!(f, "User({:?})", function),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a, _), Self::Builtin(b, _)) => a == b,
            (Self::User(a), Self::User(b)) => Rc::ptr_eq(a, b),
            _ => false
        }
    }
}

// Everything a program can produce. Symbols only come out of the reader, evaluation
// resolves them before they could end up inside another value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Symbol(String),
    None,
    List(Vec<Value>),
    Function(Function),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::None => "none",
            Self::List(_) => "list",
            Self::Function(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => number.fmt(f),
            Self::Boolean(bool) => bool.fmt(f),
            Self::String(string) => write!(f, "'{}'", string),
            Self::Symbol(name) => write!(f, "expr({})", name),
            Self::None => write!(f, "None"),
            Self::List(list) => write!(f, "[{}]", list.iter().join(", ")),
            Self::Function(function) => write!(f, "<function {}>", function.name()),
        }
    }
}
