#![no_main]

use core::fmt;
use std::io;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Primitives, constants and loads from variables
#[derive(Arbitrary, Debug)]
enum LispAtom {
    Add, Sub, Mul, Div,
    True, False, None, Pi,
    Greater, GreaterEq,
    Less, LessEq, Eq, EqP,

    List, Head, Tail, Attach,
    Length, Map, Apply,
    Begin, Only, Println,

    Identifier(String),
    Text(String),
    Number(f64),
}

impl fmt::Display for LispAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            LispAtom::Add => "+",
            LispAtom::Sub => "-",
            LispAtom::Mul => "*",
            LispAtom::Div => "/",
            LispAtom::True => "true",
            LispAtom::False => "false",
            LispAtom::None => "none",
            LispAtom::Pi => "pi",
            LispAtom::Greater => ">",
            LispAtom::GreaterEq => ">=",
            LispAtom::Less => "<",
            LispAtom::LessEq => "<=",
            LispAtom::Eq => "=",
            LispAtom::EqP => "eq?",
            LispAtom::List => "list",
            LispAtom::Head => "head",
            LispAtom::Tail => "tail",
            LispAtom::Attach => "attach",
            LispAtom::Length => "length",
            LispAtom::Map => "map",
            LispAtom::Apply => "apply",
            LispAtom::Begin => "begin",
            LispAtom::Only => "only",
            LispAtom::Println => "println",
            LispAtom::Identifier(identifier) => identifier,
            LispAtom::Text(text) => return write!(f, "'{}'", text.replace('\'', "")),
            LispAtom::Number(value) => return write!(f, "{}", value),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum LispCommand {
    // Special forms
    If(Vec<LispCommand>),
    Define(Vec<LispCommand>),
    Set(Vec<LispCommand>),
    Function(Vec<LispCommand>),

    Call(Vec<LispCommand>),
    Atom(LispAtom),
}

fn stringify_arguments(values: &[LispCommand]) -> String {
    values.iter()
        .map(LispCommand::to_string)
        .join(" ")
}

impl fmt::Display for LispCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LispCommand::Atom(atom) => atom.fmt(f),
            LispCommand::Call(args) => write!(f, "({})", stringify_arguments(args)),
            LispCommand::If(args) => write!(f, "(if {})", stringify_arguments(args)),
            LispCommand::Define(args) => write!(f, "(define {})", stringify_arguments(args)),
            LispCommand::Set(args) => write!(f, "(set {})", stringify_arguments(args)),
            LispCommand::Function(args) => write!(f, "(function {})", stringify_arguments(args)),
        }
    }
}

fuzz_target!(|commands: Vec<LispCommand>| {
    let mut context = attolisp::EvaluationContext::new().with_output(io::sink());

    for command in commands {
        let _ = context.evaluate_str(&command.to_string());
    }
});
