use core::fmt;

use itertools::Itertools;
use log::debug;
use logos::Logos;

use crate::{error::LispError, value::Value};


#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(skip r"\s+")]
pub enum Token<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    // Everything between a pair of quotes is one token, whitespace and parens included
    #[regex(r"'[^']*'", |lex| { let slice = lex.slice(); &slice[1..slice.len() - 1] })]
    Quoted(&'a str),

    #[regex(r"[^\s()']+", |lex| lex.slice())]
    Literal(&'a str),
}

impl<'a> Token<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Quoted(text) | Self::Literal(text) => text,
        }
    }

    pub fn is_quoted_string(&self) -> bool {
        matches!(self, Self::Quoted(_))
    }
}

// Sexps are both the code that gets evaluated and the bodies stored by user functions.
// A placeholder only ever appears inside a stored function body, standing in for the
// formal parameter at that position
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    Atom(Value),
    Expression(Vec<Self>),
    Placeholder(usize),
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(Value::Symbol(name)) => write!(f, "{}", name),
            Self::Atom(value) => write!(f, "{}", value),
            Self::Expression(expression) => write!(f, "({})", expression.iter().join(" ")),
            Self::Placeholder(index) => write!(f, "#{}", index),
        }
    }
}

type ParseResult<'t, 'a, O> = Result<(&'t [Token<'a>], O), LispError>;

/// Deepest paren nesting the reader accepts. The reader recurses once per level, so
/// this keeps hostile input from exhausting the native stack before evaluation starts
pub const MAX_PARSE_DEPTH: usize = 1024;


pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LispError> {
    let mut tokens = vec![];
    let mut tokenizer = Token::lexer(input);

    // The only character no token accepts is a quote that is never closed
    while let Some(result) = tokenizer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(LispError::syntax(format!(
                "unterminated string literal starting at byte {}", tokenizer.span().start
            )))
        }
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> Option<f64> {
    // f64::from_str also accepts words like "inf" and "NaN", which stay symbols here
    if !text.bytes().any(|byte| byte.is_ascii_digit()) { return None; }
    text.parse().ok()
}

/// Turns a single non-paren token into the value it denotes. Quoted tokens are always
/// strings, then numbers, booleans and `none` are recognized, and anything else is a symbol.
pub fn atom(token: &Token<'_>) -> Value {
    if let Token::Quoted(text) = token {
        return Value::String(text.to_string());
    }

    let text = token.text();
    if let Some(number) = parse_number(text) { return Value::Number(number); }

    match text {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "none" => Value::None,
        symbol => Value::Symbol(symbol.to_string()),
    }
}

fn unbalanced() -> LispError {
    LispError::syntax("unbalanced parentheses or empty program")
}

fn parse_expression<'t, 'a>(mut tokens: &'t [Token<'a>], depth: usize) -> ParseResult<'t, 'a, Sexp> {
    // The opening paren has already been consumed, children are read until the matching close
    let mut expression = vec![];

    loop {
        match tokens.first() {
            Some(Token::RightParen) => return Ok((&tokens[1..], Sexp::Expression(expression))),
            Some(_) => {
                let (rest, sexp) = parse_sexp(tokens, depth)?;
                expression.push(sexp);
                tokens = rest;
            }
            None => return Err(unbalanced()),
        }
    }
}

fn parse_sexp<'t, 'a>(tokens: &'t [Token<'a>], depth: usize) -> ParseResult<'t, 'a, Sexp> {
    let (token, rest) = tokens.split_first().ok_or_else(unbalanced)?;

    match token {
        Token::LeftParen if depth >= MAX_PARSE_DEPTH => Err(LispError::syntax(format!(
            "expression too deeply nested (max depth: {})", MAX_PARSE_DEPTH
        ))),
        Token::LeftParen => parse_expression(rest, depth + 1),
        Token::RightParen => Err(LispError::syntax("unexpected close paren")),
        token => Ok((rest, Sexp::Atom(atom(token)))),
    }
}

pub fn parse(input: &str) -> Result<Sexp, LispError> {
    let tokens = tokenize(input)?;

    let (tokens, sexp) = parse_sexp(&tokens, 0)?;
    if !tokens.is_empty() {
        return Err(LispError::syntax(format!("unexpected {} after the end of the program", tokens[0].text())));
    }

    debug!("parsed {}", sexp);
    Ok(sexp)
}
