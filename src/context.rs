use std::io::{self, Write};

use log::info;
use serde::Deserialize;

use crate::{environment::Environment, error::LispError, interpreter::{self, EvaluationResult}, parser::{parse, Sexp}, value::Value};


#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How deeply evaluation may nest before a run fails with a stack overflow
    pub max_depth: usize,
    /// Whether `println` writes to the output sink. It is always logged
    pub echo_println: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 10_000, echo_println: true }
    }
}

impl Config {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// An evaluation context that takes source text or sexps and evaluates them to give
/// values.
///
/// Every program evaluated through the same context shares one global environment, so
/// definitions made by one are visible to the next. Use [EvaluationContext::reset] or a
/// fresh context to isolate runs.
pub struct EvaluationContext {
    pub(crate) environment: Environment,
    pub(crate) config: Config,
    pub(crate) depth: usize,
    output: Box<dyn Write>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            environment: Environment::default(),
            config,
            depth: 0,
            output: Box::new(io::stdout()),
        }
    }

    /// Sends `println` output somewhere other than stdout
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reset(&mut self) {
        self.environment = Environment::default();
        self.depth = 0;
    }

    pub fn evaluate_sexp(&mut self, sexp: &Sexp) -> EvaluationResult {
        self.depth = 0;
        interpreter::evaluate(sexp, self)
    }

    pub fn evaluate_str(&mut self, input: &str) -> Result<Value, LispError> {
        let sexp = parse(input)?;
        self.evaluate_sexp(&sexp)
    }

    pub(crate) fn print_line(&mut self, line: &str) -> Result<(), LispError> {
        info!(target: "attolisp::println", "{}", line);

        if self.config.echo_println {
            writeln!(self.output, "{}", line)
                .and_then(|_| self.output.flush())
                .map_err(|error| LispError::OutputError(error.to_string()))?;
        }
        Ok(())
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses and evaluates one program against a freshly seeded environment
pub fn evaluate(source: &str) -> Result<Value, LispError> {
    EvaluationContext::new().evaluate_str(source)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::SharedBuffer;

    use super::*;

    #[test]
    fn scenarios() -> anyhow::Result<()> {
        assert_eq!(evaluate("(+ 1 2 3)")?, Value::Number(6.0));
        assert_eq!(evaluate("(- 13.37)")?, Value::Number(-13.37));
        assert_eq!(evaluate("(if (= 1 2) (only 5) (only 10))")?, Value::Number(10.0));
        assert_eq!(evaluate("(begin (function fact (n) (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 10))")?, Value::Number(3628800.0));
        assert_eq!(evaluate("(begin (function plusone (x) (+ x 1)) (function plustwo (x) (+ x 2)) (plusone 1))")?, Value::Number(2.0));
        assert!(matches!(evaluate("(+ 1 2"), Err(LispError::SyntaxError(_))));
        Ok(())
    }

    #[test]
    fn range_builder() -> anyhow::Result<()> {
        let result = evaluate("(begin (function range (a b) (if (= a b) a (attach a (range (+ a 1) b)))) (range 0 4))")?;
        assert_eq!(result.to_string(), "[0, 1, 2, 3, 4]");
        Ok(())
    }

    #[test]
    fn println_output() -> anyhow::Result<()> {
        let buffer = SharedBuffer::default();
        let mut ctx = EvaluationContext::new().with_output(buffer.clone());

        assert_eq!(ctx.evaluate_str("(println 42)")?, Value::None);
        ctx.evaluate_str("(println 'hi')")?;
        ctx.evaluate_str("(println 1 'two' (list 3 none))")?;
        ctx.evaluate_str("(println (list))")?;

        assert_eq!(buffer.contents(), "42\n'hi'\n[1, 'two', [3, None]]\n[]\n");
        Ok(())
    }

    #[test]
    fn println_can_be_silenced() -> anyhow::Result<()> {
        let buffer = SharedBuffer::default();
        let config = Config { echo_println: false, ..Config::default() };
        let mut ctx = EvaluationContext::with_config(config).with_output(buffer.clone());

        ctx.evaluate_str("(println 42)")?;
        assert_eq!(buffer.contents(), "");
        Ok(())
    }

    #[test]
    fn definitions_persist_until_reset() -> anyhow::Result<()> {
        let mut ctx = EvaluationContext::new();
        ctx.evaluate_str("(define r 10)")?;
        assert_eq!(ctx.evaluate_str("(* r 2)")?, Value::Number(20.0));

        ctx.reset();
        assert_eq!(ctx.evaluate_str("(* r 2)"), Err(LispError::UndefinedSymbol("r".into())));
        Ok(())
    }

    #[test]
    fn defines_inside_map_are_global() -> anyhow::Result<()> {
        let mut ctx = EvaluationContext::new();
        ctx.evaluate_str("(function remember (v) (begin (define last v) v))")?;
        ctx.evaluate_str("(map remember (list 1 2 3))")?;
        assert_eq!(ctx.evaluate_str("(only last)")?, Value::Number(3.0));
        Ok(())
    }

    #[test]
    fn deep_recursion_under_default_config() -> anyhow::Result<()> {
        let expected: f64 = (1..=100).map(f64::from).product();
        match evaluate("(begin (function fact (n) (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 100))")? {
            Value::Number(number) => assert!(((number - expected) / expected).abs() < 1.0e-12, "fact 100 gave {}", number),
            other => anyhow::bail!("fact 100 gave {}", other),
        }

        let length = evaluate("(begin (function range (a b) (if (= a b) a (attach a (range (+ a 1) b)))) (length (range 0 499)))")?;
        assert_eq!(length, Value::Number(500.0));

        let countdown = evaluate("(begin (function countdown (n) (if (= n 0) 'done' (countdown (- n 1)))) (countdown 4000))")?;
        assert_eq!(countdown, Value::String("done".into()));
        Ok(())
    }

    #[test]
    fn runaway_recursion_under_default_config() {
        let result = evaluate("(begin (function forever (n) (forever n)) (forever 1))");
        assert_eq!(result, Err(LispError::StackOverflow(Config::default().max_depth)));
    }

    #[test]
    fn config_from_json() -> anyhow::Result<()> {
        assert_eq!(Config::from_json("{}")?, Config::default());

        let config = Config::from_json(r#"{"max_depth": 16}"#)?;
        assert_eq!(config, Config { max_depth: 16, echo_println: true });

        let mut ctx = EvaluationContext::with_config(config);
        let result = ctx.evaluate_str("(begin (function down (n) (if (= n 0) 0 (down (- n 1)))) (down 100))");
        assert_eq!(result, Err(LispError::StackOverflow(16)));
        Ok(())
    }
}
