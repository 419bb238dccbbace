use std::collections::HashMap;

use itertools::Itertools;

use crate::{context::EvaluationContext, error::LispError, interpreter::EvaluationResult, value::{Builtin, Function, Value}};


fn expect_arity(name: &str, values: &[Value], count: usize) -> Result<(), LispError> {
    if values.len() != count {
        return Err(LispError::arity(format!("{} expects {} argument(s), got {}", name, count, values.len())));
    }
    Ok(())
}

fn expect_some(name: &str, values: &[Value]) -> Result<(), LispError> {
    if values.is_empty() {
        return Err(LispError::arity(format!("{} expects at least one argument", name)));
    }
    Ok(())
}

fn expect_number(name: &str, value: &Value) -> Result<f64, LispError> {
    match value {
        Value::Number(number) => Ok(*number),
        other => Err(LispError::arity(format!("{} expects numbers, got {} {}", name, other.type_name(), other))),
    }
}

fn expect_list(name: &str, value: Value) -> Result<Vec<Value>, LispError> {
    match value {
        Value::List(list) => Ok(list),
        other => Err(LispError::arity(format!("{} expects a list, got {} {}", name, other.type_name(), other))),
    }
}

fn expect_function(name: &str, value: Value) -> Result<Function, LispError> {
    match value {
        Value::Function(function) => Ok(function),
        other => Err(LispError::arity(format!("{} expects a function, got {} {}", name, other.type_name(), other))),
    }
}

fn values_to_numbers(name: &str, values: &[Value]) -> Result<Vec<f64>, LispError> {
    values.iter()
        .map(|value| expect_number(name, value))
        .collect()
}

fn single(name: &str, values: Vec<Value>) -> EvaluationResult {
    expect_arity(name, &values, 1)?;
    Ok(values.into_iter().next().unwrap_or(Value::None))
}

fn fold_numbers(name: &str, values: Vec<Value>, f: impl Fn(f64, f64) -> f64) -> EvaluationResult {
    expect_some(name, &values)?;

    let numbers = values_to_numbers(name, &values)?;
    Ok(Value::Number(numbers[1..].iter().fold(numbers[0], |a, b| f(a, *b))))
}

fn builtin_add(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    fold_numbers("+", values, |a, b| a + b)
}

fn builtin_sub(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    // A single argument is negated, more are subtracted from the first
    if let [value] = values.as_slice() { return Ok(Value::Number(-expect_number("-", value)?)) }
    fold_numbers("-", values, |a, b| a - b)
}

fn builtin_mul(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    fold_numbers("*", values, |a, b| a * b)
}

fn builtin_div(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    if let [value] = values.as_slice() { return Ok(Value::Number(1.0 / expect_number("/", value)?)) }
    fold_numbers("/", values, |a, b| a / b)
}

fn builtin_max(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    fold_numbers("max", values, f64::max)
}

fn builtin_min(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    fold_numbers("min", values, f64::min)
}

fn builtin_exp(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    expect_arity("exp", &values, 2)?;
    let numbers = values_to_numbers("exp", &values)?;
    Ok(Value::Number(numbers[0].powf(numbers[1])))
}

fn unary_math(name: &str, values: Vec<Value>, f: fn(f64) -> f64) -> EvaluationResult {
    expect_arity(name, &values, 1)?;
    Ok(Value::Number(f(expect_number(name, &values[0])?)))
}

fn builtin_compare(name: &str, values: Vec<Value>, f: fn(&f64, &f64) -> bool) -> EvaluationResult {
    // Adjacent pairs are checked left to right, the first pair that fails decides
    let numbers = values_to_numbers(name, &values)?;
    Ok(Value::Boolean(numbers.iter().tuple_windows().all(|(a, b)| f(a, b))))
}

fn builtin_greater(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    builtin_compare(">", values, |a, b| a > b)
}

fn builtin_greater_eq(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    builtin_compare(">=", values, |a, b| a >= b)
}

fn builtin_less(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    builtin_compare("<", values, |a, b| a < b)
}

fn builtin_less_eq(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    builtin_compare("<=", values, |a, b| a <= b)
}

fn builtin_eq(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    let numbers = values_to_numbers("=", &values)?;
    Ok(Value::Boolean(numbers.iter().all(|number| *number == numbers[0])))
}

fn builtin_eq_p(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    Ok(Value::Boolean(values.iter().all(|value| *value == values[0])))
}

fn builtin_not(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    match single("not", values)? {
        Value::Boolean(bool) => Ok(Value::Boolean(!bool)),
        other => Err(LispError::arity(format!("not expects a boolean, got {} {}", other.type_name(), other))),
    }
}

fn builtin_list(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    Ok(Value::List(values))
}

fn builtin_head(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    let list = expect_list("head", single("head", values)?)?;
    list.into_iter().next()
        .ok_or_else(|| LispError::arity("head of an empty list"))
}

fn builtin_tail(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    let list = expect_list("tail", single("tail", values)?)?;
    Ok(Value::List(list.into_iter().skip(1).collect()))
}

fn builtin_attach(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    // Prepends onto a list. A non-list tail is treated as a list of one, so
    // `(attach 1 2)` gives `[1, 2]`
    expect_arity("attach", &values, 2)?;

    let mut values = values.into_iter();
    let (head, tail) = match (values.next(), values.next()) {
        (Some(head), Some(tail)) => (head, tail),
        _ => return Err(LispError::arity("attach expects 2 argument(s)")),
    };

    let mut list = vec![head];
    match tail {
        Value::List(tail) => list.extend(tail),
        tail => list.push(tail),
    }
    Ok(Value::List(list))
}

fn builtin_length(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    let list = expect_list("length", single("length", values)?)?;
    Ok(Value::Number(list.len() as f64))
}

fn builtin_map(values: Vec<Value>, ctx: &mut EvaluationContext) -> EvaluationResult {
    // The function is called once per position, with one argument taken from each list.
    // Lists of unequal length are cut down to the shortest one
    if values.len() < 2 {
        return Err(LispError::arity(format!("map expects a function and at least one list, got {} argument(s)", values.len())));
    }

    let mut values = values.into_iter();
    let function = match values.next() {
        Some(value) => expect_function("map", value)?,
        None => return Err(LispError::arity("map expects a function")),
    };
    let lists = values.map(|value| expect_list("map", value)).collect::<Result<Vec<_>, _>>()?;
    let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);

    (0..shortest)
        .map(|index| {
            let arguments = lists.iter().map(|list| list[index].clone()).collect_vec();
            function.call(arguments, ctx)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn builtin_apply(values: Vec<Value>, ctx: &mut EvaluationContext) -> EvaluationResult {
    expect_arity("apply", &values, 2)?;

    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (Some(function), Some(arguments)) => {
            let function = expect_function("apply", function)?;
            function.call(expect_list("apply", arguments)?, ctx)
        }
        _ => Err(LispError::arity("apply expects 2 argument(s)")),
    }
}

fn is_type(name: &str, values: Vec<Value>, f: fn(&Value) -> bool) -> EvaluationResult {
    Ok(Value::Boolean(f(&single(name, values)?)))
}

fn builtin_println(values: Vec<Value>, ctx: &mut EvaluationContext) -> EvaluationResult {
    // A single argument is printed as is, several are printed as one bracketed list
    expect_some("println", &values)?;

    let line = match values.len() {
        1 => values[0].to_string(),
        _ => Value::List(values).to_string(),
    };
    ctx.print_line(&line)?;
    Ok(Value::None)
}

fn builtin_begin(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    // The arguments were already evaluated in order, so only the last one is left to return
    expect_some("begin", &values)?;
    Ok(values.into_iter().last().unwrap_or(Value::None))
}

fn builtin_only(values: Vec<Value>, _ctx: &mut EvaluationContext) -> EvaluationResult {
    single("only", values)
}

fn builtin(name: &'static str, builtin: Builtin) -> (String, Value) {
    (name.to_string(), Value::Function(Function::Builtin(name, builtin)))
}

pub(crate) fn builtin_bindings() -> HashMap<String, Value> {
    HashMap::from([
        ("pi".to_string(), Value::Number(std::f64::consts::PI)),
        ("tau".to_string(), Value::Number(std::f64::consts::TAU)),
        ("e".to_string(), Value::Number(std::f64::consts::E)),

        builtin("+", builtin_add),
        builtin("-", builtin_sub),
        builtin("*", builtin_mul),
        builtin("/", builtin_div),
        builtin("max", builtin_max),
        builtin("min", builtin_min),
        builtin("exp", builtin_exp),

        builtin(">", builtin_greater),
        builtin(">=", builtin_greater_eq),
        builtin("<", builtin_less),
        builtin("<=", builtin_less_eq),
        builtin("=", builtin_eq),
        builtin("eq?", builtin_eq_p),
        builtin("not", builtin_not),

        builtin("sin", |values, _| unary_math("sin", values, f64::sin)),
        builtin("cos", |values, _| unary_math("cos", values, f64::cos)),
        builtin("tan", |values, _| unary_math("tan", values, f64::tan)),
        builtin("asin", |values, _| unary_math("asin", values, f64::asin)),
        builtin("acos", |values, _| unary_math("acos", values, f64::acos)),
        builtin("atan", |values, _| unary_math("atan", values, f64::atan)),
        builtin("round", |values, _| unary_math("round", values, f64::round)),
        builtin("floor", |values, _| unary_math("floor", values, f64::floor)),
        builtin("abs", |values, _| unary_math("abs", values, f64::abs)),
        builtin("sqrt", |values, _| unary_math("sqrt", values, f64::sqrt)),

        builtin("list", builtin_list),
        builtin("head", builtin_head),
        builtin("car", builtin_head),
        builtin("tail", builtin_tail),
        builtin("cdr", builtin_tail),
        builtin("attach", builtin_attach),
        builtin("cons", builtin_attach),
        builtin("length", builtin_length),
        builtin("map", builtin_map),
        builtin("apply", builtin_apply),

        builtin("number?", |values, _| is_type("number?", values, |value| matches!(value, Value::Number(_)))),
        builtin("string?", |values, _| is_type("string?", values, |value| matches!(value, Value::String(_)))),
        builtin("list?", |values, _| is_type("list?", values, |value| matches!(value, Value::List(_)))),
        builtin("function?", |values, _| is_type("function?", values, |value| matches!(value, Value::Function(_)))),
        builtin("none?", |values, _| is_type("none?", values, |value| matches!(value, Value::None))),
        builtin("boolean?", |values, _| is_type("boolean?", values, |value| matches!(value, Value::Boolean(_)))),

        builtin("println", builtin_println),
        builtin("begin", builtin_begin),
        builtin("only", builtin_only),
    ])
}
