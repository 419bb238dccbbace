use std::rc::Rc;

use log::{debug, trace};

use crate::{context::EvaluationContext, error::LispError, parser::Sexp, value::{Function, Value}};

pub type EvaluationResult = Result<Value, LispError>;

// Native stack kept free before each nested evaluation, and the size of a new segment
// when it runs short. Recursion depth is bounded by `Config::max_depth`, not the thread
const RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;


/// A procedure declared with `function`. The body is stored with every formal parameter
/// already rewritten to a positional placeholder, so nothing in it refers to a formal by
/// name. Each call fills the placeholders of a fresh copy with the actual arguments.
#[derive(Debug)]
pub struct UserFunction {
    name: String,
    parameters: Vec<String>,
    template: Sexp,
}

impl UserFunction {
    pub(crate) fn new(name: &str, parameters: Vec<String>, body: &Sexp) -> Self {
        let template = rewrite_parameters(body, &parameters);
        Self { name: name.to_string(), parameters, template }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn template(&self) -> &Sexp {
        &self.template
    }

    pub(crate) fn call(&self, values: Vec<Value>, ctx: &mut EvaluationContext) -> EvaluationResult {
        // To evaluate a user function, it must receive exactly one value per formal
        if values.len() != self.parameters.len() {
            return Err(LispError::arity(format!(
                "{} expects {} argument(s), got {}", self.name, self.parameters.len(), values.len()
            )))
        }

        let body = substitute(&self.template, &values);
        evaluate(&body, ctx)
    }
}

fn rewrite_parameters(sexp: &Sexp, parameters: &[String]) -> Sexp {
    match sexp {
        Sexp::Atom(Value::Symbol(name)) => match parameters.iter().position(|parameter| parameter == name) {
            Some(index) => Sexp::Placeholder(index),
            None => sexp.clone(),
        },
        Sexp::Expression(expression) => Sexp::Expression(
            expression.iter().map(|sexp| rewrite_parameters(sexp, parameters)).collect()
        ),
        _ => sexp.clone(),
    }
}

fn substitute(sexp: &Sexp, values: &[Value]) -> Sexp {
    // Always builds a new tree, the stored template is never touched, so nested and
    // recursive activations of the same function cannot see each other's arguments
    match sexp {
        Sexp::Placeholder(index) => match values.get(*index) {
            Some(value) => Sexp::Atom(value.clone()),
            None => sexp.clone(),
        },
        Sexp::Expression(expression) => Sexp::Expression(
            expression.iter().map(|sexp| substitute(sexp, values)).collect()
        ),
        Sexp::Atom(_) => sexp.clone(),
    }
}

fn evaluate_atom(value: &Value, ctx: &EvaluationContext) -> EvaluationResult {
    // Symbols are looked up, every other atom evaluates to itself

    match value {
        Value::Symbol(name) => ctx.environment.get(name),
        value => Ok(value.clone()),
    }
}

fn expect_symbol<'s>(form: &str, sexp: &'s Sexp) -> Result<&'s str, LispError> {
    match sexp {
        Sexp::Atom(Value::Symbol(name)) => Ok(name),
        other => Err(LispError::arity(format!("{} expects a symbol, got {}", form, other))),
    }
}

fn evaluate_if(list: &[Sexp], ctx: &mut EvaluationContext) -> EvaluationResult {
    // The test is evaluated first. Only a boolean true selects the consequent, anything
    // else selects the alternative. The branch not taken is never evaluated

    if list.len() != 3 {
        return Err(LispError::arity(format!("if expects 3 operands, got {}", list.len())));
    }

    match evaluate(&list[0], ctx)? {
        Value::Boolean(true) => evaluate(&list[1], ctx),
        _ => evaluate(&list[2], ctx),
    }
}

fn evaluate_define(form: &str, list: &[Sexp], ctx: &mut EvaluationContext) -> EvaluationResult {
    // Both `define` and `set` evaluate the second operand and bind it under the first.
    // There is only the global scope, so a `define` inside a procedure body is visible
    // to everything evaluated after it

    if list.len() != 2 {
        return Err(LispError::arity(format!("{} expects 2 operands, got {}", form, list.len())));
    }

    let name = expect_symbol(form, &list[0])?;
    let value = evaluate(&list[1], ctx)?;
    debug!("{} {}", form, name);
    ctx.environment.define(name, value);
    Ok(Value::None)
}

fn evaluate_function(list: &[Sexp], ctx: &mut EvaluationContext) -> EvaluationResult {
    // A function declaration has a name, a list of formal names and a single body expression

    if list.len() != 3 {
        return Err(LispError::arity(format!("function expects 3 operands, got {}", list.len())));
    }

    let name = expect_symbol("function", &list[0])?;
    let parameters = match &list[1] {
        Sexp::Expression(parameters) => parameters.iter()
            .map(|sexp| expect_symbol("function", sexp).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(LispError::arity(format!("function expects a list of parameters, got {}", other))),
    };

    let function = UserFunction::new(name, parameters, &list[2]);
    debug!("function {} ({}) = {}", name, function.parameters().join(" "), function.template());
    ctx.environment.define(name, Value::Function(Function::User(Rc::new(function))));
    Ok(Value::None)
}

fn evaluate_expression(expression: &[Sexp], ctx: &mut EvaluationContext) -> EvaluationResult {
    // To interpret an expression, the special forms are checked first. Otherwise every
    // element is evaluated, the first must be a function which is then called with the rest

    let Some(head) = expression.first() else { return Ok(Value::List(vec![])) };

    if let Sexp::Atom(Value::Symbol(identifier)) = head {
        match identifier.as_str() {
            "if" => { trace!("special form if"); return evaluate_if(&expression[1..], ctx) },
            "define" => { trace!("special form define"); return evaluate_define("define", &expression[1..], ctx) },
            "set" => { trace!("special form set"); return evaluate_define("set", &expression[1..], ctx) },
            "function" => { trace!("special form function"); return evaluate_function(&expression[1..], ctx) },
            _ => {}
        }
    }

    let function = match evaluate(head, ctx)? {
        Value::Function(function) => function,
        other => return Err(LispError::NotCallable(other.to_string())),
    };

    function.call(evaluate_list(&expression[1..], ctx)?, ctx)
}

fn evaluate_list(list: &[Sexp], ctx: &mut EvaluationContext) -> Result<Vec<Value>, LispError> {
    list.iter()
        .map(|sexp| evaluate(sexp, ctx))
        .collect::<Result<Vec<Value>, LispError>>()
}

pub(crate) fn evaluate(sexp: &Sexp, ctx: &mut EvaluationContext) -> EvaluationResult {
    ctx.depth += 1;

    let result = if ctx.depth > ctx.config.max_depth {
        Err(LispError::StackOverflow(ctx.config.max_depth))
    } else {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || match sexp {
            Sexp::Atom(value) => evaluate_atom(value, ctx),
            Sexp::Expression(expression) => evaluate_expression(expression, ctx),
            Sexp::Placeholder(index) => Err(LispError::arity(format!("unfilled parameter #{}", index))),
        })
    };

    ctx.depth -= 1;
    result
}
