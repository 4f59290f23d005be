//! AST-walking evaluator.
//!
//! Coercion rules are narrow on purpose: `+` concatenates when either
//! side is a string, the other arithmetic operators take numbers only,
//! and loose equality adds nothing beyond numeric-string and boolean
//! coercion. Anything else is a type error naming both operands.

use indexmap::IndexMap;

use super::ast::{Expr, NumberLiteral};
use crate::error::RenderError;
use crate::template::scope::Scope;
use crate::value::{self, Value};

/// Evaluate an expression against a scope.
pub fn evaluate(expr: &Expr, scope: &Scope<'_>) -> Result<Value, RenderError> {
    match expr {
        Expr::ImplicitReceiver => Err(RenderError::TypeError(
            "implicit receiver used as a value".to_string(),
        )),
        Expr::LiteralString(s) => Ok(Value::Str(s.clone())),
        Expr::LiteralNumber(NumberLiteral::Int(i)) => Ok(Value::Int(*i)),
        Expr::LiteralNumber(NumberLiteral::Float(n)) => Ok(Value::Float(*n)),
        Expr::LiteralBool(b) => Ok(Value::Bool(*b)),
        Expr::LiteralNull => Ok(Value::Null),
        Expr::LiteralArray { expressions } => {
            let mut items = Vec::with_capacity(expressions.len());
            for expression in expressions {
                items.push(evaluate(expression, scope)?);
            }
            Ok(Value::array(items))
        }
        Expr::LiteralMap { keys, values } => {
            let mut entries = IndexMap::with_capacity(keys.len());
            for (key, value_expr) in keys.iter().zip(values) {
                entries.insert(key.clone(), evaluate(value_expr, scope)?);
            }
            Ok(Value::object(entries))
        }
        Expr::PropertyRead { receiver, name } => {
            if matches!(receiver.as_ref(), Expr::ImplicitReceiver) {
                return scope
                    .lookup(name)
                    .ok_or_else(|| RenderError::UnboundVariable(name.clone()));
            }
            let target = evaluate(receiver, scope)?;
            property_of(&target, name)
        }
        Expr::KeyedRead { receiver, key } => {
            let target = evaluate(receiver, scope)?;
            let key = evaluate(key, scope)?;
            keyed_of(&target, &key)
        }
        Expr::Call { receiver, args } => evaluate_call(receiver, args, scope),
        Expr::Binary {
            operation,
            left,
            right,
        } => evaluate_binary(operation, left, right, scope),
        Expr::PrefixNot { expression } => {
            Ok(Value::Bool(!evaluate(expression, scope)?.is_truthy()))
        }
        Expr::Unary {
            operator,
            expression,
        } => {
            let operand = evaluate(expression, scope)?;
            evaluate_unary(operator, &operand)
        }
        Expr::Conditional {
            condition,
            true_exp,
            false_exp,
        } => {
            if evaluate(condition, scope)?.is_truthy() {
                evaluate(true_exp, scope)
            } else {
                evaluate(false_exp, scope)
            }
        }
        Expr::Chain { expressions } => {
            let mut result = Value::Null;
            for expression in expressions {
                result = evaluate(expression, scope)?;
            }
            Ok(result)
        }
    }
}

fn evaluate_unary(operator: &str, operand: &Value) -> Result<Value, RenderError> {
    match (operator, operand) {
        ("-", Value::Int(i)) => Ok(i
            .checked_neg()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(*i as f64)))),
        ("-", Value::Float(n)) => Ok(Value::Float(-n)),
        ("+", Value::Int(_) | Value::Float(_)) => Ok(operand.clone()),
        _ => Err(RenderError::TypeError(format!(
            "unary '{}' needs a number, got {}",
            operator,
            operand.type_name()
        ))),
    }
}

/// Property access on a value. Missing keys read as null; only a null
/// receiver is an error.
fn property_of(target: &Value, name: &str) -> Result<Value, RenderError> {
    match target {
        Value::Null => Err(RenderError::TypeError(format!(
            "cannot read property '{name}' of null"
        ))),
        Value::Object(entries) => Ok(entries.borrow().get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) => {
            if name == "length" {
                Ok(Value::Int(items.borrow().len() as i64))
            } else {
                Ok(Value::Null)
            }
        }
        Value::Str(s) => {
            if name == "length" {
                Ok(Value::Int(s.chars().count() as i64))
            } else {
                Ok(Value::Null)
            }
        }
        _ => Ok(Value::Null),
    }
}

fn keyed_of(target: &Value, key: &Value) -> Result<Value, RenderError> {
    match target {
        Value::Null => Err(RenderError::TypeError(format!(
            "cannot index null with {}",
            key.to_js_string()
        ))),
        Value::Array(items) => Ok(index_from(key)
            .and_then(|i| items.borrow().get(i).cloned())
            .unwrap_or(Value::Null)),
        Value::Object(entries) => {
            let name = key.to_js_string();
            Ok(entries.borrow().get(&name).cloned().unwrap_or(Value::Null))
        }
        Value::Str(s) => Ok(index_from(key)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::Str(c.to_string()))
            .unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

fn index_from(key: &Value) -> Option<usize> {
    match key {
        Value::Int(i) if *i >= 0 => Some(*i as usize),
        Value::Float(n) if *n >= 0.0 && n.trunc() == *n => Some(*n as usize),
        _ => None,
    }
}

fn evaluate_call(receiver: &Expr, args: &[Expr], scope: &Scope<'_>) -> Result<Value, RenderError> {
    // A property read on a real receiver is a method call; everything
    // else must evaluate to a function value.
    if let Expr::PropertyRead {
        receiver: target_expr,
        name,
    } = receiver
    {
        if !matches!(target_expr.as_ref(), Expr::ImplicitReceiver) {
            let target = evaluate(target_expr, scope)?;
            let arg_values = evaluate_args(args, scope)?;
            return call_method(&target, name, arg_values);
        }
    }

    let callee = evaluate(receiver, scope)?;
    let arg_values = evaluate_args(args, scope)?;
    match callee {
        Value::Func(f) => (*f)(&arg_values),
        other => {
            let label = match receiver {
                Expr::PropertyRead { name, .. } => name.clone(),
                _ => format!("a {}", other.type_name()),
            };
            Err(RenderError::TypeError(format!("{label} is not a function")))
        }
    }
}

fn evaluate_args(args: &[Expr], scope: &Scope<'_>) -> Result<Vec<Value>, RenderError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(evaluate(arg, scope)?);
    }
    Ok(values)
}

fn call_method(target: &Value, name: &str, args: Vec<Value>) -> Result<Value, RenderError> {
    match target {
        Value::Array(items) => match name {
            "push" => {
                let mut list = items.borrow_mut();
                for arg in args {
                    list.push(arg);
                }
                Ok(Value::Int(list.len() as i64))
            }
            "join" => {
                let sep = args
                    .first()
                    .map(|v| v.to_js_string())
                    .unwrap_or_else(|| ",".to_string());
                let joined = items
                    .borrow()
                    .iter()
                    .map(|item| match item {
                        Value::Null => String::new(),
                        other => other.to_js_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(&sep);
                Ok(Value::Str(joined))
            }
            "includes" => {
                let needle = args.first().cloned().unwrap_or(Value::Null);
                Ok(Value::Bool(
                    items
                        .borrow()
                        .iter()
                        .any(|item| value::strict_equals(item, &needle)),
                ))
            }
            "indexOf" => {
                let needle = args.first().cloned().unwrap_or(Value::Null);
                let position = items
                    .borrow()
                    .iter()
                    .position(|item| value::strict_equals(item, &needle));
                Ok(Value::Int(position.map(|i| i as i64).unwrap_or(-1)))
            }
            _ => Err(RenderError::TypeError(format!(
                "array has no method '{name}'"
            ))),
        },
        Value::Str(s) => match name {
            "toUpperCase" => Ok(Value::Str(s.to_uppercase())),
            "toLowerCase" => Ok(Value::Str(s.to_lowercase())),
            "trim" => Ok(Value::Str(s.trim().to_string())),
            "includes" => {
                let needle = args.first().map(|v| v.to_js_string()).unwrap_or_default();
                Ok(Value::Bool(s.contains(&needle)))
            }
            "split" => {
                let parts: Vec<Value> = match args.first() {
                    None => vec![Value::Str(s.clone())],
                    Some(sep) => {
                        let sep = sep.to_js_string();
                        if sep.is_empty() {
                            s.chars().map(|c| Value::Str(c.to_string())).collect()
                        } else {
                            s.split(sep.as_str())
                                .map(|part| Value::Str(part.to_string()))
                                .collect()
                        }
                    }
                };
                Ok(Value::array(parts))
            }
            "charAt" => {
                let index = args.first().and_then(index_from).unwrap_or(0);
                Ok(Value::Str(
                    s.chars().nth(index).map(|c| c.to_string()).unwrap_or_default(),
                ))
            }
            _ => Err(RenderError::TypeError(format!(
                "string has no method '{name}'"
            ))),
        },
        Value::Object(entries) => {
            let member = entries.borrow().get(name).cloned();
            match member {
                Some(Value::Func(f)) => (*f)(&args),
                _ => Err(RenderError::TypeError(format!("{name} is not a function"))),
            }
        }
        Value::Null => Err(RenderError::TypeError(format!(
            "cannot read property '{name}' of null"
        ))),
        other => Err(RenderError::TypeError(format!(
            "{} has no method '{name}'",
            other.type_name()
        ))),
    }
}

fn evaluate_binary(
    operation: &str,
    left: &Expr,
    right: &Expr,
    scope: &Scope<'_>,
) -> Result<Value, RenderError> {
    // Logical operators short-circuit and yield the deciding operand.
    if operation == "&&" {
        let l = evaluate(left, scope)?;
        if !l.is_truthy() {
            return Ok(l);
        }
        return evaluate(right, scope);
    }
    if operation == "||" {
        let l = evaluate(left, scope)?;
        if l.is_truthy() {
            return Ok(l);
        }
        return evaluate(right, scope);
    }

    let l = evaluate(left, scope)?;
    let r = evaluate(right, scope)?;
    match operation {
        "===" => Ok(Value::Bool(value::strict_equals(&l, &r))),
        "!==" => Ok(Value::Bool(!value::strict_equals(&l, &r))),
        "==" => Ok(Value::Bool(value::loose_equals(&l, &r))),
        "!=" => Ok(Value::Bool(!value::loose_equals(&l, &r))),
        "<" | ">" | "<=" | ">=" => compare(operation, &l, &r),
        "+" => add(&l, &r),
        "-" | "*" | "/" | "%" => arithmetic(operation, &l, &r),
        other => Err(RenderError::TypeError(format!(
            "unsupported operator '{other}'"
        ))),
    }
}

fn compare(operation: &str, l: &Value, r: &Value) -> Result<Value, RenderError> {
    if let (Some(x), Some(y)) = (l.as_number(), r.as_number()) {
        let result = match operation {
            "<" => x < y,
            ">" => x > y,
            "<=" => x <= y,
            _ => x >= y,
        };
        return Ok(Value::Bool(result));
    }
    if let (Value::Str(x), Value::Str(y)) = (l, r) {
        let result = match operation {
            "<" => x < y,
            ">" => x > y,
            "<=" => x <= y,
            _ => x >= y,
        };
        return Ok(Value::Bool(result));
    }
    Err(RenderError::TypeError(format!(
        "cannot compare {} and {}",
        l.type_name(),
        r.type_name()
    )))
}

/// `+` concatenates when either side is a string, otherwise it needs
/// two numbers.
fn add(l: &Value, r: &Value) -> Result<Value, RenderError> {
    if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
        return Ok(Value::Str(format!(
            "{}{}",
            l.to_js_string(),
            r.to_js_string()
        )));
    }
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return Ok(a
            .checked_add(*b)
            .map(Value::Int)
            .unwrap_or(Value::Float(*a as f64 + *b as f64)));
    }
    match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(a + b)),
        _ => Err(RenderError::TypeError(format!(
            "cannot add {} and {}",
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn arithmetic(operation: &str, l: &Value, r: &Value) -> Result<Value, RenderError> {
    let (a, b) = match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(RenderError::TypeError(format!(
                "cannot apply '{}' to {} and {}",
                operation,
                l.type_name(),
                r.type_name()
            )))
        }
    };

    // Integer pairs stay integral except under division; a modulus by
    // zero falls through to the float path and yields NaN.
    if let (Value::Int(x), Value::Int(y)) = (l, r) {
        match operation {
            "-" => {
                return Ok(x
                    .checked_sub(*y)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(a - b)))
            }
            "*" => {
                return Ok(x
                    .checked_mul(*y)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(a * b)))
            }
            "%" => {
                return Ok(x
                    .checked_rem(*y)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(a % b)))
            }
            _ => {}
        }
    }

    let result = match operation {
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        _ => a % b,
    };
    Ok(Value::Float(result))
}
