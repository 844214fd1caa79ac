//! Expression evaluation implementation.
//!
//! The evaluator walks a predicate tree and produces the value it denotes.
//! Member chains rooted at a constant are resolved lazily: each member access
//! pushes a frame and the constant at the root of the chain replays the
//! frames against its literal value.

use crate::access::convert::{convert, to_bool, to_datetime, to_decimal, to_i64};
use crate::access::{QuotedExpr, Value, ValueError, DEFAULT_DATETIME_FORMATS};
use crate::expression::{
    BinaryOperator, CallInterceptor, EvalResult, EvaluationError, Expr, MemberRef, MethodCall,
    NewExpr, StaticType, UnaryOperator,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;

/// A member access waiting for the value it is read from
#[derive(Debug, Clone)]
pub struct EvaluationFrame {
    pub member: MemberRef,
    /// Indices applied to the member's value, outermost access last
    pub array_index_path: Vec<i64>,
}

/// Per-evaluation mutable state
#[derive(Debug, Default)]
pub struct EvaluationContext {
    frames: Vec<EvaluationFrame>,
    pending_index: Vec<i64>,
    negate: bool,
}

impl EvaluationContext {
    pub fn frames(&self) -> &[EvaluationFrame] {
        &self.frames
    }

    pub fn pending_index(&self) -> &[i64] {
        &self.pending_index
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.pending_index.clear();
        self.negate = false;
    }
}

/// Evaluator for predicate and selector trees
#[derive(Default)]
pub struct ExpressionEvaluator<'a> {
    interceptor: Option<&'a dyn CallInterceptor>,
    context: EvaluationContext,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new() -> Self {
        Self {
            interceptor: None,
            context: EvaluationContext::default(),
        }
    }

    /// Create an evaluator whose method calls pass through `interceptor`
    pub fn with_interceptor(interceptor: &'a dyn CallInterceptor) -> Self {
        Self {
            interceptor: Some(interceptor),
            context: EvaluationContext::default(),
        }
    }

    /// Evaluate an expression and return the result.
    ///
    /// The context is reset first, so one evaluator can be reused
    /// sequentially. Afterwards it holds whatever the walk left behind.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.context.clear();
        self.visit(expr)
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    fn visit(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Lambda { body, .. } => self.visit(body),

            // Parameters only get values once the tree is translated
            Expr::Parameter { .. } | Expr::Default(_) => Ok(Value::Null),

            Expr::Constant { value, .. } => self.visit_constant(value.clone()),

            Expr::Member { expression, member } => self.visit_member(expression.as_deref(), member),

            Expr::MethodCall(call) => self.visit_call(call),

            Expr::Unary { op, operand, ty } => self.visit_unary(*op, operand, *ty),

            Expr::Binary {
                op,
                left,
                right,
                method,
            } => match method {
                Some(method) => {
                    let l = self.isolated(|this| this.visit(left))?;
                    let r = self.isolated(|this| this.visit(right))?;
                    method.invoke(None, vec![l, r])
                }
                None => self.visit_binary(*op, left, right),
            },

            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                let test = self.isolated(|this| this.visit(test))?;
                if truthy(&test)? {
                    self.visit(if_true)
                } else {
                    self.visit(if_false)
                }
            }

            Expr::New(new) => self.construct(new),

            Expr::MemberInit { new, bindings } => {
                let mut object = self.construct(new)?;
                for (member, binding) in bindings {
                    let value = self.isolated(|this| this.visit(binding))?;
                    member.set(&mut object, value)?;
                }
                Ok(object)
            }

            Expr::ListInit { new, initializers } => {
                let mut items = match self.construct(new)? {
                    Value::List(items) => items,
                    other => {
                        return Err(EvaluationError::NotAList {
                            found: other.type_name(),
                        })
                    }
                };
                for initializer in initializers {
                    items.push(self.isolated(|this| this.visit(initializer))?);
                }
                Ok(Value::List(items))
            }

            Expr::NewArray { expressions, .. } => {
                let items = expressions
                    .iter()
                    .map(|e| self.isolated(|this| this.visit(e)))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::List(items))
            }
        }
    }

    /// Run `f` with an empty context and restore the current one afterwards
    fn isolated<R>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<R>) -> EvalResult<R> {
        let saved = mem::take(&mut self.context);
        let result = f(self);
        self.context = saved;
        result
    }

    fn construct(&mut self, new: &NewExpr) -> EvalResult<Value> {
        let arguments = new
            .arguments
            .iter()
            .map(|a| self.isolated(|this| this.visit(a)))
            .collect::<EvalResult<Vec<_>>>()?;
        new.constructor.invoke(arguments)
    }

    fn visit_constant(&mut self, literal: Value) -> EvalResult<Value> {
        let mut value = if self.context.frames.is_empty() {
            literal
        } else {
            self.resolve_frames(literal)?
        };
        if !self.context.pending_index.is_empty() {
            let path = mem::take(&mut self.context.pending_index);
            for index in path.into_iter().rev() {
                value = index_value(&value, index)?;
            }
        }
        Ok(self.consume_negation(value))
    }

    fn visit_member(&mut self, owner: Option<&Expr>, member: &MemberRef) -> EvalResult<Value> {
        let Some(owner) = owner else {
            self.push_frame(member);
            let placeholder = match member.ty() {
                StaticType::DateTime => Value::DateTime(NaiveDateTime::default()),
                _ => Value::Null,
            };
            return self.visit_constant(placeholder);
        };

        match owner {
            Expr::Parameter { name, .. } => Err(EvaluationError::InvalidParameterDereference {
                member: member.name().to_string(),
                parameter: name.clone(),
            }),
            Expr::Member { .. } | Expr::Constant { .. } => {
                self.push_frame(member);
                self.visit(owner)
            }
            _ => {
                self.push_frame(member);
                let root = self.isolated(|this| this.visit(owner))?;
                let value = self.resolve_frames(root)?;
                Ok(self.consume_negation(value))
            }
        }
    }

    /// Push a frame that takes ownership of the pending index path
    fn push_frame(&mut self, member: &MemberRef) {
        let mut array_index_path = mem::take(&mut self.context.pending_index);
        array_index_path.reverse();
        self.context.frames.push(EvaluationFrame {
            member: member.clone(),
            array_index_path,
        });
    }

    /// Replay the frame stack against `root`, innermost access first
    fn resolve_frames(&mut self, root: Value) -> EvalResult<Value> {
        let mut value = root;
        while let Some(frame) = self.context.frames.pop() {
            value = frame.member.get(Some(&value))?;
            for index in frame.array_index_path {
                value = index_value(&value, index)?;
            }
        }
        Ok(value)
    }

    fn visit_call(&mut self, call: &MethodCall) -> EvalResult<Value> {
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            let value = if argument.static_type() == StaticType::Expression {
                Value::Expr(QuotedExpr(Arc::new(unquote(argument).clone())))
            } else {
                self.isolated(|this| this.visit(argument))?
            };
            arguments.push(value);
        }

        let receiver = match &call.object {
            Some(object) => match self.isolated(|this| this.visit(object))? {
                Value::Null => None,
                value => Some(value),
            },
            None => None,
        };

        let intercepted = self
            .interceptor
            .and_then(|hooks| hooks.before_call(receiver.as_ref(), call));
        let mut result = match intercepted {
            Some(value) => value,
            None => call.method.invoke(receiver.as_ref(), arguments)?,
        };
        if let Some(hooks) = self.interceptor {
            result = hooks.after_call(receiver.as_ref(), result, call);
        }
        Ok(self.consume_negation(result))
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Expr, ty: StaticType) -> EvalResult<Value> {
        match op {
            UnaryOperator::Not => {
                let outer = self.context.negate;
                self.context.negate = !outer;
                let value = self.visit(operand)?;
                if self.context.negate == outer {
                    // a leaf already inverted its value
                    return Ok(value);
                }
                self.context.negate = outer;
                logical_not(value)
            }
            UnaryOperator::Negate => {
                let value = self.isolated(|this| this.visit(operand))?;
                negate(value)
            }
            UnaryOperator::Convert => {
                let value = self.isolated(|this| this.visit(operand))?;
                match ty.data_type() {
                    Some(target) if !value.is_null() => {
                        Ok(convert(value, target, DEFAULT_DATETIME_FORMATS)?)
                    }
                    _ => Ok(value),
                }
            }
            UnaryOperator::Quote => Ok(Value::Expr(QuotedExpr(Arc::new(operand.clone())))),
        }
    }

    fn visit_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr) -> EvalResult<Value> {
        match op {
            BinaryOperator::AndAlso => {
                let l = self.isolated(|this| this.visit(left))?;
                if !truthy(&l)? {
                    return Ok(Value::Boolean(false));
                }
                let r = self.isolated(|this| this.visit(right))?;
                Ok(Value::Boolean(truthy(&r)?))
            }
            BinaryOperator::OrElse => {
                let l = self.isolated(|this| this.visit(left))?;
                if truthy(&l)? {
                    return Ok(Value::Boolean(true));
                }
                let r = self.isolated(|this| this.visit(right))?;
                Ok(Value::Boolean(truthy(&r)?))
            }
            BinaryOperator::ArrayIndex => {
                let index = match self.isolated(|this| this.visit(right))? {
                    Value::Null => 0,
                    value => to_i64(&value)?,
                };
                let marker = self.context.pending_index.len();
                self.context.pending_index.push(index);
                let value = self.visit(left)?;
                if self.context.pending_index.len() > marker {
                    // nothing on the array side took the index
                    self.context.pending_index.truncate(marker);
                    return index_value(&value, index);
                }
                Ok(value)
            }
            _ => {
                let l = self.isolated(|this| this.visit(left))?;
                let r = self.isolated(|this| this.visit(right))?;
                let wide = left.static_type() == StaticType::Int64
                    || right.static_type() == StaticType::Int64;
                if op.is_arithmetic() {
                    arithmetic(op, l, r, wide)
                } else {
                    let dates = left.static_type() == StaticType::DateTime;
                    compare(op, &l, &r, wide, dates).map(Value::Boolean)
                }
            }
        }
    }

    /// Invert a boolean leaf when a `Not` is waiting for one
    fn consume_negation(&mut self, value: Value) -> Value {
        match value {
            Value::Boolean(b) if self.context.negate => {
                self.context.negate = false;
                Value::Boolean(!b)
            }
            other => other,
        }
    }
}

/// Evaluate `expr` without interception
pub fn evaluate(expr: &Expr) -> EvalResult<Value> {
    ExpressionEvaluator::new().evaluate(expr)
}

fn unquote(expr: &Expr) -> &Expr {
    match expr {
        Expr::Unary {
            op: UnaryOperator::Quote,
            operand,
            ..
        } => operand,
        other => other,
    }
}

fn truthy(value: &Value) -> EvalResult<bool> {
    match value {
        Value::Null => Ok(false),
        other => Ok(to_bool(other)?),
    }
}

fn logical_not(value: Value) -> EvalResult<Value> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::Boolean(b) => Value::Boolean(!b),
        Value::Byte(v) => Value::Byte(!v),
        Value::SByte(v) => Value::SByte(!v),
        Value::Int16(v) => Value::Int16(!v),
        Value::UInt16(v) => Value::UInt16(!v),
        Value::Int32(v) => Value::Int32(!v),
        Value::UInt32(v) => Value::UInt32(!v),
        Value::Int64(v) => Value::Int64(!v),
        Value::UInt64(v) => Value::UInt64(!v),
        other => {
            return Err(ValueError::TypeMismatch {
                expected: "Boolean",
                found: other.type_name(),
            }
            .into())
        }
    })
}

fn negate(value: Value) -> EvalResult<Value> {
    let overflow = || EvaluationError::ArithmeticOverflow { operator: "-" };
    Ok(match value {
        Value::Null => Value::Null,
        Value::SByte(v) => Value::SByte(v.checked_neg().ok_or_else(overflow)?),
        Value::Int16(v) => Value::Int16(v.checked_neg().ok_or_else(overflow)?),
        Value::Int32(v) => Value::Int32(v.checked_neg().ok_or_else(overflow)?),
        Value::Int64(v) => Value::Int64(v.checked_neg().ok_or_else(overflow)?),
        Value::Byte(v) => Value::Int32(-i32::from(v)),
        Value::UInt16(v) => Value::Int32(-i32::from(v)),
        Value::UInt32(v) => Value::Int64(-i64::from(v)),
        Value::UInt64(v) => Value::Decimal(-Decimal::from(v)),
        Value::Float32(v) => Value::Float32(-v),
        Value::Float64(v) => Value::Float64(-v),
        Value::Decimal(d) => Value::Decimal(-d),
        other => Value::String(format!("-{}", other)),
    })
}

fn int_operand(value: &Value) -> EvalResult<i64> {
    match value {
        Value::Null => Ok(0),
        other => Ok(to_i64(other)?),
    }
}

fn decimal_operand(value: &Value) -> EvalResult<Decimal> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        other => Ok(to_decimal(other)?),
    }
}

fn arithmetic(op: BinaryOperator, l: Value, r: Value, wide: bool) -> EvalResult<Value> {
    if op == BinaryOperator::Add {
        if let (Value::String(_), _) | (_, Value::String(_)) = (&l, &r) {
            let text = |v: &Value| if v.is_null() { String::new() } else { v.to_string() };
            return Ok(Value::String(text(&l) + &text(&r)));
        }
    }

    let overflow = || EvaluationError::ArithmeticOverflow {
        operator: op.as_str(),
    };
    if wide {
        let (a, b) = (int_operand(&l)?, int_operand(&r)?);
        let result = match op {
            BinaryOperator::Add => a.checked_add(b),
            BinaryOperator::Subtract => a.checked_sub(b),
            BinaryOperator::Multiply => a.checked_mul(b),
            BinaryOperator::Divide | BinaryOperator::Modulo if b == 0 => {
                return Err(EvaluationError::DivisionByZero)
            }
            BinaryOperator::Divide => a.checked_div(b),
            BinaryOperator::Modulo => a.checked_rem(b),
            _ => unreachable!("non-arithmetic operator {:?}", op),
        };
        return result.map(Value::Int64).ok_or_else(overflow);
    }

    let (a, b) = (decimal_operand(&l)?, decimal_operand(&r)?);
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide | BinaryOperator::Modulo if b.is_zero() => {
            return Err(EvaluationError::DivisionByZero)
        }
        BinaryOperator::Divide => a.checked_div(b),
        BinaryOperator::Modulo => a.checked_rem(b),
        _ => unreachable!("non-arithmetic operator {:?}", op),
    };
    result.map(Value::Decimal).ok_or_else(overflow)
}

fn is_numeric(value: &Value) -> bool {
    value.data_type().is_some_and(|t| t.is_numeric())
}

fn values_equal(l: &Value, r: &Value) -> bool {
    if is_numeric(l) && is_numeric(r) {
        if let (Ok(a), Ok(b)) = (to_decimal(l), to_decimal(r)) {
            return a == b;
        }
    }
    l == r
}

fn compare(op: BinaryOperator, l: &Value, r: &Value, wide: bool, dates: bool) -> EvalResult<bool> {
    match op {
        BinaryOperator::Equal => return Ok(values_equal(l, r)),
        BinaryOperator::NotEqual => return Ok(!values_equal(l, r)),
        _ => {}
    }
    if l.is_null() || r.is_null() {
        return Ok(false);
    }

    let ordering = if dates {
        to_datetime(l, DEFAULT_DATETIME_FORMATS)?.cmp(&to_datetime(r, DEFAULT_DATETIME_FORMATS)?)
    } else if let (Value::String(a), Value::String(b)) = (l, r) {
        a.cmp(b)
    } else if wide {
        to_i64(l)?.cmp(&to_i64(r)?)
    } else {
        to_decimal(l)?.cmp(&to_decimal(r)?)
    };

    Ok(match op {
        BinaryOperator::LessThan => ordering == Ordering::Less,
        BinaryOperator::LessThanOrEqual => ordering != Ordering::Greater,
        BinaryOperator::GreaterThan => ordering == Ordering::Greater,
        BinaryOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        _ => unreachable!("non-comparison operator {:?}", op),
    })
}

/// Index into a list, byte string, text or JSON array
fn index_value(value: &Value, index: i64) -> EvalResult<Value> {
    let len = match value {
        Value::List(items) => items.len(),
        Value::Bytes(bytes) => bytes.len(),
        Value::String(s) => s.chars().count(),
        Value::Json(serde_json::Value::Array(items)) => items.len(),
        other => {
            return Err(EvaluationError::NotIndexable {
                found: other.type_name(),
            })
        }
    };
    let position = usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EvaluationError::IndexOutOfBounds { index, len })?;

    Ok(match value {
        Value::List(items) => items[position].clone(),
        Value::Bytes(bytes) => Value::Byte(bytes[position]),
        Value::String(s) => s.chars().nth(position).map_or(Value::Null, Value::Char),
        Value::Json(serde_json::Value::Array(items)) => Value::Json(items[position].clone()),
        _ => Value::Null,
    })
}
