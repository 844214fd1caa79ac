//! Expression AST definitions.

use crate::access::{DataType, Value};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::reflect::{ConstructorRef, MemberRef, MethodRef};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Static type of an expression node, as known when the tree was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticType {
    Object,
    Boolean,
    Int16,
    Int32,
    Int64,
    Float64,
    Decimal,
    String,
    Char,
    DateTime,
    Guid,
    Array,
    Record,
    /// A quoted expression, passed to calls as syntax
    Expression,
}

impl StaticType {
    /// Static type describing a runtime value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => StaticType::Object,
            Value::Boolean(_) => StaticType::Boolean,
            Value::Int16(_) => StaticType::Int16,
            Value::Byte(_) | Value::SByte(_) | Value::UInt16(_) | Value::Int32(_) => {
                StaticType::Int32
            }
            Value::UInt32(_) | Value::Int64(_) => StaticType::Int64,
            Value::UInt64(_) | Value::Decimal(_) => StaticType::Decimal,
            Value::Float32(_) | Value::Float64(_) => StaticType::Float64,
            Value::Char(_) => StaticType::Char,
            Value::String(_) => StaticType::String,
            Value::DateTime(_) => StaticType::DateTime,
            Value::Guid(_) => StaticType::Guid,
            Value::Bytes(_) | Value::List(_) => StaticType::Array,
            Value::Json(_) | Value::Record(_) => StaticType::Record,
            Value::Expr(_) => StaticType::Expression,
        }
    }

    /// Conversion target for scalar types
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            StaticType::Object => Some(DataType::Object),
            StaticType::Boolean => Some(DataType::Boolean),
            StaticType::Int16 => Some(DataType::Int16),
            StaticType::Int32 => Some(DataType::Int32),
            StaticType::Int64 => Some(DataType::Int64),
            StaticType::Float64 => Some(DataType::Float64),
            StaticType::Decimal => Some(DataType::Decimal),
            StaticType::String => Some(DataType::String),
            StaticType::Char => Some(DataType::Char),
            StaticType::DateTime => Some(DataType::DateTime),
            StaticType::Guid => Some(DataType::Guid),
            StaticType::Array | StaticType::Record | StaticType::Expression => None,
        }
    }

    pub fn zero_value(&self) -> Value {
        match self {
            StaticType::Boolean => Value::Boolean(false),
            StaticType::Int16 => Value::Int16(0),
            StaticType::Int32 => Value::Int32(0),
            StaticType::Int64 => Value::Int64(0),
            StaticType::Float64 => Value::Float64(0.0),
            StaticType::Decimal => Value::Decimal(Decimal::ZERO),
            StaticType::Char => Value::Char('\0'),
            StaticType::DateTime => Value::DateTime(NaiveDateTime::default()),
            StaticType::Guid => Value::Guid(Uuid::nil()),
            _ => Value::Null,
        }
    }
}

/// Method invocation node
#[derive(Debug, Clone)]
pub struct MethodCall {
    /// Receiver; `None` for a static call
    pub object: Option<Box<Expr>>,
    pub method: MethodRef,
    pub arguments: Vec<Expr>,
}

/// Constructor invocation node
#[derive(Debug, Clone)]
pub struct NewExpr {
    pub constructor: ConstructorRef,
    pub arguments: Vec<Expr>,
}

/// Predicate / selector tree node
#[derive(Debug, Clone)]
pub enum Expr {
    Lambda {
        parameters: Vec<String>,
        body: Box<Expr>,
    },

    /// The predicate's own input
    Parameter { name: String, ty: StaticType },

    Constant { value: Value, ty: StaticType },

    /// Member access; `expression` is the owner, `None` for a static member
    Member {
        expression: Option<Box<Expr>>,
        member: MemberRef,
    },

    MethodCall(MethodCall),

    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
        ty: StaticType,
    },

    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        /// User-defined operator implementation
        method: Option<MethodRef>,
    },

    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },

    New(NewExpr),

    MemberInit {
        new: NewExpr,
        bindings: Vec<(MemberRef, Expr)>,
    },

    ListInit {
        new: NewExpr,
        initializers: Vec<Expr>,
    },

    NewArray {
        element_type: StaticType,
        expressions: Vec<Expr>,
    },

    Default(StaticType),
}

impl Expr {
    /// Constant typed after its value
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = StaticType::of(&value);
        Expr::Constant { value, ty }
    }

    pub fn typed_constant(value: impl Into<Value>, ty: StaticType) -> Self {
        Expr::Constant {
            value: value.into(),
            ty,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: StaticType) -> Self {
        Expr::Parameter {
            name: name.into(),
            ty,
        }
    }

    pub fn lambda(parameters: Vec<String>, body: Expr) -> Self {
        Expr::Lambda {
            parameters,
            body: Box::new(body),
        }
    }

    pub fn member(owner: Expr, member: MemberRef) -> Self {
        Expr::Member {
            expression: Some(Box::new(owner)),
            member,
        }
    }

    pub fn static_member(member: MemberRef) -> Self {
        Expr::Member {
            expression: None,
            member,
        }
    }

    /// Record field access, see [`MemberRef::field`]
    pub fn field(owner: Expr, name: impl Into<String>, ty: StaticType) -> Self {
        Expr::member(owner, MemberRef::field(name, ty))
    }

    pub fn call(object: Expr, method: MethodRef, arguments: Vec<Expr>) -> Self {
        Expr::MethodCall(MethodCall {
            object: Some(Box::new(object)),
            method,
            arguments,
        })
    }

    pub fn static_call(method: MethodRef, arguments: Vec<Expr>) -> Self {
        Expr::MethodCall(MethodCall {
            object: None,
            method,
            arguments,
        })
    }

    pub fn unary(op: UnaryOperator, operand: Expr, ty: StaticType) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn not(operand: Expr) -> Self {
        let ty = operand.static_type();
        Expr::unary(UnaryOperator::Not, operand, ty)
    }

    pub fn negate(operand: Expr) -> Self {
        let ty = operand.static_type();
        Expr::unary(UnaryOperator::Negate, operand, ty)
    }

    pub fn convert(operand: Expr, ty: StaticType) -> Self {
        Expr::unary(UnaryOperator::Convert, operand, ty)
    }

    pub fn quote(operand: Expr) -> Self {
        Expr::unary(UnaryOperator::Quote, operand, StaticType::Expression)
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            method: None,
        }
    }

    /// Binary node dispatched to a user-defined operator
    pub fn binary_with(op: BinaryOperator, left: Expr, right: Expr, method: MethodRef) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            method: Some(method),
        }
    }

    pub fn index(array: Expr, index: Expr) -> Self {
        Expr::binary(BinaryOperator::ArrayIndex, array, index)
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn new_object(constructor: ConstructorRef, arguments: Vec<Expr>) -> Self {
        Expr::New(NewExpr {
            constructor,
            arguments,
        })
    }

    pub fn member_init(new: NewExpr, bindings: Vec<(MemberRef, Expr)>) -> Self {
        Expr::MemberInit { new, bindings }
    }

    pub fn list_init(new: NewExpr, initializers: Vec<Expr>) -> Self {
        Expr::ListInit { new, initializers }
    }

    pub fn new_array(element_type: StaticType, expressions: Vec<Expr>) -> Self {
        Expr::NewArray {
            element_type,
            expressions,
        }
    }

    pub fn static_type(&self) -> StaticType {
        match self {
            Expr::Lambda { .. } => StaticType::Expression,
            Expr::Parameter { ty, .. } | Expr::Constant { ty, .. } | Expr::Unary { ty, .. } => *ty,
            Expr::Member { member, .. } => member.ty(),
            Expr::MethodCall(call) => call.method.return_type(),
            Expr::Binary {
                op,
                left,
                right,
                method,
            } => match method {
                Some(method) => method.return_type(),
                None => binary_type(*op, left.static_type(), right.static_type()),
            },
            Expr::Conditional { if_true, .. } => if_true.static_type(),
            Expr::New(new) | Expr::MemberInit { new, .. } => new.constructor.ty(),
            Expr::ListInit { .. } | Expr::NewArray { .. } => StaticType::Array,
            Expr::Default(ty) => *ty,
        }
    }
}

fn binary_type(op: BinaryOperator, left: StaticType, right: StaticType) -> StaticType {
    if op.is_comparison() || op.is_logical() {
        return StaticType::Boolean;
    }
    if op == BinaryOperator::ArrayIndex {
        return StaticType::Object;
    }
    if left == StaticType::Int64 || right == StaticType::Int64 {
        StaticType::Int64
    } else {
        StaticType::Decimal
    }
}
