//! Well-known SQL marker functions.
//!
//! These only carry meaning once a query translator sees them. Invoked
//! directly they return the zero value of their result type; an interceptor
//! recognizes them through [`SqlFunction::recognize`] and substitutes its own
//! interpretation.

use crate::access::Value;
use crate::expression::{Expr, MethodCall, MethodRef, StaticType};
use std::fmt;
use std::str::FromStr;

pub const SQL_FUNCTION_TYPE: &str = "SqlFunc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlFunction {
    Len,
    Length,
    Operation,
    Max,
    Min,
    Count,
    Sum,
    Avg,
    Abs,
    Round,
    DateDiff,
    TimestampDiff,
    Year,
    Month,
    Day,
    IsNull,
    IfNull,
    Nvl,
    RowNumber,

    // CASE builder chain: Case/CaseWhen open it, End closes it
    Case,
    CaseWhen,
    When,
    Then,
    Else,
    End,
}

impl SqlFunction {
    pub const ALL: [SqlFunction; 25] = [
        SqlFunction::Len,
        SqlFunction::Length,
        SqlFunction::Operation,
        SqlFunction::Max,
        SqlFunction::Min,
        SqlFunction::Count,
        SqlFunction::Sum,
        SqlFunction::Avg,
        SqlFunction::Abs,
        SqlFunction::Round,
        SqlFunction::DateDiff,
        SqlFunction::TimestampDiff,
        SqlFunction::Year,
        SqlFunction::Month,
        SqlFunction::Day,
        SqlFunction::IsNull,
        SqlFunction::IfNull,
        SqlFunction::Nvl,
        SqlFunction::RowNumber,
        SqlFunction::Case,
        SqlFunction::CaseWhen,
        SqlFunction::When,
        SqlFunction::Then,
        SqlFunction::Else,
        SqlFunction::End,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SqlFunction::Len => "Len",
            SqlFunction::Length => "Length",
            SqlFunction::Operation => "Operation",
            SqlFunction::Max => "Max",
            SqlFunction::Min => "Min",
            SqlFunction::Count => "Count",
            SqlFunction::Sum => "Sum",
            SqlFunction::Avg => "Avg",
            SqlFunction::Abs => "Abs",
            SqlFunction::Round => "Round",
            SqlFunction::DateDiff => "DateDiff",
            SqlFunction::TimestampDiff => "TimestampDiff",
            SqlFunction::Year => "Year",
            SqlFunction::Month => "Month",
            SqlFunction::Day => "Day",
            SqlFunction::IsNull => "IsNull",
            SqlFunction::IfNull => "IfNull",
            SqlFunction::Nvl => "Nvl",
            SqlFunction::RowNumber => "RowNumber",
            SqlFunction::Case => "Case",
            SqlFunction::CaseWhen => "CaseWhen",
            SqlFunction::When => "When",
            SqlFunction::Then => "Then",
            SqlFunction::Else => "Else",
            SqlFunction::End => "End",
        }
    }

    /// Fixed result type, `None` when the result follows the argument type
    pub fn fixed_return_type(&self) -> Option<StaticType> {
        match self {
            SqlFunction::Len
            | SqlFunction::Length
            | SqlFunction::Count
            | SqlFunction::DateDiff
            | SqlFunction::TimestampDiff
            | SqlFunction::Year
            | SqlFunction::Month
            | SqlFunction::Day
            | SqlFunction::RowNumber => Some(StaticType::Int32),
            SqlFunction::Operation => Some(StaticType::Boolean),
            SqlFunction::Round => Some(StaticType::Decimal),
            SqlFunction::Case
            | SqlFunction::CaseWhen
            | SqlFunction::When
            | SqlFunction::Then
            | SqlFunction::Else => Some(StaticType::Record),
            SqlFunction::Max
            | SqlFunction::Min
            | SqlFunction::Sum
            | SqlFunction::Avg
            | SqlFunction::Abs
            | SqlFunction::IsNull
            | SqlFunction::IfNull
            | SqlFunction::Nvl
            | SqlFunction::End => None,
        }
    }

    /// Whether the marker produces the CASE builder rather than a value
    pub fn is_case_builder(&self) -> bool {
        matches!(
            self,
            SqlFunction::Case
                | SqlFunction::CaseWhen
                | SqlFunction::When
                | SqlFunction::Then
                | SqlFunction::Else
        )
    }

    /// Result type when the generic argument is `generic`
    pub fn return_type(&self, generic: StaticType) -> StaticType {
        self.fixed_return_type().unwrap_or(generic)
    }

    /// Static method whose direct invocation yields the zero value
    pub fn method(&self, generic: StaticType) -> MethodRef {
        let ty = self.return_type(generic);
        MethodRef::new(self.name(), SQL_FUNCTION_TYPE, ty, move |_, _| {
            Ok(ty.zero_value())
        })
    }

    /// Static call node, typed after its first argument
    pub fn call(&self, arguments: Vec<Expr>) -> Expr {
        let generic = arguments
            .first()
            .map_or(StaticType::Object, Expr::static_type);
        Expr::static_call(self.method(generic), arguments)
    }

    /// Static call node with an explicit generic type, e.g. the element type
    /// an `End` closes a CASE chain with
    pub fn typed_call(&self, generic: StaticType, arguments: Vec<Expr>) -> Expr {
        Expr::static_call(self.method(generic), arguments)
    }

    /// Identify a call node as one of the marker functions
    pub fn recognize(call: &MethodCall) -> Option<SqlFunction> {
        if call.object.is_some() || call.method.declaring_type() != SQL_FUNCTION_TYPE {
            return None;
        }
        call.method.name().parse().ok()
    }
}

impl fmt::Display for SqlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown SQL function '{}'", s))
    }
}

/// Zero result of a marker function, for interceptors that only observe
pub fn zero_result(function: SqlFunction, generic: StaticType) -> Value {
    function.return_type(generic).zero_value()
}
