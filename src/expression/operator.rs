//! Operator definitions for expressions.

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical, short-circuiting
    AndAlso,
    OrElse,

    /// `array[index]`
    ArrayIndex,
}

impl BinaryOperator {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::AndAlso | BinaryOperator::OrElse)
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::AndAlso => "&&",
            BinaryOperator::OrElse => "||",
            BinaryOperator::ArrayIndex => "[]",
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Logical negation, bitwise complement on integers
    Not,
    /// Arithmetic negation
    Negate,
    /// Conversion to the node's static type
    Convert,
    /// Hand the operand over as syntax
    Quote,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Convert => "convert",
            UnaryOperator::Quote => "quote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOperator::Modulo.is_arithmetic());
        assert!(!BinaryOperator::Modulo.is_comparison());
        assert!(BinaryOperator::GreaterThanOrEqual.is_comparison());
        assert!(BinaryOperator::OrElse.is_logical());
        assert!(!BinaryOperator::ArrayIndex.is_arithmetic());
        assert!(!BinaryOperator::ArrayIndex.is_comparison());
    }

    #[test]
    fn test_operator_strings() {
        assert_eq!(BinaryOperator::NotEqual.as_str(), "!=");
        assert_eq!(BinaryOperator::AndAlso.as_str(), "&&");
        assert_eq!(UnaryOperator::Negate.as_str(), "-");
    }
}
