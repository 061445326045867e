use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Minus,
    Not,
}

impl PrefixOperator {
    pub fn get_binding_power(&self) -> u8 {
        match self {
            // 2. Prefix operators
            PrefixOperator::Minus | PrefixOperator::Not => 11,
        }
    }
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Minus => write!(f, "-"),
            PrefixOperator::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 3. Multiplicative operators
            Self::Multiply | Self::Divide | Self::Modulo => (9, 10),
            // 4. Additive operators
            Self::Add | Self::Subtract => (7, 8),
            // 5. Comparison and equality operators
            Self::LessThan
            | Self::LessThanEqual
            | Self::GreaterThan
            | Self::GreaterThanEqual
            | Self::EqualEqual
            | Self::BangEqual => (5, 6),
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixShortCircuitOperator {
    And,
    Or,
}

impl InfixShortCircuitOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 6. Logical AND operator
            Self::And => (3, 4),
            // 7. Logical OR operator
            Self::Or => (1, 2),
        }
    }
}

impl Display for InfixShortCircuitOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Call,
}

impl PostfixOperator {
    pub fn get_binding_power(&self) -> u8 {
        match self {
            // 1. Call operator
            Self::Call => 13,
        }
    }
}
