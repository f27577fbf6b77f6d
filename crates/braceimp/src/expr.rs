use crate::util::Spanned;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op_str = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        };
        write!(f, "{}", op_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorFromLexemeError<'a> {
    #[error("{0:?} is not a binary operator")]
    NotABinaryOperator(&'a str),
    #[error("{0:?} is not a relational operator")]
    NotARelationalOperator(&'a str),
}

impl<'a> TryFrom<&'a str> for BinaryOperator {
    type Error = OperatorFromLexemeError<'a>;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(BinaryOperator::Add),
            "-" => Ok(BinaryOperator::Sub),
            "*" => Ok(BinaryOperator::Mul),
            "/" => Ok(BinaryOperator::Div),
            _ => Err(OperatorFromLexemeError::NotABinaryOperator(value)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum RelationalOperator {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl std::fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op_str = match self {
            RelationalOperator::Eq => "==",
            RelationalOperator::Neq => "!=",
            RelationalOperator::Lt => "<",
            RelationalOperator::Gt => ">",
            RelationalOperator::Lte => "<=",
            RelationalOperator::Gte => ">=",
        };
        write!(f, "{}", op_str)
    }
}

impl<'a> TryFrom<&'a str> for RelationalOperator {
    type Error = OperatorFromLexemeError<'a>;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        match value {
            "==" => Ok(RelationalOperator::Eq),
            "!=" => Ok(RelationalOperator::Neq),
            "<" => Ok(RelationalOperator::Lt),
            ">" => Ok(RelationalOperator::Gt),
            "<=" => Ok(RelationalOperator::Lte),
            ">=" => Ok(RelationalOperator::Gte),
            _ => Err(OperatorFromLexemeError::NotARelationalOperator(value)),
        }
    }
}

/// Expression tree built for a single statement or condition. The operator of
/// a binary node is kept as source text and only resolved when evaluated.
#[derive(Clone, PartialEq, Debug)]
pub enum Expr<'a> {
    IntLiteral(i64),
    // Quotes already stripped
    StringLiteral(&'a str),
    VariableAccess(&'a str),
    BinaryOp {
        left: Box<Spanned<Expr<'a>>>,
        op: Spanned<&'a str>,
        right: Box<Spanned<Expr<'a>>>,
    },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Condition<'a> {
    pub left: Spanned<Expr<'a>>,
    pub op: Spanned<RelationalOperator>,
    pub right: Spanned<Expr<'a>>,
}
