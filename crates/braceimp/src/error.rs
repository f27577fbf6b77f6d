use crate::{
    expr::BinaryOperator,
    token::TokenKind,
    util::SourceSpan,
    value::Type,
};

pub use crate::lexer::LexError;

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Expression,
    Statement,
    IntegerLiteral,
    EndOfInput,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Expression => write!(f, "expression"),
            Expected::Statement => write!(f, "statement"),
            Expected::IntegerLiteral => write!(f, "integer literal that fits in 64 bits"),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

fn describe_found(found: &Option<String>, span: &Option<SourceSpan>) -> String {
    match (found, span) {
        (Some(lexeme), Some(span)) => format!("{:?} on line {}", lexeme, span.line),
        _ => "end of input".to_string(),
    }
}

/// `found` and `span` are `None` when the input ran out.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error: expected {expected}, found {}", describe_found(.found, .span))]
pub struct SyntaxError {
    pub expected: Expected,
    pub found: Option<String>,
    pub span: Option<SourceSpan>,
}

impl SyntaxError {
    pub fn line(&self) -> Option<usize> {
        self.span.map(|span| span.line)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("type error: unsupported operand types for '{op}': {left} and {right} on line {line}")]
    TypeError {
        op: String,
        left: Type,
        right: Type,
        line: usize,
        span: SourceSpan,
    },
    #[error("evaluation error: {detail} on line {line}")]
    EvalError {
        detail: String,
        line: usize,
        span: SourceSpan,
    },
    #[error("division by zero on line {line}")]
    DivisionByZero { line: usize, span: SourceSpan },
    #[error("integer overflow in '{op}' on line {line}")]
    Overflow {
        op: BinaryOperator,
        line: usize,
        span: SourceSpan,
    },
    #[error("string result of '{op}' exceeds {limit} bytes on line {line}")]
    StringTooLong {
        op: BinaryOperator,
        limit: usize,
        line: usize,
        span: SourceSpan,
    },
    #[error("step limit of {limit} exceeded on line {line}")]
    StepLimit {
        limit: u64,
        line: usize,
        span: SourceSpan,
    },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::TypeError { line, .. }
            | RuntimeError::EvalError { line, .. }
            | RuntimeError::DivisionByZero { line, .. }
            | RuntimeError::Overflow { line, .. }
            | RuntimeError::StringTooLong { line, .. }
            | RuntimeError::StepLimit { line, .. } => *line,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            RuntimeError::TypeError { span, .. }
            | RuntimeError::EvalError { span, .. }
            | RuntimeError::DivisionByZero { span, .. }
            | RuntimeError::Overflow { span, .. }
            | RuntimeError::StringTooLong { span, .. }
            | RuntimeError::StepLimit { span, .. } => *span,
        }
    }
}

/// First failure of a run, from whichever phase raised it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// 1-based line, or `None` for a syntax error at end of input.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.line),
            Error::Syntax(e) => e.line(),
            Error::Runtime(e) => Some(e.line()),
        }
    }

    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Error::Lex(e) => Some(e.span),
            Error::Syntax(e) => e.span,
            Error::Runtime(e) => Some(e.span()),
        }
    }
}
