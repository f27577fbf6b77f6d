use crate::util::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,

    Assign,

    // Keywords
    Print,
    If,
    Else,
    While,

    Identifier,

    // Operators
    //   `==`, `!=`, `<`, `>`, `<=`, `>=`
    RelOp,
    //   `+`, `-`, `*`, `/`, `(`, `)`
    Op,

    LBrace,
    RBrace,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Assign => "'='",
            TokenKind::Print => "'print'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Identifier => "identifier",
            TokenKind::RelOp => "relational operator",
            TokenKind::Op => "operator",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Exact source text of the token, quotes included for strings.
    pub lexeme: &'src str,
    pub span: SourceSpan,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, span: SourceSpan) -> Self {
        Token { kind, lexeme, span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// True for a generic operator token spelled `lexeme`, e.g. `is_op("(")`.
    pub fn is_op(&self, lexeme: &str) -> bool {
        self.kind == TokenKind::Op && self.lexeme == lexeme
    }
}
