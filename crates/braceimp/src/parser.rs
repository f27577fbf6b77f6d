use crate::{
    error::{Expected, SyntaxError},
    expr::{Condition, Expr, RelationalOperator},
    token::{Token, TokenKind},
    util::Spanned,
};

/// Cursor over a scanned token sequence.
///
/// Parsing only ever moves the cursor; it never touches variables. That is
/// what lets the interpreter save a position, parse from somewhere else, and
/// come back with [`Parser::seek`].
#[derive(Debug, Clone)]
pub struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    pos: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token<'src>> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<&'t Token<'src>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    pub fn check_op(&self, lexeme: &str) -> bool {
        self.peek().is_some_and(|token| token.is_op(lexeme))
    }

    /// Error for the token under the cursor, or for end of input.
    pub fn error_here(&self, expected: Expected) -> SyntaxError {
        let token = self.peek();
        SyntaxError {
            expected,
            found: token.map(|token| token.lexeme.to_string()),
            span: token.map(|token| token.span),
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<&'t Token<'src>, SyntaxError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error_here(Expected::Token(kind))),
        }
    }

    /// Moves past the contents of a block whose `{` has already been
    /// consumed, stopping on (not after) the matching `}`. Nested braces are
    /// counted. Runs to the end of input if the block is never closed.
    pub fn skip_block(&mut self) {
        let mut depth = 1usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    pub fn parse_expression(&mut self) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        self.parse_term()
    }

    // term := factor (('+' | '-') factor)*
    fn parse_term(&mut self) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        let mut node = self.parse_factor()?;
        while self.check_op("+") || self.check_op("-") {
            node = self.parse_binary_tail(node, Self::parse_factor)?;
        }
        Ok(node)
    }

    // factor := atom (('*' | '/') atom)*
    fn parse_factor(&mut self) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        let mut node = self.parse_atom()?;
        while self.check_op("*") || self.check_op("/") {
            node = self.parse_binary_tail(node, Self::parse_atom)?;
        }
        Ok(node)
    }

    fn parse_binary_tail(
        &mut self,
        left: Spanned<Expr<'src>>,
        parse_operand: fn(&mut Self) -> Result<Spanned<Expr<'src>>, SyntaxError>,
    ) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        let op = self.expect(TokenKind::Op)?;
        let right = parse_operand(self)?;

        Ok(left.span.to(right.span).make_wrapped(Expr::BinaryOp {
            left: Box::new(left),
            op: op.span.make_wrapped(op.lexeme),
            right: Box::new(right),
        }))
    }

    // atom := NUMBER | STRING | IDENTIFIER | '(' expression ')'
    fn parse_atom(&mut self) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here(Expected::Expression));
        };

        let expr = match token.kind {
            TokenKind::Number => {
                let n = token
                    .lexeme
                    .parse::<i64>()
                    .map_err(|_| self.error_here(Expected::IntegerLiteral))?;
                Expr::IntLiteral(n)
            }
            TokenKind::String => Expr::StringLiteral(strip_quotes(token.lexeme)),
            TokenKind::Identifier => Expr::VariableAccess(token.lexeme),
            TokenKind::Op if token.lexeme == "(" => {
                self.pos += 1;
                return self.parse_parenthesized_tail(token);
            }
            _ => return Err(self.error_here(Expected::Expression)),
        };

        self.pos += 1;
        Ok(token.span.make_wrapped(expr))
    }

    /// Parses the remainder of `( expression )` after the opening bracket.
    /// The closer is any generic operator token; its spelling is not checked.
    pub fn parse_parenthesized_tail(
        &mut self,
        open: &Token<'src>,
    ) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        let inner = self.parse_expression()?;
        let close = self.expect(TokenKind::Op)?;
        Ok(open.span.to(close.span).make_wrapped(inner.inner))
    }

    /// Operand of a `print` written without parentheses: an identifier or a
    /// string literal. Anything else needs the parenthesized form.
    pub fn parse_bare_print_operand(&mut self) -> Result<Spanned<Expr<'src>>, SyntaxError> {
        if self.check(TokenKind::String) {
            return self.parse_atom();
        }

        let name = self.expect(TokenKind::Identifier)?;
        Ok(name.span.make_wrapped(Expr::VariableAccess(name.lexeme)))
    }

    /// `expression RELOP expression`
    pub fn parse_condition(&mut self) -> Result<Condition<'src>, SyntaxError> {
        let left = self.parse_expression()?;
        let op_token = self.expect(TokenKind::RelOp)?;
        let op = RelationalOperator::try_from(op_token.lexeme).map_err(|_| SyntaxError {
            expected: Expected::Token(TokenKind::RelOp),
            found: Some(op_token.lexeme.to_string()),
            span: Some(op_token.span),
        })?;
        let right = self.parse_expression()?;

        Ok(Condition {
            left,
            op: op_token.span.make_wrapped(op),
            right,
        })
    }
}

fn strip_quotes(lexeme: &str) -> &str {
    let mut chars = lexeme.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close => chars.as_str(),
        _ => lexeme,
    }
}
