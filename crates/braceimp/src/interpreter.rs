use std::collections::HashMap;

use crate::{
    error::{Error, Expected, RuntimeError},
    expr::{BinaryOperator, Condition, Expr},
    lexer::scan,
    parser::Parser,
    token::{Token, TokenKind},
    util::Spanned,
    value::Value,
};

/// The single flat variable scope of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment(HashMap<String, Value>);

impl Environment {
    /// Value bound to `name`, or integer zero if it was never assigned.
    pub fn get(&self, name: &str) -> Value {
        self.0.get(name).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &Value)> {
        let mut bindings: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), v)).collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));
        bindings
    }
}

/// Lines produced by `print`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output(Vec<String>);

impl Output {
    fn push_line(&mut self, line: String) {
        self.0.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

/// Each line followed by `\n`.
impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.0 {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum number of steps (executed statements plus loop condition
    /// checks) before the run is aborted. `None` runs without a bound.
    pub step_limit: Option<u64>,
    /// Bindings visible to the program before its first statement.
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramResult {
    pub output: Output,
    pub environment: Environment,
}

pub fn evaluate(
    expr: &Spanned<Expr<'_>>,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    match &expr.inner {
        Expr::IntLiteral(n) => Ok(Value::Integer(*n)),
        Expr::StringLiteral(s) => Ok(Value::from(*s)),
        Expr::VariableAccess(name) => Ok(environment.get(name)),
        Expr::BinaryOp { left, op, right } => {
            let lhs = evaluate(left, environment)?;
            let rhs = evaluate(right, environment)?;
            let operator =
                BinaryOperator::try_from(op.inner).map_err(|e| RuntimeError::EvalError {
                    detail: e.to_string(),
                    line: op.span.line,
                    span: op.span,
                })?;

            lhs.binary_operation(rhs, operator, op.span)
        }
    }
}

pub fn evaluate_condition(
    condition: &Condition<'_>,
    environment: &Environment,
) -> Result<bool, RuntimeError> {
    let lhs = evaluate(&condition.left, environment)?;
    let rhs = evaluate(&condition.right, environment)?;

    lhs.relational_operation(&rhs, condition.op.inner, condition.op.span)
}

/// Executes statements directly off the token sequence. Blocks and loop
/// bodies are re-parsed every time they run; nothing is cached between
/// iterations.
pub struct InterpreterState<'t, 'src> {
    parser: Parser<'t, 'src>,
    environment: Environment,
    output: Output,
    steps: u64,
    step_limit: Option<u64>,
}

impl<'t, 'src> InterpreterState<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>], options: RunOptions) -> Self {
        Self {
            parser: Parser::new(tokens),
            environment: options.environment,
            output: Output::default(),
            steps: 0,
            step_limit: options.step_limit,
        }
    }

    pub fn run(mut self) -> Result<ProgramResult, Error> {
        tracing::debug!(
            tokens = self.parser.remaining(),
            bindings = self.environment.len(),
            step_limit = ?self.step_limit,
            "program started"
        );

        while !self.parser.is_at_end() {
            self.execute_statement()?;
        }

        tracing::debug!(
            steps = self.steps,
            lines = self.output.lines().len(),
            "program finished"
        );

        Ok(ProgramResult {
            output: self.output,
            environment: self.environment,
        })
    }

    fn count_step(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        match self.step_limit {
            Some(limit) if self.steps > limit => {
                let span = self
                    .parser
                    .peek()
                    .map(|token| token.span)
                    .unwrap_or_default();
                Err(RuntimeError::StepLimit {
                    limit,
                    line: span.line,
                    span,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn execute_statement(&mut self) -> Result<(), Error> {
        let Some(token) = self.parser.peek() else {
            return Err(self.parser.error_here(Expected::Statement).into());
        };

        self.count_step()?;
        tracing::trace!(line = token.line(), kind = %token.kind, "statement");

        match token.kind {
            TokenKind::Identifier => self.execute_assignment(),
            TokenKind::Print => self.execute_print(),
            TokenKind::If => self.execute_if(),
            TokenKind::While => self.execute_while(),
            _ => Err(self.parser.error_here(Expected::Statement).into()),
        }
    }

    /// Runs statements until the `}` closing the current block is under the
    /// cursor. The `}` itself is left for the caller.
    fn execute_block(&mut self) -> Result<(), Error> {
        loop {
            match self.parser.peek() {
                None => {
                    return Err(self
                        .parser
                        .error_here(Expected::Token(TokenKind::RBrace))
                        .into())
                }
                Some(token) if token.kind == TokenKind::RBrace => return Ok(()),
                Some(_) => self.execute_statement()?,
            }
        }
    }

    // IDENTIFIER '=' expression
    fn execute_assignment(&mut self) -> Result<(), Error> {
        let name = self.parser.expect(TokenKind::Identifier)?;
        self.parser.expect(TokenKind::Assign)?;
        let expr = self.parser.parse_expression()?;
        let value = evaluate(&expr, &self.environment)?;

        tracing::trace!(name = name.lexeme, %value, "assign");
        self.environment.set(name.lexeme, value);
        Ok(())
    }

    // 'print' ( '(' expression ')' | IDENTIFIER | STRING )
    fn execute_print(&mut self) -> Result<(), Error> {
        self.parser.expect(TokenKind::Print)?;

        let expr = match self.parser.peek() {
            Some(open) if open.is_op("(") => {
                self.parser.advance();
                self.parser.parse_parenthesized_tail(open)?
            }
            _ => self.parser.parse_bare_print_operand()?,
        };

        let value = evaluate(&expr, &self.environment)?;
        self.output.push_line(value.to_string());
        Ok(())
    }

    fn parse_and_eval_condition(&mut self) -> Result<bool, Error> {
        let condition = self.parser.parse_condition()?;
        Ok(evaluate_condition(&condition, &self.environment)?)
    }

    /// Evaluates the condition starting at `position`, then puts the cursor
    /// back where it was.
    fn eval_condition_from(&mut self, position: usize) -> Result<bool, Error> {
        let saved = self.parser.position();
        self.parser.seek(position);
        let result = self.parse_and_eval_condition();
        self.parser.seek(saved);
        result
    }

    // 'if' condition '{' block '}' [ 'else' '{' block '}' ]
    fn execute_if(&mut self) -> Result<(), Error> {
        self.parser.expect(TokenKind::If)?;
        let condition = self.parse_and_eval_condition()?;
        self.parser.expect(TokenKind::LBrace)?;

        if condition {
            self.execute_block()?;
            self.parser.expect(TokenKind::RBrace)?;

            if self.parser.check(TokenKind::Else) {
                self.parser.advance();
                self.parser.expect(TokenKind::LBrace)?;
                self.parser.skip_block();
                self.parser.expect(TokenKind::RBrace)?;
            }
        } else {
            self.parser.skip_block();
            self.parser.expect(TokenKind::RBrace)?;

            if self.parser.check(TokenKind::Else) {
                self.parser.advance();
                self.parser.expect(TokenKind::LBrace)?;
                self.execute_block()?;
                self.parser.expect(TokenKind::RBrace)?;
            }
        }

        Ok(())
    }

    // 'while' condition '{' block '}'
    fn execute_while(&mut self) -> Result<(), Error> {
        let keyword = self.parser.expect(TokenKind::While)?;

        let condition_start = self.parser.position();
        // Only parsed here to find the body; the value comes from the re-check
        self.parser.parse_condition()?;
        self.parser.expect(TokenKind::LBrace)?;
        let body_start = self.parser.position();

        let mut iterations = 0u64;
        loop {
            self.count_step()?;
            if !self.eval_condition_from(condition_start)? {
                break;
            }

            self.parser.seek(body_start);
            self.execute_block()?;
            iterations += 1;
            tracing::trace!(line = keyword.line(), iterations, "loop iteration");
        }

        // The cursor is either at the body start or on the body's `}`
        self.parser.skip_block();
        self.parser.expect(TokenKind::RBrace)?;

        tracing::debug!(line = keyword.line(), iterations, "loop finished");
        Ok(())
    }

    /// Executes exactly one assignment and requires it to span the whole
    /// token sequence.
    fn execute_single_assignment(&mut self) -> Result<(), Error> {
        self.execute_assignment()?;
        if !self.parser.is_at_end() {
            return Err(self.parser.error_here(Expected::EndOfInput).into());
        }
        Ok(())
    }
}

pub fn run_program_with_options(
    source: &str,
    options: RunOptions,
) -> Result<ProgramResult, Error> {
    let tokens = scan(source)?;
    InterpreterState::new(&tokens, options).run()
}

pub fn run_program(source: &str) -> Result<ProgramResult, Error> {
    run_program_with_options(source, RunOptions::default())
}

/// Runs `source` and returns its printed output as one block of text, one
/// `\n`-terminated line per executed `print`. Any error discards the output.
pub fn run(source: &str) -> Result<String, Error> {
    Ok(run_program(source)?.output.to_string())
}

/// Applies a `name = expression` binding on top of `environment`, as used for
/// values supplied before a program starts.
pub fn apply_initializer(source: &str, environment: Environment) -> Result<Environment, Error> {
    let tokens = scan(source)?;
    let mut state = InterpreterState::new(
        &tokens,
        RunOptions {
            environment,
            ..RunOptions::default()
        },
    );
    state.execute_single_assignment()?;
    Ok(state.environment)
}
