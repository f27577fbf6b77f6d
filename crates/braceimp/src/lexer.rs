use std::{collections::VecDeque, ops::Range};

use logos::Logos;

use crate::{
    token::{Token, TokenKind},
    util::SourceSpan,
};

/// Raised by logos when no pattern matches. The catch-all pattern below makes
/// this unreachable for `&str` input, but logos needs an error type.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Default)]
pub enum LexerError {
    #[error("Unknown lexer error")]
    #[default]
    Unknown,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
#[error("lexical error: unexpected character {character:?} on line {line}")]
pub struct LexError {
    pub character: char,
    pub line: usize,
    pub span: SourceSpan,
}

#[derive(Debug, Logos)]
#[logos(error = LexerError)]
#[logos(skip r"[ \t]+")]
enum LexerToken<'a> {
    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice())]
    NumberLiteral(&'a str),
    #[regex(r#""[^"\n]*""#, |lex| lex.slice())]
    #[regex(r"'[^'\n]*'", |lex| lex.slice())]
    StringLiteral(&'a str),
    #[token("=")]
    Assign,
    // Keywords
    #[token("print")]
    Print,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Identifier(&'a str),
    // Comparison
    #[token("==")]
    Eq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    // Arithmetic and grouping
    #[token("+")]
    Add,
    #[token("-")]
    Subtract,
    #[token("*")]
    Multiply,
    #[token("/")]
    Divide,
    #[token("(")]
    RoundL,
    #[token(")")]
    RoundR,
    #[token("{")]
    BraceL,
    #[token("}")]
    BraceR,
    #[token("\n")]
    Newline,

    #[regex(".", priority = 0, callback = |lex| lex.slice().chars().next())]
    UnexpectedCharacter(char),
}

impl LexerToken<'_> {
    fn kind(&self) -> Option<TokenKind> {
        Some(match self {
            LexerToken::NumberLiteral(_) => TokenKind::Number,
            LexerToken::StringLiteral(_) => TokenKind::String,
            LexerToken::Assign => TokenKind::Assign,
            LexerToken::Print => TokenKind::Print,
            LexerToken::If => TokenKind::If,
            LexerToken::Else => TokenKind::Else,
            LexerToken::While => TokenKind::While,
            LexerToken::Identifier(_) => TokenKind::Identifier,
            LexerToken::Eq
            | LexerToken::Neq
            | LexerToken::Lte
            | LexerToken::Gte
            | LexerToken::Lt
            | LexerToken::Gt => TokenKind::RelOp,
            LexerToken::Add
            | LexerToken::Subtract
            | LexerToken::Multiply
            | LexerToken::Divide
            | LexerToken::RoundL
            | LexerToken::RoundR => TokenKind::Op,
            LexerToken::BraceL => TokenKind::LBrace,
            LexerToken::BraceR => TokenKind::RBrace,
            LexerToken::Newline | LexerToken::UnexpectedCharacter(_) => return None,
        })
    }
}

// Keyword spellings in the order an ordered scanner tries them.
const KEYWORDS: [(&str, TokenKind); 4] = [
    ("print", TokenKind::Print),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
];

/// Re-scans an identifier-shaped word the way a first-match scanner does:
/// keyword spellings are tried before the identifier pattern and need no word
/// boundary, so `printer` becomes `print` + `er` and `if2` becomes `if` + `2`.
/// A word that does not start with a keyword or digit is a single identifier.
fn split_keyword_prefixes<'src>(
    word: &'src str,
    word_start: usize,
    line: usize,
) -> Vec<Token<'src>> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < word.len() {
        let rest = &word[offset..];
        let (kind, len) = if rest.starts_with(|c: char| c.is_ascii_digit()) {
            (
                TokenKind::Number,
                rest.find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len()),
            )
        } else if let Some((keyword, kind)) = KEYWORDS
            .iter()
            .find(|(keyword, _)| rest.starts_with(keyword))
        {
            (*kind, keyword.len())
        } else {
            (TokenKind::Identifier, rest.len())
        };

        let start = word_start + offset;
        tokens.push(Token::new(
            kind,
            &rest[..len],
            SourceSpan::new(line, start..start + len),
        ));
        offset += len;
    }

    tokens
}

fn into_final_tokens<'src>(
    source_token: Result<LexerToken<'src>, LexerError>,
    slice: &'src str,
    source_location: Range<usize>,
    line: usize,
) -> Result<Vec<Token<'src>>, LexError> {
    let span = SourceSpan::new(line, source_location.clone());

    match source_token {
        Ok(LexerToken::Identifier(word)) => Ok(split_keyword_prefixes(
            word,
            source_location.start,
            line,
        )),
        Ok(LexerToken::UnexpectedCharacter(character)) => Err(LexError {
            character,
            line,
            span,
        }),
        Err(LexerError::Unknown) => Err(LexError {
            character: slice
                .chars()
                .next()
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            line,
            span,
        }),
        Ok(token) => Ok(token
            .kind()
            .map(|kind| Token::new(kind, slice, span))
            .into_iter()
            .collect()),
    }
}

/// Lazily scans `source`. Yields tokens in order and stops after the first
/// error.
pub fn lex_str<'src>(source: &'src str) -> impl Iterator<Item = Result<Token<'src>, LexError>> {
    let mut lexer = LexerToken::lexer(source);

    std::iter::from_fn({
        let mut line = 1;
        let mut failed = false;
        let mut queue: VecDeque<Token<'src>> = VecDeque::new();
        move || -> Option<Result<Token<'src>, LexError>> {
            loop {
                if failed {
                    return None;
                }

                if let Some(token) = queue.pop_front() {
                    return Some(Ok(token));
                }

                let res = lexer.next()?;

                if let Ok(LexerToken::Newline) = res {
                    line += 1;
                    continue;
                }

                match into_final_tokens(res, lexer.slice(), lexer.span(), line) {
                    Err(e) => {
                        failed = true;
                        return Some(Err(e));
                    }
                    Ok(tokens) => queue.extend(tokens),
                }
            }
        }
    })
}

/// Scans the whole of `source` up front.
pub fn scan(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    let tokens = lex_str(source).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(tokens = tokens.len(), "scanned source");
    Ok(tokens)
}
