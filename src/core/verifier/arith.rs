//! The pluggable symbolic sanity-check backend (§4.3, §9 re-architecture
//! note: modeled as a trait rather than a hard dependency on a CAS; its
//! absence of opinion returns `unknown`, never an error).
//!
//! The shipped backend is a recursive-descent evaluator over
//! `+ - * / ^ ( )`, integers and decimals -- sufficient for "common
//! expression forms" per §9, not general symbolic algebra. It handles
//! simple `x = <numeric expr>` assignment extraction but does not solve for
//! unknowns.

use once_cell::sync::Lazy;
use regex::Regex;

/// A pluggable sanity-check backend. The default in-process evaluator
/// implements this; a future variant could shell out to a real CAS without
/// touching call sites.
pub trait SanityCheckBackend: Send + Sync {
    /// `Some(true)` the candidate evaluated to a finite number, `Some(false)`
    /// it parsed but was NaN/infinite or otherwise invalid, `None` no
    /// evaluable candidate expression was found in `text`.
    fn check(&self, text: &str) -> Option<bool>;
}

pub struct ArithmeticSanityCheck;

impl SanityCheckBackend for ArithmeticSanityCheck {
    fn check(&self, text: &str) -> Option<bool> {
        let candidate = extract_candidate_expression(text)?;
        Some(match evaluate(&candidate) {
            Ok(value) => value.is_finite(),
            Err(_) => false,
        })
    }
}

static ANSWER_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:answer|therefore|thus|so|hence)\s*[:=]?\s*([-+0-9().^*/\s]+?)\s*\.?\s*$").unwrap()
});
static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*[A-Za-z][A-Za-z0-9_]*\s*=\s*([-+0-9().^*/\s]+)\s*$").unwrap()
});
static STANDALONE_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?\d+(?:\.\d+)?(?:\s*[-+*/^]\s*[-+]?\d+(?:\.\d+)?)+").unwrap()
});
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap());

/// Tries, in order: explicitly marked answer patterns; equation
/// assignments; the last non-empty line if it looks numeric/expression-like;
/// any standalone arithmetic expression in the text. Returns `None` (not an
/// error) when nothing matches.
fn extract_candidate_expression(text: &str) -> Option<String> {
    for line in text.lines().rev() {
        if let Some(captures) = ANSWER_MARKER.captures(line) {
            return Some(captures[1].trim().to_string());
        }
    }
    if let Some(captures) = ASSIGNMENT.captures(text) {
        return Some(captures[1].trim().to_string());
    }
    if let Some(last_line) = text.lines().rev().find(|l| !l.trim().is_empty()) {
        let trimmed = last_line.trim();
        if STANDALONE_EXPR.is_match(trimmed) {
            return Some(trimmed.to_string());
        }
        if BARE_NUMBER.is_match(trimmed) && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c.is_whitespace()) {
            return Some(trimmed.to_string());
        }
    }
    STANDALONE_EXPR.find(text).map(|m| m.as_str().to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseError(pub String);

/// Recursive-descent parser: `expr := term (('+' | '-') term)*`,
/// `term := power (('*' | '/') power)*`, `power := unary ('^' unary)*`,
/// `unary := '-' unary | atom`, `atom := number | '(' expr ')'`.
fn evaluate(input: &str) -> Result<f64, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ParseError(format!("unexpected trailing input at token {}", parser.pos)));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '^' => { tokens.push(Token::Caret); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| ParseError(format!("bad number: {text}")))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(ParseError(format!("unexpected character: {other}"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_expr(&mut self) -> Result<f64, ParseError> {
        let mut value = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => { self.pos += 1; value += self.parse_term()?; }
                Some(Token::Minus) => { self.pos += 1; value -= self.parse_term()?; }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<f64, ParseError> {
        let mut value = self.parse_power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => { self.pos += 1; value *= self.parse_power()?; }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.parse_power()?;
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_power(&mut self) -> Result<f64, ParseError> {
        let base = self.parse_unary()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.parse_power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<f64, ParseError> {
        if let Some(Token::Minus) = self.peek() {
            self.pos += 1;
            return Ok(-self.parse_unary()?);
        }
        if let Some(Token::Plus) = self.peek() {
            self.pos += 1;
            return self.parse_unary();
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<f64, ParseError> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => { self.pos += 1; Ok(n) }
            Some(Token::LParen) => {
                self.pos += 1;
                let value = self.parse_expr()?;
                match self.peek() {
                    Some(Token::RParen) => { self.pos += 1; Ok(value) }
                    _ => Err(ParseError("expected closing parenthesis".to_string())),
                }
            }
            other => Err(ParseError(format!("unexpected token: {other:?}"))),
        }
    }
}
