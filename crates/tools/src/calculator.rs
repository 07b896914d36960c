//! Calculator tool — evaluates arithmetic expressions.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, unary negation, and decimal
//! numbers. A small recursive-descent evaluator working directly over the
//! input characters; no dependencies beyond std.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolInput};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports +, -, *, /, parentheses, and decimal numbers, e.g. '(2 + 3) * 4'."
    }

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError> {
        let expr = input
            .get("expression")
            .or_else(|| input.get("input"))
            .ok_or_else(|| ToolError::InvalidInput("missing expression".into()))?;

        let value = evaluate(expr).map_err(|reason| ToolError::ExecutionFailed {
            tool_name: "calculator".into(),
            reason,
        })?;

        // Integers print without a trailing .0
        if value.fract() == 0.0 && value.abs() < 1e15 {
            Ok(format!("{}", value as i64))
        } else {
            Ok(format!("{value}"))
        }
    }
}

/// Evaluate an arithmetic expression string.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let mut cursor = Cursor::new(expr);
    let value = cursor.expr()?;
    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(format!("unexpected input at position {}", cursor.pos));
    }
    Ok(value)
}

/// Character cursor over the expression. Grammar:
///
/// ```text
/// expr   = term (('+' | '-') term)*
/// term   = unary (('*' | '/') unary)*
/// unary  = '-' unary | primary
/// primary = NUMBER | '(' expr ')'
/// ```
struct Cursor<'a> {
    chars: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut left = self.term()?;
        loop {
            if self.eat(b'+') {
                left += self.term()?;
            } else if self.eat(b'-') {
                left -= self.term()?;
            } else {
                return Ok(left);
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut left = self.unary()?;
        loop {
            if self.eat(b'*') {
                left *= self.unary()?;
            } else if self.eat(b'/') {
                let right = self.unary()?;
                if right == 0.0 {
                    return Err("division by zero".into());
                }
                left /= right;
            } else {
                return Ok(left);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, String> {
        if self.eat(b'-') {
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, String> {
        if self.eat(b'(') {
            let value = self.expr()?;
            if !self.eat(b')') {
                return Err("expected closing parenthesis".into());
            }
            return Ok(value);
        }
        self.number()
    }

    fn number(&mut self) -> Result<f64, String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == b'.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return match self.chars.get(self.pos) {
                Some(c) => Err(format!("unexpected character '{}'", *c as char)),
                None => Err("unexpected end of expression".into()),
            };
        }
        let text = std::str::from_utf8(&self.chars[start..self.pos]).unwrap_or("");
        text.parse()
            .map_err(|_| format!("invalid number: {text}"))
    }
}
