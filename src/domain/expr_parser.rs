//! Expression parser.
//!
//! Recursive descent, one function per precedence level (lowest first):
//! ternary, `||`, `&&`, equality, comparison, additive, multiplicative,
//! `**` (right associative), unary, postfix indexing, primary. Errors carry
//! the character offset of the offending token.

use crate::domain::error::ParseError;
use crate::domain::expr::{BinaryOp, Expr, UnaryOp, Value};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    /// Consumes `op` if it is next, unless it is a prefix of a longer operator
    /// listed in `longer`.
    fn consume_op(&mut self, op: &str, longer: &[&str]) -> bool {
        self.skip_whitespace();
        let remaining = self.remaining();
        if !remaining.starts_with(op) || longer.iter().any(|l| remaining.starts_with(l)) {
            return false;
        }
        self.pos += op.len();
        true
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;
        if !self.consume_op("?", &[]) {
            return Ok(condition);
        }
        let then = self.parse_ternary()?;
        self.expect_char(':')?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.consume_op("||", &[]) {
            let right = self.parse_and()?;
            left = Self::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.consume_op("&&", &[]) {
            let right = self.parse_equality()?;
            left = Self::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = if self.consume_op("==", &[]) {
                BinaryOp::Eq
            } else if self.consume_op("!=", &[]) {
                BinaryOp::Ne
            } else {
                return Ok(left);
            };
            let right = self.parse_comparison()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.consume_op("<=", &[]) {
                BinaryOp::Le
            } else if self.consume_op(">=", &[]) {
                BinaryOp::Ge
            } else if self.consume_op("<", &[]) {
                BinaryOp::Lt
            } else if self.consume_op(">", &[]) {
                BinaryOp::Gt
            } else {
                return Ok(left);
            };
            let right = self.parse_additive()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.consume_op("+", &[]) {
                BinaryOp::Add
            } else if self.consume_op("-", &[]) {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_power()?;
        loop {
            let op = if self.consume_op("*", &["**"]) {
                BinaryOp::Mul
            } else if self.consume_op("/", &[]) {
                BinaryOp::Div
            } else if self.consume_op("%", &[]) {
                BinaryOp::Rem
            } else {
                return Ok(left);
            };
            let right = self.parse_power()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;
        if self.consume_op("**", &[]) {
            let exponent = self.parse_power()?;
            return Ok(Self::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.consume_op("-", &[]) {
            UnaryOp::Neg
        } else if self.consume_op("!", &["!="]) {
            UnaryOp::Not
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.consume_op("[", &[]) {
            let index = self.parse_ternary()?;
            self.expect_char(']')?;
            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let inner = self.parse_ternary()?;
                self.expect_char(')')?;
                Ok(inner)
            }
            Some(q @ ('\'' | '"')) => self.parse_string(q),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.parse_number(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Ok(self.parse_identifier()),
            _ => Err(ParseError {
                message: format!("expected expression, found '{}'", self.peek_word()),
                position: self.pos,
            }),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        let value = if has_dot {
            num_str.parse::<f64>().map(Value::Number).ok()
        } else {
            // too large for i64: widen
            num_str
                .parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| num_str.parse::<f64>().map(Value::Number))
                .ok()
        };
        value.map(Expr::Literal).ok_or_else(|| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_string(&mut self, quote: char) -> Result<Expr, ParseError> {
        let start = self.pos;
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(ch) if ch == quote => return Ok(Expr::Literal(Value::Text(text))),
                Some(ch) => text.push(ch),
                None => {
                    return Err(ParseError {
                        message: "unterminated string".to_string(),
                        position: start,
                    });
                }
            }
        }
    }

    fn parse_identifier(&mut self) -> Expr {
        let start = self.pos;
        let word = self.peek_word();
        self.pos += word.len();
        match word.as_str() {
            "true" => Expr::Literal(Value::Bool(true)),
            "false" => Expr::Literal(Value::Bool(false)),
            _ => Expr::Variable {
                name: word,
                position: start,
            },
        }
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_ternary()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after expression: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(expr)
    }
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
