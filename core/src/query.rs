//! Boolean query parsing: infix `AND`/`OR`/`NOT` with parentheses to postfix order.

use crate::error::QueryError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A search word, already lowercased.
    Operand(String),
    And,
    Or,
    Not,
}

impl Token {
    pub fn is_operator(&self) -> bool {
        !matches!(self, Token::Operand(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operand(word) => f.write_str(word),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Not => f.write_str("NOT"),
        }
    }
}

/// Entries on the operator stack. Parentheses never reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackOp {
    Open,
    And,
    Or,
    Not,
}

impl StackOp {
    fn precedence(self) -> u8 {
        match self {
            StackOp::Not => 3,
            StackOp::And => 2,
            StackOp::Or => 1,
            StackOp::Open => 0,
        }
    }

    fn into_token(self) -> Option<Token> {
        match self {
            StackOp::Not => Some(Token::Not),
            StackOp::And => Some(Token::And),
            StackOp::Or => Some(Token::Or),
            StackOp::Open => None,
        }
    }
}

/// Split a raw query into infix tokens, padding parentheses so `(term` and `term)` separate.
pub fn lex(query: &str) -> Vec<String> {
    query
        .replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Shunting-yard conversion to postfix.
///
/// An incoming operator only pops operators of strictly greater precedence, so chains of equal
/// precedence group to the right (`a OR b OR c` becomes `a b c OR OR`).
pub fn parse(query: &str) -> Result<Vec<Token>, QueryError> {
    let mut output = Vec::new();
    let mut stack: Vec<StackOp> = Vec::new();

    for word in lex(query) {
        let op = match word.as_str() {
            "(" => {
                stack.push(StackOp::Open);
                continue;
            }
            ")" => {
                loop {
                    match stack.pop() {
                        Some(StackOp::Open) => break,
                        Some(op) => output.extend(op.into_token()),
                        None => return Err(QueryError::UnbalancedParentheses),
                    }
                }
                continue;
            }
            "AND" => StackOp::And,
            "OR" => StackOp::Or,
            "NOT" => StackOp::Not,
            _ => {
                output.push(Token::Operand(word.to_lowercase()));
                continue;
            }
        };
        while let Some(&top) = stack.last() {
            if top.precedence() <= op.precedence() {
                break;
            }
            stack.pop();
            output.extend(top.into_token());
        }
        stack.push(op);
    }

    while let Some(op) = stack.pop() {
        match op.into_token() {
            Some(token) => output.push(token),
            None => return Err(QueryError::UnbalancedParentheses),
        }
    }
    Ok(output)
}

/// Render postfix tokens space-separated, for logging.
pub fn postfix_string(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_string).collect::<Vec<_>>().join(" ")
}
