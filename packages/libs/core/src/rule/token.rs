//! 토큰 정의

use std::fmt;

/// 토큰 (종류 + 0-based 문자 위치)
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// 토큰 종류
///
/// 점 경로(`a.b.c`)와 매크로 이름(`@has_role`)은 모두 `Identifier`입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,

    Identifier(String),

    // Comparison
    Eq, // ==
    Ne, // !=
    Lt, // <
    Gt, // >
    Le, // <=
    Ge, // >=

    // Keywords
    And,
    Or,
    Not,
    In,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    Eof,
}

impl TokenKind {
    /// 식별자 문자열을 키워드로 재분류
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "true" => Some(TokenKind::Boolean(true)),
            "false" => Some(TokenKind::Boolean(false)),
            "null" => Some(TokenKind::Null),
            "and" => Some(TokenKind::And),
            "or" => Some(TokenKind::Or),
            "not" => Some(TokenKind::Not),
            "in" => Some(TokenKind::In),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Integer(i) => write!(f, "{}", i),
            TokenKind::Float(x) => write!(f, "{}", x),
            TokenKind::String(s) => write!(f, "{:?}", s),
            TokenKind::Boolean(b) => write!(f, "{}", b),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::Eq => f.write_str("=="),
            TokenKind::Ne => f.write_str("!="),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::Le => f.write_str("<="),
            TokenKind::Ge => f.write_str(">="),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::In => f.write_str("in"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
