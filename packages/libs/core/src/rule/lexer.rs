//! 규칙 문자열 렉서
//!
//! 한 글자 lookahead로 한 번에 훑으며 토큰 스트림을 만듭니다.
//! 모든 에러는 실패 지점의 0-based 문자 위치를 가진 `Error::Syntax`입니다.

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// 렉서
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// 전체 입력을 토큰화 (마지막 토큰은 항상 `Eof`)
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn next_token(&mut self) -> Result<Token> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }

        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, start));
        };

        if c.is_ascii_digit() {
            return self.number();
        }
        if c == '"' || c == '\'' {
            return self.string(c);
        }
        if is_identifier_start(c) {
            return self.identifier();
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '=' => return self.two_char('=', TokenKind::Eq, "expected '==', found single '='"),
            '!' => return self.two_char('=', TokenKind::Ne, "expected '!=', found single '!'"),
            '<' => return Ok(self.maybe_two_char('=', TokenKind::Le, TokenKind::Lt)),
            '>' => return Ok(self.maybe_two_char('=', TokenKind::Ge, TokenKind::Gt)),
            other => {
                return Err(Error::syntax(format!("unexpected character '{}'", other), start));
            }
        };

        self.pos += 1;
        Ok(Token::new(kind, start))
    }

    /// 반드시 두 글자여야 하는 연산자 (`==`, `!=`)
    fn two_char(&mut self, second: char, kind: TokenKind, message: &str) -> Result<Token> {
        let start = self.pos;
        if self.peek_next() == Some(second) {
            self.pos += 2;
            Ok(Token::new(kind, start))
        } else {
            Err(Error::syntax(message, start))
        }
    }

    /// 한 글자 또는 두 글자 연산자 (`<`/`<=`, `>`/`>=`)
    fn maybe_two_char(&mut self, second: char, long: TokenKind, short: TokenKind) -> Token {
        let start = self.pos;
        if self.peek_next() == Some(second) {
            self.pos += 2;
            Token::new(long, start)
        } else {
            self.pos += 1;
            Token::new(short, start)
        }
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        self.consume_digits();

        // 소수점 뒤에 숫자가 있을 때만 실수
        let is_float = self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.pos += 1;
            self.consume_digits();
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| Error::syntax(format!("invalid number '{}'", text), start))?
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|_| Error::syntax(format!("integer literal '{}' out of range", text), start))?
        };

        Ok(Token::new(kind, start))
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// 따옴표 문자열 (이스케이프 처리 없음)
    fn string(&mut self, quote: char) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;

        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Token::new(TokenKind::String(value), start));
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
                None => return Err(Error::syntax("unterminated string literal", start)),
            }
        }
    }

    /// 식별자/키워드
    ///
    /// `@`는 첫 글자로만 허용됩니다 (`foo@bar`는 에러).
    fn identifier(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        while self.peek().is_some_and(is_identifier_part) {
            self.pos += 1;
        }

        if self.peek() == Some('@') {
            return Err(Error::syntax("'@' is only allowed at the start of an identifier", self.pos));
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        if text == "@" {
            return Err(Error::syntax("expected a macro name after '@'", start));
        }

        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text));
        Ok(Token::new(kind, start))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '@'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// 규칙 문자열 토큰화
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}
