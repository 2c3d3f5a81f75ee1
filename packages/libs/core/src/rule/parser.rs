//! 규칙 파서
//!
//! 토큰 한 개 lookahead의 재귀 하강 파서입니다. 우선순위 (낮음 → 높음):
//!
//! ```text
//! expression := term   ( OR  term  )*
//! term       := factor ( AND factor )*
//! factor     := NOT factor | comparison
//! comparison := atom [ ( == | != | < | > | <= | >= | in ) atom ]
//! atom       := literal | list | '(' expression ')' | IDENT [ '(' args ')' ]
//! list       := '[' [ literal ( ',' literal )* ] ']'
//! ```
//!
//! 비교 연산은 체이닝되지 않으며, 입력 전체를 소비하지 못하면 에러입니다.
//! 중첩 깊이(괄호, `not`, 함수 인자, 리스트, `and`/`or` 체인)는 [`MAX_DEPTH`]로 제한되어
//! 평가기, 컴파일러, 검증기는 깊이가 제한된 트리만 받습니다.

use super::ast::{BinaryOperator, Expr, Literal};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// 허용되는 최대 중첩 깊이
pub const MAX_DEPTH: usize = 256;

/// 파서
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map(|t| t.position + 1).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// 전체 토큰 스트림을 하나의 표현식으로 파싱
    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.expression()?;

        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(Error::syntax(
                format!("unexpected token '{}' after end of expression", token.kind),
                token.position,
            ));
        }

        Ok(expr)
    }

    fn peek(&self) -> &Token {
        // new()가 Eof를 보장하므로 마지막 토큰에서 멈춤
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(unexpected(&token.kind, token.position, &format!("expected '{}'", kind)))
        }
    }

    /// 중첩 한 단계 진입
    fn nest(&mut self, position: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::syntax(
                format!("expression nested too deeply (limit {})", MAX_DEPTH),
                position,
            ));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.term()?;
        while self.check(&TokenKind::Or) {
            // 왼쪽 결합 체인은 연산자마다 트리가 한 단계 깊어짐
            let token = self.advance();
            self.nest(token.position)?;
            let right = self.term()?;
            left = Expr::binary(left, BinaryOperator::Or, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.factor()?;
        while self.check(&TokenKind::And) {
            let token = self.advance();
            self.nest(token.position)?;
            let right = self.factor()?;
            left = Expr::binary(left, BinaryOperator::And, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::Not) {
            let token = self.advance();
            self.nest(token.position)?;
            let operand = self.factor()?;
            self.depth -= 1;
            return Ok(Expr::not(operand));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.atom()?;

        let Some(op) = comparison_operator(&self.peek().kind) else {
            return Ok(left);
        };
        self.advance();
        let right = self.atom()?;

        let next = self.peek();
        if comparison_operator(&next.kind).is_some() {
            return Err(Error::syntax(
                format!(
                    "comparison operators cannot be chained; wrap one side in parentheses before '{}'",
                    next.kind
                ),
                next.position,
            ));
        }

        Ok(Expr::binary(left, op, right))
    }

    fn atom(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::LParen => {
                self.nest(token.position)?;
                let expr = self.expression()?;
                self.expect(TokenKind::RParen)?;
                self.depth -= 1;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.nest(token.position)?;
                let list = self.list()?;
                self.depth -= 1;
                Ok(Expr::Literal(list))
            }
            TokenKind::Identifier(name) => {
                if self.check(&TokenKind::LParen) {
                    let open = self.advance();
                    self.nest(open.position)?;
                    let args = self.arguments()?;
                    self.depth -= 1;
                    Ok(Expr::FunctionCall { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            other => match literal(&other) {
                Some(value) => Ok(Expr::Literal(value)),
                None => Err(unexpected(&other, token.position, "expected a value, identifier or '('")),
            },
        }
    }

    /// 함수 인자 (여는 괄호 다음부터)
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    /// 리스트 리터럴 (여는 대괄호 다음부터)
    fn list(&mut self) -> Result<Literal> {
        let mut items = Vec::new();
        if self.check(&TokenKind::RBracket) {
            self.advance();
            return Ok(Literal::List(items));
        }

        loop {
            let token = self.advance();
            let item = match token.kind {
                TokenKind::LBracket => {
                    self.nest(token.position)?;
                    let nested = self.list()?;
                    self.depth -= 1;
                    nested
                }
                other => literal(&other).ok_or_else(|| {
                    unexpected(&other, token.position, "list elements must be literals")
                })?,
            };
            items.push(item);

            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect(TokenKind::RBracket)?;
            return Ok(Literal::List(items));
        }
    }
}

fn comparison_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Eq => Some(BinaryOperator::Eq),
        TokenKind::Ne => Some(BinaryOperator::Ne),
        TokenKind::Lt => Some(BinaryOperator::Lt),
        TokenKind::Gt => Some(BinaryOperator::Gt),
        TokenKind::Le => Some(BinaryOperator::Le),
        TokenKind::Ge => Some(BinaryOperator::Ge),
        TokenKind::In => Some(BinaryOperator::In),
        _ => None,
    }
}

fn literal(kind: &TokenKind) -> Option<Literal> {
    match kind {
        TokenKind::Integer(i) => Some(Literal::Int(*i)),
        TokenKind::Float(f) => Some(Literal::Float(*f)),
        TokenKind::String(s) => Some(Literal::String(s.clone())),
        TokenKind::Boolean(b) => Some(Literal::Bool(*b)),
        TokenKind::Null => Some(Literal::Null),
        _ => None,
    }
}

fn unexpected(kind: &TokenKind, position: usize, expected: &str) -> Error {
    let message = match kind {
        TokenKind::Eof => format!("unexpected end of input; {}", expected),
        kind => format!("unexpected token '{}'; {}", kind, expected),
    };
    Error::syntax(message, position)
}

/// 규칙 문자열 파싱
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let expr = Parser::new(tokens).parse()?;
    tracing::trace!(rule = source, ast = %expr, "parsed rule");
    Ok(expr)
}
