//! Parser for the Brio language
//!
//! A recursive descent parser over the lexer's token sequence. Grammar
//! disambiguation is one token of lookahead at a time; keywords and
//! operators are matched by token text, literals by token kind. The first
//! token that does not fit the grammar aborts the parse with an
//! [`Error::Parse`] carrying the offset of the next unconsumed token (or
//! the last token's offset at end of input) and a description of what was
//! expected. There is no error recovery.

use crate::ast::*;
use crate::common::{IdGenerator, Span};
use crate::diagnostics::{Error, Result};
use crate::lexer::{Token, TokenKind};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;

/// Parse a token stream into a [`Source`].
pub fn parse(tokens: &[Token]) -> Result<Source> {
    let mut parser = Parser::new(tokens);
    parser.parse_source()
}

/// Parser state
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    id_gen: IdGenerator,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            id_gen: IdGenerator::new(),
        }
    }

    fn next_id(&mut self) -> crate::common::NodeId {
        self.id_gen.next()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// True if the next token's text is exactly `text`.
    fn at(&self, text: &str) -> bool {
        self.current().is_some_and(|t| t.text == text)
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume the next token if its text is exactly `text`.
    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the next token if it has the given kind.
    fn take(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at_kind(kind) {
            let token = self.tokens[self.pos].clone();
            self.advance();
            Some(token)
        } else {
            None
        }
    }

    fn expect(&mut self, text: &str, expected: &str) -> Result<()> {
        if self.eat(text) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<String> {
        match self.take(TokenKind::Identifier) {
            Some(token) => Ok(token.text),
            None => Err(self.error(expected)),
        }
    }

    /// Build a parse error at the next unconsumed token, falling back to the
    /// last token once the stream is exhausted.
    fn error(&self, expected: &str) -> Error {
        let span = self
            .current()
            .or_else(|| self.tokens.last())
            .map(Token::span)
            .unwrap_or_else(|| Span::point(0));
        Error::parse(expected, span)
    }

    // ==================== SOURCE ====================

    fn parse_source(&mut self) -> Result<Source> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        while self.eat("LET") {
            fields.push(self.parse_field()?);
        }
        while self.eat("DEF") {
            methods.push(self.parse_method()?);
        }

        if self.current().is_some() {
            return Err(self.error("a method declaration or end of input"));
        }

        Ok(Source { fields, methods })
    }

    fn parse_field(&mut self) -> Result<Field> {
        let id = self.next_id();
        let name = self.expect_identifier("a field name")?;

        let type_name = if self.eat(":") {
            Some(self.expect_identifier("a type name")?)
        } else {
            None
        };

        let value = if self.eat("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(";", "`;`")?;

        Ok(Field {
            id,
            name,
            type_name,
            value,
        })
    }

    fn parse_method(&mut self) -> Result<Method> {
        let id = self.next_id();
        let name = self.expect_identifier("a method name")?;

        self.expect("(", "`(`")?;
        let mut parameters = Vec::new();
        if !self.at(")") {
            parameters.push(self.parse_parameter()?);
            while self.eat(",") {
                parameters.push(self.parse_parameter()?);
            }
        }
        self.expect(")", "`)`")?;

        let return_type_name = if self.eat(":") {
            Some(self.expect_identifier("a type name")?)
        } else {
            None
        };

        self.expect("DO", "`DO`")?;
        let statements = self.parse_block(&["END"])?;
        self.expect("END", "`END`")?;

        Ok(Method {
            id,
            name,
            parameters,
            return_type_name,
            statements,
        })
    }

    fn parse_parameter(&mut self) -> Result<Parameter> {
        let name = self.expect_identifier("a parameter name")?;
        self.expect(":", "`:`")?;
        let type_name = self.expect_identifier("a type name")?;
        Ok(Parameter { name, type_name })
    }

    // ==================== STATEMENTS ====================

    /// Parse statements until one of `terminators` (left unconsumed).
    fn parse_block(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            match self.current() {
                None => return Err(self.error("`END`")),
                Some(token) if terminators.contains(&token.text.as_str()) => break,
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if self.eat("LET") {
            return self.parse_declaration();
        }
        if self.eat("IF") {
            return self.parse_if();
        }
        if self.eat("FOR") {
            return self.parse_for();
        }
        if self.eat("WHILE") {
            return self.parse_while();
        }
        if self.eat("RETURN") {
            let value = self.parse_expression()?;
            self.expect(";", "`;`")?;
            return Ok(Stmt::Return { value });
        }

        let expr = self.parse_expression()?;
        if self.eat("=") {
            let value = self.parse_expression()?;
            self.expect(";", "`;`")?;
            return Ok(Stmt::Assignment {
                receiver: expr,
                value,
            });
        }
        self.expect(";", "`;`")?;
        Ok(Stmt::Expression { expr })
    }

    fn parse_declaration(&mut self) -> Result<Stmt> {
        let id = self.next_id();
        let name = self.expect_identifier("a variable name")?;

        let type_name = if self.eat(":") {
            Some(self.expect_identifier("a type name")?)
        } else {
            None
        };

        let value = if self.eat("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(";", "`;`")?;

        Ok(Stmt::Declaration {
            id,
            name,
            type_name,
            value,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let condition = self.parse_expression()?;
        self.expect("DO", "`DO`")?;

        let then_branch = self.parse_block(&["ELSE", "END"])?;
        let else_branch = if self.eat("ELSE") {
            self.parse_block(&["END"])?
        } else {
            Vec::new()
        };
        self.expect("END", "`END`")?;

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let name = self.expect_identifier("an induction variable name")?;
        self.expect("IN", "`IN`")?;
        let iterable = self.parse_expression()?;
        self.expect("DO", "`DO`")?;
        let body = self.parse_block(&["END"])?;
        self.expect("END", "`END`")?;

        Ok(Stmt::For {
            name,
            iterable,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let condition = self.parse_expression()?;
        self.expect("DO", "`DO`")?;
        let body = self.parse_block(&["END"])?;
        self.expect("END", "`END`")?;

        Ok(Stmt::While { condition, body })
    }

    // ==================== EXPRESSIONS ====================

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_logical()
    }

    /// Each precedence level loops while the next token is one of its
    /// operators and recurses into the next-tighter level for the right
    /// operand, building a left-associative chain.
    fn parse_binary_level(
        &mut self,
        operators: &[(&str, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr = next(self)?;
        'outer: loop {
            for (text, op) in operators {
                if self.eat(text) {
                    let right = next(self)?;
                    expr = Expr::Binary {
                        id: self.next_id(),
                        op: *op,
                        left: Box::new(expr),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            break;
        }
        Ok(expr)
    }

    fn parse_logical(&mut self) -> Result<Expr> {
        self.parse_binary_level(
            &[("AND", BinaryOp::And), ("OR", BinaryOp::Or)],
            Self::parse_equality,
        )
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        self.parse_binary_level(
            &[
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::Ne),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.parse_binary_level(
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        self.parse_binary_level(
            &[("*", BinaryOp::Mul), ("/", BinaryOp::Div)],
            Self::parse_secondary,
        )
    }

    /// Postfix field/method access: `expr.name` and `expr.name(args)`,
    /// chainable left to right.
    fn parse_secondary(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        while self.eat(".") {
            let name = self.expect_identifier("a field or method name")?;
            if self.eat("(") {
                let arguments = self.parse_arguments()?;
                expr = Expr::Call {
                    id: self.next_id(),
                    receiver: Some(Box::new(expr)),
                    name,
                    arguments,
                };
            } else {
                expr = Expr::Access {
                    id: self.next_id(),
                    receiver: Some(Box::new(expr)),
                    name,
                };
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.eat("NIL") {
            return Ok(self.literal(Literal::Nil));
        }
        if self.eat("TRUE") {
            return Ok(self.literal(Literal::Boolean(true)));
        }
        if self.eat("FALSE") {
            return Ok(self.literal(Literal::Boolean(false)));
        }

        if let Some(token) = self.take(TokenKind::Integer) {
            let value = BigInt::from_str(&token.text)
                .map_err(|_| Error::parse("an integer literal", token.span()))?;
            return Ok(self.literal(Literal::Integer(value)));
        }

        if let Some(token) = self.take(TokenKind::Decimal) {
            let value = BigDecimal::from_str(&token.text)
                .map_err(|_| Error::parse("a decimal literal", token.span()))?;
            return Ok(self.literal(Literal::Decimal(value)));
        }

        if let Some(token) = self.take(TokenKind::Character) {
            let inner = unescape(&token.text[1..token.text.len() - 1]);
            let value = inner
                .chars()
                .next()
                .ok_or_else(|| Error::parse("a character literal", token.span()))?;
            return Ok(self.literal(Literal::Character(value)));
        }

        if let Some(token) = self.take(TokenKind::String) {
            let inner = unescape(&token.text[1..token.text.len() - 1]);
            return Ok(self.literal(Literal::String(inner)));
        }

        if self.eat("(") {
            let expr = self.parse_expression()?;
            self.expect(")", "`)`")?;
            return Ok(Expr::Group {
                id: self.next_id(),
                expr: Box::new(expr),
            });
        }

        if let Some(token) = self.take(TokenKind::Identifier) {
            let name = token.text;
            if self.eat("(") {
                let arguments = self.parse_arguments()?;
                return Ok(Expr::Call {
                    id: self.next_id(),
                    receiver: None,
                    name,
                    arguments,
                });
            }
            return Ok(Expr::Access {
                id: self.next_id(),
                receiver: None,
                name,
            });
        }

        Err(self.error("an expression"))
    }

    /// Comma-separated arguments; the `(` has been consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut arguments = Vec::new();
        if !self.at(")") {
            arguments.push(self.parse_expression()?);
            while self.eat(",") {
                arguments.push(self.parse_expression()?);
            }
        }
        self.expect(")", "`)`")?;
        Ok(arguments)
    }

    fn literal(&mut self, value: Literal) -> Expr {
        Expr::Literal {
            id: self.next_id(),
            value,
        }
    }
}

/// Decode the escape sequences the lexer admitted.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
