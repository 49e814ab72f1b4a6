use thiserror::Error;

use crate::ast::{
    AssignKind, BinaryOperator, Block, Conditional, ElseBranch, Expression, PostfixOperator,
    PrefixOperator, Program, Statement,
};
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected token {expected:?}, found {found} at line {line}")]
    ExpectedToken {
        expected: TokenKind,
        found: String,
        line: usize,
    },
    #[error("Expected expression, found {found} at line {line}")]
    ExpectedExpression { found: String, line: usize },
    #[error("Expected variable type after const, found {found} at line {line}")]
    ExpectedType { found: String, line: usize },
    #[error("Invalid {kind} literal '{lexeme}' at line {line}")]
    InvalidLiteral {
        kind: &'static str,
        lexeme: String,
        line: usize,
    },
    #[error("Token {kind:?} does not map to an operator")]
    UnmappedOperator { kind: TokenKind },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a complete token sequence.
///
/// Any grammar violation aborts the parse; no partial program is returned.
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let statement = match self.peek_kind() {
            TokenKind::Const => self.parse_variable()?,
            kind if kind.is_type() => self.parse_variable()?,
            TokenKind::If => Statement::Conditional(self.parse_conditional()?),
            TokenKind::While => self.parse_while()?,
            TokenKind::Identifier
                if AssignKind::from_token_kind(self.peek_kind_at(1)).is_some() =>
            {
                self.parse_assignment()?
            }
            _ => self.parse_expression_statement()?,
        };
        log::trace!("parsed {} statement", statement.kind_name());
        Ok(statement)
    }

    fn parse_variable(&mut self) -> ParseResult<Statement> {
        let is_const = self.match_kind(&[TokenKind::Const]).is_some();
        let ty = match self.match_kind(&[TokenKind::Int, TokenKind::Float]) {
            Some(token) => token.lexeme.to_string(),
            None => {
                return Err(ParseError::ExpectedType {
                    found: self.describe_current(),
                    line: self.current_line(),
                });
            }
        };
        let name = self.expect(TokenKind::Identifier)?.lexeme.to_string();

        if self.match_kind(&[TokenKind::Equal]).is_some() {
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Statement::VariableDefinition {
                is_const,
                ty,
                name,
                value,
            });
        }

        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::VariableDeclaration { is_const, ty, name })
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let name = self.expect(TokenKind::Identifier)?.lexeme.to_string();
        let operator = self.advance_kind();
        let kind = AssignKind::from_token_kind(operator)
            .ok_or(ParseError::UnmappedOperator { kind: operator })?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::VariableAssignment { name, kind, value })
    }

    fn parse_conditional(&mut self) -> ParseResult<Conditional> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::ParenLeft)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::ParenRight)?;
        let then_block = self.parse_block()?;

        let else_branch = if self.match_kind(&[TokenKind::Else]).is_some() {
            if self.peek_kind() == TokenKind::If {
                Some(ElseBranch::Conditional(Box::new(self.parse_conditional()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Conditional {
            condition,
            then_block,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::ParenLeft)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::ParenRight)?;
        let body = self.parse_block()?;
        Ok(Statement::WhileLoop { condition, body })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::BraceLeft)?;
        let mut statements = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::BraceRight | TokenKind::EOF) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::BraceRight)?;
        Ok(Block::new(statements))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Expression(expr))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(&[TokenKind::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(&[TokenKind::And], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            &[
                TokenKind::Lower,
                TokenKind::LowerEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        self.parse_binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Modulo],
            Self::parse_prefix_unary,
        )
    }

    /// One left-associative precedence level: `next (op next)*`.
    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut expr = next(self)?;
        while let Some(token) = self.match_kind(operators) {
            let op = BinaryOperator::from_token_kind(token.kind)
                .ok_or(ParseError::UnmappedOperator { kind: token.kind })?;
            let right = next(self)?;
            expr = Expression::binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_prefix_unary(&mut self) -> ParseResult<Expression> {
        let operators = [
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ];
        if let Some(token) = self.match_kind(&operators) {
            let op = PrefixOperator::from_token_kind(token.kind)
                .ok_or(ParseError::UnmappedOperator { kind: token.kind })?;
            let operand = self.parse_grouping()?;
            return Ok(Expression::prefix(op, operand));
        }
        self.parse_grouping()
    }

    fn parse_grouping(&mut self) -> ParseResult<Expression> {
        if self.match_kind(&[TokenKind::ParenLeft]).is_some() {
            let inner = self.parse_expression()?;
            self.expect(TokenKind::ParenRight)?;
            return Ok(Expression::grouping(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.match_kind(&[
            TokenKind::IntegerLiteral,
            TokenKind::FloatLiteral,
            TokenKind::StringLiteral,
            TokenKind::Identifier,
        ]) else {
            return Err(ParseError::ExpectedExpression {
                found: self.describe_current(),
                line: self.current_line(),
            });
        };

        match token.kind {
            TokenKind::IntegerLiteral => token
                .lexeme
                .parse::<i64>()
                .map(Expression::Int)
                .map_err(|_| invalid_literal("integer", &token)),
            TokenKind::FloatLiteral => token
                .lexeme
                .parse::<f64>()
                .map(Expression::Float)
                .map_err(|_| invalid_literal("float", &token)),
            TokenKind::StringLiteral => Ok(Expression::String(token.lexeme.to_string())),
            _ => {
                let identifier = token.lexeme.to_string();
                if let Some(step) = self.match_kind(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
                    let op = PostfixOperator::from_token_kind(step.kind)
                        .ok_or(ParseError::UnmappedOperator { kind: step.kind })?;
                    return Ok(Expression::PostfixIncrement { identifier, op });
                }
                Ok(Expression::Identifier(identifier))
            }
        }
    }

    /// Error recovery is not implemented: every error aborts the parse.
    #[allow(dead_code)]
    fn synchronize(&mut self) {}

    fn match_kind(&mut self, kinds: &[TokenKind]) -> Option<Token<'a>> {
        let current = self.tokens.get(self.cursor)?;
        if current.kind != TokenKind::EOF && kinds.contains(&current.kind) {
            let token = current.clone();
            self.cursor += 1;
            return Some(token);
        }
        None
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'a>> {
        self.match_kind(&[kind]).ok_or_else(|| ParseError::ExpectedToken {
            expected: kind,
            found: self.describe_current(),
            line: self.current_line(),
        })
    }

    fn advance_kind(&mut self) -> TokenKind {
        let kind = self.peek_kind();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        kind
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek_kind_at(0)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.cursor + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::EOF
    }

    fn current_line(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .or_else(|| self.tokens.last())
            .map(|token| token.line)
            .unwrap_or(0)
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.cursor) {
            Some(token) if token.kind != TokenKind::EOF => {
                format!("{:?} '{}'", token.kind, token.lexeme)
            }
            _ => "end of input".to_string(),
        }
    }
}

fn invalid_literal(kind: &'static str, token: &Token<'_>) -> ParseError {
    ParseError::InvalidLiteral {
        kind,
        lexeme: token.lexeme.to_string(),
        line: token.line,
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}
