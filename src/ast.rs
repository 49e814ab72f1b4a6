//! Syntax tree produced by the parser.
//!
//! Nodes are built once per parse and never mutated afterwards. The bytecode
//! generator walks them directly; the stack VM never sees them.
//!
//! Declared types (`int`, `float`) are kept as plain labels and are never
//! checked.

use std::ops::Index;

use crate::token::TokenKind;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Int(i64),
    Float(f64),
    String(String),
    Identifier(String),
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Prefix {
        op: PrefixOperator,
        operand: Box<Expression>,
    },
    PostfixIncrement {
        identifier: String,
        op: PostfixOperator,
    },
    Grouping(Box<Expression>),
}

impl Expression {
    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn prefix(op: PrefixOperator, operand: Expression) -> Self {
        Expression::Prefix {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn grouping(inner: Expression) -> Self {
        Expression::Grouping(Box::new(inner))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Lower,
    LowerEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            TokenKind::Modulo => BinaryOperator::Modulo,
            TokenKind::Lower => BinaryOperator::Lower,
            TokenKind::LowerEqual => BinaryOperator::LowerEqual,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
            TokenKind::EqualEqual => BinaryOperator::Equal,
            TokenKind::BangEqual => BinaryOperator::NotEqual,
            TokenKind::And => BinaryOperator::And,
            TokenKind::Or => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    ArithmeticNegate,
    LogicalNegate,
    Increment,
    Decrement,
}

impl PrefixOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Minus => PrefixOperator::ArithmeticNegate,
            TokenKind::Bang => PrefixOperator::LogicalNegate,
            TokenKind::PlusPlus => PrefixOperator::Increment,
            TokenKind::MinusMinus => PrefixOperator::Decrement,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl PostfixOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::PlusPlus => Some(PostfixOperator::Increment),
            TokenKind::MinusMinus => Some(PostfixOperator::Decrement),
            _ => None,
        }
    }
}

/// `=`, `+=`, `-=`, `*=`, `/=` or `%=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignKind {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
}

impl AssignKind {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let assign = match kind {
            TokenKind::Equal => AssignKind::Assign,
            TokenKind::PlusEqual => AssignKind::AddAssign,
            TokenKind::MinusEqual => AssignKind::SubtractAssign,
            TokenKind::StarEqual => AssignKind::MultiplyAssign,
            TokenKind::SlashEqual => AssignKind::DivideAssign,
            TokenKind::ModuloEqual => AssignKind::ModuloAssign,
            _ => return None,
        };
        Some(assign)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Expression(Expression),
    VariableDeclaration {
        is_const: bool,
        ty: String,
        name: String,
    },
    VariableDefinition {
        is_const: bool,
        ty: String,
        name: String,
        value: Expression,
    },
    VariableAssignment {
        name: String,
        kind: AssignKind,
        value: Expression,
    },
    Conditional(Conditional),
    WhileLoop {
        condition: Expression,
        body: Block,
    },
}

impl Statement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Expression(_) => "expression",
            Statement::VariableDeclaration { .. } => "variable declaration",
            Statement::VariableDefinition { .. } => "variable definition",
            Statement::VariableAssignment { .. } => "variable assignment",
            Statement::Conditional(_) => "conditional",
            Statement::WhileLoop { .. } => "while loop",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Conditional {
    pub condition: Expression,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

/// `else { ... }` or `else if (...) { ... }`; chains nest through `Conditional`.
#[derive(Debug, PartialEq, Clone)]
pub enum ElseBranch {
    Block(Block),
    Conditional(Box<Conditional>),
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

macro_rules! statement_list {
    ($name:ident) => {
        impl $name {
            pub fn new(statements: Vec<Statement>) -> Self {
                Self { statements }
            }

            pub fn get(&self, index: usize) -> Option<&Statement> {
                self.statements.get(index)
            }

            pub fn len(&self) -> usize {
                self.statements.len()
            }

            pub fn is_empty(&self) -> bool {
                self.statements.is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
                self.statements.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = Statement;

            fn index(&self, index: usize) -> &Statement {
                &self.statements[index]
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a Statement;
            type IntoIter = std::slice::Iter<'a, Statement>;

            fn into_iter(self) -> Self::IntoIter {
                self.statements.iter()
            }
        }
    };
}

statement_list!(Program);
statement_list!(Block);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_binary_operator_token() {
        let pairs = [
            (TokenKind::Plus, BinaryOperator::Add),
            (TokenKind::Minus, BinaryOperator::Subtract),
            (TokenKind::Star, BinaryOperator::Multiply),
            (TokenKind::Slash, BinaryOperator::Divide),
            (TokenKind::Modulo, BinaryOperator::Modulo),
            (TokenKind::Lower, BinaryOperator::Lower),
            (TokenKind::LowerEqual, BinaryOperator::LowerEqual),
            (TokenKind::Greater, BinaryOperator::Greater),
            (TokenKind::GreaterEqual, BinaryOperator::GreaterEqual),
            (TokenKind::EqualEqual, BinaryOperator::Equal),
            (TokenKind::BangEqual, BinaryOperator::NotEqual),
            (TokenKind::And, BinaryOperator::And),
            (TokenKind::Or, BinaryOperator::Or),
        ];
        for (kind, op) in pairs {
            assert_eq!(BinaryOperator::from_token_kind(kind), Some(op));
        }
    }

    #[test]
    fn unmapped_tokens_have_no_operator() {
        assert_eq!(BinaryOperator::from_token_kind(TokenKind::Semicolon), None);
        assert_eq!(PrefixOperator::from_token_kind(TokenKind::Plus), None);
        assert_eq!(PostfixOperator::from_token_kind(TokenKind::Minus), None);
        assert_eq!(AssignKind::from_token_kind(TokenKind::EqualEqual), None);
    }

    #[test]
    fn program_is_indexable() {
        let program = Program::new(vec![Statement::Expression(Expression::Int(1))]);
        assert_eq!(program.len(), 1);
        assert_eq!(program[0], Statement::Expression(Expression::Int(1)));
        assert!(program.get(1).is_none());
    }

    #[test]
    #[should_panic]
    fn block_index_out_of_bounds_panics() {
        let block = Block::default();
        let _ = &block[0];
    }
}
