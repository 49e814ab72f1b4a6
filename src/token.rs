use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Int,
    Float,
    Const,
    Break,
    Continue,
    While,
    Do,
    If,
    Else,
    Return,
    For,

    // Delimiters
    BraceLeft,  // {
    BraceRight, // }
    ParenLeft,  // (
    ParenRight, // )
    Semicolon,  // ;

    // Binary operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Modulo, // %

    // Comparisons
    Lower,        // <
    LowerEqual,   // <=
    Greater,      // >
    GreaterEqual, // >=
    EqualEqual,   // ==
    BangEqual,    // !=
    Equal,        // =
    Bang,         // !

    // Logical
    And, // &&
    Or,  // ||

    // Compound assignment and steps
    PlusEqual,   // +=
    MinusEqual,  // -=
    StarEqual,   // *=
    SlashEqual,  // /=
    ModuloEqual, // %=
    PlusPlus,    // ++
    MinusMinus,  // --

    // Literals
    StringLiteral,
    IntegerLiteral,
    FloatLiteral,
    Identifier,

    EOF,
}

impl TokenKind {
    pub fn keyword(lexeme: &str) -> Option<Self> {
        let kind = match lexeme {
            "int" => TokenKind::Int,
            "float" => TokenKind::Float,
            "const" => TokenKind::Const,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            "for" => TokenKind::For,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_type(self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Float)
    }
}

/// A scanned token. `start` and `length` are byte offsets into the source;
/// for string literals `lexeme` omits the surrounding quotes while `length`
/// still covers them.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub line: usize,
    pub start: usize,
    pub length: usize,
    pub lexeme: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, line: usize, start: usize, length: usize, lexeme: &'a str) -> Self {
        Self {
            kind,
            line,
            start,
            length,
            lexeme,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {:?} '{}'",
            self.line, self.start, self.kind, self.lexeme
        )
    }
}
