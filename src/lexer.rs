use std::{iter::Peekable, str::CharIndices};

use crate::token::{Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    // byte offset where the token being scanned begins
    start: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            start: 0,
            line: 0,
        }
    }

    /// Scans the next token. Once the input is exhausted every call yields `EOF`.
    ///
    /// Characters that start no token are dropped without an error.
    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        loop {
            self.skip_whitespace();
            self.start = self.current_index();

            let Some((_, ch)) = self.advance_char() else {
                return Ok(self.accept(TokenKind::EOF));
            };

            let kind = match ch {
                ';' => TokenKind::Semicolon,
                '{' => TokenKind::BraceLeft,
                '}' => TokenKind::BraceRight,
                '(' => TokenKind::ParenLeft,
                ')' => TokenKind::ParenRight,
                '+' => {
                    if self.match_char('=') {
                        TokenKind::PlusEqual
                    } else if self.match_char('+') {
                        TokenKind::PlusPlus
                    } else {
                        TokenKind::Plus
                    }
                }
                '-' => {
                    if self.match_char('=') {
                        TokenKind::MinusEqual
                    } else if self.match_char('-') {
                        TokenKind::MinusMinus
                    } else {
                        TokenKind::Minus
                    }
                }
                '*' => self.either('=', TokenKind::StarEqual, TokenKind::Star),
                '/' => self.either('=', TokenKind::SlashEqual, TokenKind::Slash),
                '%' => self.either('=', TokenKind::ModuloEqual, TokenKind::Modulo),
                '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '<' => self.either('=', TokenKind::LowerEqual, TokenKind::Lower),
                '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
                '!' => self.either('=', TokenKind::BangEqual, TokenKind::Bang),
                '&' if self.match_char('&') => TokenKind::And,
                '|' if self.match_char('|') => TokenKind::Or,
                '"' => return self.read_string(),
                c if c.is_ascii_digit() => return self.read_number(),
                c if is_alpha(c) => return Ok(self.read_identifier()),
                other => {
                    log::trace!(
                        "ignoring character {other:?} at line {}, offset {}",
                        self.line,
                        self.start
                    );
                    continue;
                }
            };
            return Ok(self.accept(kind));
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(idx, c)) = self.chars.peek() {
            match c {
                ' ' | '\r' | '\t' | '\n' => {
                    self.advance_char();
                }
                '/' if self.input[idx..].starts_with("//") => {
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_number(&mut self) -> LexResult<Token<'a>> {
        self.consume_digits();

        if self.match_char('.') {
            if !self.peek_is(|c| c.is_ascii_digit()) {
                return Err(LexError::MalformedFloat {
                    line: self.line,
                    start: self.start,
                    cursor: self.current_index(),
                });
            }
            self.consume_digits();
            return Ok(self.accept(TokenKind::FloatLiteral));
        }

        Ok(self.accept(TokenKind::IntegerLiteral))
    }

    fn read_string(&mut self) -> LexResult<Token<'a>> {
        while let Some((_, c)) = self.advance_char() {
            if c == '"' {
                return Ok(self.accept(TokenKind::StringLiteral));
            }
        }

        Err(LexError::UnterminatedString {
            line: self.line,
            start: self.start,
            cursor: self.current_index(),
        })
    }

    fn read_identifier(&mut self) -> Token<'a> {
        while self.peek_is(is_alpha) {
            self.advance_char();
        }

        let lexeme = &self.input[self.start..self.current_index()];
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.accept(kind)
    }

    fn consume_digits(&mut self) {
        while self.peek_is(|c| c.is_ascii_digit()) {
            self.advance_char();
        }
    }

    fn either(&mut self, next: char, matched: TokenKind, single: TokenKind) -> TokenKind {
        if self.match_char(next) { matched } else { single }
    }

    fn accept(&self, kind: TokenKind) -> Token<'a> {
        let end = self.current_index();
        let lexeme = match kind {
            TokenKind::StringLiteral => &self.input[self.start + 1..end - 1],
            _ => &self.input[self.start..end],
        };
        let token = Token::new(kind, self.line, self.start, end - self.start, lexeme);
        log::trace!("token {:?} {:?} at {}", token.kind, token.lexeme, token.start);
        token
    }
}

impl<'a> Lexer<'a> {
    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, '\n')) = next {
            self.line += 1;
        }
        next
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_is(|c| c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn peek_is(&mut self, predicate: impl Fn(char) -> bool) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| predicate(c))
    }

    fn current_index(&self) -> usize {
        let mut chars = self.chars.clone();
        chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

/// Scans the whole input; the last token is always `EOF`.
pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn tok(kind: TokenKind, line: usize, start: usize, length: usize, lexeme: &str) -> Token<'_> {
        Token::new(kind, line, start, length, lexeme)
    }

    #[test]
    fn scans_symbols_with_longest_match() {
        let tokens = tokenize("(){};---=-+++=+/=/*=* < <= > >= ! != = ==")
            .expect("tokenize should succeed");
        let expected = vec![
            tok(TokenKind::ParenLeft, 0, 0, 1, "("),
            tok(TokenKind::ParenRight, 0, 1, 1, ")"),
            tok(TokenKind::BraceLeft, 0, 2, 1, "{"),
            tok(TokenKind::BraceRight, 0, 3, 1, "}"),
            tok(TokenKind::Semicolon, 0, 4, 1, ";"),
            tok(TokenKind::MinusMinus, 0, 5, 2, "--"),
            tok(TokenKind::MinusEqual, 0, 7, 2, "-="),
            tok(TokenKind::Minus, 0, 9, 1, "-"),
            tok(TokenKind::PlusPlus, 0, 10, 2, "++"),
            tok(TokenKind::PlusEqual, 0, 12, 2, "+="),
            tok(TokenKind::Plus, 0, 14, 1, "+"),
            tok(TokenKind::SlashEqual, 0, 15, 2, "/="),
            tok(TokenKind::Slash, 0, 17, 1, "/"),
            tok(TokenKind::StarEqual, 0, 18, 2, "*="),
            tok(TokenKind::Star, 0, 20, 1, "*"),
            tok(TokenKind::Lower, 0, 22, 1, "<"),
            tok(TokenKind::LowerEqual, 0, 24, 2, "<="),
            tok(TokenKind::Greater, 0, 27, 1, ">"),
            tok(TokenKind::GreaterEqual, 0, 29, 2, ">="),
            tok(TokenKind::Bang, 0, 32, 1, "!"),
            tok(TokenKind::BangEqual, 0, 34, 2, "!="),
            tok(TokenKind::Equal, 0, 37, 1, "="),
            tok(TokenKind::EqualEqual, 0, 39, 2, "=="),
            tok(TokenKind::EOF, 0, 41, 0, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn scans_logical_and_modulo_operators() {
        let tokens = tokenize("&& || % %=").expect("tokenize should succeed");
        let expected = vec![
            tok(TokenKind::And, 0, 0, 2, "&&"),
            tok(TokenKind::Or, 0, 3, 2, "||"),
            tok(TokenKind::Modulo, 0, 6, 1, "%"),
            tok(TokenKind::ModuloEqual, 0, 8, 2, "%="),
            tok(TokenKind::EOF, 0, 10, 0, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn scans_number_literals() {
        let tokens = tokenize("123456789 123.456789").expect("tokenize should succeed");
        let expected = vec![
            tok(TokenKind::IntegerLiteral, 0, 0, 9, "123456789"),
            tok(TokenKind::FloatLiteral, 0, 10, 10, "123.456789"),
            tok(TokenKind::EOF, 0, 20, 0, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn string_lexeme_excludes_quotes() {
        let tokens = tokenize("\"Hello world!\"").expect("tokenize should succeed");
        let expected = vec![
            tok(TokenKind::StringLiteral, 0, 0, 14, "Hello world!"),
            tok(TokenKind::EOF, 0, 14, 0, ""),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        let source =
            "int const break continue while do if else return for float this_is_an_identifier";
        let kinds = tokenize(source)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| (token.kind, token.start, token.length))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Int, 0, 3),
                (TokenKind::Const, 4, 5),
                (TokenKind::Break, 10, 5),
                (TokenKind::Continue, 16, 8),
                (TokenKind::While, 25, 5),
                (TokenKind::Do, 31, 2),
                (TokenKind::If, 34, 2),
                (TokenKind::Else, 37, 4),
                (TokenKind::Return, 42, 6),
                (TokenKind::For, 49, 3),
                (TokenKind::Float, 53, 5),
                (TokenKind::Identifier, 59, 21),
                (TokenKind::EOF, 80, 0),
            ]
        );
    }

    #[test]
    fn skips_comments_and_counts_lines() {
        let input = indoc! {"
            int a = 1; // first
            // whole line
            a += 2;
        "};
        let tokens = tokenize(input).expect("tokenize should succeed");
        let summary = tokens
            .iter()
            .map(|token| (token.kind, token.line, token.lexeme))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Int, 0, "int"),
                (TokenKind::Identifier, 0, "a"),
                (TokenKind::Equal, 0, "="),
                (TokenKind::IntegerLiteral, 0, "1"),
                (TokenKind::Semicolon, 0, ";"),
                (TokenKind::Identifier, 2, "a"),
                (TokenKind::PlusEqual, 2, "+="),
                (TokenKind::IntegerLiteral, 2, "2"),
                (TokenKind::Semicolon, 2, ";"),
                (TokenKind::EOF, 3, ""),
            ]
        );
    }

    #[test]
    fn comment_at_end_of_input_terminates() {
        let tokens = tokenize("1; // trailing").expect("tokenize should succeed");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::EOF);
    }

    #[test]
    fn ignores_unknown_characters() {
        let tokens = tokenize("a @ # $ & | b").expect("tokenize should succeed");
        let kinds = tokens.iter().map(|token| token.lexeme).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["a", "b", ""]);
    }

    #[test]
    fn identifiers_stop_at_digits() {
        let tokens = tokenize("x1").expect("tokenize should succeed");
        let kinds = tokens.iter().map(|token| token.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::IntegerLiteral, TokenKind::EOF]
        );
    }

    #[test]
    fn errors_on_unterminated_string() {
        let err = tokenize("x = \"open").expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::UnterminatedString {
                line: 0,
                start: 4,
                cursor: 9,
            }
        );
        assert!(err.to_string().starts_with("Unfinished string."));
    }

    #[test]
    fn errors_on_float_without_fraction() {
        let err = tokenize("\n12.;").expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::MalformedFloat {
                line: 1,
                start: 1,
                cursor: 4,
            }
        );
        assert_eq!(err.to_string(), "Expected number after .\nAt line 1 (1, 4)");
    }
}
