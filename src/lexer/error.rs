use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unfinished string.\nAt line {line} ({start}, {cursor})")]
    UnterminatedString {
        line: usize,
        start: usize,
        cursor: usize,
    },
    #[error("Expected number after .\nAt line {line} ({start}, {cursor})")]
    MalformedFloat {
        line: usize,
        start: usize,
        cursor: usize,
    },
}

pub type LexResult<T> = Result<T, LexError>;
