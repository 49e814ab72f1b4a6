pub mod ast;
pub mod backend;
pub mod emit;
pub mod fixtures;
pub mod lexer;
pub mod parser;
pub mod token;
