//! Code generation and execution.
//!
//! `bytecode` lowers a parsed [`Program`](crate::ast::Program) to the
//! register IR. `vm` executes the separate stack IR.

pub mod bytecode;
pub mod vm;
