use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

mod function;
mod instruction;
mod scope;
mod value;

pub use function::Function;
pub use instruction::Instruction;
pub use scope::{Binding, Scope, Variable};
pub use value::{Comparison, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("Expected EOF.")]
    ExpectedEof,
    #[error("Unexpected state.")]
    UnexpectedState,
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("'{name}' is not a variable")]
    NotAVariable { name: String },
    #[error("Cannot {operation} {left} and {right}")]
    InvalidOperands {
        operation: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("Cannot {operation} {operand}")]
    InvalidOperand {
        operation: &'static str,
        operand: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },
    #[error("Jump at {index} by {steps} lands before the first instruction")]
    InvalidJumpTarget { index: usize, steps: isize },
}

pub type VmResult<T> = Result<T, VmError>;

/// Snapshot taken when the machine executes `OP_EOF`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub output: Option<String>,
    pub memory_dump: BTreeMap<String, String>,
    pub stack_dump: Vec<Value>,
    pub return_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VmState {
    Running,
    Eof(ExecutionResult),
}

/// Stack machine over an immutable instruction sequence.
///
/// Every `run` starts from a fresh copy of the initial scope, so the same
/// machine can be run repeatedly with identical results.
#[derive(Debug)]
pub struct VirtualMachine {
    code: Rc<[Instruction]>,
    current: usize,
    state: VmState,
    initial_scope: Scope,
    scope: Scope,
    stack: Vec<Value>,
    compare_result: Option<bool>,
    return_value: Option<Value>,
}

impl VirtualMachine {
    pub fn new(code: Vec<Instruction>) -> Self {
        Self::with_scope(code, Scope::new())
    }

    pub fn with_scope(code: Vec<Instruction>, scope: Scope) -> Self {
        Self::from_shared(code.into(), scope)
    }

    pub(crate) fn from_shared(code: Rc<[Instruction]>, scope: Scope) -> Self {
        Self {
            code,
            current: 0,
            state: VmState::Running,
            scope: scope.copy(),
            initial_scope: scope,
            stack: Vec::new(),
            compare_result: None,
            return_value: None,
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn run(&mut self) -> VmResult<ExecutionResult> {
        self.reset();

        while self.current < self.code.len() {
            self.next()?;
            if let VmState::Eof(result) = &self.state {
                log::debug!(
                    "vm reached EOF after {} instructions with {} bindings",
                    self.current,
                    result.memory_dump.len()
                );
                return Ok(result.clone());
            }
        }

        Err(VmError::ExpectedEof)
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.state = VmState::Running;
        self.scope = self.initial_scope.copy();
        self.stack.clear();
        self.compare_result = None;
        self.return_value = None;
    }

    /// Executes the instruction under the cursor and advances past it.
    pub fn next(&mut self) -> VmResult<()> {
        if matches!(self.state, VmState::Eof(_)) {
            return Err(VmError::UnexpectedState);
        }
        let code = Rc::clone(&self.code);
        let instruction = code.get(self.current).ok_or(VmError::ExpectedEof)?;
        log::trace!("{:04} {instruction}", self.current);

        let mut steps = 0;
        match instruction {
            Instruction::Eof => {
                self.state = VmState::Eof(ExecutionResult {
                    output: None,
                    memory_dump: self.scope.dump(),
                    stack_dump: self.stack.clone(),
                    return_value: self.return_value.clone(),
                });
            }
            Instruction::Assign(name) => {
                let value = self.pop()?;
                self.scope.set_variable(name.as_str(), value);
            }
            Instruction::Load(name) => {
                let value = self.load(name)?;
                self.stack.push(value);
            }
            Instruction::Constant(value) => self.stack.push(value.clone()),
            Instruction::Negate => {
                let value = self.pop()?.negate()?;
                self.stack.push(value);
            }
            Instruction::Add => self.binary(Value::add)?,
            Instruction::Subtract => self.binary(Value::subtract)?,
            Instruction::Multiply => self.binary(Value::multiply)?,
            Instruction::Divide => self.binary(Value::divide)?,
            Instruction::CompareEqual => self.compare(Comparison::Equal)?,
            Instruction::CompareNotEqual => self.compare(Comparison::NotEqual)?,
            Instruction::CompareGreater => self.compare(Comparison::Greater)?,
            Instruction::CompareGreaterEqual => self.compare(Comparison::GreaterEqual)?,
            Instruction::CompareLower => self.compare(Comparison::Lower)?,
            Instruction::CompareLowerEqual => self.compare(Comparison::LowerEqual)?,
            Instruction::Jump(offset) => steps = *offset,
            Instruction::JumpIfFalse(offset) => {
                if self.compare_result == Some(false) {
                    steps = *offset;
                    self.compare_result = None;
                }
            }
            Instruction::Ret => self.return_value = Some(self.pop()?),
        }

        self.current = resume_index(self.current, steps).ok_or(VmError::InvalidJumpTarget {
            index: self.current,
            steps,
        })?;
        Ok(())
    }

    fn load(&self, name: &str) -> VmResult<Value> {
        match self.scope.get(name) {
            Some(Binding::Variable(variable)) => Ok(variable.value().clone()),
            Some(Binding::Function(_)) => Err(VmError::NotAVariable {
                name: name.to_string(),
            }),
            None => Err(VmError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    fn binary(&mut self, operation: fn(&Value, &Value) -> VmResult<Value>) -> VmResult<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.stack.push(operation(&left, &right)?);
        Ok(())
    }

    fn compare(&mut self, comparison: Comparison) -> VmResult<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.compare_result = Some(left.compare(&right, comparison)?);
        Ok(())
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }
}

// `current + steps + 1`; only the final index has to be non-negative.
fn resume_index(current: usize, steps: isize) -> Option<usize> {
    isize::try_from(current)
        .ok()?
        .checked_add(steps)?
        .checked_add(1)
        .and_then(|index| usize::try_from(index).ok())
}
