//! Register-machine lowering of the syntax tree.
//!
//! Every value flows through a single accumulator: literals are loaded into it
//! and copied into numbered registers, arithmetic combines the accumulator
//! with one register operand. Jump targets are absolute instruction indices.

use std::fmt;

use thiserror::Error;

use crate::ast::{
    BinaryOperator, Block, Conditional, Expression, PostfixOperator, PrefixOperator, Program,
    Statement,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Statement kind '{kind}' is not supported by the bytecode generator")]
    UnsupportedStatement { kind: &'static str },
    #[error("Else branches are not supported by the bytecode generator")]
    UnsupportedElseBranch,
    #[error("Operator {op:?} has no register instruction")]
    UnsupportedOperator { op: BinaryOperator },
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(usize);

impl Register {
    pub fn id(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Load a register into the accumulator.
    LoadReg(Register),
    /// Store the accumulator into a register.
    StoreReg(Register),
    LoadInt(i64),
    LoadFloat(f64),
    LoadString(String),
    LoadVar(String),
    AddReg(Register),
    SubReg(Register),
    MulReg(Register),
    DivReg(Register),
    ModReg(Register),
    Neg,
    LogNeg,
    Increment,
    Decrement,
    /// Store the accumulator into a named variable.
    StoreInt(String),
    Jump(usize),
    /// Jump when the accumulator is falsey.
    JumpFalse(usize),
}

impl Instruction {
    /// Rewrites the target of a jump; other instructions are left untouched.
    pub fn patch(&mut self, address: usize) -> bool {
        match self {
            Instruction::Jump(target) | Instruction::JumpFalse(target) => {
                *target = address;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoadReg(reg) => write!(f, "load_reg {reg}"),
            Instruction::StoreReg(reg) => write!(f, "store_reg {reg}"),
            Instruction::LoadInt(value) => write!(f, "load_int {value}"),
            Instruction::LoadFloat(value) => write!(f, "load_float {value}"),
            Instruction::LoadString(value) => write!(f, "load_string {value:?}"),
            Instruction::LoadVar(name) => write!(f, "load_var {name}"),
            Instruction::AddReg(reg) => write!(f, "add_reg {reg}"),
            Instruction::SubReg(reg) => write!(f, "sub_reg {reg}"),
            Instruction::MulReg(reg) => write!(f, "mul_reg {reg}"),
            Instruction::DivReg(reg) => write!(f, "div_reg {reg}"),
            Instruction::ModReg(reg) => write!(f, "mod_reg {reg}"),
            Instruction::Neg => write!(f, "neg"),
            Instruction::LogNeg => write!(f, "log_neg"),
            Instruction::Increment => write!(f, "inc"),
            Instruction::Decrement => write!(f, "dec"),
            Instruction::StoreInt(name) => write!(f, "store_int {name}"),
            Instruction::Jump(target) => write!(f, "jump {target}"),
            Instruction::JumpFalse(target) => write!(f, "jump_false {target}"),
        }
    }
}

/// Numbered listing, one instruction per line.
pub fn disassemble(code: &[Instruction]) -> String {
    code.iter()
        .enumerate()
        .map(|(index, instruction)| format!("{index:04} {instruction}\n"))
        .collect()
}

/// Counter-based allocator. Registers behave like a stack: the generator
/// releases them in the reverse order of their nesting, so the next
/// allocation reuses the lowest free id.
#[derive(Debug, Default)]
pub struct RegisterAllocator {
    current: usize,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> Register {
        let register = Register::id(self.current);
        self.current += 1;
        register
    }

    pub fn release(&mut self, register: Register) {
        debug_assert!(
            register.index() < self.current,
            "released {register} which is not allocated"
        );
        self.current = self.current.saturating_sub(1);
    }

    pub fn in_use(&self) -> usize {
        self.current
    }
}

#[derive(Debug, Default)]
pub struct BytecodeGenerator {
    allocator: RegisterAllocator,
    instructions: Vec<Instruction>,
}

impl BytecodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, program: &Program) -> GenerationResult<Vec<Instruction>> {
        for statement in program {
            self.statement(statement)?;
        }
        Ok(self.instructions)
    }

    fn statement(&mut self, statement: &Statement) -> GenerationResult<()> {
        match statement {
            Statement::Expression(expr) => {
                let reg = self.expression(expr)?;
                self.allocator.release(reg);
            }
            Statement::VariableDefinition { name, value, .. } => {
                let reg = self.expression(value)?;
                self.emit(Instruction::LoadReg(reg));
                self.emit(Instruction::StoreInt(name.clone()));
                self.allocator.release(reg);
            }
            Statement::Conditional(conditional) => self.conditional(conditional)?,
            Statement::WhileLoop { condition, body } => self.while_loop(condition, body)?,
            Statement::VariableDeclaration { .. } | Statement::VariableAssignment { .. } => {
                return Err(GenerationError::UnsupportedStatement {
                    kind: statement.kind_name(),
                });
            }
        }
        Ok(())
    }

    fn conditional(&mut self, conditional: &Conditional) -> GenerationResult<()> {
        if conditional.else_branch.is_some() {
            return Err(GenerationError::UnsupportedElseBranch);
        }

        self.condition(&conditional.condition)?;
        let jump = self.emit(Instruction::JumpFalse(0));
        self.block(&conditional.then_block)?;
        self.patch_past_end(jump);
        Ok(())
    }

    fn while_loop(&mut self, condition: &Expression, body: &Block) -> GenerationResult<()> {
        let loop_start = self.instructions.len();

        self.condition(condition)?;
        let jump = self.emit(Instruction::JumpFalse(0));
        self.block(body)?;
        self.emit(Instruction::Jump(loop_start));
        self.patch_past_end(jump);
        Ok(())
    }

    /// Leaves the condition's value in the accumulator.
    fn condition(&mut self, condition: &Expression) -> GenerationResult<()> {
        let reg = self.expression(condition)?;
        self.emit(Instruction::LoadReg(reg));
        self.allocator.release(reg);
        Ok(())
    }

    // Targets the index one past the end of the emitted code, plus one.
    fn patch_past_end(&mut self, jump: usize) {
        let target = self.instructions.len() + 1;
        self.instructions[jump].patch(target);
        log::debug!("patched jump at {jump} -> {target}");
    }

    fn block(&mut self, block: &Block) -> GenerationResult<()> {
        for statement in block {
            self.statement(statement)?;
        }
        Ok(())
    }

    fn expression(&mut self, expr: &Expression) -> GenerationResult<Register> {
        match expr {
            Expression::Int(value) => Ok(self.load_literal(Instruction::LoadInt(*value))),
            Expression::Float(value) => Ok(self.load_literal(Instruction::LoadFloat(*value))),
            Expression::String(value) => {
                Ok(self.load_literal(Instruction::LoadString(value.clone())))
            }
            Expression::Identifier(name) => {
                Ok(self.load_literal(Instruction::LoadVar(name.clone())))
            }
            Expression::Grouping(inner) => self.expression(inner),
            Expression::Binary { left, op, right } => {
                let arithmetic = arithmetic_instruction(*op)?;
                let left = self.expression(left)?;
                let right = self.expression(right)?;

                self.emit(Instruction::LoadReg(left));
                self.emit(arithmetic(right));

                self.allocator.release(right);
                self.allocator.release(left);

                let result = self.allocator.alloc();
                self.emit(Instruction::StoreReg(result));
                Ok(result)
            }
            Expression::Prefix { op, operand } => {
                let reg = self.expression(operand)?;
                self.emit(Instruction::LoadReg(reg));
                self.emit(match op {
                    PrefixOperator::ArithmeticNegate => Instruction::Neg,
                    PrefixOperator::LogicalNegate => Instruction::LogNeg,
                    PrefixOperator::Increment => Instruction::Increment,
                    PrefixOperator::Decrement => Instruction::Decrement,
                });
                self.emit(Instruction::StoreReg(reg));
                Ok(reg)
            }
            Expression::PostfixIncrement { identifier, op } => {
                self.emit(Instruction::LoadVar(identifier.clone()));
                let reg = self.allocator.alloc();
                self.emit(Instruction::StoreReg(reg));
                self.emit(Instruction::LoadReg(reg));
                self.emit(match op {
                    PostfixOperator::Increment => Instruction::Increment,
                    PostfixOperator::Decrement => Instruction::Decrement,
                });
                self.emit(Instruction::StoreReg(reg));
                Ok(reg)
            }
        }
    }

    fn load_literal(&mut self, load: Instruction) -> Register {
        let reg = self.allocator.alloc();
        self.emit(load);
        self.emit(Instruction::StoreReg(reg));
        reg
    }

    /// Appends an instruction and returns its index.
    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }
}

fn arithmetic_instruction(op: BinaryOperator) -> GenerationResult<fn(Register) -> Instruction> {
    let constructor: fn(Register) -> Instruction = match op {
        BinaryOperator::Add => Instruction::AddReg,
        BinaryOperator::Subtract => Instruction::SubReg,
        BinaryOperator::Multiply => Instruction::MulReg,
        BinaryOperator::Divide => Instruction::DivReg,
        BinaryOperator::Modulo => Instruction::ModReg,
        _ => return Err(GenerationError::UnsupportedOperator { op }),
    };
    Ok(constructor)
}

pub fn generate(program: &Program) -> GenerationResult<Vec<Instruction>> {
    BytecodeGenerator::new().generate(program)
}
