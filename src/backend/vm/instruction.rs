use std::fmt;

use super::Value;

/// Stack/accumulator instruction executed by the virtual machine.
///
/// Jump operands are relative step counts. After any instruction the machine
/// advances one more step, so `Jump(n)` resumes `n + 1` instructions after
/// the jump itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign(String),
    Constant(Value),
    Load(String),
    Negate,
    Add,
    Subtract,
    Multiply,
    Divide,
    CompareEqual,
    CompareNotEqual,
    CompareGreater,
    CompareGreaterEqual,
    CompareLower,
    CompareLowerEqual,
    Jump(isize),
    JumpIfFalse(isize),
    Ret,
    Eof,
}

impl Instruction {
    pub fn assign(name: impl Into<String>) -> Self {
        Instruction::Assign(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Instruction::Constant(value.into())
    }

    pub fn load(name: impl Into<String>) -> Self {
        Instruction::Load(name.into())
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Assign(_) => "OP_ASSIGN",
            Instruction::Constant(_) => "OP_CONSTANT",
            Instruction::Load(_) => "OP_LOAD",
            Instruction::Negate => "OP_NEGATE",
            Instruction::Add => "OP_ADD",
            Instruction::Subtract => "OP_SUBTRACT",
            Instruction::Multiply => "OP_MULTIPLY",
            Instruction::Divide => "OP_DIVIDE",
            Instruction::CompareEqual => "OP_COMPARE_EQUAL",
            Instruction::CompareNotEqual => "OP_COMPARE_NOT_EQUAL",
            Instruction::CompareGreater => "OP_COMPARE_GREATER",
            Instruction::CompareGreaterEqual => "OP_COMPARE_GREATER_EQUAL",
            Instruction::CompareLower => "OP_COMPARE_LOWER",
            Instruction::CompareLowerEqual => "OP_COMPARE_LOWER_EQUAL",
            Instruction::Jump(_) => "OP_JUMP",
            Instruction::JumpIfFalse(_) => "OP_JUMP_IF_FALSE",
            Instruction::Ret => "OP_RET",
            Instruction::Eof => "OP_EOF",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.opcode();
        match self {
            Instruction::Assign(name) | Instruction::Load(name) => write!(f, "{opcode} {name}"),
            Instruction::Constant(Value::Str(text)) => write!(f, "{opcode} {text:?}"),
            Instruction::Constant(value) => write!(f, "{opcode} {value}"),
            Instruction::Jump(steps) | Instruction::JumpIfFalse(steps) => {
                write!(f, "{opcode} {steps}")
            }
            _ => f.write_str(opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_opcodes() {
        assert_eq!(Instruction::Eof.opcode(), "OP_EOF");
        assert_eq!(Instruction::load("a").opcode(), "OP_LOAD");
        assert_eq!(Instruction::CompareLowerEqual.opcode(), "OP_COMPARE_LOWER_EQUAL");
        assert_eq!(Instruction::JumpIfFalse(3).opcode(), "OP_JUMP_IF_FALSE");
    }

    #[test]
    fn displays_operands() {
        assert_eq!(Instruction::assign("x").to_string(), "OP_ASSIGN x");
        assert_eq!(Instruction::constant(21).to_string(), "OP_CONSTANT 21");
        assert_eq!(Instruction::constant(1.5).to_string(), "OP_CONSTANT 1.5");
        assert_eq!(
            Instruction::constant("a \"b\"").to_string(),
            "OP_CONSTANT \"a \\\"b\\\"\""
        );
        assert_eq!(Instruction::Jump(-9).to_string(), "OP_JUMP -9");
        assert_eq!(Instruction::Multiply.to_string(), "OP_MULTIPLY");
    }
}
