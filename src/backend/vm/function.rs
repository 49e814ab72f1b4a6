use std::rc::Rc;

use super::{Instruction, Scope, VirtualMachine};

/// A fixed instruction sequence that can be run in any number of frames.
#[derive(Debug, Clone)]
pub struct Function {
    code: Rc<[Instruction]>,
}

impl Function {
    pub fn new(code: Vec<Instruction>) -> Self {
        Self { code: code.into() }
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// A fresh machine over this function's code whose runs start from `scope`.
    pub fn instance(&self, scope: Scope) -> VirtualMachine {
        VirtualMachine::from_shared(Rc::clone(&self.code), scope)
    }

    /// Like [`Function::instance`], with `arguments` overlaid on a copy of the
    /// enclosing scope. Neither caller scope is touched by the call.
    pub fn instance_with_arguments(&self, enclosing: &Scope, arguments: &Scope) -> VirtualMachine {
        let mut frame = enclosing.copy();
        frame.extend(arguments);
        self.instance(frame)
    }
}
