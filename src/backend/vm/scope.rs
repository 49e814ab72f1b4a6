use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use super::{Function, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Variable(Value);

impl Variable {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// A cell stored under a name: a plain variable or a callable function.
#[derive(Debug, Clone)]
pub enum Binding {
    Variable(Variable),
    Function(Rc<Function>),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Variable(variable) => write!(f, "{}", variable.value()),
            Binding::Function(_) => f.write_str("<function>"),
        }
    }
}

/// Flat name -> binding environment. Blocks never open nested scopes.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.set(name, Binding::Variable(Variable::new(value)));
    }

    pub fn set_function(&mut self, name: impl Into<String>, function: Function) {
        self.set(name, Binding::Function(Rc::new(function)));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Shallow copy: the map is duplicated, function cells are shared.
    pub fn copy(&self) -> Scope {
        self.clone()
    }

    /// Overlays every binding of `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &Scope) {
        self.bindings.extend(
            other
                .bindings
                .iter()
                .map(|(name, binding)| (name.clone(), binding.clone())),
        );
    }

    /// Name -> display form of every binding, sorted by name.
    pub fn dump(&self) -> BTreeMap<String, String> {
        self.bindings
            .iter()
            .map(|(name, binding)| (name.clone(), binding.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Scope
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.set_variable(name, value);
        }
        scope
    }
}
