use std::cmp::Ordering;
use std::fmt;

use super::{VmError, VmResult};

/// Scalar held on the operand stack and in variable cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Lower,
    LowerEqual,
}

impl Comparison {
    fn name(self) -> &'static str {
        match self {
            Comparison::Equal => "compare_equal",
            Comparison::NotEqual => "compare_not_equal",
            Comparison::Greater => "compare_greater",
            Comparison::GreaterEqual => "compare_greater_equal",
            Comparison::Lower => "compare_lower",
            Comparison::LowerEqual => "compare_lower_equal",
        }
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            Comparison::Equal => ordering == Some(Ordering::Equal),
            Comparison::NotEqual => ordering != Some(Ordering::Equal),
            Comparison::Greater => ordering == Some(Ordering::Greater),
            Comparison::GreaterEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
            Comparison::Lower => ordering == Some(Ordering::Less),
            Comparison::LowerEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Numeric addition, or concatenation of the display forms when either
    /// side is a string.
    pub fn add(&self, other: &Value) -> VmResult<Value> {
        if matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)) {
            return Ok(Value::Str(format!("{self}{other}")));
        }
        self.arithmetic(other, "add", i64::checked_add, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Value) -> VmResult<Value> {
        self.arithmetic(other, "subtract", i64::checked_sub, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Value) -> VmResult<Value> {
        self.arithmetic(other, "multiply", i64::checked_mul, |a, b| a * b)
    }

    /// Integer division truncates toward zero; float division follows IEEE.
    pub fn divide(&self, other: &Value) -> VmResult<Value> {
        if let (Value::Int(_), Value::Int(0)) = (self, other) {
            return Err(VmError::DivisionByZero);
        }
        self.arithmetic(other, "divide", i64::checked_div, |a, b| a / b)
    }

    pub fn negate(&self) -> VmResult<Value> {
        match self {
            Value::Int(value) => value
                .checked_neg()
                .map(Value::Int)
                .ok_or(VmError::ArithmeticOverflow {
                    operation: "negate",
                }),
            Value::Float(value) => Ok(Value::Float(-value)),
            Value::Str(_) => Err(VmError::InvalidOperand {
                operation: "negate",
                operand: self.type_name(),
            }),
        }
    }

    /// Strings and numbers never compare equal; ordering them is an error.
    pub fn compare(&self, other: &Value, comparison: Comparison) -> VmResult<bool> {
        let ordering = match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => {
                return match comparison {
                    Comparison::Equal => Ok(false),
                    Comparison::NotEqual => Ok(true),
                    _ => Err(self.invalid_operands(comparison.name(), other)),
                };
            }
        };
        Ok(comparison.holds(ordering))
    }

    fn arithmetic(
        &self,
        other: &Value,
        operation: &'static str,
        ints: fn(i64, i64) -> Option<i64>,
        floats: fn(f64, f64) -> f64,
    ) -> VmResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => ints(*a, *b)
                .map(Value::Int)
                .ok_or(VmError::ArithmeticOverflow { operation }),
            (Value::Int(a), Value::Float(b)) => Ok(Value::Float(floats(*a as f64, *b))),
            (Value::Float(a), Value::Int(b)) => Ok(Value::Float(floats(*a, *b as f64))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(floats(*a, *b))),
            _ => Err(self.invalid_operands(operation, other)),
        }
    }

    fn invalid_operands(&self, operation: &'static str, other: &Value) -> VmError {
        VmError::InvalidOperands {
            operation,
            left: self.type_name(),
            right: other.type_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Str(value) => f.write_str(value),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(Value::Int(1).add(&Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(Value::Int(1).subtract(&Value::Int(2)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(3).multiply(&Value::Int(3)), Ok(Value::Int(9)));
        assert_eq!(Value::Int(90).divide(&Value::Int(3)), Ok(Value::Int(30)));
        assert_eq!(Value::Int(7).divide(&Value::Int(2)), Ok(Value::Int(3)));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(Value::Int(1).add(&Value::Float(0.5)), Ok(Value::Float(1.5)));
        assert_eq!(
            Value::Float(7.0).divide(&Value::Int(2)),
            Ok(Value::Float(3.5))
        );
    }

    #[test]
    fn addition_with_a_string_concatenates() {
        let text = Value::from("I am ").add(&Value::Int(21)).expect("add");
        let text = text.add(&Value::from(" years old.")).expect("add");
        assert_eq!(text, Value::from("I am 21 years old."));
        assert_eq!(
            Value::Float(1.5).add(&Value::from("!")),
            Ok(Value::from("1.5!"))
        );
    }

    #[test]
    fn strings_reject_other_arithmetic() {
        assert_eq!(
            Value::from("a").multiply(&Value::Int(2)),
            Err(VmError::InvalidOperands {
                operation: "multiply",
                left: "string",
                right: "int",
            })
        );
        assert!(Value::from("a").negate().is_err());
    }

    #[test]
    fn integer_faults_are_reported() {
        assert_eq!(
            Value::Int(1).divide(&Value::Int(0)),
            Err(VmError::DivisionByZero)
        );
        assert_eq!(
            Value::Int(i64::MAX).add(&Value::Int(1)),
            Err(VmError::ArithmeticOverflow { operation: "add" })
        );
        assert!(Value::Float(1.0).divide(&Value::Int(0)).is_ok());
    }

    #[test]
    fn compares_numbers_and_strings() {
        assert_eq!(
            Value::Int(21).compare(&Value::Int(21), Comparison::Equal),
            Ok(true)
        );
        assert_eq!(
            Value::Int(2).compare(&Value::Float(2.0), Comparison::LowerEqual),
            Ok(true)
        );
        assert_eq!(
            Value::from("abc").compare(&Value::from("abd"), Comparison::Lower),
            Ok(true)
        );
        assert_eq!(
            Value::from("1").compare(&Value::Int(1), Comparison::NotEqual),
            Ok(true)
        );
        assert!(
            Value::from("1")
                .compare(&Value::Int(1), Comparison::Greater)
                .is_err()
        );
    }

    #[test]
    fn nan_is_unordered() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan.compare(&nan, Comparison::Equal), Ok(false));
        assert_eq!(nan.compare(&nan, Comparison::NotEqual), Ok(true));
        assert_eq!(nan.compare(&Value::Int(0), Comparison::Lower), Ok(false));
    }

    #[test]
    fn displays_scalars() {
        assert_eq!(Value::Int(-1).to_string(), "-1");
        assert_eq!(Value::Float(2.0).to_string(), "2");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from("hello world").to_string(), "hello world");
    }
}
