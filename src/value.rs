use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The value of an empty line or of the placeholder after a trailing `;`.
    Nil,
    Int(i64),
    Double(f64),
}

impl Value {
    /// Numeric view used by every arithmetic operator.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Nil => None,
            Value::Int(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(n) => {
                // Always show at least one decimal place for doubles
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}
