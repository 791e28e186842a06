//! The calculation core: a closed set of binary arithmetic operations over
//! `f64` and the two ways a request can fail.
//!
//! Everything here is pure. A raw operation identifier is parsed into an
//! [`Operation`] exactly once, and that parse is the only place an
//! [`CalculationError::UnsupportedOperation`] is produced.

use std::{fmt, str::FromStr};

/// One of the four supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// The identifier clients use on the wire, e.g. `"add"`.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Capitalized name used in formatted reports, e.g. `"Add"`.
    pub fn title(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Multiply => "Multiply",
            Operation::Divide => "Divide",
        }
    }

    /// Applies the operation to `a` and `b`.
    ///
    /// Only [`Operation::Divide`] can fail, and only when `b` is zero
    /// (either sign). Every other result is the plain IEEE-754 value,
    /// including infinities and NaN propagated from the operands.
    pub fn apply(self, a: f64, b: f64) -> Outcome {
        let result = match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b == 0.0 {
                    return Err(CalculationError::DivisionByZero);
                }
                a / b
            }
        };

        Ok(Calculation {
            operation: self,
            a,
            b,
            result,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CalculationError;

    // Case-sensitive: "Add" is not "add".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == s)
            .ok_or_else(|| CalculationError::UnsupportedOperation(s.to_owned()))
    }
}

/// Why a calculation produced no result.
///
/// Both variants are expected, caller-correctable conditions. The `Display`
/// text is the human-readable description shared by every presentation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("Division by zero is not allowed.")]
    DivisionByZero,
    #[error("Unsupported operation. Use 'add', 'subtract', 'multiply', or 'divide'.")]
    UnsupportedOperation(String),
}

impl CalculationError {
    /// Stable machine-readable tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationError::DivisionByZero => "division_by_zero",
            CalculationError::UnsupportedOperation(_) => "unsupported_operation",
        }
    }
}

/// A successful calculation together with the inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
    pub result: f64,
}

pub type Outcome = Result<Calculation, CalculationError>;

/// Computes `operation` over `a` and `b`.
///
/// ```
/// use arithmo_mcp_server::calculation::{compute, CalculationError};
///
/// assert_eq!(compute("multiply", 4.0, 5.0).unwrap().result, 20.0);
/// assert_eq!(compute("divide", 10.0, 0.0), Err(CalculationError::DivisionByZero));
/// ```
pub fn compute(operation: &str, a: f64, b: f64) -> Outcome {
    operation.parse::<Operation>()?.apply(a, b)
}
