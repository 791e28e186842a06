//! Presentation of calculation outcomes.
//!
//! The structured [`Outcome`] is the primary contract. This module layers the
//! two presentations on top of it:
//!
//! - **Bare**: the numeric result as structured content; errors are flagged
//!   tool errors.
//! - **Report**: a three-line summary on success and an `Error: ...` sentence
//!   on failure, both delivered as ordinary text. Callers of this mode must
//!   look at the text to tell the two apart.

use std::fmt;

use crate::calculation::{Calculation, Outcome};

/// How tool results are presented to MCP clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Presentation {
    /// Return the number as structured content; flag calculation errors as tool errors.
    #[default]
    Bare,
    /// Return a formatted report; return calculation errors as text.
    Report,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operation: {}", self.operation.title())?;
        writeln!(f, "Inputs: {} and {}", self.a, self.b)?;
        write!(f, "Result: {}", self.result)
    }
}

/// Renders an outcome the way report mode delivers it.
///
/// ```
/// use arithmo_mcp_server::{calculation::compute, report::render_report};
///
/// assert_eq!(
///     render_report(&compute("divide", 1.0, 0.0)),
///     "Error: Division by zero is not allowed."
/// );
/// ```
pub fn render_report(outcome: &Outcome) -> String {
    match outcome {
        Ok(calculation) => calculation.to_string(),
        Err(err) => format!("Error: {err}"),
    }
}

