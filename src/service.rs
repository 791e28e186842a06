//! The MCP tool handler exposing the calculation core.
//!
//! [`Calculator`] registers one tool per operation (`add`, `subtract`,
//! `multiply`, `divide`) plus `perform_calculation`, which takes the
//! operation by name. Every tool answers according to the configured
//! [`Presentation`].

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};

use crate::{
    calculation::{Operation, Outcome, compute},
    report::{Presentation, render_report},
};

/// Arguments of the per-operation tools.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct OperandsRequest {
    #[schemars(description = "the left hand side number")]
    pub a: f64,
    #[schemars(description = "the right hand side number")]
    pub b: f64,
}

/// Arguments of `perform_calculation`.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CalculationRequest {
    #[schemars(description = "one of 'add', 'subtract', 'multiply' or 'divide'")]
    pub operation: String,
    #[schemars(description = "the left hand side number")]
    pub a: f64,
    #[schemars(description = "the right hand side number")]
    pub b: f64,
}

/// Structured payload of a bare-mode result.
#[derive(Debug, serde::Serialize, schemars::JsonSchema)]
pub struct CalculatorResult {
    #[schemars(description = "the result of the operation")]
    pub result: f64,
}

impl From<f64> for CalculatorResult {
    fn from(result: f64) -> Self {
        Self { result }
    }
}

/// Calculator tool handler.
///
/// Holds no calculation state, so a clone is handed to every session (or to
/// every request in stateless mode).
///
/// ```
/// use arithmo_mcp_server::{Calculator, Presentation};
///
/// let calculator = Calculator::new(Presentation::Report);
/// assert_eq!(calculator.presentation(), Presentation::Report);
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    presentation: Presentation,
    tool_router: ToolRouter<Self>,
}

impl Calculator {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation,
            tool_router: Self::tool_router(),
        }
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    fn respond(&self, outcome: Outcome) -> Result<CallToolResult, McpError> {
        if let Err(err) = &outcome {
            tracing::info!(kind = err.kind(), %err, "calculation rejected");
        }

        match (self.presentation, outcome) {
            (Presentation::Bare, Ok(calculation)) => {
                let payload = serde_json::to_value(CalculatorResult::from(calculation.result))
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(CallToolResult::structured(payload))
            }
            (Presentation::Bare, Err(err)) => {
                Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
            }
            (Presentation::Report, outcome) => Ok(CallToolResult::success(vec![
                Content::text(render_report(&outcome)),
            ])),
        }
    }

    fn apply(&self, operation: Operation, a: f64, b: f64) -> Result<CallToolResult, McpError> {
        tracing::debug!(%operation, a, b, "tool invoked");
        self.respond(operation.apply(a, b))
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(Presentation::default())
    }
}

#[tool_router]
impl Calculator {
    #[tool(description = "Add two numbers")]
    fn add(
        &self,
        Parameters(OperandsRequest { a, b }): Parameters<OperandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Operation::Add, a, b)
    }

    #[tool(description = "Subtract the second number from the first")]
    fn subtract(
        &self,
        Parameters(OperandsRequest { a, b }): Parameters<OperandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Operation::Subtract, a, b)
    }

    #[tool(description = "Multiply two numbers")]
    fn multiply(
        &self,
        Parameters(OperandsRequest { a, b }): Parameters<OperandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Operation::Multiply, a, b)
    }

    #[tool(description = "Divide the first number by the second")]
    fn divide(
        &self,
        Parameters(OperandsRequest { a, b }): Parameters<OperandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Operation::Divide, a, b)
    }

    #[tool(
        description = "Perform an arithmetic operation ('add', 'subtract', 'multiply' or 'divide') on two numbers"
    )]
    fn perform_calculation(
        &self,
        Parameters(CalculationRequest { operation, a, b }): Parameters<CalculationRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(%operation, a, b, "tool invoked");
        self.respond(compute(&operation, a, b))
    }
}

#[tool_handler]
impl ServerHandler for Calculator {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "A calculator: add, subtract, multiply or divide two numbers.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
