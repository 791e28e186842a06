pub mod calculation;
pub mod config;
pub mod report;
pub mod server;
pub mod service;
pub mod transport;

// Direct exports of main types
pub use calculation::{Calculation, CalculationError, Operation, Outcome, compute};
pub use config::{ServerConfig, Transport};
pub use report::Presentation;
pub use service::Calculator;
pub use transport::StreamableHttpService;

// Re-exports of session types from rmcp
pub use rmcp::transport::common::server_side_http::SessionId;
pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
