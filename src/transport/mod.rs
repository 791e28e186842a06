//! Network transport for the calculator.
//!
//! Standard input/output is served directly by `rmcp` (see
//! [`crate::server::serve_stdio`]). The network listener speaks MCP's
//! streamable HTTP protocol through [`StreamableHttpService`], an actix-web
//! scope that can be mounted at any path:
//!
//! ```rust,no_run
//! use actix_web::{App, HttpServer, web};
//! use arithmo_mcp_server::{Calculator, transport::StreamableHttpService};
//! use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
//! use std::{sync::Arc, time::Duration};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     HttpServer::new(|| {
//!         let http_service = StreamableHttpService::builder()
//!             .service_factory(Arc::new(|| Ok(Calculator::default())))
//!             .session_manager(Arc::new(LocalSessionManager::default()))
//!             .stateful_mode(false)
//!             .sse_keep_alive(Duration::from_secs(30))
//!             .build();
//!
//!         App::new().service(web::scope("/api/v1/mcp").service(http_service.scope()))
//!     })
//!     .bind("127.0.0.1:8080")?
//!     .run()
//!     .await
//! }
//! ```

/// Streamable HTTP transport implementation.
pub mod streamable_http_server;
pub use streamable_http_server::{StreamableHttpService, StreamableHttpServiceBuilder};
