//! Runs a constructed [`Calculator`] over the configured transport.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use rmcp::{
    RoleServer, ServiceExt,
    transport::{IntoTransport, stdio},
};

use crate::{
    LocalSessionManager,
    config::{ServerConfig, Transport},
    service::Calculator,
    transport::StreamableHttpService,
};

/// Serves `calculator` until the transport is closed.
pub async fn run(calculator: Calculator, config: &ServerConfig) -> anyhow::Result<()> {
    match config.transport {
        Transport::Stdio => serve_stdio(calculator).await,
        Transport::Http => serve_http(calculator, config).await,
    }
}

/// Serves MCP over standard input/output until the client closes stdin.
pub async fn serve_stdio(calculator: Calculator) -> anyhow::Result<()> {
    serve_io(calculator, stdio()).await
}

/// Serves MCP over any byte-stream transport (stdio, a socket, an in-memory
/// pipe) until the peer closes it.
pub async fn serve_io<T, E, A>(calculator: Calculator, transport: T) -> anyhow::Result<()>
where
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::info!(
        presentation = ?calculator.presentation(),
        "serving calculator over a stream transport"
    );

    let service = calculator.serve(transport).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    let reason = service.waiting().await?;
    tracing::info!(?reason, "stream transport closed");
    Ok(())
}

/// Serves MCP streamable HTTP on `config.bind`, mounted at `config.path`.
pub async fn serve_http(calculator: Calculator, config: &ServerConfig) -> anyhow::Result<()> {
    let session_manager = Arc::new(LocalSessionManager::default());
    let path = config.path.trim_end_matches('/').to_owned();
    let stateful_mode = !config.stateless;
    let sse_keep_alive = config.sse_keep_alive();

    tracing::info!(
        bind = %config.bind,
        %path,
        stateful_mode,
        presentation = ?calculator.presentation(),
        "serving calculator over streamable HTTP"
    );

    HttpServer::new(move || {
        let calculator = calculator.clone();
        let http_service = StreamableHttpService::builder()
            .service_factory(Arc::new(move || Ok(calculator.clone())))
            .session_manager(session_manager.clone())
            .stateful_mode(stateful_mode)
            .maybe_sse_keep_alive(sse_keep_alive)
            .build();

        App::new()
            .wrap(middleware::Logger::default())
            .service(web::scope(&path).service(http_service.scope()))
    })
    .bind(config.bind)?
    .run()
    .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
