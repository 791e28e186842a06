//! MCP streamable HTTP transport on actix-web.
//!
//! A single mount point answers three methods:
//!
//! - **POST**: JSON-RPC messages from the client. In stateful mode the first
//!   message must be `initialize`; it creates a session whose id is returned
//!   in the `Mcp-Session-Id` header. Later requests carry that header and get
//!   their response back as a `text/event-stream`. In stateless mode every
//!   request is served by a fresh handler through a one-shot transport.
//! - **GET**: the standalone server-to-client event stream of a session,
//!   resumable with `Last-Event-ID`.
//! - **DELETE**: closes a session.
//!
//! ## Example
//!
//! ```rust,no_run
//! use actix_web::{App, HttpServer, web};
//! use arithmo_mcp_server::{Calculator, Presentation, StreamableHttpService};
//! use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
//! use std::sync::Arc;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let session_manager = Arc::new(LocalSessionManager::default());
//!     HttpServer::new(move || {
//!         let service = StreamableHttpService::builder()
//!             .service_factory(Arc::new(|| Ok(Calculator::new(Presentation::Bare))))
//!             .session_manager(session_manager.clone())
//!             .build();
//!
//!         App::new().service(web::scope("/mcp").service(service.scope()))
//!     })
//!     .bind("127.0.0.1:8000")?
//!     .run()
//!     .await
//! }
//! ```

use std::{fmt, sync::Arc, time::Duration};

use actix_web::{
    HttpRequest, HttpResponse, HttpResponseBuilder, Result, Scope,
    error::InternalError,
    http::{
        StatusCode,
        header::{self, CACHE_CONTROL},
    },
    middleware,
    web::{self, Bytes, Data},
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::time::Interval;
use tokio_stream::wrappers::ReceiverStream;

use rmcp::{
    RoleServer,
    model::{ClientJsonRpcMessage, ClientRequest},
    serve_server,
    service::serve_directly,
    transport::{
        OneshotTransport, TransportAdapterIdentity,
        common::{
            http_header::{HEADER_LAST_EVENT_ID, HEADER_SESSION_ID},
            server_side_http::SessionId,
        },
        streamable_http_server::session::{SessionManager, local::LocalSessionManager},
    },
};

const HEADER_X_ACCEL_BUFFERING: &str = "X-Accel-Buffering";
const EVENT_STREAM_MIME_TYPE: &str = "text/event-stream";
const JSON_MIME_TYPE: &str = "application/json";
const KEEP_ALIVE_FRAME: &[u8] = b":ping\n\n";

type ServiceFactory<S> = Arc<dyn Fn() -> Result<S, std::io::Error> + Send + Sync>;

/// Streamable HTTP endpoint serving MCP handlers of type `S`.
///
/// `service_factory` is called once per session (stateful) or once per
/// request (stateless). The session manager should be shared by every
/// actix worker so a session created on one worker is visible to the rest.
#[derive(bon::Builder)]
pub struct StreamableHttpService<S, M = LocalSessionManager> {
    service_factory: ServiceFactory<S>,

    session_manager: Arc<M>,

    #[builder(default = true)]
    stateful_mode: bool,

    /// Interval between `:ping` comments on open event streams; zero disables them
    sse_keep_alive: Option<Duration>,
}

impl<S, M> Clone for StreamableHttpService<S, M> {
    fn clone(&self) -> Self {
        Self {
            service_factory: self.service_factory.clone(),
            session_manager: self.session_manager.clone(),
            stateful_mode: self.stateful_mode,
            sse_keep_alive: self.sse_keep_alive,
        }
    }
}

impl<S, M> StreamableHttpService<S, M>
where
    S: Clone + rmcp::ServerHandler + Send + 'static,
    M: SessionManager + 'static,
{
    /// Builds the actix-web scope with the GET, POST and DELETE routes.
    ///
    /// The scope has an empty prefix; nest it under `web::scope("/path")` to
    /// mount it elsewhere.
    pub fn scope(
        self,
    ) -> Scope<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        web::scope("")
            .app_data(Data::new(self))
            .wrap(middleware::NormalizePath::trim())
            .route("", web::get().to(Self::handle_get))
            .route("", web::post().to(Self::handle_post))
            .route("", web::delete().to(Self::handle_delete))
    }

    fn new_service(&self) -> Result<S> {
        (self.service_factory)().map_err(internal_error)
    }

    async fn handle_get(req: HttpRequest, service: Data<Self>) -> Result<HttpResponse> {
        if !accepts(&req, &[EVENT_STREAM_MIME_TYPE]) {
            return Ok(HttpResponse::NotAcceptable()
                .body("Not Acceptable: Client must accept text/event-stream"));
        }

        let Some(session_id) = session_id(&req) else {
            return Ok(HttpResponse::Unauthorized().body("Unauthorized: Session ID is required"));
        };

        if !service
            .session_manager
            .has_session(&session_id)
            .await
            .map_err(internal_error)?
        {
            return Ok(HttpResponse::Unauthorized().body("Unauthorized: Session not found"));
        }

        let messages: std::pin::Pin<Box<dyn Stream<Item = _> + Send>> =
            match header_str(&req, HEADER_LAST_EVENT_ID) {
                Some(last_event_id) => {
                    tracing::debug!(%session_id, %last_event_id, "resuming event stream");
                    Box::pin(
                        service
                            .session_manager
                            .resume(&session_id, last_event_id.to_owned())
                            .await
                            .map_err(internal_error)?,
                    )
                }
                None => {
                    tracing::debug!(%session_id, "opening standalone event stream");
                    Box::pin(
                        service
                            .session_manager
                            .create_standalone_stream(&session_id)
                            .await
                            .map_err(internal_error)?,
                    )
                }
            };

        let frames = messages.map(|msg| sse_frame(msg.event_id, &msg.message));
        Ok(event_stream_response().streaming(with_keep_alive(frames, service.sse_keep_alive)))
    }

    async fn handle_post(
        req: HttpRequest,
        body: Bytes,
        service: Data<Self>,
    ) -> Result<HttpResponse> {
        if !accepts(&req, &[JSON_MIME_TYPE, EVENT_STREAM_MIME_TYPE]) {
            return Ok(HttpResponse::NotAcceptable().body(
                "Not Acceptable: Client must accept both application/json and text/event-stream",
            ));
        }

        if !header_str(&req, header::CONTENT_TYPE).is_some_and(|ct| ct.starts_with(JSON_MIME_TYPE))
        {
            return Ok(HttpResponse::UnsupportedMediaType()
                .body("Unsupported Media Type: Content-Type must be application/json"));
        }

        let message: ClientJsonRpcMessage = serde_json::from_slice(&body)
            .map_err(|e| InternalError::new(e, StatusCode::BAD_REQUEST))?;
        tracing::debug!(?message, "POST message");

        if !service.stateful_mode {
            return Self::handle_stateless(message, &service);
        }

        match session_id(&req) {
            Some(session_id) => Self::handle_session_message(session_id, message, &service).await,
            None => Self::handle_initialize(message, &service).await,
        }
    }

    async fn handle_session_message(
        session_id: SessionId,
        message: ClientJsonRpcMessage,
        service: &Self,
    ) -> Result<HttpResponse> {
        if !service
            .session_manager
            .has_session(&session_id)
            .await
            .map_err(internal_error)?
        {
            tracing::warn!(%session_id, "session not found");
            return Ok(HttpResponse::Unauthorized().body("Unauthorized: Session not found"));
        }

        match message {
            ClientJsonRpcMessage::Request(_) => {
                let messages = service
                    .session_manager
                    .create_stream(&session_id, message)
                    .await
                    .map_err(internal_error)?;
                let frames = messages.map(|msg| sse_frame(msg.event_id, &msg.message));
                Ok(event_stream_response()
                    .streaming(with_keep_alive(frames, service.sse_keep_alive)))
            }
            ClientJsonRpcMessage::Notification(_)
            | ClientJsonRpcMessage::Response(_)
            | ClientJsonRpcMessage::Error(_) => {
                service
                    .session_manager
                    .accept_message(&session_id, message)
                    .await
                    .map_err(internal_error)?;
                Ok(HttpResponse::Accepted().finish())
            }
        }
    }

    async fn handle_initialize(
        message: ClientJsonRpcMessage,
        service: &Self,
    ) -> Result<HttpResponse> {
        let is_initialize = matches!(
            &message,
            ClientJsonRpcMessage::Request(request)
                if matches!(request.request, ClientRequest::InitializeRequest(_))
        );
        if !is_initialize {
            return Ok(HttpResponse::UnprocessableEntity().body("Expected initialize request"));
        }

        let handler = service.new_service()?;
        let (session_id, transport) = service
            .session_manager
            .create_session()
            .await
            .map_err(internal_error)?;
        tracing::info!(%session_id, "created session");

        tokio::spawn({
            let session_manager = service.session_manager.clone();
            let session_id = session_id.clone();
            async move {
                match serve_server::<S, M::Transport, _, TransportAdapterIdentity>(
                    handler, transport,
                )
                .await
                {
                    Ok(running) => {
                        let _ = running.waiting().await;
                    }
                    Err(e) => tracing::error!(%session_id, "failed to start session: {e}"),
                }
                if let Err(e) = session_manager.close_session(&session_id).await {
                    tracing::error!(%session_id, "failed to close session: {e}");
                }
            }
        });

        let response = service
            .session_manager
            .initialize_session(&session_id, message)
            .await
            .map_err(internal_error)?;
        let frame = sse_frame(None::<String>, &response);

        Ok(event_stream_response()
            .append_header((HEADER_SESSION_ID, session_id.as_ref()))
            .streaming(with_keep_alive(futures::stream::iter([frame]), None)))
    }

    fn handle_stateless(message: ClientJsonRpcMessage, service: &Self) -> Result<HttpResponse> {
        let ClientJsonRpcMessage::Request(request) = message else {
            return Ok(HttpResponse::UnprocessableEntity().body("Unexpected message type"));
        };

        let handler = service.new_service()?;
        let (transport, receiver) =
            OneshotTransport::<RoleServer>::new(ClientJsonRpcMessage::Request(request));
        let running = serve_directly(handler, transport, None);
        tokio::spawn(async move {
            let _ = running.waiting().await;
        });

        let frames = ReceiverStream::new(receiver).map(|msg| sse_frame(None::<String>, &msg));
        Ok(event_stream_response().streaming(with_keep_alive(frames, service.sse_keep_alive)))
    }

    async fn handle_delete(req: HttpRequest, service: Data<Self>) -> Result<HttpResponse> {
        let Some(session_id) = session_id(&req) else {
            return Ok(HttpResponse::Unauthorized().body("Unauthorized: Session ID is required"));
        };

        service
            .session_manager
            .close_session(&session_id)
            .await
            .map_err(internal_error)?;
        tracing::info!(%session_id, "closed session");

        Ok(HttpResponse::NoContent().finish())
    }
}

fn internal_error<E: fmt::Debug + fmt::Display + 'static>(err: E) -> actix_web::Error {
    InternalError::new(err, StatusCode::INTERNAL_SERVER_ERROR).into()
}

fn header_str(req: &HttpRequest, name: impl header::AsHeaderName) -> Option<&str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn accepts(req: &HttpRequest, mime_types: &[&str]) -> bool {
    header_str(req, header::ACCEPT)
        .is_some_and(|accept| mime_types.iter().all(|mime| accept.contains(mime)))
}

fn session_id(req: &HttpRequest) -> Option<SessionId> {
    header_str(req, HEADER_SESSION_ID).map(|s| s.to_owned().into())
}

fn event_stream_response() -> HttpResponseBuilder {
    let mut response = HttpResponse::Ok();
    response
        .content_type(EVENT_STREAM_MIME_TYPE)
        .append_header((CACHE_CONTROL, "no-cache"))
        .append_header((HEADER_X_ACCEL_BUFFERING, "no"));
    response
}

/// Encodes one SSE event carrying `message` as JSON.
fn sse_frame<I: fmt::Display>(event_id: Option<I>, message: &impl Serialize) -> Bytes {
    let data = serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string());
    let mut frame = String::new();
    if let Some(id) = event_id {
        frame.push_str(&format!("id: {id}\n"));
    }
    frame.push_str(&format!("data: {data}\n\n"));
    Bytes::from(frame)
}

/// Interleaves keep-alive comments into `frames`; ends when `frames` ends.
/// A zero interval means no keep-alive.
fn with_keep_alive<F>(
    frames: F,
    keep_alive: Option<Duration>,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> + 'static
where
    F: Stream<Item = Bytes> + 'static,
{
    async_stream::stream! {
        let mut frames = Box::pin(frames);
        let mut timer = keep_alive
            .filter(|period| !period.is_zero())
            .map(tokio::time::interval);

        loop {
            tokio::select! {
                frame = frames.next() => match frame {
                    Some(frame) => yield Ok(frame),
                    None => break,
                },
                _ = next_tick(&mut timer) => {
                    yield Ok(Bytes::from_static(KEEP_ALIVE_FRAME));
                }
            }
        }
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
