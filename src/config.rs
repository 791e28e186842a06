use std::{net::SocketAddr, time::Duration};

use clap::{Parser, ValueEnum};

use crate::report::Presentation;

/// Which transport the calculator is served over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// MCP over standard input/output.
    #[default]
    Stdio,
    /// MCP streamable HTTP on a network listener.
    Http,
}

/// Arithmetic tools served over the Model Context Protocol.
#[derive(Debug, Clone, Parser)]
#[command(name = "arithmo-mcp-server", version, about)]
pub struct ServerConfig {
    /// Transport to serve the tools over
    #[arg(long, env = "ARITHMO_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport
    #[arg(long, env = "ARITHMO_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Path the HTTP transport is mounted at
    #[arg(long, env = "ARITHMO_PATH", default_value = "/mcp")]
    pub path: String,

    /// How tool results and calculation errors are presented
    #[arg(long, env = "ARITHMO_PRESENTATION", value_enum, default_value_t = Presentation::Bare)]
    pub presentation: Presentation,

    /// Serve every HTTP request independently, without sessions
    #[arg(long, env = "ARITHMO_STATELESS")]
    pub stateless: bool,

    /// Interval in seconds between SSE keep-alive pings
    #[arg(
        long,
        env = "ARITHMO_SSE_KEEP_ALIVE",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sse_keep_alive: Option<u64>,
}

impl ServerConfig {
    pub fn sse_keep_alive(&self) -> Option<Duration> {
        self.sse_keep_alive.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_bare_results_over_stdio() {
        let config = ServerConfig::try_parse_from(["arithmo-mcp-server"]).unwrap();

        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.bind, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.path, "/mcp");
        assert_eq!(config.presentation, Presentation::Bare);
        assert!(!config.stateless);
        assert_eq!(config.sse_keep_alive(), None);
    }

    #[test]
    fn http_flags_are_parsed() {
        let config = ServerConfig::try_parse_from([
            "arithmo-mcp-server",
            "--transport",
            "http",
            "--bind",
            "127.0.0.1:9000",
            "--presentation",
            "report",
            "--stateless",
            "--sse-keep-alive",
            "15",
        ])
        .unwrap();

        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.presentation, Presentation::Report);
        assert!(config.stateless);
        assert_eq!(config.sse_keep_alive(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn zero_keep_alive_is_rejected() {
        let result =
            ServerConfig::try_parse_from(["arithmo-mcp-server", "--sse-keep-alive", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let result = ServerConfig::try_parse_from(["arithmo-mcp-server", "--transport", "tcp"]);
        assert!(result.is_err());
    }
}
