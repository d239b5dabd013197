// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Modelwire server entrypoint.
//!
//! Serves the remote model access protocol as MCP tools over raw TCP (one MCP session per
//! connection) and, with `--http-port`, over streamable HTTP at `http://<host>:<port>/mcp`.
//!
//! Use `--stdio` to serve a single MCP session over stdin/stdout instead.

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use modelwire::client::{DEFAULT_HOST, DEFAULT_PORT};
use modelwire::mcp::{ModelwireMcp, SHUTDOWN_GRACE};
use modelwire::protocol::ProjectLocationParams;
use modelwire::service::ModelAccessService;
use modelwire::store::WriteDurability;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<project-file>] [--durable-writes] [--host <host>] [--port <port>] [--http-port <port>]\n  {program} [--project <file>] [--durable-writes] [--host <host>] [--port <port>] [--http-port <port>]\n  {program} --demo [--host <host>] [--port <port>] [--http-port <port>]\n  {program} [<project-file> | --demo] [--durable-writes] --stdio\n\nServes MCP over TCP on <host>:<port> (default {DEFAULT_HOST}:{DEFAULT_PORT}; MODELWIRE_HOST and\nMODELWIRE_PORT override the defaults). --http-port additionally serves streamable HTTP at\n`http://<host>:<port>/mcp` (0 = ephemeral).\n\nWithout a project, clients open one with `project.open`.\n--demo serves the built-in zoo model and cannot be combined with a project file.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    stdio: bool,
    demo: bool,
    project: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    http_port: Option<u16>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stdio" => {
                if options.stdio {
                    return Err(());
                }
                options.stdio = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--project" => {
                if options.project.is_some() {
                    return Err(());
                }
                options.project = Some(args.next().ok_or(())?);
            }
            "--host" => {
                if options.host.is_some() {
                    return Err(());
                }
                let host = args.next().ok_or(())?;
                if host.trim().is_empty() {
                    return Err(());
                }
                options.host = Some(host);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.port = Some(raw.parse().map_err(|_| ())?);
            }
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.http_port = Some(raw.parse().map_err(|_| ())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.project.is_some() {
                    return Err(());
                }
                options.project = Some(arg);
            }
        }
    }

    if options.demo && options.project.is_some() {
        return Err(());
    }

    if options.stdio && (options.host.is_some() || options.port.is_some() || options.http_port.is_some()) {
        return Err(());
    }

    Ok(options)
}

/// TCP endpoint: flags first, then `MODELWIRE_HOST` / `MODELWIRE_PORT`, then the defaults.
fn endpoint(options: &CliOptions, lookup: impl Fn(&str) -> Option<String>) -> Result<(String, u16), String> {
    let host = options
        .host
        .clone()
        .or_else(|| lookup("MODELWIRE_HOST").filter(|host| !host.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HOST.to_owned());
    let port = match (options.port, lookup("MODELWIRE_PORT")) {
        (Some(port), _) => port,
        (None, Some(raw)) => raw.trim().parse().map_err(|_| format!("invalid MODELWIRE_PORT `{raw}`"))?,
        (None, None) => DEFAULT_PORT,
    };
    Ok((host, port))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn build_service(options: &CliOptions) -> Result<ModelAccessService, Box<dyn Error>> {
    let durability =
        if options.durable_writes { WriteDurability::Durable } else { WriteDurability::BestEffort };
    if options.demo {
        return Ok(ModelAccessService::demo()?.with_durability(durability));
    }

    let metamodel = modelwire::model::fixtures::uml_metamodel()?;
    let service = ModelAccessService::new(Arc::new(metamodel)).with_durability(durability);
    if let Some(project) = &options.project {
        let opened = service.open_project(ProjectLocationParams { file_url: project.clone() })?;
        tracing::info!(project = %opened.name, location = %opened.file_url, "project open");
    }
    Ok(service)
}

async fn spawn_http(
    mcp: ModelwireMcp,
    host: &str,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<JoinHandle<()>> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(url = %format!("http://{}/mcp", listener.local_addr()?), "serving MCP over streamable HTTP");

    let config = StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let cancel = config.cancellation_token.clone();
    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);
    let router = Router::new().nest_service("/mcp", mcp_service);

    Ok(tokio::spawn(async move {
        let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
            cancel.cancel();
        });
        if let Err(err) = serve.await {
            tracing::error!(error = %err, "MCP HTTP server error");
        }
    }))
}

async fn serve(mcp: ModelwireMcp, host: String, port: u16, http_port: Option<u16>) -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(address = %listener.local_addr()?, "serving MCP over TCP");

    let (stop, shutdown) = watch::channel(false);
    let http = match http_port {
        Some(http_port) => Some(spawn_http(mcp.clone(), &host, http_port, shutdown.clone()).await?),
        None => None,
    };
    let tcp = tokio::spawn(mcp.serve_tcp(listener, shutdown));

    tokio::signal::ctrl_c().await?;
    tracing::info!(grace = ?SHUTDOWN_GRACE, "shutting down");
    let _ = stop.send(true);

    let http_stopped = async {
        if let Some(http) = http {
            if tokio::time::timeout(SHUTDOWN_GRACE, http).await.is_err() {
                tracing::warn!("HTTP server did not stop within the grace period");
            }
        }
    };
    let (tcp_result, ()) = tokio::join!(tcp, http_stopped);
    tcp_result??;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "modelwire".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();
        let mcp = ModelwireMcp::new(build_service(&options)?);
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.stdio {
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let (host, port) = endpoint(&options, |key| std::env::var(key).ok())?;
        runtime.block_on(serve(mcp, host, port, options.http_port))
    })();

    if let Err(err) = result {
        eprintln!("modelwire: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{endpoint, parse_options, CliOptions, DEFAULT_HOST, DEFAULT_PORT};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_demo_flag() {
        let options = parse_options(args(&["--demo"])).expect("parse options");
        assert!(options.demo);
        assert!(!options.stdio);
        assert!(options.project.is_none());
    }

    #[test]
    fn parses_project_forms() {
        let options = parse_options(args(&["--project", "zoo.json"])).expect("parse options");
        assert_eq!(options.project.as_deref(), Some("zoo.json"));

        let options = parse_options(args(&["zoo.json", "--durable-writes"])).expect("parse options");
        assert_eq!(options.project.as_deref(), Some("zoo.json"));
        assert!(options.durable_writes);
    }

    #[test]
    fn parses_endpoint_flags() {
        let options = parse_options(args(&["--host", "0.0.0.0", "--port", "9000", "--http-port", "0"]))
            .expect("parse options");
        assert_eq!(options.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(options.port, Some(9000));
        assert_eq!(options.http_port, Some(0));
    }

    #[rstest]
    #[case(&["--nope"])]
    #[case(&["--demo", "--demo"])]
    #[case(&["--demo", "zoo.json"])]
    #[case(&["--project", "a.json", "b.json"])]
    #[case(&["--project"])]
    #[case(&["--port", "http"])]
    #[case(&["--port", "70000"])]
    #[case(&["--host", ""])]
    #[case(&["--stdio", "--port", "1"])]
    #[case(&["--stdio", "--http-port", "1"])]
    #[case(&["one.json", "two.json"])]
    fn rejects_invalid_args(#[case] raw: &[&str]) {
        parse_options(args(raw)).unwrap_err();
    }

    #[test]
    fn endpoint_defaults() {
        let (host, port) = endpoint(&CliOptions::default(), no_env).expect("endpoint");
        assert_eq!(host, DEFAULT_HOST);
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    fn environment_fills_in_missing_flags() {
        let env = |key: &str| match key {
            "MODELWIRE_HOST" => Some("modeler.local".to_owned()),
            "MODELWIRE_PORT" => Some("7001".to_owned()),
            _ => None,
        };
        let (host, port) = endpoint(&CliOptions::default(), env).expect("endpoint");
        assert_eq!((host.as_str(), port), ("modeler.local", 7001));

        let options = CliOptions { port: Some(9000), ..CliOptions::default() };
        let (_, port) = endpoint(&options, env).expect("endpoint");
        assert_eq!(port, 9000, "flags win over the environment");
    }

    #[test]
    fn invalid_environment_port_is_reported() {
        let env = |key: &str| (key == "MODELWIRE_PORT").then(|| "eighty".to_owned());
        endpoint(&CliOptions::default(), env).unwrap_err();
    }
}
