// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Routeplane control-plane daemon.
//!
//! Serves the administrative query surface (`/v1/routes/{sync,stats,info}`,
//! `/healthz`, `/metrics`) and runs the DNS reconciler against the domains
//! service. In production the registries are fed by the platform's entity
//! service; standalone mode keeps them in memory and can seed them from a
//! JSON file, which drives the full event-driven DNS fan-out at startup.

use anyhow::{Context as _, Result};
use clap::Parser;
use routeplane::admin::AdminQuery;
use routeplane::agents::{HttpProxyAgent, StaticNodeDirectory};
use routeplane::api::{router, AppState};
use routeplane::domains::HttpDnsProvider;
use routeplane::entities::{Host, Route, Router};
use routeplane::events::EventBus;
use routeplane::guard::StoreGate;
use routeplane::hosts::{CreateHost, HostCascade, HostRegistry};
use routeplane::providers::CallContext;
use routeplane::reconciler::DnsReconciler;
use routeplane::routers::{CreateRouter, RouterRegistry};
use routeplane::routes::{CreateRoute, RouteRegistry};
use routeplane::scatter::ScatterGather;
use routeplane::store::MemoryStore;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "routeplane", about = "Reverse-proxy control plane daemon")]
struct Cli {
    /// Address the admin API listens on
    #[arg(long, default_value = "0.0.0.0:8700")]
    listen: SocketAddr,

    /// Cluster node running a proxy agent; repeat per node
    #[arg(long = "node", value_name = "HOST")]
    nodes: Vec<String>,

    /// Base URL of the domains service
    #[arg(long, default_value = "http://127.0.0.1:8600")]
    domains_url: String,

    /// Port the proxy agents listen on
    #[arg(long, default_value_t = 8710)]
    agent_port: u16,

    /// Seed the in-memory registries from a JSON file at startup
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SeedFile {
    routes: Vec<SeedRoute>,
    routers: Vec<SeedRouter>,
    hosts: Vec<SeedHost>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRoute {
    #[serde(rename = "vHost")]
    v_host: String,
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRouter {
    node: String,
    zone: String,
    ipv4: String,
    #[serde(default)]
    ipv6: Option<String>,
    #[serde(default)]
    priority: Option<u32>,
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedHost {
    /// vHost of the owning route; resolved to a route id during seeding
    #[serde(rename = "vHost")]
    v_host: String,
    hostname: String,
    port: u16,
    #[serde(default)]
    weight: Option<u32>,
    #[serde(default)]
    vnodes: Option<u32>,
    #[serde(default)]
    cluster: Option<String>,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("routeplane")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG for the filter and RUST_LOG_FORMAT for text|json
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let cli = Cli::parse();
    info!("Starting routeplane control plane");

    // Stores and collaborators
    let route_store = Arc::new(MemoryStore::<Route>::new());
    let host_store = Arc::new(MemoryStore::<Host>::new());
    let router_store = Arc::new(MemoryStore::<Router>::new());
    let dns = Arc::new(HttpDnsProvider::new(&cli.domains_url));

    // Reconciler and event wiring: host cascade first, DNS fan-out second;
    // ordering carries no semantic weight, both always run.
    let reconciler = Arc::new(DnsReconciler::new(
        route_store.clone(),
        router_store.clone(),
        dns,
    ));
    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(HostCascade::new(host_store.clone())));
    bus.subscribe(reconciler.clone());
    let bus = Arc::new(bus);

    // Registries
    let gate = Arc::new(StoreGate::new(route_store.clone()));
    let route_registry = Arc::new(RouteRegistry::new(route_store.clone(), bus.clone()));
    let host_registry = Arc::new(HostRegistry::new(host_store, gate));
    let router_registry = Arc::new(RouterRegistry::new(router_store, bus));

    if let Some(path) = &cli.seed {
        seed_registries(path, &route_registry, &host_registry, &router_registry).await?;
    }

    // Cluster query surface
    let directory = Arc::new(StaticNodeDirectory::new(cli.nodes.clone()));
    let agent = Arc::new(HttpProxyAgent::new(cli.agent_port));
    let scatter = ScatterGather::new(directory, agent);
    let admin = AdminQuery::new(scatter, reconciler);

    let app = router(Arc::new(AppState { admin }));
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("cannot bind {}", cli.listen))?;
    info!(listen = %cli.listen, nodes = cli.nodes.len(), "admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

/// Create seed entities through the registries so the usual validation and
/// DNS fan-out apply.
async fn seed_registries(
    path: &PathBuf,
    routes: &RouteRegistry,
    hosts: &HostRegistry,
    routers: &RouterRegistry,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw).context("malformed seed file")?;

    for router in seed.routers {
        routers
            .create(CreateRouter {
                node: router.node,
                zone: router.zone,
                ipv4: router.ipv4,
                ipv6: router.ipv6,
                priority: router.priority,
                enabled: router.enabled,
            })
            .await?;
    }
    for route in seed.routes {
        let ctx = CallContext::for_owner(route.owner.as_deref());
        routes
            .create(
                &ctx,
                CreateRoute {
                    v_host: route.v_host,
                    zone: route.zone,
                    ..CreateRoute::default()
                },
            )
            .await?;
    }
    for host in seed.hosts {
        let route = routes
            .resolve_route(&host.v_host.to_lowercase())
            .await?
            .with_context(|| format!("seed host references unknown vHost '{}'", host.v_host))?;
        let ctx = CallContext::for_owner(route.owner.as_deref());
        hosts
            .create(
                &ctx,
                CreateHost {
                    route: Some(route.id),
                    hostname: host.hostname,
                    port: host.port,
                    weight: host.weight,
                    vnodes: host.vnodes,
                    cluster: host.cluster,
                    ..CreateHost::default()
                },
            )
            .await?;
    }
    debug!("seed file applied");
    Ok(())
}
