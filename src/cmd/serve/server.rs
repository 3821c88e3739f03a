// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use axum::routing::post;
use repeetcode_core::PolicyConfig;
use repeetcode_core::SchedulingPolicy;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;

use crate::auth::StaticTokens;
use crate::auth::UserId;
use crate::cmd::serve::handlers::all_problems_handler;
use crate::cmd::serve::handlers::dashboard_stats_handler;
use crate::cmd::serve::handlers::log_handler;
use crate::cmd::serve::handlers::not_found_handler;
use crate::cmd::serve::handlers::problem_bank_handler;
use crate::cmd::serve::handlers::reviews_handler;
use crate::cmd::serve::state::Clock;
use crate::cmd::serve::state::ServerState;
use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub policy: PolicyConfig,
    pub tokens: HashMap<String, UserId>,
    pub cors_origins: Vec<String>,
    pub clock: Clock,
}

impl ServerConfig {
    pub fn from_config(config: Config) -> Self {
        Self {
            host: config.server.host,
            port: config.server.port,
            database: config.database,
            policy: config.policy,
            tokens: config.auth.tokens,
            cors_origins: config.server.cors_origins,
            clock: Clock::System,
        }
    }
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let policy: Arc<dyn SchedulingPolicy> = Arc::from(config.policy.build()?);
    let db = Database::open(&config.database)?;
    if config.tokens.is_empty() {
        log::warn!("No tokens are configured, every request will be rejected");
    }
    let state = ServerState {
        db,
        policy: policy.clone(),
        verifier: Arc::new(StaticTokens::new(config.tokens)),
        clock: config.clock,
    };
    let app = Router::new();
    let app = app.route("/log", post(log_handler));
    let app = app.route("/reviews", get(reviews_handler));
    let app = app.route("/all_problems", get(all_problems_handler));
    let app = app.route("/dashboard_stats", get(dashboard_stats_handler));
    let app = app.route("/problem_bank", get(problem_bank_handler));
    let app = app.fallback(not_found_handler);
    let app = app.layer(cors_layer(&config.cors_origins)?);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::info!(
        "Starting server on {bind} with the {} scheduling policy",
        policy.name()
    );
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> Fallible<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ErrorReport::new(format!("invalid CORS origin: '{origin}'")))
        })
        .collect::<Fallible<_>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::debug!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
