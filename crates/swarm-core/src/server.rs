//! Status Endpoint
//!
//! Read-only HTTP view of the roster built at bootstrap. Balances are not
//! included; they live in the ledger.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::components::Agent;

/// Shared, immutable roster
pub type Roster = Arc<Vec<Agent>>;

pub const GREETING: &str = "Hello Agent Swarm";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("status endpoint io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn router(roster: Roster) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/agent", get(list_agents))
        .route("/agent/:id", get(get_agent))
        .layer(TraceLayer::new_for_http())
        .with_state(roster)
}

/// Serves the status endpoint on an already bound listener until the
/// process exits.
pub async fn serve(listener: TcpListener, roster: Roster) -> Result<(), ServerError> {
    axum::serve(listener, router(roster)).await?;
    Ok(())
}

async fn greeting() -> &'static str {
    GREETING
}

async fn list_agents(State(roster): State<Roster>) -> Json<Vec<Agent>> {
    Json(roster.as_ref().clone())
}

async fn get_agent(
    State(roster): State<Roster>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, StatusCode> {
    roster
        .iter()
        .find(|agent| agent.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
