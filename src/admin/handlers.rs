use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AppState;
use crate::chat::{ChatView, RejectReason, SubmitOutcome};
use crate::health::{HealthStatus, ServiceHealth};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub service_id: String,
    pub service_status: HealthStatus,
    pub simulation_mode: bool,
    pub busy: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub id: String,
    #[serde(flatten)]
    pub health: ServiceHealth,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub simulation_mode: bool,
    pub retry_count: u32,
}

#[derive(Serialize)]
pub struct SimulationToggle {
    pub simulation_mode: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let chat = &state.orchestrator;
    let view = chat.view();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        service_id: chat.service_id().to_string(),
        service_status: state.registry.get_health(chat.service_id()).status,
        simulation_mode: view.simulation_mode,
        busy: view.is_busy(),
    })
}

pub async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceStatus>> {
    Json(
        state
            .registry
            .snapshot_all()
            .into_iter()
            .map(|(id, health)| ServiceStatus { id, health })
            .collect(),
    )
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ServiceStatus> {
    let health = state.registry.get_health(&id);
    Json(ServiceStatus { id, health })
}

pub async fn reset_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ServiceStatus> {
    let health = state.registry.reset(&id);
    Json(ServiceStatus { id, health })
}

pub async fn get_chat(State(state): State<AppState>) -> Json<ChatView> {
    Json(state.orchestrator.view())
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> (StatusCode, Json<SubmitResponse>) {
    let outcome = state.orchestrator.submit(&request.message).await;
    submit_response(&state, outcome)
}

pub async fn post_retry(State(state): State<AppState>) -> (StatusCode, Json<SubmitResponse>) {
    let outcome = state.orchestrator.retry_last().await;
    submit_response(&state, outcome)
}

pub async fn post_simulation(State(state): State<AppState>) -> Json<SimulationToggle> {
    Json(SimulationToggle {
        simulation_mode: state.orchestrator.toggle_simulation(),
    })
}

fn submit_response(state: &AppState, outcome: SubmitOutcome) -> (StatusCode, Json<SubmitResponse>) {
    let view = state.orchestrator.view();
    let (status, error, answer) = match &outcome {
        SubmitOutcome::Answered(_) => (
            StatusCode::OK,
            None,
            view.last_assistant_message().map(|m| m.content.clone()),
        ),
        SubmitOutcome::Failed(e) => (StatusCode::BAD_GATEWAY, Some(e.to_string()), None),
        SubmitOutcome::Rejected(RejectReason::InFlight) => (
            StatusCode::CONFLICT,
            Some("another question is being answered".to_string()),
            None,
        ),
        SubmitOutcome::Rejected(RejectReason::EmptyInput) => (
            StatusCode::BAD_REQUEST,
            Some("message is empty".to_string()),
            None,
        ),
        SubmitOutcome::Rejected(RejectReason::NothingToRetry) => (
            StatusCode::BAD_REQUEST,
            Some("nothing to retry".to_string()),
            None,
        ),
        SubmitOutcome::Disposed => (
            StatusCode::SERVICE_UNAVAILABLE,
            Some("assistant is shutting down".to_string()),
            None,
        ),
    };

    (
        status,
        Json(SubmitResponse {
            outcome: outcome.label(),
            error,
            answer,
            simulation_mode: view.simulation_mode,
            retry_count: view.retry_count,
        }),
    )
}
