//! Coordination API routes.
//!
//! Handlers only check request shape and translate errors; everything else
//! is delegated to the proposal store.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use cosign_types::{
    api::{
        AppendSignatureRequest, GetProposalQuery, ListProposalsResponse, ProposalResponse,
        ResetResponse,
    },
    Proposal, ProposalDraft, SequenceNumber,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::error::ApiResult;
use crate::health::{health_handler, metrics_handler, status_handler};
use crate::AppState;

async fn refresh_open_gauge(state: &AppState) {
    cosign_telemetry::set_open_proposals(state.store.summary().await.open);
}

type RawSequenceNumber = Result<Path<String>, PathRejection>;

fn parse_sequence_number(path: RawSequenceNumber) -> ApiResult<SequenceNumber> {
    let Path(raw) = path?;
    Ok(raw.parse::<SequenceNumber>()?)
}

/// List all proposals
async fn list_proposals(State(state): State<Arc<AppState>>) -> Json<ListProposalsResponse> {
    let _timer = cosign_telemetry::start_request_timer("list_proposals");
    let proposals = state.store.list().await;
    let summary = state.store.summary().await;
    Json(ListProposalsResponse {
        proposals,
        open: summary.open,
        executed: summary.executed,
    })
}

/// Get one proposal, with a quorum hint when `requiredSignatures` is given
async fn get_proposal(
    State(state): State<Arc<AppState>>,
    path: RawSequenceNumber,
    query: Result<Query<GetProposalQuery>, QueryRejection>,
) -> ApiResult<Json<ProposalResponse>> {
    let _timer = cosign_telemetry::start_request_timer("get_proposal");
    let sequence_number = parse_sequence_number(path)?;
    let Query(query) = query?;

    let proposal = state.store.get(sequence_number).await?;
    let quorum = query
        .required_signatures
        .map(|required| proposal.quorum_hint(required));

    Ok(Json(ProposalResponse { proposal, quorum }))
}

/// Create a proposal carrying the creator's signature
async fn create_proposal(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProposalDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Proposal>)> {
    let _timer = cosign_telemetry::start_request_timer("create_proposal");
    let Json(draft) = body?;
    let proposal = state.store.create(draft).await?;

    cosign_telemetry::PROPOSALS_CREATED.inc();
    refresh_open_gauge(&state).await;

    Ok((StatusCode::CREATED, Json(proposal)))
}

/// Append a signature to an open proposal
async fn append_signature(
    State(state): State<Arc<AppState>>,
    path: RawSequenceNumber,
    body: Result<Json<AppendSignatureRequest>, JsonRejection>,
) -> ApiResult<Json<Proposal>> {
    let _timer = cosign_telemetry::start_request_timer("append_signature");
    let sequence_number = parse_sequence_number(path)?;
    let Json(request) = body?;

    let proposal = state
        .store
        .append_signature(sequence_number, &request.signature)
        .await?;

    cosign_telemetry::SIGNATURES_APPENDED.inc();
    Ok(Json(proposal))
}

/// Record on-chain execution
async fn mark_executed(
    State(state): State<Arc<AppState>>,
    path: RawSequenceNumber,
) -> ApiResult<Json<Proposal>> {
    let _timer = cosign_telemetry::start_request_timer("mark_executed");
    let sequence_number = parse_sequence_number(path)?;
    let proposal = state.store.mark_executed(sequence_number).await?;

    cosign_telemetry::PROPOSALS_EXECUTED.inc();
    refresh_open_gauge(&state).await;

    Ok(Json(proposal))
}

/// Administrative reset of the whole store
async fn reset_store(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let _timer = cosign_telemetry::start_request_timer("reset_store");
    let cleared = state.store.reset().await;

    cosign_telemetry::STORE_RESETS.inc();
    refresh_open_gauge(&state).await;
    info!(cleared, "store reset via API");

    Json(ResetResponse {
        reset: true,
        cleared,
    })
}

/// Build the Coordination API router with its middleware stack
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();
    let request_timeout = state.config.request_timeout();

    let mut proposals = get(list_proposals).post(create_proposal);
    if server.enable_admin_reset {
        proposals = proposals.delete(reset_store);
    }

    let mut router = Router::new()
        .route("/api/proposals", proposals)
        .route("/api/proposals/:sequence_number", get(get_proposal))
        .route(
            "/api/proposals/:sequence_number/signatures",
            put(append_signature),
        )
        .route(
            "/api/proposals/:sequence_number/executed",
            put(mark_executed),
        )
        .route("/health", get(health_handler))
        .route("/status", get(status_handler));

    if server.enable_metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Layers wrap outermost last
    let router = router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let router = if server.cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
    } else {
        router
    };

    router
        .layer(RequestBodyLimitLayer::new(server.max_request_size))
        .with_state(state)
}
