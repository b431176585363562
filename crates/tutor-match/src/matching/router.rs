use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{BlockId, JobPosting, TutorId, TutorProfile};
use super::eligibility::EligibilityOutcome;
use super::repository::{PostingSource, ProviderError, ScheduleStore, TutorDirectory};
use super::service::{CancellationFlag, ConflictCheck, MatchingService, MatchingServiceError};

/// Router state: the service plus the process-wide shutdown signal.
pub struct MatchingState<T, P, S> {
    pub service: Arc<MatchingService<T, P, S>>,
    pub shutdown: CancellationFlag,
}

impl<T, P, S> Clone for MatchingState<T, P, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            shutdown: self.shutdown.clone(),
        }
    }
}

/// Ad-hoc eligibility check for data supplied by the caller.
#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub posting: JobPosting,
    pub tutor: TutorProfile,
    #[serde(default)]
    pub taught_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub summary: String,
    pub outcome: EligibilityOutcome,
}

#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub conflict: bool,
    pub conflicting_block_ids: Vec<BlockId>,
}

/// Router builder exposing matching, eligibility, scheduling, and language lookups.
pub fn matching_router<T, P, S>(state: MatchingState<T, P, S>) -> Router
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/tutors/:tutor_id/postings",
            get(compatible_postings_handler::<T, P, S>),
        )
        .route(
            "/api/v1/tutors/:tutor_id/screening",
            get(screening_handler::<T, P, S>),
        )
        .route("/api/v1/eligibility", post(eligibility_handler::<T, P, S>))
        .route(
            "/api/v1/schedule/conflicts",
            post(conflict_handler::<T, P, S>),
        )
        .route(
            "/api/v1/languages/:identifier",
            get(language_handler::<T, P, S>),
        )
        .with_state(state)
}

pub(crate) async fn compatible_postings_handler<T, P, S>(
    State(state): State<MatchingState<T, P, S>>,
    Path(tutor_id): Path<String>,
) -> Response
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    let tutor_id = TutorId(tutor_id);
    match state
        .service
        .find_compatible_postings(&tutor_id, &state.shutdown)
        .await
    {
        Ok(postings) => {
            let payload = json!({
                "tutor_id": tutor_id,
                "postings": postings,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn screening_handler<T, P, S>(
    State(state): State<MatchingState<T, P, S>>,
    Path(tutor_id): Path<String>,
) -> Response
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    let tutor_id = TutorId(tutor_id);
    match state
        .service
        .screen_postings(&tutor_id, &state.shutdown)
        .await
    {
        Ok(screenings) => {
            let payload = json!({
                "tutor_id": tutor_id,
                "screenings": screenings,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn eligibility_handler<T, P, S>(
    State(state): State<MatchingState<T, P, S>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    match state.service.evaluator().evaluate(
        &request.posting,
        &request.tutor,
        &request.taught_languages,
    ) {
        Ok(outcome) => {
            let response = EligibilityResponse {
                eligible: outcome.is_eligible(),
                summary: outcome.decision.summary(),
                outcome,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn conflict_handler<T, P, S>(
    State(state): State<MatchingState<T, P, S>>,
    axum::Json(request): axum::Json<ConflictCheck>,
) -> Response
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    let conflict = match state.service.check_schedule(&request).await {
        Ok(conflict) => conflict,
        Err(error) => return service_error_response(error),
    };

    let conflicting_block_ids = if conflict {
        match state.service.conflicting_blocks(&request).await {
            Ok(blocks) => blocks.into_iter().map(|block| block.block_id).collect(),
            Err(error) => return service_error_response(error),
        }
    } else {
        Vec::new()
    };

    let response = ConflictResponse {
        conflict,
        conflicting_block_ids,
    };
    (StatusCode::OK, axum::Json(response)).into_response()
}

pub(crate) async fn language_handler<T, P, S>(
    State(state): State<MatchingState<T, P, S>>,
    Path(identifier): Path<String>,
) -> Response
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    match state.service.resolver().lookup(&identifier) {
        Some(resolution) => (StatusCode::OK, axum::Json(resolution)).into_response(),
        None => {
            let payload = json!({
                "error": format!("no language matches '{identifier}'"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

fn service_error_response(error: MatchingServiceError) -> Response {
    let status = match &error {
        MatchingServiceError::Fetch(ProviderError::NotFound(_)) => StatusCode::NOT_FOUND,
        MatchingServiceError::Fetch(ProviderError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        MatchingServiceError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
