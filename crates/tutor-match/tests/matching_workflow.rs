//! Integration scenarios for the tutor matching HTTP surface.
//!
//! Scenarios exercise the public router with in-memory providers so that
//! eligibility, screening, conflict checks, and language lookups are validated end to end.

mod common {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::Value;

    use tutor_match::matching::{
        matching_router, BlockId, BlockStatus, CancellationFlag, EligibilityConfig,
        EligibilityEvaluator, ExperienceCategory, ExperienceLevel, JobPosting, LanguageAssignment,
        LanguageResolver, MatchingService, MatchingState, Modality, PostingId, PostingSource,
        ProviderError, ScheduleStore, ScheduledBlock, TimeSlot, TutorDirectory, TutorId,
        TutorProfile,
    };

    pub(super) struct Tutors;

    #[async_trait]
    impl TutorDirectory for Tutors {
        async fn profile(&self, tutor_id: &TutorId) -> Result<TutorProfile, ProviderError> {
            if tutor_id.0 != "tutor-lea" {
                return Err(ProviderError::NotFound(format!("tutor {tutor_id}")));
            }
            Ok(TutorProfile {
                tutor_id: tutor_id.clone(),
                country: Some("FR".to_string()),
                region: Some("IDF".to_string()),
                experience: Some(ExperienceLevel::Category(ExperienceCategory::Advanced)),
                hourly_rate: Some(35.0),
                currency: Some("EUR".to_string()),
            })
        }

        async fn language_assignments(
            &self,
            _tutor_id: &TutorId,
        ) -> Result<Vec<LanguageAssignment>, ProviderError> {
            Ok(vec![
                LanguageAssignment::teaching("Français"),
                LanguageAssignment::teaching("en"),
                LanguageAssignment::spoken("de"),
            ])
        }
    }

    pub(super) struct Postings;

    fn posting(id: &str, target: &str, modality: Modality, country: &str) -> JobPosting {
        JobPosting {
            posting_id: PostingId(id.to_string()),
            title: format!("{target} lessons"),
            target_language: Some(target.to_string()),
            additional_languages: Vec::new(),
            minimum_experience: Some(ExperienceLevel::Category(
                ExperienceCategory::Intermediate,
            )),
            max_hourly_rate: Some(40.0),
            country: Some(country.to_string()),
            region: None,
            modality,
            schedule: Some(TimeSlot::new(june_10(), at(14, 0), 90)),
        }
    }

    #[async_trait]
    impl PostingSource for Postings {
        async fn open_postings(&self) -> Result<Vec<JobPosting>, ProviderError> {
            Ok(vec![
                posting("post-fr-paris", "fr", Modality::InPerson, "FR"),
                posting("post-de-online", "German", Modality::Virtual, "DE"),
                posting("post-en-online", "English", Modality::Virtual, "US"),
                posting("post-en-boston", "English", Modality::Hybrid, "US"),
            ])
        }
    }

    pub(super) struct Schedule;

    #[async_trait]
    impl ScheduleStore for Schedule {
        async fn blocks_for(
            &self,
            tutor_id: &TutorId,
            date: NaiveDate,
        ) -> Result<Vec<ScheduledBlock>, ProviderError> {
            Ok(vec![
                ScheduledBlock {
                    block_id: BlockId("block-morning".to_string()),
                    tutor_id: tutor_id.clone(),
                    date,
                    start: at(9, 0),
                    duration_minutes: 60,
                    status: BlockStatus::Scheduled,
                },
                ScheduledBlock {
                    block_id: BlockId("block-cancelled".to_string()),
                    tutor_id: tutor_id.clone(),
                    date,
                    start: at(11, 0),
                    duration_minutes: 60,
                    status: BlockStatus::Cancelled,
                },
            ])
        }
    }

    pub(super) fn june_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")
    }

    pub(super) fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    pub(super) fn router_with(shutdown: CancellationFlag) -> axum::Router {
        let evaluator = EligibilityEvaluator::new(
            EligibilityConfig::default(),
            Arc::new(LanguageResolver::default()),
        );
        let service = MatchingService::new(
            Arc::new(Tutors),
            Arc::new(Postings),
            Arc::new(Schedule),
            evaluator,
        );
        matching_router(MatchingState {
            service: Arc::new(service),
            shutdown,
        })
    }

    pub(super) fn router() -> axum::Router {
        router_with(CancellationFlag::new())
    }

    pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    pub(super) fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    pub(super) async fn read_json_body(response: Response<Body>) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tower::ServiceExt;
use tutor_match::matching::CancellationFlag;

#[tokio::test]
async fn compatible_postings_keep_provider_order() {
    let response = router()
        .oneshot(get("/api/v1/tutors/tutor-lea/postings"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body["postings"]
        .as_array()
        .expect("postings array")
        .iter()
        .map(|posting| posting["posting_id"].as_str().expect("id string"))
        .collect();
    assert_eq!(ids, vec!["post-fr-paris", "post-en-online"]);
}

#[tokio::test]
async fn screening_reports_rejection_gates() {
    let response = router()
        .oneshot(get("/api/v1/tutors/tutor-lea/screening"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let screenings = body["screenings"].as_array().expect("screenings array");
    assert_eq!(screenings.len(), 4);
    assert!(screenings[1]["rationale"]
        .as_str()
        .expect("rationale")
        .contains("target_language gate"));
    assert!(screenings[3]["rationale"]
        .as_str()
        .expect("rationale")
        .contains("location gate"));
}

#[tokio::test]
async fn unknown_tutor_returns_not_found() {
    let response = router()
        .oneshot(get("/api/v1/tutors/nobody/postings"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shutdown_flag_cancels_matching() {
    let shutdown = CancellationFlag::new();
    shutdown.cancel();

    let response = router_with(shutdown)
        .oneshot(get("/api/v1/tutors/tutor-lea/postings"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn eligibility_endpoint_explains_decision() {
    let payload = json!({
        "posting": {
            "posting_id": "adhoc-1",
            "title": "Conversational English",
            "target_language": "fr",
            "minimum_experience": "advanced",
            "country": "US",
            "modality": "online"
        },
        "tutor": {
            "tutor_id": "tutor-sam",
            "country": "BR",
            "experience": 7,
            "hourly_rate": 30.0
        },
        "taught_languages": ["es"]
    });

    let response = router()
        .oneshot(json_request("POST", "/api/v1/eligibility", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["eligible"], false);
    assert!(body["summary"]
        .as_str()
        .expect("summary")
        .contains("target_language gate"));
    assert_eq!(body["outcome"]["checks"][0]["status"], "skipped");
}

#[tokio::test]
async fn eligibility_endpoint_rejects_malformed_rates() {
    let payload = json!({
        "posting": {
            "posting_id": "adhoc-2",
            "max_hourly_rate": -5.0,
            "modality": "virtual"
        },
        "tutor": { "tutor_id": "tutor-sam", "hourly_rate": 30.0 }
    });

    let response = router()
        .oneshot(json_request("POST", "/api/v1/eligibility", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn conflict_endpoint_lists_overlapping_blocks() {
    let overlapping = json!({
        "tutor_id": "tutor-lea",
        "date": "2024-06-10",
        "start": "09:30",
        "duration_minutes": 30
    });
    let response = router()
        .oneshot(json_request("POST", "/api/v1/schedule/conflicts", overlapping))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["conflict"], true);
    assert_eq!(body["conflicting_block_ids"], json!(["block-morning"]));

    let back_to_back = json!({
        "tutor_id": "tutor-lea",
        "date": "2024-06-10",
        "start": "10:00",
        "duration_minutes": 60
    });
    let response = router()
        .oneshot(json_request("POST", "/api/v1/schedule/conflicts", back_to_back))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["conflict"], false);

    let over_cancelled = json!({
        "tutor_id": "tutor-lea",
        "date": "2024-06-10",
        "start": "11:00",
        "duration_minutes": 60
    });
    let response = router()
        .oneshot(json_request("POST", "/api/v1/schedule/conflicts", over_cancelled))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["conflict"], false);
}

#[tokio::test]
async fn editing_a_block_excludes_it_from_conflicts() {
    let moved = json!({
        "tutor_id": "tutor-lea",
        "date": "2024-06-10",
        "start": "09:15",
        "duration_minutes": 60,
        "exclude_block_id": "block-morning"
    });

    let response = router()
        .oneshot(json_request("POST", "/api/v1/schedule/conflicts", moved))
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert_eq!(body["conflict"], false);
}

#[tokio::test]
async fn language_lookup_resolves_names_and_reports_misses() {
    let response = router()
        .oneshot(get("/api/v1/languages/Espa%C3%B1ol"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["record"]["code"], "es");
    assert_eq!(body["tier"], "name");

    let response = router()
        .oneshot(get("/api/v1/languages/klingon"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
