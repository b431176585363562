use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::matching::domain::{
    BlockId, BlockStatus, ExperienceCategory, ExperienceLevel, JobPosting, LanguageAssignment,
    Modality, PostingId, ScheduledBlock, TimeSlot, TutorId, TutorProfile,
};
use crate::matching::eligibility::{EligibilityConfig, EligibilityEvaluator};
use crate::matching::language::{LanguageCatalog, LanguageResolver};
use crate::matching::repository::{PostingSource, ProviderError, ScheduleStore, TutorDirectory};
use crate::matching::service::{CancellationFlag, MatchingService};

pub(super) fn resolver() -> Arc<LanguageResolver> {
    Arc::new(LanguageResolver::new(LanguageCatalog::builtin()))
}

pub(super) fn evaluator() -> EligibilityEvaluator {
    EligibilityEvaluator::new(EligibilityConfig::default(), resolver())
}

pub(super) fn strict_evaluator() -> EligibilityEvaluator {
    EligibilityEvaluator::new(
        EligibilityConfig {
            reject_on_experience_mismatch: true,
        },
        resolver(),
    )
}

pub(super) fn tutor_id() -> TutorId {
    TutorId("tutor-ana".to_string())
}

pub(super) fn tutor() -> TutorProfile {
    TutorProfile {
        tutor_id: tutor_id(),
        country: Some("US".to_string()),
        region: Some("CA".to_string()),
        experience: Some(ExperienceLevel::Numeric(5.0)),
        hourly_rate: Some(40.0),
        currency: Some("USD".to_string()),
    }
}

pub(super) fn assignments() -> Vec<LanguageAssignment> {
    vec![
        LanguageAssignment::teaching("es"),
        LanguageAssignment::teaching("English"),
        LanguageAssignment::spoken("fr"),
    ]
}

pub(super) fn taught() -> Vec<String> {
    vec!["es".to_string(), "English".to_string()]
}

pub(super) fn posting(id: &str) -> JobPosting {
    JobPosting {
        posting_id: PostingId(id.to_string()),
        title: format!("Posting {id}"),
        target_language: Some("Spanish".to_string()),
        additional_languages: Vec::new(),
        minimum_experience: Some(ExperienceLevel::Numeric(2.0)),
        max_hourly_rate: Some(50.0),
        country: Some("US".to_string()),
        region: None,
        modality: Modality::InPerson,
        schedule: Some(TimeSlot::new(june_10(), at(9, 0), 60)),
    }
}

pub(super) fn category(level: ExperienceCategory) -> Option<ExperienceLevel> {
    Some(ExperienceLevel::Category(level))
}

pub(super) fn june_10() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")
}

pub(super) fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn block(id: &str, start: NaiveTime, minutes: u32, status: BlockStatus) -> ScheduledBlock {
    ScheduledBlock {
        block_id: BlockId(id.to_string()),
        tutor_id: tutor_id(),
        date: june_10(),
        start,
        duration_minutes: minutes,
        status,
    }
}

#[derive(Default)]
pub(super) struct MemoryTutors {
    pub(super) profiles: HashMap<TutorId, TutorProfile>,
    pub(super) assignments: HashMap<TutorId, Vec<LanguageAssignment>>,
}

impl MemoryTutors {
    pub(super) fn with_tutor(profile: TutorProfile, assignments: Vec<LanguageAssignment>) -> Self {
        let mut tutors = Self::default();
        tutors
            .assignments
            .insert(profile.tutor_id.clone(), assignments);
        tutors.profiles.insert(profile.tutor_id.clone(), profile);
        tutors
    }
}

#[async_trait]
impl TutorDirectory for MemoryTutors {
    async fn profile(&self, tutor_id: &TutorId) -> Result<TutorProfile, ProviderError> {
        self.profiles
            .get(tutor_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("tutor {tutor_id}")))
    }

    async fn language_assignments(
        &self,
        tutor_id: &TutorId,
    ) -> Result<Vec<LanguageAssignment>, ProviderError> {
        Ok(self.assignments.get(tutor_id).cloned().unwrap_or_default())
    }
}

/// Posting source that counts fetches and can trip a cancellation flag while serving.
#[derive(Default)]
pub(super) struct MemoryPostings {
    pub(super) postings: Vec<JobPosting>,
    pub(super) fetches: AtomicUsize,
    pub(super) cancel_on_fetch: Option<CancellationFlag>,
}

impl MemoryPostings {
    pub(super) fn new(postings: Vec<JobPosting>) -> Self {
        Self {
            postings,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PostingSource for MemoryPostings {
    async fn open_postings(&self) -> Result<Vec<JobPosting>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(flag) = &self.cancel_on_fetch {
            flag.cancel();
        }
        Ok(self.postings.clone())
    }
}

pub(super) struct UnavailablePostings;

#[async_trait]
impl PostingSource for UnavailablePostings {
    async fn open_postings(&self) -> Result<Vec<JobPosting>, ProviderError> {
        Err(ProviderError::Unavailable("postings index offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySchedule {
    pub(super) blocks: Arc<Mutex<Vec<ScheduledBlock>>>,
}

impl MemorySchedule {
    pub(super) fn with_blocks(blocks: Vec<ScheduledBlock>) -> Self {
        Self {
            blocks: Arc::new(Mutex::new(blocks)),
        }
    }
}

#[async_trait]
impl ScheduleStore for MemorySchedule {
    async fn blocks_for(
        &self,
        tutor_id: &TutorId,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledBlock>, ProviderError> {
        let guard = self.blocks.lock().expect("schedule mutex poisoned");
        Ok(guard
            .iter()
            .filter(|block| &block.tutor_id == tutor_id && block.date == date)
            .cloned()
            .collect())
    }
}

pub(super) fn build_service<P: PostingSource + 'static>(
    postings: P,
    blocks: Vec<ScheduledBlock>,
) -> MatchingService<MemoryTutors, P, MemorySchedule> {
    MatchingService::new(
        Arc::new(MemoryTutors::with_tutor(tutor(), assignments())),
        Arc::new(postings),
        Arc::new(MemorySchedule::with_blocks(blocks)),
        evaluator(),
    )
}
