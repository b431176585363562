use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{JobPosting, LanguageAssignment, ScheduledBlock, TutorId, TutorProfile};

/// Source of tutor profiles and their language assignments.
#[async_trait]
pub trait TutorDirectory: Send + Sync {
    async fn profile(&self, tutor_id: &TutorId) -> Result<TutorProfile, ProviderError>;
    async fn language_assignments(
        &self,
        tutor_id: &TutorId,
    ) -> Result<Vec<LanguageAssignment>, ProviderError>;
}

/// Source of candidate postings, already restricted to open/published ones.
#[async_trait]
pub trait PostingSource: Send + Sync {
    async fn open_postings(&self) -> Result<Vec<JobPosting>, ProviderError>;
}

/// Source of a tutor's existing commitments.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Blocks of `tutor_id` on `date`. Implementations may return extra blocks;
    /// the conflict detector filters them again.
    async fn blocks_for(
        &self,
        tutor_id: &TutorId,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledBlock>, ProviderError>;
}

/// Failure reported by an external data provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
