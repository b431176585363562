use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    taught_languages, BlockId, JobPosting, PostingId, ScheduledBlock, TimeSlot, TutorId,
};
use super::eligibility::{EligibilityDecision, EligibilityEvaluator, EligibilityOutcome};
use super::language::LanguageResolver;
use super::repository::{PostingSource, ProviderError, ScheduleStore, TutorDirectory};
use super::schedule::{find_conflicts, has_conflict};

/// Shared signal telling in-flight pipelines to stop at the next boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn ensure_active(&self) -> Result<(), MatchingServiceError> {
        if self.is_cancelled() {
            Err(MatchingServiceError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Proposed booking to check against a tutor's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheck {
    pub tutor_id: TutorId,
    pub date: NaiveDate,
    #[serde(with = "crate::matching::domain::clock")]
    pub start: NaiveTime,
    pub duration_minutes: u32,
    /// Block being edited, ignored by the check.
    #[serde(default)]
    pub exclude_block_id: Option<BlockId>,
}

impl ConflictCheck {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.date, self.start, self.duration_minutes)
    }
}

/// Per-posting result of a screening run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostingScreening {
    pub posting_id: PostingId,
    pub title: String,
    pub eligible: bool,
    pub rationale: String,
    /// Class time the posting would occupy, for follow-up conflict checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<TimeSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<EligibilityOutcome>,
}

enum Screening {
    Evaluated(EligibilityOutcome),
    Malformed(String),
}

/// Orchestrates provider fetches and eligibility evaluation for one tutor.
pub struct MatchingService<T, P, S> {
    evaluator: Arc<EligibilityEvaluator>,
    tutors: Arc<T>,
    postings: Arc<P>,
    schedule: Arc<S>,
}

impl<T, P, S> MatchingService<T, P, S>
where
    T: TutorDirectory + 'static,
    P: PostingSource + 'static,
    S: ScheduleStore + 'static,
{
    pub fn new(
        tutors: Arc<T>,
        postings: Arc<P>,
        schedule: Arc<S>,
        evaluator: EligibilityEvaluator,
    ) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            tutors,
            postings,
            schedule,
        }
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    pub fn resolver(&self) -> &LanguageResolver {
        self.evaluator.resolver()
    }

    /// Open postings the tutor is eligible for, in provider order.
    pub async fn find_compatible_postings(
        &self,
        tutor_id: &TutorId,
        cancellation: &CancellationFlag,
    ) -> Result<Vec<JobPosting>, MatchingServiceError> {
        let screened = self.screen(tutor_id, cancellation).await?;
        let candidates = screened.len();

        let compatible: Vec<JobPosting> = screened
            .into_iter()
            .filter_map(|(posting, screening)| match screening {
                Screening::Evaluated(outcome) if outcome.is_eligible() => Some(posting),
                _ => None,
            })
            .collect();

        info!(
            %tutor_id,
            candidates,
            compatible = compatible.len(),
            "matched tutor against open postings"
        );
        Ok(compatible)
    }

    /// Every open posting with the decision and rationale for this tutor.
    pub async fn screen_postings(
        &self,
        tutor_id: &TutorId,
        cancellation: &CancellationFlag,
    ) -> Result<Vec<PostingScreening>, MatchingServiceError> {
        let screened = self.screen(tutor_id, cancellation).await?;

        Ok(screened
            .into_iter()
            .map(|(posting, screening)| match screening {
                Screening::Evaluated(outcome) => PostingScreening {
                    posting_id: posting.posting_id,
                    title: posting.title,
                    eligible: outcome.is_eligible(),
                    rationale: outcome.decision.summary(),
                    schedule: posting.schedule,
                    outcome: Some(outcome),
                },
                Screening::Malformed(message) => PostingScreening {
                    posting_id: posting.posting_id,
                    title: posting.title,
                    eligible: false,
                    rationale: format!("not evaluated: {message}"),
                    schedule: posting.schedule,
                    outcome: None,
                },
            })
            .collect())
    }

    /// Whether the proposed booking overlaps one of the tutor's active blocks.
    ///
    /// Primary conflict check; [`Self::conflicting_blocks`] adds the detail when this is `true`.
    pub async fn check_schedule(
        &self,
        request: &ConflictCheck,
    ) -> Result<bool, MatchingServiceError> {
        let blocks = self.fetch_blocks(request).await?;
        Ok(has_conflict(
            &blocks,
            &request.tutor_id,
            &request.slot(),
            request.exclude_block_id.as_ref(),
        ))
    }

    /// The active blocks the proposed booking overlaps.
    pub async fn conflicting_blocks(
        &self,
        request: &ConflictCheck,
    ) -> Result<Vec<ScheduledBlock>, MatchingServiceError> {
        let blocks = self.fetch_blocks(request).await?;
        Ok(find_conflicts(
            &blocks,
            &request.tutor_id,
            &request.slot(),
            request.exclude_block_id.as_ref(),
        )
        .into_iter()
        .cloned()
        .collect())
    }

    async fn fetch_blocks(
        &self,
        request: &ConflictCheck,
    ) -> Result<Vec<ScheduledBlock>, MatchingServiceError> {
        self.schedule
            .blocks_for(&request.tutor_id, request.date)
            .await
            .map_err(|error| {
                warn!(tutor_id = %request.tutor_id, %error, "schedule fetch failed");
                MatchingServiceError::Fetch(error)
            })
    }

    async fn screen(
        &self,
        tutor_id: &TutorId,
        cancellation: &CancellationFlag,
    ) -> Result<Vec<(JobPosting, Screening)>, MatchingServiceError> {
        cancellation.ensure_active()?;

        let (profile, assignments, postings) = tokio::try_join!(
            self.tutors.profile(tutor_id),
            self.tutors.language_assignments(tutor_id),
            self.postings.open_postings(),
        )
        .map_err(|error| {
            warn!(%tutor_id, %error, "matching fetch failed");
            MatchingServiceError::Fetch(error)
        })?;

        cancellation.ensure_active()?;

        let taught = taught_languages(&assignments);
        let mut screened = Vec::with_capacity(postings.len());

        for posting in postings {
            cancellation.ensure_active()?;

            let screening = match self.evaluator.evaluate(&posting, &profile, &taught) {
                Ok(outcome) => {
                    if let EligibilityDecision::Rejected(reason) = &outcome.decision {
                        debug!(
                            %tutor_id,
                            posting_id = %posting.posting_id,
                            gate = reason.gate().label(),
                            reason = %reason.summary(),
                            "posting rejected"
                        );
                    }
                    Screening::Evaluated(outcome)
                }
                Err(error) => {
                    warn!(
                        %tutor_id,
                        posting_id = %posting.posting_id,
                        %error,
                        "skipping malformed posting"
                    );
                    Screening::Malformed(error.to_string())
                }
            };
            screened.push((posting, screening));

            // let shutdown and other requests run between postings of a large batch
            tokio::task::yield_now().await;
        }

        Ok(screened)
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Fetch(#[from] ProviderError),
    #[error("matching request cancelled")]
    Cancelled,
}
