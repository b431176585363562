//! Tutor eligibility matching and schedule conflict detection.
//!
//! The language resolver, eligibility evaluator, and conflict detector are pure and
//! synchronous. [`MatchingService`] is the only component that talks to providers; it
//! fetches snapshots, runs the evaluator per posting, and logs at that boundary.

pub mod domain;
pub mod eligibility;
pub mod language;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    taught_languages, BlockId, BlockStatus, ExperienceCategory, ExperienceComparison,
    ExperienceLevel, JobPosting, LanguageAssignment, LanguageRecord, LanguageUsage, Modality,
    PostingId, ScheduledBlock, TimeSlot, TutorId, TutorProfile,
};
pub use eligibility::{
    EligibilityConfig, EligibilityDecision, EligibilityEvaluator, EligibilityOutcome, Gate,
    GateCheck, GateStatus, MalformedRecord, RejectionReason,
};
pub use language::{CatalogError, LanguageCatalog, LanguageResolver, MatchTier, Resolution};
pub use repository::{PostingSource, ProviderError, ScheduleStore, TutorDirectory};
pub use router::{matching_router, MatchingState};
pub use schedule::{find_conflicts, has_conflict};
pub use service::{
    CancellationFlag, ConflictCheck, MatchingService, MatchingServiceError, PostingScreening,
};
