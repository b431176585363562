use serde::{Deserialize, Serialize};

use super::super::domain::{ExperienceLevel, PostingId, TutorId};

/// Independent eligibility checks, listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Location,
    TargetLanguage,
    AdditionalLanguages,
    Experience,
    Rate,
}

impl Gate {
    pub const ORDER: [Gate; 5] = [
        Gate::Location,
        Gate::TargetLanguage,
        Gate::AdditionalLanguages,
        Gate::Experience,
        Gate::Rate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Gate::Location => "location",
            Gate::TargetLanguage => "target_language",
            Gate::AdditionalLanguages => "additional_languages",
            Gate::Experience => "experience",
            Gate::Rate => "rate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Passed,
    Skipped,
    Failed,
}

/// One entry of the audit trail produced while evaluating a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateCheck {
    pub gate: Gate,
    pub status: GateStatus,
    pub notes: String,
}

/// Accept/reject decision for one tutor and one posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EligibilityDecision {
    Eligible,
    Rejected(RejectionReason),
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible)
    }

    pub fn summary(&self) -> String {
        match self {
            EligibilityDecision::Eligible => "eligible".to_string(),
            EligibilityDecision::Rejected(reason) => reason.summary(),
        }
    }
}

/// Why a gate rejected the tutor, with the values that were compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectionReason {
    CountryMismatch {
        required: String,
        actual: Option<String>,
    },
    RegionMismatch {
        required: String,
        actual: Option<String>,
    },
    TargetLanguageNotTaught {
        required: String,
        taught: Vec<String>,
    },
    RequiredLanguagesMissing {
        missing: Vec<String>,
        taught: Vec<String>,
    },
    InsufficientExperience {
        required: ExperienceLevel,
        actual: ExperienceLevel,
    },
    ExperienceRepresentationMismatch {
        required: ExperienceLevel,
        actual: ExperienceLevel,
    },
    RateAboveMaximum {
        maximum: f64,
        actual: f64,
    },
}

impl RejectionReason {
    pub const fn gate(&self) -> Gate {
        match self {
            RejectionReason::CountryMismatch { .. } | RejectionReason::RegionMismatch { .. } => {
                Gate::Location
            }
            RejectionReason::TargetLanguageNotTaught { .. } => Gate::TargetLanguage,
            RejectionReason::RequiredLanguagesMissing { .. } => Gate::AdditionalLanguages,
            RejectionReason::InsufficientExperience { .. }
            | RejectionReason::ExperienceRepresentationMismatch { .. } => Gate::Experience,
            RejectionReason::RateAboveMaximum { .. } => Gate::Rate,
        }
    }

    pub fn summary(&self) -> String {
        let detail = match self {
            RejectionReason::CountryMismatch { required, actual } => format!(
                "requires country {required}, tutor is in {}",
                actual.as_deref().unwrap_or("an unknown country")
            ),
            RejectionReason::RegionMismatch { required, actual } => format!(
                "requires region {required}, tutor is in {}",
                actual.as_deref().unwrap_or("an unknown region")
            ),
            RejectionReason::TargetLanguageNotTaught { required, taught } => format!(
                "requires {required}, tutor teaches {}",
                list_or_none(taught)
            ),
            RejectionReason::RequiredLanguagesMissing { missing, taught } => format!(
                "missing {}, tutor teaches {}",
                missing.join(", "),
                list_or_none(taught)
            ),
            RejectionReason::InsufficientExperience { required, actual } => {
                format!("requires at least {required}, tutor has {actual}")
            }
            RejectionReason::ExperienceRepresentationMismatch { required, actual } => format!(
                "cannot compare {} requirement {required} with {} experience {actual}",
                required.representation(),
                actual.representation()
            ),
            RejectionReason::RateAboveMaximum { maximum, actual } => {
                format!("hourly rate {actual:.2} exceeds maximum {maximum:.2}")
            }
        };

        format!("rejected by {} gate: {detail}", self.gate().label())
    }
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "nothing".to_string()
    } else {
        values.join(", ")
    }
}

/// Evaluation output: the decision plus the gate trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub posting_id: PostingId,
    pub tutor_id: TutorId,
    pub decision: EligibilityDecision,
    pub checks: Vec<GateCheck>,
}

impl EligibilityOutcome {
    pub fn is_eligible(&self) -> bool {
        self.decision.is_eligible()
    }

    pub fn rejected_by(&self) -> Option<Gate> {
        match &self.decision {
            EligibilityDecision::Eligible => None,
            EligibilityDecision::Rejected(reason) => Some(reason.gate()),
        }
    }
}

/// Input data too broken for a gate to compare at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("posting {posting_id} has an invalid maximum hourly rate ({value})")]
    PostingRate { posting_id: PostingId, value: f64 },
    #[error("tutor {tutor_id} has an invalid hourly rate ({value})")]
    TutorRate { tutor_id: TutorId, value: f64 },
    #[error("posting {posting_id} has an invalid minimum experience ({value})")]
    PostingExperience { posting_id: PostingId, value: f64 },
    #[error("tutor {tutor_id} has an invalid experience value ({value})")]
    TutorExperience { tutor_id: TutorId, value: f64 },
}
