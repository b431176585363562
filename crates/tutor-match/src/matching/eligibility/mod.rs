mod config;
mod decision;
mod gates;

pub use config::EligibilityConfig;
pub use decision::{
    EligibilityDecision, EligibilityOutcome, Gate, GateCheck, GateStatus, MalformedRecord,
    RejectionReason,
};

use std::sync::Arc;

use super::domain::{JobPosting, TutorProfile};
use super::language::LanguageResolver;
use gates::GateResult;

/// Stateless evaluator running the ordered gates; the first failing gate decides.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
    resolver: Arc<LanguageResolver>,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig, resolver: Arc<LanguageResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    pub fn evaluate(
        &self,
        posting: &JobPosting,
        tutor: &TutorProfile,
        taught_languages: &[String],
    ) -> Result<EligibilityOutcome, MalformedRecord> {
        let mut checks = Vec::with_capacity(Gate::ORDER.len());

        for gate in Gate::ORDER {
            let result = match gate {
                Gate::Location => gates::location(posting, tutor),
                Gate::TargetLanguage => {
                    gates::target_language(posting, taught_languages, &self.resolver)
                }
                Gate::AdditionalLanguages => {
                    gates::additional_languages(posting, taught_languages, &self.resolver)
                }
                Gate::Experience => gates::experience(posting, tutor, &self.config)?,
                Gate::Rate => gates::rate(posting, tutor)?,
            };

            match result {
                GateResult::Passed(notes) => checks.push(GateCheck {
                    gate,
                    status: GateStatus::Passed,
                    notes,
                }),
                GateResult::Skipped(notes) => checks.push(GateCheck {
                    gate,
                    status: GateStatus::Skipped,
                    notes,
                }),
                GateResult::Failed(reason) => {
                    checks.push(GateCheck {
                        gate,
                        status: GateStatus::Failed,
                        notes: reason.summary(),
                    });
                    return Ok(EligibilityOutcome {
                        posting_id: posting.posting_id.clone(),
                        tutor_id: tutor.tutor_id.clone(),
                        decision: EligibilityDecision::Rejected(reason),
                        checks,
                    });
                }
            }
        }

        Ok(EligibilityOutcome {
            posting_id: posting.posting_id.clone(),
            tutor_id: tutor.tutor_id.clone(),
            decision: EligibilityDecision::Eligible,
            checks,
        })
    }
}
