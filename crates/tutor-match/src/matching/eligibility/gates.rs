use super::super::domain::{
    ExperienceComparison, ExperienceLevel, JobPosting, Modality, TutorProfile,
};
use super::super::language::LanguageResolver;
use super::config::EligibilityConfig;
use super::decision::{MalformedRecord, RejectionReason};

pub(crate) enum GateResult {
    Passed(String),
    Skipped(String),
    Failed(RejectionReason),
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn location(posting: &JobPosting, tutor: &TutorProfile) -> GateResult {
    if posting.modality == Modality::Virtual {
        return GateResult::Skipped("virtual posting has no location requirement".to_string());
    }

    let Some(country) = present(posting.country.as_deref()) else {
        return GateResult::Skipped("posting names no country".to_string());
    };

    if present(tutor.country.as_deref()) != Some(country) {
        return GateResult::Failed(RejectionReason::CountryMismatch {
            required: country.to_string(),
            actual: tutor.country.clone(),
        });
    }

    if let Some(region) = present(posting.region.as_deref()) {
        if present(tutor.region.as_deref()) != Some(region) {
            return GateResult::Failed(RejectionReason::RegionMismatch {
                required: region.to_string(),
                actual: tutor.region.clone(),
            });
        }
        return GateResult::Passed(format!("tutor located in {region}, {country}"));
    }

    GateResult::Passed(format!("tutor located in {country}"))
}

pub(crate) fn target_language(
    posting: &JobPosting,
    taught: &[String],
    resolver: &LanguageResolver,
) -> GateResult {
    let Some(target) = present(posting.target_language.as_deref()) else {
        return GateResult::Skipped("posting names no target language".to_string());
    };

    match taught
        .iter()
        .find(|language| resolver.same_language(language, target))
    {
        Some(language) => GateResult::Passed(format!("teaches {target} as {language}")),
        None => GateResult::Failed(RejectionReason::TargetLanguageNotTaught {
            required: target.to_string(),
            taught: taught.to_vec(),
        }),
    }
}

pub(crate) fn additional_languages(
    posting: &JobPosting,
    taught: &[String],
    resolver: &LanguageResolver,
) -> GateResult {
    let required: Vec<&str> = posting
        .additional_languages
        .iter()
        .filter_map(|language| present(Some(language.as_str())))
        .collect();

    if required.is_empty() {
        return GateResult::Skipped("posting requires no additional languages".to_string());
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|language| !resolver.any_same_language(taught, language))
        .map(|language| language.to_string())
        .collect();

    if missing.is_empty() {
        GateResult::Passed(format!("teaches all of {}", required.join(", ")))
    } else {
        GateResult::Failed(RejectionReason::RequiredLanguagesMissing {
            missing,
            taught: taught.to_vec(),
        })
    }
}

pub(crate) fn experience(
    posting: &JobPosting,
    tutor: &TutorProfile,
    config: &EligibilityConfig,
) -> Result<GateResult, MalformedRecord> {
    let Some(required) = posting.minimum_experience else {
        return Ok(GateResult::Skipped(
            "posting names no minimum experience".to_string(),
        ));
    };
    if let ExperienceLevel::Numeric(value) = required {
        if !valid_amount(value) {
            return Err(MalformedRecord::PostingExperience {
                posting_id: posting.posting_id.clone(),
                value,
            });
        }
    }

    let Some(actual) = tutor.experience else {
        return Ok(GateResult::Skipped(
            "tutor has no experience on file".to_string(),
        ));
    };
    if let ExperienceLevel::Numeric(value) = actual {
        if !valid_amount(value) {
            return Err(MalformedRecord::TutorExperience {
                tutor_id: tutor.tutor_id.clone(),
                value,
            });
        }
    }

    let result = match actual.compare_to_requirement(&required) {
        ExperienceComparison::Meets => {
            GateResult::Passed(format!("{actual} meets minimum {required}"))
        }
        ExperienceComparison::Below => {
            GateResult::Failed(RejectionReason::InsufficientExperience { required, actual })
        }
        ExperienceComparison::Incomparable if config.reject_on_experience_mismatch => {
            GateResult::Failed(RejectionReason::ExperienceRepresentationMismatch {
                required,
                actual,
            })
        }
        ExperienceComparison::Incomparable => GateResult::Skipped(format!(
            "{} requirement {required} is not comparable with {} experience {actual}",
            required.representation(),
            actual.representation()
        )),
    };

    Ok(result)
}

pub(crate) fn rate(
    posting: &JobPosting,
    tutor: &TutorProfile,
) -> Result<GateResult, MalformedRecord> {
    let Some(maximum) = posting.max_hourly_rate else {
        return Ok(GateResult::Skipped(
            "posting names no maximum rate".to_string(),
        ));
    };
    if !valid_amount(maximum) {
        return Err(MalformedRecord::PostingRate {
            posting_id: posting.posting_id.clone(),
            value: maximum,
        });
    }

    let Some(actual) = tutor.hourly_rate else {
        return Ok(GateResult::Skipped("tutor has no rate on file".to_string()));
    };
    if !valid_amount(actual) {
        return Err(MalformedRecord::TutorRate {
            tutor_id: tutor.tutor_id.clone(),
            value: actual,
        });
    }

    if actual <= maximum {
        Ok(GateResult::Passed(format!(
            "hourly rate {actual:.2} within maximum {maximum:.2}"
        )))
    } else {
        Ok(GateResult::Failed(RejectionReason::RateAboveMaximum {
            maximum,
            actual,
        }))
    }
}

fn valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
