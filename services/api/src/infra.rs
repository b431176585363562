use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tutor_match::config::MatchingConfig;
use tutor_match::error::AppError;
use tutor_match::matching::{
    BlockId, BlockStatus, EligibilityConfig, EligibilityEvaluator, ExperienceCategory,
    ExperienceLevel, JobPosting, LanguageAssignment, LanguageCatalog, LanguageResolver,
    MatchingService, Modality, PostingId, PostingSource, ProviderError, ScheduleStore,
    ScheduledBlock, TimeSlot, TutorDirectory, TutorId, TutorProfile,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryMatchingService =
    MatchingService<InMemoryTutorDirectory, InMemoryPostingSource, InMemoryScheduleStore>;

#[derive(Debug, Default)]
pub(crate) struct InMemoryTutorDirectory {
    profiles: HashMap<TutorId, TutorProfile>,
    assignments: HashMap<TutorId, Vec<LanguageAssignment>>,
}

#[async_trait]
impl TutorDirectory for InMemoryTutorDirectory {
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

#[derive(Debug, Default)]
pub(crate) struct InMemoryPostingSource {
    postings: Vec<JobPosting>,
}

#[async_trait]
impl PostingSource for InMemoryPostingSource {
    async fn open_postings(&self) -> Result<Vec<JobPosting>, ProviderError> {
        Ok(self.postings.clone())
    }
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryScheduleStore {
    blocks: Vec<ScheduledBlock>,
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn blocks_for(
        &self,
        tutor_id: &TutorId,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledBlock>, ProviderError> {
        Ok(self
            .blocks
            .iter()
            .filter(|block| &block.tutor_id == tutor_id && block.date == date)
            .cloned()
            .collect())
    }
}

/// Tutor entry of a seed file: the profile plus its language rows.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SeedTutor {
    pub(crate) profile: TutorProfile,
    #[serde(default)]
    pub(crate) languages: Vec<LanguageAssignment>,
}

/// JSON snapshot used to hydrate the in-memory providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SeedData {
    #[serde(default)]
    pub(crate) tutors: Vec<SeedTutor>,
    #[serde(default)]
    pub(crate) postings: Vec<JobPosting>,
    #[serde(default)]
    pub(crate) blocks: Vec<ScheduledBlock>,
}

impl SeedData {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            tutors = seed.tutors.len(),
            postings = seed.postings.len(),
            blocks = seed.blocks.len(),
            "loaded matching seed data"
        );
        Ok(seed)
    }

    /// Two tutors, a handful of postings on `date`, and one tutor's existing bookings.
    pub(crate) fn demo(date: NaiveDate) -> Self {
        let ana = TutorId("tutor-ana".to_string());
        let lea = TutorId("tutor-lea".to_string());

        let tutors = vec![
            SeedTutor {
                profile: TutorProfile {
                    tutor_id: ana.clone(),
                    country: Some("US".to_string()),
                    region: Some("CA".to_string()),
                    experience: Some(ExperienceLevel::Numeric(5.0)),
                    hourly_rate: Some(40.0),
                    currency: Some("USD".to_string()),
                },
                languages: vec![
                    LanguageAssignment::teaching("es"),
                    LanguageAssignment::teaching("English"),
                    LanguageAssignment::spoken("fr"),
                ],
            },
            SeedTutor {
                profile: TutorProfile {
                    tutor_id: lea.clone(),
                    country: Some("FR".to_string()),
                    region: Some("IDF".to_string()),
                    experience: Some(ExperienceLevel::Category(ExperienceCategory::Advanced)),
                    hourly_rate: Some(35.0),
                    currency: Some("EUR".to_string()),
                },
                languages: vec![
                    LanguageAssignment::teaching("Français"),
                    LanguageAssignment::teaching("en"),
                    LanguageAssignment::spoken("de"),
                ],
            },
        ];

        let postings = vec![
            demo_posting(
                "post-spanish-la",
                "Conversational Spanish in Los Angeles",
                "Spanish",
                Modality::InPerson,
                Some(("US", Some("CA"))),
                Some(ExperienceLevel::Numeric(2.0)),
                Some(50.0),
                TimeSlot::new(date, clock(9, 30), 60),
            ),
            demo_posting(
                "post-english-online",
                "Business English (online)",
                "Inglés",
                Modality::Virtual,
                Some(("MX", None)),
                Some(ExperienceLevel::Category(ExperienceCategory::Intermediate)),
                Some(45.0),
                TimeSlot::new(date, clock(13, 0), 90),
            ),
            demo_posting(
                "post-french-paris",
                "French for expats",
                "fr",
                Modality::Hybrid,
                Some(("FR", None)),
                Some(ExperienceLevel::Category(ExperienceCategory::Intermediate)),
                Some(40.0),
                TimeSlot::new(date, clock(17, 0), 60),
            ),
            demo_posting(
                "post-japanese-online",
                "Japanese for beginners",
                "Japanese",
                Modality::Virtual,
                None,
                None,
                Some(60.0),
                TimeSlot::new(date, clock(8, 0), 45),
            ),
            demo_posting(
                "post-spanish-premium",
                "Spanish exam preparation",
                "es",
                Modality::Virtual,
                None,
                Some(ExperienceLevel::Numeric(3.0)),
                Some(30.0),
                TimeSlot::new(date, clock(15, 0), 60),
            ),
        ];

        let blocks = vec![
            ScheduledBlock {
                block_id: BlockId("block-ana-morning".to_string()),
                tutor_id: ana.clone(),
                date,
                start: clock(9, 0),
                duration_minutes: 60,
                status: BlockStatus::Scheduled,
            },
            ScheduledBlock {
                block_id: BlockId("block-ana-lunch".to_string()),
                tutor_id: ana,
                date,
                start: clock(12, 0),
                duration_minutes: 60,
                status: BlockStatus::Cancelled,
            },
            ScheduledBlock {
                block_id: BlockId("block-lea-evening".to_string()),
                tutor_id: lea,
                date,
                start: clock(18, 0),
                duration_minutes: 60,
                status: BlockStatus::Scheduled,
            },
        ];

        Self {
            tutors,
            postings,
            blocks,
        }
    }

    pub(crate) fn into_providers(
        self,
    ) -> (InMemoryTutorDirectory, InMemoryPostingSource, InMemoryScheduleStore) {
        let mut directory = InMemoryTutorDirectory::default();
        for SeedTutor { profile, languages } in self.tutors {
            directory
                .assignments
                .insert(profile.tutor_id.clone(), languages);
            directory.profiles.insert(profile.tutor_id.clone(), profile);
        }

        (
            directory,
            InMemoryPostingSource {
                postings: self.postings,
            },
            InMemoryScheduleStore {
                blocks: self.blocks,
            },
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_posting(
    id: &str,
    title: &str,
    target: &str,
    modality: Modality,
    location: Option<(&str, Option<&str>)>,
    minimum_experience: Option<ExperienceLevel>,
    max_hourly_rate: Option<f64>,
    schedule: TimeSlot,
) -> JobPosting {
    let (country, region) = match location {
        Some((country, region)) => (Some(country.to_string()), region.map(str::to_string)),
        None => (None, None),
    };
    JobPosting {
        posting_id: PostingId(id.to_string()),
        title: title.to_string(),
        target_language: Some(target.to_string()),
        additional_languages: Vec::new(),
        minimum_experience,
        max_hourly_rate,
        country,
        region,
        modality,
        schedule: Some(schedule),
    }
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("demo dataset uses valid wall-clock times")
}

/// Language catalog from the configured CSV, or the builtin table.
pub(crate) fn language_resolver(config: &MatchingConfig) -> Result<LanguageResolver, AppError> {
    let catalog = match &config.language_catalog {
        Some(path) => {
            let catalog = LanguageCatalog::from_path(path)?;
            info!(path = %path.display(), languages = catalog.len(), "loaded language catalog");
            catalog
        }
        None => LanguageCatalog::builtin(),
    };
    Ok(LanguageResolver::new(catalog))
}

pub(crate) fn build_matching_service(
    config: &MatchingConfig,
    seed: SeedData,
) -> Result<InMemoryMatchingService, AppError> {
    let resolver = Arc::new(language_resolver(config)?);
    let evaluator = EligibilityEvaluator::new(
        EligibilityConfig {
            reject_on_experience_mismatch: config.reject_on_experience_mismatch,
        },
        resolver,
    );
    let (tutors, postings, schedule) = seed.into_providers();
    Ok(MatchingService::new(
        Arc::new(tutors),
        Arc::new(postings),
        Arc::new(schedule),
        evaluator,
    ))
}

/// Seed from `seed_path` when configured, otherwise the demo dataset on `date`.
pub(crate) fn load_seed(config: &MatchingConfig, date: NaiveDate) -> Result<SeedData, AppError> {
    match &config.seed_path {
        Some(path) => SeedData::from_path(path),
        None => Ok(SeedData::demo(date)),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
