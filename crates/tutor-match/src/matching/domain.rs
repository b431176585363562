use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for tutors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TutorId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostingId(pub String);

/// Identifier wrapper for scheduled blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl fmt::Display for TutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry describing one language. Identity is the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub code: String,
    pub name: String,
    /// Display names keyed by locale, e.g. `es -> "Inglés"`.
    #[serde(default)]
    pub localized_names: BTreeMap<String, String>,
}

impl LanguageRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            localized_names: BTreeMap::new(),
        }
    }

    pub fn with_localized(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.localized_names.insert(locale.into(), name.into());
        self
    }

    /// Default name followed by every localized name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.localized_names.values().map(String::as_str))
    }
}

/// Whether a tutor teaches a language or merely speaks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageUsage {
    Teaching,
    Spoken,
}

/// Row of the tutor/language assignment relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAssignment {
    /// Code or free-text name, as entered.
    pub language: String,
    pub usage: LanguageUsage,
}

impl LanguageAssignment {
    pub fn teaching(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            usage: LanguageUsage::Teaching,
        }
    }

    pub fn spoken(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            usage: LanguageUsage::Spoken,
        }
    }
}

/// Identifiers of the languages a tutor teaches, in assignment order.
pub fn taught_languages(assignments: &[LanguageAssignment]) -> Vec<String> {
    assignments
        .iter()
        .filter(|assignment| assignment.usage == LanguageUsage::Teaching)
        .map(|assignment| assignment.language.clone())
        .collect()
}

/// Subset of a tutor profile consumed by the eligibility gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorProfile {
    pub tutor_id: TutorId,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub experience: Option<ExperienceLevel>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// How a class is delivered. Location rules apply to everything but `Virtual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[serde(alias = "online")]
    Virtual,
    #[serde(alias = "in-person", alias = "onsite")]
    InPerson,
    Hybrid,
}

impl Modality {
    pub const fn label(self) -> &'static str {
        match self {
            Modality::Virtual => "virtual",
            Modality::InPerson => "in_person",
            Modality::Hybrid => "hybrid",
        }
    }
}

/// Subset of a job posting consumed by the eligibility gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub posting_id: PostingId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub additional_languages: Vec<String>,
    #[serde(default)]
    pub minimum_experience: Option<ExperienceLevel>,
    #[serde(default)]
    pub max_hourly_rate: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub modality: Modality,
    #[serde(default)]
    pub schedule: Option<TimeSlot>,
}

impl JobPosting {
    /// The class time this posting would occupy once assigned.
    pub fn slot(&self) -> Option<TimeSlot> {
        self.schedule
    }
}

/// Ordinal experience scale used by categorical profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceCategory {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceCategory {
    pub const fn rank(self) -> u8 {
        match self {
            ExperienceCategory::Beginner => 0,
            ExperienceCategory::Intermediate => 1,
            ExperienceCategory::Advanced => 2,
            ExperienceCategory::Expert => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceCategory::Beginner => "beginner",
            ExperienceCategory::Intermediate => "intermediate",
            ExperienceCategory::Advanced => "advanced",
            ExperienceCategory::Expert => "expert",
        }
    }
}

/// Experience expressed either in years or on the categorical scale.
///
/// The two representations are never converted into each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExperienceLevel {
    Numeric(f64),
    Category(ExperienceCategory),
}

/// Result of checking an experience level against a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceComparison {
    Meets,
    Below,
    /// The two sides use different representations.
    Incomparable,
}

impl ExperienceLevel {
    pub fn compare_to_requirement(&self, required: &ExperienceLevel) -> ExperienceComparison {
        let meets = match (self, required) {
            (ExperienceLevel::Numeric(actual), ExperienceLevel::Numeric(required)) => {
                actual >= required
            }
            (ExperienceLevel::Category(actual), ExperienceLevel::Category(required)) => {
                actual.rank() >= required.rank()
            }
            _ => return ExperienceComparison::Incomparable,
        };

        if meets {
            ExperienceComparison::Meets
        } else {
            ExperienceComparison::Below
        }
    }

    pub const fn representation(&self) -> &'static str {
        match self {
            ExperienceLevel::Numeric(_) => "numeric",
            ExperienceLevel::Category(_) => "category",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Numeric(years) => write!(f, "{years} years"),
            ExperienceLevel::Category(category) => f.write_str(category.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised experience level '{0}'")]
pub struct UnknownExperienceLevel(pub String);

impl FromStr for ExperienceCategory {
    type Err = UnknownExperienceLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            _ => Err(UnknownExperienceLevel(raw.to_string())),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = UnknownExperienceLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if let Ok(years) = raw.trim().parse::<f64>() {
            return Ok(Self::Numeric(years));
        }
        raw.parse::<ExperienceCategory>().map(Self::Category)
    }
}

impl<'de> Deserialize<'de> for ExperienceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(years) => Ok(Self::Numeric(years)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A calendar date, wall-clock start and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    #[serde(with = "clock")]
    pub start: NaiveTime,
    pub duration_minutes: u32,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> Self {
        Self {
            date,
            start,
            duration_minutes,
        }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    /// Saturates at `NaiveDateTime::MAX` for slots running past the last representable instant.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at()
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Half-open overlap: `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.starts_at() < other.ends_at() && other.starts_at() < self.ends_at()
    }
}

/// Lifecycle of a scheduled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl BlockStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, BlockStatus::Scheduled | BlockStatus::Ongoing)
    }

    pub const fn label(self) -> &'static str {
        match self {
            BlockStatus::Scheduled => "scheduled",
            BlockStatus::Ongoing => "ongoing",
            BlockStatus::Completed => "completed",
            BlockStatus::Cancelled => "cancelled",
        }
    }
}

/// A tutor commitment created when a posting is assigned or a class is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBlock {
    pub block_id: BlockId,
    pub tutor_id: TutorId,
    pub date: NaiveDate,
    #[serde(with = "clock")]
    pub start: NaiveTime,
    pub duration_minutes: u32,
    pub status: BlockStatus,
}

impl ScheduledBlock {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.date, self.start, self.duration_minutes)
    }
}

/// `HH:MM` wall-clock times; `HH:MM:SS` is accepted on input.
pub(crate) mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub(crate) fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
    }

    pub(crate) fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_deserializes_from_numbers_and_names() {
        let years: ExperienceLevel = serde_json::from_str("7").expect("number");
        let named: ExperienceLevel = serde_json::from_str("\"Advanced\"").expect("category");
        let numeric_text: ExperienceLevel = serde_json::from_str("\"3.5\"").expect("numeric text");

        assert_eq!(years, ExperienceLevel::Numeric(7.0));
        assert_eq!(
            named,
            ExperienceLevel::Category(ExperienceCategory::Advanced)
        );
        assert_eq!(numeric_text, ExperienceLevel::Numeric(3.5));
        assert!(serde_json::from_str::<ExperienceLevel>("\"guru\"").is_err());
    }

    #[test]
    fn same_representation_levels_compare() {
        let advanced = ExperienceLevel::Category(ExperienceCategory::Advanced);
        let expert = ExperienceLevel::Category(ExperienceCategory::Expert);

        assert_eq!(
            expert.compare_to_requirement(&advanced),
            ExperienceComparison::Meets
        );
        assert_eq!(
            advanced.compare_to_requirement(&expert),
            ExperienceComparison::Below
        );
        assert_eq!(
            ExperienceLevel::Numeric(3.0).compare_to_requirement(&ExperienceLevel::Numeric(3.0)),
            ExperienceComparison::Meets
        );
        assert_eq!(
            ExperienceLevel::Numeric(7.0).compare_to_requirement(&advanced),
            ExperienceComparison::Incomparable
        );
    }

    #[test]
    fn time_slots_round_trip_wall_clock_times() {
        let slot: TimeSlot =
            serde_json::from_str(r#"{"date":"2024-06-10","start":"09:30","duration_minutes":30}"#)
                .expect("slot parses");
        assert_eq!(slot.start, NaiveTime::from_hms_opt(9, 30, 0).expect("valid"));
        assert_eq!(
            slot.ends_at(),
            NaiveDate::from_ymd_opt(2024, 6, 10)
                .expect("valid")
                .and_hms_opt(10, 0, 0)
                .expect("valid")
        );

        let json = serde_json::to_value(slot).expect("serializes");
        assert_eq!(json["start"], "09:30");
    }

    #[test]
    fn slots_at_the_end_of_the_calendar_saturate() {
        let last_day = NaiveDate::MAX;
        let late = TimeSlot::new(last_day, NaiveTime::from_hms_opt(23, 30, 0).expect("valid"), 120);
        let earlier = TimeSlot::new(last_day, NaiveTime::from_hms_opt(23, 0, 0).expect("valid"), 45);

        assert_eq!(late.ends_at(), NaiveDateTime::MAX);
        assert!(late.overlaps(&earlier));
        assert!(earlier.overlaps(&late));

        let parsed: TimeSlot = serde_json::from_str(
            r#"{"date":"+262142-12-31","start":"23:30","duration_minutes":120}"#,
        )
        .expect("far-future date parses");
        assert!(parsed.ends_at() > parsed.starts_at());
    }

    #[test]
    fn only_scheduled_and_ongoing_blocks_are_active() {
        assert!(BlockStatus::Scheduled.is_active());
        assert!(BlockStatus::Ongoing.is_active());
        assert!(!BlockStatus::Completed.is_active());
        assert!(!BlockStatus::Cancelled.is_active());
    }

    #[test]
    fn taught_languages_ignore_spoken_assignments() {
        let assignments = vec![
            LanguageAssignment::teaching("fr"),
            LanguageAssignment::spoken("en"),
            LanguageAssignment::teaching("Spanish"),
        ];
        assert_eq!(taught_languages(&assignments), vec!["fr", "Spanish"]);
    }
}
