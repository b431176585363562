use serde::{Deserialize, Serialize};

/// Policy switches for the eligibility gates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Reject instead of passing when posting and tutor express experience differently.
    #[serde(default)]
    pub reject_on_experience_mismatch: bool,
}
