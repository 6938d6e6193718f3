//! Model configuration: which constraint families are active.
//!
//! Two named configurations cover the observed problem variants:
//! [`ModelConfig::general`] (multi-person tasks, hours modeled) and
//! [`ModelConfig::strict`] (one assignee per task, preference penalty).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::data::MAX_VALUE;

/// Penalty per forbidden pair when the preference rule penalizes.
pub const DEFAULT_PREFERENCE_PENALTY: i64 = 1000;

/// Upper bound of each `hours[w, t]` variable.
pub const DEFAULT_SLOT_HOURS: i64 = 8;

/// Requirement level from which the per-worker skill gate applies.
pub const DEFAULT_GATE_THRESHOLD: i64 = 2;

/// How many workers each task receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// `sum_w x[w, t] >= 1`: several workers may share a task.
    AtLeastOne,
    /// `sum_w x[w, t] == 1`: a single assignee per task.
    ExactlyOne,
}

/// Treatment of pairs whose preference rank is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PreferenceRule {
    /// Preferences play no role.
    Ignore,
    /// Rank-0 pairs are fixed to 0.
    Forbid,
    /// Rank-0 pairs cost an extra `penalty` in the objective.
    Penalize { penalty: i64 },
    /// Both the hard exclusion and the objective penalty.
    ForbidAndPenalize { penalty: i64 },
}

impl PreferenceRule {
    /// Whether rank-0 pairs are excluded outright.
    pub fn forbids(&self) -> bool {
        matches!(
            self,
            PreferenceRule::Forbid | PreferenceRule::ForbidAndPenalize { .. }
        )
    }

    /// Objective penalty for a rank-0 pair, if any.
    pub fn penalty(&self) -> Option<i64> {
        match self {
            PreferenceRule::Penalize { penalty }
            | PreferenceRule::ForbidAndPenalize { penalty } => Some(*penalty),
            PreferenceRule::Ignore | PreferenceRule::Forbid => None,
        }
    }
}

/// Named model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    General,
    Strict,
}

impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(ModelVariant::General),
            "strict" => Ok(ModelVariant::Strict),
            other => Err(format!("unknown model variant '{other}' (expected general|strict)")),
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelVariant::General => f.write_str("general"),
            ModelVariant::Strict => f.write_str("strict"),
        }
    }
}

/// Selects the constraint families of an assignment model.
///
/// # Examples
///
/// ```
/// use u_assign::assign::{Coverage, ModelConfig, PreferenceRule};
///
/// let config = ModelConfig::strict()
///     .with_preference(PreferenceRule::Penalize { penalty: 1000 });
/// assert_eq!(config.coverage, Coverage::ExactlyOne);
/// assert!(!config.preference.forbids());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Cardinality of task coverage.
    pub coverage: Coverage,
    /// Aggregate skill sufficiency per task and required skill.
    pub skill_sufficiency: bool,
    /// Per-worker hard skill gate.
    pub skill_gate: bool,
    /// Requirement level at which the hard gate applies.
    pub gate_threshold: i64,
    /// At most one task per worker.
    pub exclusivity: bool,
    /// Per-task budget ceiling.
    pub budget: bool,
    /// Treatment of rank-0 preferences.
    pub preference: PreferenceRule,
    /// Model `hours[w, t]` with capacity, overtime and effort constraints.
    pub hours: bool,
    /// Upper bound of each hours variable.
    pub slot_hours: i64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::general()
    }
}

impl ModelConfig {
    /// Multi-person coverage with hours, overtime and hard preference gate.
    pub fn general() -> Self {
        Self {
            coverage: Coverage::AtLeastOne,
            skill_sufficiency: true,
            skill_gate: true,
            gate_threshold: DEFAULT_GATE_THRESHOLD,
            exclusivity: true,
            budget: true,
            preference: PreferenceRule::Forbid,
            hours: true,
            slot_hours: DEFAULT_SLOT_HOURS,
        }
    }

    /// Single-assignee coverage without hours; rank-0 pairs are both
    /// excluded and penalized.
    pub fn strict() -> Self {
        Self {
            coverage: Coverage::ExactlyOne,
            preference: PreferenceRule::ForbidAndPenalize {
                penalty: DEFAULT_PREFERENCE_PENALTY,
            },
            hours: false,
            ..Self::general()
        }
    }

    /// Configuration of a named variant.
    pub fn variant(variant: ModelVariant) -> Self {
        match variant {
            ModelVariant::General => Self::general(),
            ModelVariant::Strict => Self::strict(),
        }
    }

    /// Sets the coverage cardinality.
    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Sets the treatment of rank-0 preferences.
    pub fn with_preference(mut self, rule: PreferenceRule) -> Self {
        self.preference = rule;
        self
    }

    /// Sets whether hours, capacity and effort are modeled.
    pub fn with_hours(mut self, enabled: bool) -> Self {
        self.hours = enabled;
        self
    }

    /// Sets the upper bound of each hours variable.
    pub fn with_slot_hours(mut self, hours: i64) -> Self {
        self.slot_hours = hours;
        self
    }

    /// Sets whether the per-worker skill gate applies.
    pub fn with_skill_gate(mut self, enabled: bool) -> Self {
        self.skill_gate = enabled;
        self
    }

    /// Sets the requirement level from which the gate applies.
    pub fn with_gate_threshold(mut self, level: i64) -> Self {
        self.gate_threshold = level;
        self
    }

    /// Sets whether aggregate skill sufficiency is enforced.
    pub fn with_skill_sufficiency(mut self, enabled: bool) -> Self {
        self.skill_sufficiency = enabled;
        self
    }

    /// Sets whether each worker holds at most one task.
    pub fn with_exclusivity(mut self, enabled: bool) -> Self {
        self.exclusivity = enabled;
        self
    }

    /// Sets whether task budgets are enforced.
    pub fn with_budget(mut self, enabled: bool) -> Self {
        self.budget = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.hours && !(0..=MAX_VALUE).contains(&self.slot_hours) {
            return Err(format!(
                "slot_hours must be within 0..={MAX_VALUE}, got {}",
                self.slot_hours
            ));
        }
        if self.skill_gate && self.gate_threshold < 1 {
            return Err(format!(
                "gate_threshold must be at least 1, got {}",
                self.gate_threshold
            ));
        }
        if let Some(penalty) = self.preference.penalty() {
            if !(0..=MAX_VALUE).contains(&penalty) {
                return Err(format!(
                    "preference penalty must be within 0..={MAX_VALUE}, got {penalty}"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_defaults() {
        let config = ModelConfig::general();
        assert_eq!(config.coverage, Coverage::AtLeastOne);
        assert!(config.hours);
        assert_eq!(config.slot_hours, 8);
        assert_eq!(config.gate_threshold, 2);
        assert_eq!(config.preference, PreferenceRule::Forbid);
        assert_eq!(ModelConfig::default(), config);
    }

    #[test]
    fn test_strict_defaults() {
        let config = ModelConfig::strict();
        assert_eq!(config.coverage, Coverage::ExactlyOne);
        assert!(!config.hours);
        assert!(config.preference.forbids());
        assert_eq!(config.preference.penalty(), Some(1000));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("Strict".parse::<ModelVariant>(), Ok(ModelVariant::Strict));
        assert_eq!("general".parse::<ModelVariant>(), Ok(ModelVariant::General));
        assert!("fuzzy".parse::<ModelVariant>().is_err());
        assert_eq!(ModelConfig::variant(ModelVariant::Strict), ModelConfig::strict());
    }

    #[test]
    fn test_validate_bad_values() {
        assert!(ModelConfig::general().with_slot_hours(-1).validate().is_err());
        assert!(ModelConfig::general().with_gate_threshold(0).validate().is_err());
        let config = ModelConfig::strict().with_preference(PreferenceRule::Penalize { penalty: -5 });
        assert!(config.validate().is_err());
        let config =
            ModelConfig::strict().with_preference(PreferenceRule::Penalize { penalty: i64::MAX });
        assert!(config.validate().is_err());
        assert!(ModelConfig::general().with_slot_hours(i64::MAX).validate().is_err());
    }

    #[test]
    fn test_disabled_checks_skip_validation() {
        let config = ModelConfig::general()
            .with_hours(false)
            .with_slot_hours(-1)
            .with_skill_gate(false)
            .with_gate_threshold(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preference_rule_flags() {
        assert!(!PreferenceRule::Ignore.forbids());
        assert_eq!(PreferenceRule::Forbid.penalty(), None);
        assert_eq!(PreferenceRule::Penalize { penalty: 7 }.penalty(), Some(7));
        assert!(!PreferenceRule::Penalize { penalty: 7 }.forbids());
    }
}
