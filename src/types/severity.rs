//! Severity tiers: the four ordinal classes the classifier assigns.

use serde::{Deserialize, Serialize};

/// Ordinal severity tier assigned to an earthquake record.
///
/// Ordering follows the tier order, so `Severity::Low < Severity::VeryHigh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Severity {
    /// Number of tiers (and model output classes).
    pub const COUNT: usize = 4;

    /// All tiers in ordinal order (index == model class index).
    pub const ALL: [Self; Self::COUNT] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Map a model class index to a tier.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Model class index of this tier.
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::VeryHigh => 3,
        }
    }

    /// Human-readable name shown on the page.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    /// Label used by the source dataset's `Gravedad` column.
    pub fn source_label(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::High => "Alta",
            Self::VeryHigh => "Muy Alta",
        }
    }

    /// Chart colour for this tier (cold blue to hot red).
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#2c7fb8",
            Self::Medium => "#41b6c4",
            Self::High => "#fdae61",
            Self::VeryHigh => "#d7191c",
        }
    }

    /// Parse a tier from either the English names or the dataset labels.
    ///
    /// Matching is case-insensitive and tolerant of `_`/`-`/space separators.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();

        match normalized.as_str() {
            "low" | "baja" => Some(Self::Low),
            "medium" | "media" => Some(Self::Medium),
            "high" | "alta" => Some(Self::High),
            "veryhigh" | "muyalta" => Some(Self::VeryHigh),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trips_for_all_tiers() {
        for (i, sev) in Severity::ALL.iter().enumerate() {
            assert_eq!(sev.index(), i);
            assert_eq!(Severity::from_index(i), Some(*sev));
        }
        assert_eq!(Severity::from_index(4), None);
    }

    #[test]
    fn test_from_label_accepts_dataset_labels() {
        assert_eq!(Severity::from_label("Baja"), Some(Severity::Low));
        assert_eq!(Severity::from_label("Muy Alta"), Some(Severity::VeryHigh));
        assert_eq!(Severity::from_label("very_high"), Some(Severity::VeryHigh));
        assert_eq!(Severity::from_label(" MEDIUM "), Some(Severity::Medium));
        assert_eq!(Severity::from_label("extreme"), None);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::VeryHigh);
    }
}
