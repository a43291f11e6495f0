use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket for repositories GitHub could not detect a language for
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Contribution counts per repository language
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LanguageTally {
    counts: BTreeMap<String, u64>,
}

/// One row of [`LanguageTally::ranked`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

impl LanguageTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one contribution. `None` and blank labels land in [`UNKNOWN_LANGUAGE`].
    pub fn increment(&mut self, language: Option<&str>) {
        let label = match language.map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => UNKNOWN_LANGUAGE,
        };
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, language: &str) -> u64 {
        self.counts.get(language).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Share of all contributions made in `language`, from 0 to 100.
    ///
    /// An empty tally yields 0 for every label.
    pub fn percentage(&self, language: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(language) as f64 / total as f64 * 100.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Languages ordered by count (highest first), ties broken by name.
    pub fn ranked(&self) -> Vec<LanguageShare> {
        let mut shares: Vec<LanguageShare> = self
            .iter()
            .map(|(name, count)| LanguageShare {
                name: name.to_string(),
                count,
                percentage: self.percentage(name),
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_percentage() {
        let mut tally = LanguageTally::new();
        tally.increment(Some("Go"));
        tally.increment(Some("Go"));
        tally.increment(Some("Rust"));

        assert_eq!(tally.total(), 3);
        assert!(approx(tally.percentage("Go"), 66.67));
        assert!(approx(tally.percentage("Rust"), 33.33));
        assert_eq!(tally.percentage("Python"), 0.0);
    }

    #[test]
    fn test_empty_tally_percentage_is_zero() {
        let tally = LanguageTally::new();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.percentage("Go"), 0.0);
        assert!(tally.ranked().is_empty());
    }

    #[test]
    fn test_unknown_language_bucket() {
        let mut tally = LanguageTally::new();
        tally.increment(None);
        tally.increment(Some("  "));
        tally.increment(Some("Rust"));

        assert_eq!(tally.count(UNKNOWN_LANGUAGE), 2);
        assert_eq!(tally.count("Rust"), 1);
    }

    #[test]
    fn test_ranked_orders_by_count_then_name() {
        let mut tally = LanguageTally::new();
        for language in ["Rust", "Go", "Go", "C", "Rust"] {
            tally.increment(Some(language));
        }

        let names: Vec<String> = tally.ranked().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Go", "Rust", "C"]);
        assert!(approx(tally.ranked()[2].percentage, 20.0));
    }
}
