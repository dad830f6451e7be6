//! Sidebar search history owned by the dashboard session

use serde::{Deserialize, Serialize};

pub const SIDEBAR_TITLE: &str = "Starview Model 1.0.0";
pub const TODAY: &str = "Today";
/// Most recent searches kept under "Today"
pub const TODAY_LIMIT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySection {
    pub title: String,
    pub items: Vec<String>,
}

impl HistorySection {
    pub fn new(title: &str, items: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    sections: Vec<HistorySection>,
}

impl SearchHistory {
    pub fn new(sections: Vec<HistorySection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[HistorySection] {
        &self.sections
    }

    /// Sections narrowed to items containing `term` (case-insensitive).
    /// Sections left empty are dropped; a blank term returns everything.
    pub fn filter(&self, term: &str) -> Vec<HistorySection> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.sections.clone();
        }

        self.sections
            .iter()
            .filter_map(|section| {
                let items: Vec<String> = section
                    .items
                    .iter()
                    .filter(|item| item.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                (!items.is_empty()).then(|| HistorySection {
                    title: section.title.clone(),
                    items,
                })
            })
            .collect()
    }

    /// Put `query` at the top of the "Today" section
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        if self.sections.first().map(|s| s.title.as_str()) != Some(TODAY) {
            self.sections.insert(
                0,
                HistorySection {
                    title: TODAY.to_string(),
                    items: Vec::new(),
                },
            );
        }

        let today = &mut self.sections[0].items;
        today.retain(|item| item != query);
        today.insert(0, query.to_string());
        today.truncate(TODAY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn history() -> SearchHistory {
        SearchHistory::new(vec![
            HistorySection::new("Yesterday", &["Via Lagrange, 3", "Via Roma, 56"]),
            HistorySection::new("Last 7 days", &["Via Roma 45", "Via Garibaldi 12"]),
        ])
    }

    #[test]
    fn test_blank_filter_returns_all() {
        assert_eq!(history().filter("  "), history().sections().to_vec());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let result = history().filter("ROMA");
        assert_eq!(
            result,
            vec![
                HistorySection::new("Yesterday", &["Via Roma, 56"]),
                HistorySection::new("Last 7 days", &["Via Roma 45"]),
            ]
        );
    }

    #[test]
    fn test_filter_drops_empty_sections() {
        let result = history().filter("garibaldi");
        assert_eq!(result, vec![HistorySection::new("Last 7 days", &["Via Garibaldi 12"])]);
    }

    #[test]
    fn test_record_creates_today_section() {
        let mut h = history();
        h.record("Via Verdi 76");
        assert_eq!(h.sections()[0], HistorySection::new("Today", &["Via Verdi 76"]));
        assert_eq!(h.sections().len(), 3);
    }

    #[test]
    fn test_record_moves_repeat_to_top() {
        let mut h = history();
        h.record("A");
        h.record("B");
        h.record(" A ");
        assert_eq!(h.sections()[0].items, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_today_keeps_most_recent_searches() {
        let mut h = history();
        for i in 0..25 {
            h.record(&format!("Via Verdi {}", i));
        }
        let today = &h.sections()[0].items;
        assert_eq!(today.len(), TODAY_LIMIT);
        assert_eq!(today[0], "Via Verdi 24");
        assert_eq!(today[TODAY_LIMIT - 1], "Via Verdi 16");
        assert_eq!(h.sections().len(), 3);
    }

    #[test]
    fn test_record_ignores_blank() {
        let mut h = history();
        h.record("   ");
        assert_eq!(h, history());
    }

    proptest! {
        /// Property: filtering keeps only matching items and never invents sections
        #[test]
        fn filter_returns_matching_subset(term in "[a-zA-Z ,]{0,6}") {
            let h = SearchHistory::new(crate::config::DashboardConfig::default().history);
            let needle = term.trim().to_lowercase();
            for section in h.filter(&term) {
                prop_assert!(h.sections().iter().any(|s| s.title == section.title));
                prop_assert!(!section.items.is_empty());
                for item in &section.items {
                    prop_assert!(item.to_lowercase().contains(&needle));
                }
            }
        }
    }
}
