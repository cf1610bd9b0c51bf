//! Visitor statistics (`analytics`)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVisitors {
    /// Weekday label, `Mon` .. `Sun`
    pub name: String,
    pub visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVisitors {
    pub name: String,
    pub visitors: u64,
}

/// Share of traffic per source, in percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub name: String,
    pub value: u64,
}

/// Pages whose views are counted
pub const TRACKED_PAGES: &[&str] = &[
    "Home",
    "Portfolio",
    "CV",
    "Blog",
    "Contact",
    "Applications",
    "Training",
    "Achievements",
    "Press",
    "Literature",
    "Resources",
];

/// Canonical name of a tracked page, matched case-insensitively
pub fn tracked_page(name: &str) -> Option<&'static str> {
    TRACKED_PAGES
        .iter()
        .copied()
        .find(|page| page.eq_ignore_ascii_case(name.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViews {
    pub name: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub daily: Vec<DailyVisitors>,
    pub monthly: Vec<MonthlyVisitors>,
    pub sources: Vec<TrafficSource>,
    pub pages: Vec<PageViews>,
}

impl VisitorStats {
    /// Add one view to the named page, appending it when unknown
    pub fn record_page_view(&mut self, page: &str) -> u64 {
        match self.pages.iter_mut().find(|p| p.name == page) {
            Some(entry) => {
                entry.views += 1;
                entry.views
            }
            None => {
                self.pages.push(PageViews {
                    name: page.to_string(),
                    views: 1,
                });
                1
            }
        }
    }

    pub fn total_page_views(&self) -> u64 {
        self.pages.iter().map(|p| p.views).sum()
    }

    pub fn weekly_visitors(&self) -> u64 {
        self.daily.iter().map(|d| d.visitors).sum()
    }
}

impl Default for VisitorStats {
    fn default() -> Self {
        super::seed::visitor_stats()
    }
}
