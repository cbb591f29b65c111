//! Sample analytics dashboard.
//!
//! All numbers are canned. Switching the time range multiplies the counts
//! and leaves rates, durations, and the recent feed untouched; nothing is
//! computed from real traffic.

use crate::domain::error::DomainError;
use crate::domain::incident::{IncidentCategory, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Quarter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Day => "Last 24 hours",
            TimeRange::Week => "Last 7 days",
            TimeRange::Month => "Last 30 days",
            TimeRange::Quarter => "Last 90 days",
        }
    }

    fn multiplier(self) -> u32 {
        match self {
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Day
    }
}

impl TryFrom<&str> for TimeRange {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "24h" => Ok(TimeRange::Day),
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            "90d" => Ok(TimeRange::Quarter),
            other => Err(DomainError::validation(format!(
                "unknown dashboard range: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardOverview {
    pub range: TimeRange,
    pub total_incidents: u32,
    pub resolved_incidents: u32,
    pub mean_resolution_minutes: u32,
    pub availability_percent: f64,
    pub severity_breakdown: Vec<SeveritySlice>,
    pub category_breakdown: Vec<CategorySlice>,
    pub recent_incidents: Vec<RecentIncident>,
}

#[derive(Debug, Clone)]
pub struct SeveritySlice {
    pub severity: Severity,
    pub count: u32,
    pub percent: u8,
}

#[derive(Debug, Clone)]
pub struct CategorySlice {
    pub category: IncidentCategory,
    pub count: u32,
    pub percent: u8,
}

#[derive(Debug, Clone)]
pub struct RecentIncident {
    pub title: &'static str,
    pub category: IncidentCategory,
    pub severity: Severity,
    pub minutes_ago: u32,
    pub status: &'static str,
}

impl RecentIncident {
    pub fn age_label(&self) -> String {
        if self.minutes_ago < 60 {
            format!("{} minutes ago", self.minutes_ago)
        } else {
            format!("{} hours ago", self.minutes_ago / 60)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardService;

impl DashboardService {
    pub fn overview(&self, range: Option<&str>) -> Result<DashboardOverview, DomainError> {
        let range = match range {
            Some(token) => TimeRange::try_from(token)?,
            None => TimeRange::default(),
        };
        Ok(build_overview(range))
    }
}

// Baseline counts describe one day; percentages are fixed so the charts
// keep their shape across ranges.
const SEVERITY_BASELINE: [(Severity, u32, u8); 3] = [
    (Severity::High, 3, 25),
    (Severity::Medium, 5, 42),
    (Severity::Low, 4, 33),
];

const CATEGORY_BASELINE: [(IncidentCategory, u32, u8); 5] = [
    (IncidentCategory::ServerDown, 4, 33),
    (IncidentCategory::Performance, 3, 25),
    (IncidentCategory::Database, 2, 17),
    (IncidentCategory::Network, 2, 17),
    (IncidentCategory::Security, 1, 8),
];

const BASELINE_TOTAL: u32 = 12;
const BASELINE_RESOLVED: u32 = 11;

fn build_overview(range: TimeRange) -> DashboardOverview {
    let factor = range.multiplier();
    DashboardOverview {
        range,
        total_incidents: BASELINE_TOTAL * factor,
        resolved_incidents: BASELINE_RESOLVED * factor,
        mean_resolution_minutes: 42,
        availability_percent: 99.92,
        severity_breakdown: SEVERITY_BASELINE
            .iter()
            .map(|&(severity, count, percent)| SeveritySlice {
                severity,
                count: count * factor,
                percent,
            })
            .collect(),
        category_breakdown: CATEGORY_BASELINE
            .iter()
            .map(|&(category, count, percent)| CategorySlice {
                category,
                count: count * factor,
                percent,
            })
            .collect(),
        recent_incidents: recent_feed(),
    }
}

fn recent_feed() -> Vec<RecentIncident> {
    vec![
        RecentIncident {
            title: "Checkout API returning 502s",
            category: IncidentCategory::ServerDown,
            severity: Severity::High,
            minutes_ago: 38,
            status: "Resolved",
        },
        RecentIncident {
            title: "Replica lag on orders database",
            category: IncidentCategory::Database,
            severity: Severity::Medium,
            minutes_ago: 190,
            status: "Monitoring",
        },
        RecentIncident {
            title: "Elevated p99 latency on search",
            category: IncidentCategory::Performance,
            severity: Severity::Medium,
            minutes_ago: 320,
            status: "Resolved",
        },
        RecentIncident {
            title: "VPN tunnel flapping between regions",
            category: IncidentCategory::Network,
            severity: Severity::Low,
            minutes_ago: 510,
            status: "Resolved",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_is_the_last_day() {
        let overview = DashboardService.overview(None).expect("overview");
        assert_eq!(overview.range, TimeRange::Day);
        assert_eq!(overview.total_incidents, 12);

        let by_severity: u32 = overview.severity_breakdown.iter().map(|s| s.count).sum();
        let by_category: u32 = overview.category_breakdown.iter().map(|c| c.count).sum();
        assert_eq!(by_severity, overview.total_incidents);
        assert_eq!(by_category, overview.total_incidents);
    }

    #[test]
    fn counts_scale_with_the_range_but_rates_do_not() {
        let day = DashboardService.overview(Some("24h")).expect("24h");
        let week = DashboardService.overview(Some("7d")).expect("7d");
        let quarter = DashboardService.overview(Some("90d")).expect("90d");

        assert_eq!(week.total_incidents, day.total_incidents * 7);
        assert_eq!(quarter.resolved_incidents, day.resolved_incidents * 90);
        assert_eq!(week.mean_resolution_minutes, day.mean_resolution_minutes);
        assert_eq!(week.availability_percent, day.availability_percent);
        assert_eq!(
            week.severity_breakdown[0].percent,
            day.severity_breakdown[0].percent
        );
    }

    #[test]
    fn every_published_token_round_trips() {
        for range in TimeRange::ALL {
            assert_eq!(TimeRange::try_from(range.as_str()).unwrap(), range);
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let err = DashboardService.overview(Some("1y")).expect_err("must fail");
        assert!(err.to_string().contains("unknown dashboard range"));
    }

    #[test]
    fn age_labels_switch_units_at_an_hour() {
        let feed = recent_feed();
        assert_eq!(feed[0].age_label(), "38 minutes ago");
        assert_eq!(feed[1].age_label(), "3 hours ago");
    }
}
