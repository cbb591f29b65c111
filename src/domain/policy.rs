//! Severity-derived policy table.
//!
//! Every number or label that depends on incident severity lives here so the
//! prompt builder, the fallback SOP, and the export engine all agree.

use crate::domain::incident::Severity;

/// Risk classification printed in the document header and risk section.
pub fn risk_label(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "CRITICAL",
        Severity::Medium => "MODERATE",
        Severity::Low => "LOW",
    }
}

/// Target time-to-resolution quoted in the performance metrics section.
pub fn resolution_target(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "< 30 minutes",
        Severity::Medium => "< 60 minutes",
        Severity::Low => "< 120 minutes",
    }
}

/// Availability commitment quoted in the performance metrics section.
pub fn availability_target(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "99.9%",
        Severity::Medium => "99.5%",
        Severity::Low => "99.0%",
    }
}

/// How many steps each SOP list should carry for this severity. The
/// generation prompt asks for this many and the fallback builder is padded
/// or trimmed against the same number.
pub fn step_quota(severity: Severity) -> usize {
    match severity {
        Severity::High => 5,
        Severity::Medium => 4,
        Severity::Low => 3,
    }
}

/// Accent color for banners and severity badges, as `#rrggbb`.
pub fn accent_color(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "#dc2626",
        Severity::Medium => "#d97706",
        Severity::Low => "#16a34a",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_matches_severity_tiers() {
        assert_eq!(risk_label(Severity::High), "CRITICAL");
        assert_eq!(resolution_target(Severity::High), "< 30 minutes");
        assert_eq!(availability_target(Severity::High), "99.9%");

        assert_eq!(risk_label(Severity::Low), "LOW");
        assert_eq!(resolution_target(Severity::Low), "< 120 minutes");
        assert_eq!(availability_target(Severity::Low), "99.0%");
    }

    #[test]
    fn step_quota_shrinks_with_severity() {
        assert_eq!(step_quota(Severity::High), 5);
        assert_eq!(step_quota(Severity::Medium), 4);
        assert_eq!(step_quota(Severity::Low), 3);
    }

    #[test]
    fn accent_colors_are_hex_triplets() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            let color = accent_color(severity);
            assert!(color.starts_with('#') && color.len() == 7);
        }
    }
}
