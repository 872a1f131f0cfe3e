//! Reporting rollups over a date-bounded procedure list.
//!
//! Aggregation happens client-side on the transient copy: a status
//! distribution for the chart, per-doctor performance (top 5), and
//! per-calendar-month trend buckets (last 6).

pub mod csv;

use std::collections::BTreeMap;

use chrono::{Duration, Local};

use crate::grid::render::parse_temporal;
use crate::models::{ApprovalStatus, Procedure};

/// How many doctors the performance panel shows.
pub const TOP_DOCTORS: usize = 5;

/// How many trailing months the trends panel shows.
pub const TREND_MONTHS: usize = 6;

/// Default reporting window: the last 30 days, inclusive.
pub fn default_window() -> (String, String) {
    let today = Local::now().date_naive();
    let from = today - Duration::days(30);
    (
        from.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

/// Restrict a list to an inclusive date window, comparing the report date
/// (execution date, falling back to creation time) as strings.
pub fn window(procedures: &[Procedure], from: &str, to: &str) -> Vec<Procedure> {
    procedures
        .iter()
        .filter(|p| {
            let date = p.report_date();
            !date.is_empty() && date >= from && date <= to
        })
        .cloned()
        .collect()
}

fn rate(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as u32
    }
}

/// Status distribution over the whole window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusRollup {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl StatusRollup {
    fn record(&mut self, status: ApprovalStatus) {
        self.total += 1;
        match status {
            ApprovalStatus::Approved => self.approved += 1,
            ApprovalStatus::RequiresReview => self.pending += 1,
            ApprovalStatus::Rejected => self.rejected += 1,
            ApprovalStatus::Unknown => {}
        }
    }

    /// Rounded percentage of the total.
    pub fn percent(&self, count: usize) -> u32 {
        rate(count, self.total)
    }
}

pub fn status_rollup(procedures: &[Procedure]) -> StatusRollup {
    let mut rollup = StatusRollup::default();
    for p in procedures {
        rollup.record(p.status());
    }
    rollup
}

/// One doctor's tallies, with a derived approval rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorStats {
    pub name: String,
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    pub approval_rate: u32,
}

/// Per-doctor rollup, sorted by total descending, top 5. Records without a
/// doctor name are left out.
pub fn doctor_performance(procedures: &[Procedure]) -> Vec<DoctorStats> {
    let mut by_doctor: BTreeMap<&str, StatusRollup> = BTreeMap::new();
    for p in procedures {
        if p.doctor_name.is_empty() {
            continue;
        }
        by_doctor
            .entry(p.doctor_name.as_str())
            .or_default()
            .record(p.status());
    }

    let mut doctors: Vec<DoctorStats> = by_doctor
        .into_iter()
        .map(|(name, rollup)| DoctorStats {
            name: name.to_string(),
            total: rollup.total,
            approved: rollup.approved,
            pending: rollup.pending,
            rejected: rollup.rejected,
            approval_rate: rate(rollup.approved, rollup.total),
        })
        .collect();

    doctors.sort_by(|a, b| b.total.cmp(&a.total));
    doctors.truncate(TOP_DOCTORS);
    doctors
}

/// One calendar month's tallies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// Bucket key, `YYYY-MM`.
    pub month: String,
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

/// Per-calendar-month rollup, chronological, last 6 months. Records whose
/// report date cannot be parsed are skipped.
pub fn monthly_trends(procedures: &[Procedure]) -> Vec<MonthBucket> {
    let mut by_month: BTreeMap<String, StatusRollup> = BTreeMap::new();
    for p in procedures {
        let Some(dt) = parse_temporal(p.report_date()) else {
            continue;
        };
        by_month
            .entry(dt.format("%Y-%m").to_string())
            .or_default()
            .record(p.status());
    }

    let buckets: Vec<MonthBucket> = by_month
        .into_iter()
        .map(|(month, rollup)| MonthBucket {
            month,
            total: rollup.total,
            approved: rollup.approved,
            pending: rollup.pending,
            rejected: rollup.rejected,
        })
        .collect();

    let skip = buckets.len().saturating_sub(TREND_MONTHS);
    buckets.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{LABEL_APPROVED, LABEL_REJECTED, LABEL_REQUIRES_REVIEW};
    use crate::models::EvaluationResult;

    fn record(doctor: &str, date: &str, label: Option<&str>) -> Procedure {
        Procedure {
            doctor_name: doctor.to_string(),
            execution_date: date.to_string(),
            evaluation_result: label.map(|l| EvaluationResult {
                approval_status: l.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn window_is_inclusive_on_both_bounds() {
        let set = vec![
            record("א", "2025-05-01", None),
            record("ב", "2025-05-15", None),
            record("ג", "2025-05-31", None),
            record("ד", "2025-06-01", None),
        ];
        let windowed = window(&set, "2025-05-01", "2025-05-31");
        assert_eq!(windowed.len(), 3);
    }

    #[test]
    fn status_rollup_counts_and_percentages() {
        let set = vec![
            record("א", "2025-05-01", Some(LABEL_APPROVED)),
            record("א", "2025-05-02", Some(LABEL_APPROVED)),
            record("א", "2025-05-03", Some(LABEL_REQUIRES_REVIEW)),
            record("א", "2025-05-04", Some(LABEL_REJECTED)),
            record("א", "2025-05-05", None),
        ];
        let rollup = status_rollup(&set);
        assert_eq!(rollup.total, 5);
        assert_eq!(rollup.approved, 2);
        assert_eq!(rollup.pending, 1);
        assert_eq!(rollup.rejected, 1);
        assert_eq!(rollup.percent(rollup.approved), 40);
    }

    #[test]
    fn doctor_performance_sorts_by_total_and_caps_at_five() {
        let mut set = Vec::new();
        for (doctor, n) in [("א", 1), ("ב", 2), ("ג", 3), ("ד", 4), ("ה", 5), ("ו", 6)] {
            for i in 0..n {
                set.push(record(doctor, &format!("2025-05-{:02}", i + 1), Some(LABEL_APPROVED)));
            }
        }
        set.push(record("", "2025-05-01", Some(LABEL_APPROVED)));

        let doctors = doctor_performance(&set);
        assert_eq!(doctors.len(), TOP_DOCTORS);
        assert_eq!(doctors[0].name, "ו");
        assert_eq!(doctors[0].total, 6);
        assert!(doctors.iter().all(|d| !d.name.is_empty()));
        let totals: Vec<usize> = doctors.iter().map(|d| d.total).collect();
        assert_eq!(totals, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn approval_rate_is_rounded() {
        let set = vec![
            record("כהן", "2025-05-01", Some(LABEL_APPROVED)),
            record("כהן", "2025-05-02", Some(LABEL_APPROVED)),
            record("כהן", "2025-05-03", Some(LABEL_REJECTED)),
        ];
        let doctors = doctor_performance(&set);
        // 2/3 → 66.67 → 67
        assert_eq!(doctors[0].approval_rate, 67);
    }

    #[test]
    fn monthly_trends_buckets_three_months_correctly() {
        let set = vec![
            record("א", "2025-03-10", Some(LABEL_APPROVED)),
            record("א", "2025-03-20", Some(LABEL_REJECTED)),
            record("א", "2025-04-05", Some(LABEL_REQUIRES_REVIEW)),
            record("א", "2025-05-01", Some(LABEL_APPROVED)),
        ];
        let buckets = monthly_trends(&set);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].month, "2025-03");
        assert_eq!(buckets[0].approved, 1);
        assert_eq!(buckets[0].rejected, 1);
        assert_eq!(buckets[1].month, "2025-04");
        assert_eq!(buckets[1].pending, 1);
        assert_eq!(buckets[2].month, "2025-05");
        assert_eq!(buckets[2].approved, 1);
    }

    #[test]
    fn monthly_trends_keeps_only_last_six_months() {
        let set: Vec<Procedure> = (1..=8)
            .map(|m| record("א", &format!("2025-{m:02}-10"), Some(LABEL_APPROVED)))
            .collect();
        let buckets = monthly_trends(&set);
        assert_eq!(buckets.len(), TREND_MONTHS);
        assert_eq!(buckets.first().unwrap().month, "2025-03");
        assert_eq!(buckets.last().unwrap().month, "2025-08");
    }

    #[test]
    fn monthly_trends_skips_unparsable_dates() {
        let set = vec![
            record("א", "בלתי ניתן לפענוח", Some(LABEL_APPROVED)),
            record("א", "2025-05-01", Some(LABEL_APPROVED)),
        ];
        let buckets = monthly_trends(&set);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 1);
    }

    #[test]
    fn month_bucket_falls_back_to_created_at() {
        let p = Procedure {
            created_at: "2025-02-11T10:00:00".to_string(),
            ..Default::default()
        };
        let buckets = monthly_trends(&[p]);
        assert_eq!(buckets[0].month, "2025-02");
    }
}
