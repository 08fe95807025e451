//! Recommended tasks: a priority per task derived from the clock, time-range
//! and priority filters, and the summary counters shown above the list.
//!
//! Task dates are read as midnight of their day. `now` is always passed in.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::model::Task;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Days before a start that still count as high / medium priority.
const HIGH_LEAD_DAYS: i64 = 2;
const MEDIUM_LEAD_DAYS: i64 = 7;
/// Days before the end that count as "due soon".
const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Which dates a recommended task must touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    Today,
    Tomorrow,
    /// Sunday through Saturday around `now`.
    ThisWeek,
    ThisMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Today,
        TimeRange::Tomorrow,
        TimeRange::ThisWeek,
        TimeRange::ThisMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Today => "Today",
            TimeRange::Tomorrow => "Tomorrow",
            TimeRange::ThisWeek => "This week",
            TimeRange::ThisMonth => "This month",
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            TimeRange::Today => date == today,
            TimeRange::Tomorrow => today.succ_opt() == Some(date),
            TimeRange::ThisWeek => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                let Some(first) = today.checked_sub_signed(Duration::days(back)) else {
                    return false;
                };
                let last = first.checked_add_signed(Duration::days(6)).unwrap_or(NaiveDate::MAX);
                first <= date && date <= last
            }
            TimeRange::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        }
    }

    /// A task matches when its start or its end falls in the range.
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        self.contains(task.start, today) || self.contains(task.end, today)
    }
}

/// Filters applied to the recommendation list. `priority: None` keeps all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecommendFilter {
    pub range: TimeRange,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation<'a> {
    pub task: &'a Task,
    pub priority: Priority,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Whole days from `now` to `at`, rounded up.
fn days_until(at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let ms = (at - now).num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

/// Priority of `task` at `now`.
///
/// A started task is ranked by the share of its duration still left: under a
/// quarter is high, under half is medium. A task that has not started yet is
/// ranked by the days until it starts.
pub fn priority(task: &Task, now: NaiveDateTime) -> Priority {
    let start = midnight(task.start);
    let end = midnight(task.end);

    if now > start {
        let total = (end - start).num_milliseconds();
        let remaining = (end - now).num_milliseconds();
        return if remaining.saturating_mul(4) < total {
            Priority::High
        } else if remaining.saturating_mul(2) < total {
            Priority::Medium
        } else {
            Priority::Low
        };
    }

    match days_until(start, now) {
        d if d <= HIGH_LEAD_DAYS => Priority::High,
        d if d <= MEDIUM_LEAD_DAYS => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Tasks matching `filter`, highest priority first, then by start date.
pub fn recommend<'a>(
    tasks: &'a [Task],
    filter: &RecommendFilter,
    now: NaiveDateTime,
) -> Vec<Recommendation<'a>> {
    let today = now.date();
    let mut picked: Vec<_> = tasks
        .iter()
        .filter(|task| filter.range.matches(task, today))
        .map(|task| Recommendation {
            task,
            priority: priority(task, now),
        })
        .filter(|rec| filter.priority.map_or(true, |p| rec.priority == p))
        .collect();
    picked.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.task.start.cmp(&b.task.start))
    });
    picked
}

/// Counters shown above the recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecommendStats {
    /// Tasks starting or ending today.
    pub today: usize,
    /// Tasks whose end is one to three days away.
    pub due_soon: usize,
    /// Tasks whose end is already past.
    pub completed: usize,
}

impl RecommendStats {
    pub fn collect(tasks: &[Task], now: NaiveDateTime) -> Self {
        let today = now.date();
        let mut stats = Self::default();
        for task in tasks {
            if TimeRange::Today.matches(task, today) {
                stats.today += 1;
            }
            let end = midnight(task.end);
            if (1..=DUE_SOON_DAYS).contains(&days_until(end, now)) {
                stats.due_soon += 1;
            }
            if end < now {
                stats.completed += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task::with_id(id, id, start, end).unwrap()
    }

    #[test]
    fn started_tasks_rank_by_time_left() {
        // Ten days, March 1 to March 11.
        let t = task("a", date(2024, 3, 1), date(2024, 3, 11));
        assert_eq!(priority(&t, at(2024, 3, 2, 0)), Priority::Low);
        // Exactly half left is not yet medium.
        assert_eq!(priority(&t, at(2024, 3, 6, 0)), Priority::Low);
        assert_eq!(priority(&t, at(2024, 3, 6, 1)), Priority::Medium);
        // Exactly a quarter left is still medium.
        assert_eq!(priority(&t, at(2024, 3, 8, 12)), Priority::Medium);
        assert_eq!(priority(&t, at(2024, 3, 8, 13)), Priority::High);
        assert_eq!(priority(&t, at(2024, 3, 20, 0)), Priority::High);
    }

    #[test]
    fn upcoming_tasks_rank_by_lead_time() {
        let now = at(2024, 3, 10, 9);
        let starting = |d| task("a", date(2024, 3, d), date(2024, 3, 30));
        // Starts in 15 hours, rounded up to one day.
        assert_eq!(priority(&starting(11), now), Priority::High);
        assert_eq!(priority(&starting(12), now), Priority::High);
        assert_eq!(priority(&starting(13), now), Priority::Medium);
        assert_eq!(priority(&starting(17), now), Priority::Medium);
        assert_eq!(priority(&starting(18), now), Priority::Low);
    }

    #[test]
    fn task_starting_right_now_is_not_started_yet() {
        let t = task("a", date(2024, 3, 10), date(2024, 3, 20));
        assert_eq!(priority(&t, at(2024, 3, 10, 0)), Priority::High);
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        // Wednesday.
        let today = date(2024, 3, 13);
        assert!(TimeRange::ThisWeek.contains(date(2024, 3, 10), today));
        assert!(TimeRange::ThisWeek.contains(date(2024, 3, 16), today));
        assert!(!TimeRange::ThisWeek.contains(date(2024, 3, 9), today));
        assert!(!TimeRange::ThisWeek.contains(date(2024, 3, 17), today));
    }

    #[test]
    fn ranges_match_on_either_end() {
        let today = date(2024, 3, 13);
        let spans_today = task("a", date(2024, 3, 1), date(2024, 3, 20));
        let ends_tomorrow = task("b", date(2024, 3, 1), date(2024, 3, 14));
        let next_month = task("c", date(2024, 4, 1), date(2024, 4, 3));

        // A task running through today without starting or ending there is not "today".
        assert!(!TimeRange::Today.matches(&spans_today, today));
        assert!(TimeRange::Tomorrow.matches(&ends_tomorrow, today));
        assert!(TimeRange::ThisMonth.matches(&spans_today, today));
        assert!(!TimeRange::ThisMonth.matches(&next_month, today));
        assert!(TimeRange::Tomorrow.contains(date(2025, 1, 1), date(2024, 12, 31)));
    }

    #[test]
    fn list_is_filtered_and_sorted() {
        let now = at(2024, 3, 13, 12);
        let tasks = vec![
            task("later", date(2024, 3, 28), date(2024, 3, 30)),
            task("soon", date(2024, 3, 14), date(2024, 3, 20)),
            task("almost-done", date(2024, 3, 2), date(2024, 3, 14)),
            task("sooner", date(2024, 3, 14), date(2024, 3, 15)),
            task("april", date(2024, 4, 2), date(2024, 4, 5)),
        ];

        let month = RecommendFilter {
            range: TimeRange::ThisMonth,
            priority: None,
        };
        let ids: Vec<_> = recommend(&tasks, &month, now)
            .iter()
            .map(|r| r.task.id.as_str())
            .collect();
        assert_eq!(ids, ["almost-done", "soon", "sooner", "later"]);

        let high = RecommendFilter {
            range: TimeRange::ThisMonth,
            priority: Some(Priority::High),
        };
        let recs = recommend(&tasks, &high, now);
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.priority == Priority::High));

        let low = RecommendFilter {
            range: TimeRange::ThisMonth,
            priority: Some(Priority::Low),
        };
        let recs = recommend(&tasks, &low, now);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].task.id, "later");
    }

    #[test]
    fn counters() {
        let now = at(2024, 3, 13, 12);
        let tasks = vec![
            // Starts today.
            task("a", date(2024, 3, 13), date(2024, 3, 25)),
            // Ends in half a day, rounded up to one.
            task("b", date(2024, 3, 1), date(2024, 3, 14)),
            // Ends in two and a half days, rounded up to three.
            task("c", date(2024, 3, 1), date(2024, 3, 16)),
            // Rounded up to four: not due soon.
            task("d", date(2024, 3, 1), date(2024, 3, 17)),
            // Ended at midnight this morning.
            task("e", date(2024, 3, 1), date(2024, 3, 13)),
            task("f", date(2024, 2, 1), date(2024, 2, 10)),
        ];
        let stats = RecommendStats::collect(&tasks, now);
        assert_eq!(
            stats,
            RecommendStats {
                today: 2,
                due_soon: 2,
                completed: 2,
            }
        );
        assert_eq!(RecommendStats::collect(&[], now), RecommendStats::default());
    }
}
