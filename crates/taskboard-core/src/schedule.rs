//! Roadmap scheduling: spread an ordered list of tasks across calendar days
//! so that no day's estimated hours exceed the daily capacity.
//!
//! Greedy bin-packing by arrival order. Task order encodes a dependency and
//! presentation sequence, so the algorithm never reorders tasks to pack days
//! tighter, and it never splits a task across days.

use chrono::{DateTime, Days, Local, LocalResult, TimeZone, Utc};
use tracing::debug;

use taskboard_storage::NewTask;

use crate::{Error, Result};

/// Estimated hours assumed for a task that has none (or a non-positive one).
pub const FALLBACK_ESTIMATED_HOURS: f64 = 1.0;

/// Schedule tasks starting today in the local time zone.
pub fn schedule_tasks(tasks: Vec<NewTask>, daily_capacity_hours: f64) -> Result<Vec<NewTask>> {
    schedule_tasks_from(tasks, daily_capacity_hours, Local::now())
}

/// Schedule tasks relative to an explicit start instant.
///
/// Tasks are stable-sorted by `order_number` and assigned deadlines at
/// 23:59:59 of their day in `start`'s time zone. A day that holds no hours
/// yet always accepts the next task, so a single task larger than the
/// capacity occupies its day alone rather than looping forever.
pub fn schedule_tasks_from<Tz: TimeZone>(
    mut tasks: Vec<NewTask>,
    daily_capacity_hours: f64,
    start: DateTime<Tz>,
) -> Result<Vec<NewTask>> {
    if !daily_capacity_hours.is_finite() || daily_capacity_hours <= 0.0 {
        return Err(Error::BadRequest(format!(
            "daily capacity must be a positive number of hours, got {daily_capacity_hours}"
        )));
    }

    tasks.sort_by_key(|t| t.order_number);

    let mut current_day: u64 = 0;
    let mut current_day_hours = 0.0_f64;

    for task in &mut tasks {
        let estimated = task
            .estimated_hours
            .filter(|hours| *hours > 0.0)
            .unwrap_or(FALLBACK_ESTIMATED_HOURS);
        task.estimated_hours = Some(estimated);

        if current_day_hours > 0.0 && current_day_hours + estimated > daily_capacity_hours {
            current_day += 1;
            current_day_hours = 0.0;
        }
        current_day_hours += estimated;

        task.deadline = Some(end_of_day(&start, current_day));
    }

    debug!(
        tasks = tasks.len(),
        days = if tasks.is_empty() { 0 } else { current_day + 1 },
        "roadmap schedule computed"
    );

    Ok(tasks)
}

/// 23:59:59 of `start + days_ahead` days, in `start`'s time zone.
fn end_of_day<Tz: TimeZone>(start: &DateTime<Tz>, days_ahead: u64) -> DateTime<Utc> {
    let date = start.date_naive() + Days::new(days_ahead);
    let naive = date.and_hms_opt(23, 59, 59).expect("valid wall-clock time");
    match start.timezone().from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // fall backward: the earlier of the two readings
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // spring forward: the wall-clock time does not exist in this zone
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(order: i32, hours: Option<f64>) -> NewTask {
        NewTask {
            title: format!("task-{order}"),
            order_number: order,
            estimated_hours: hours,
            ..NewTask::default()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    fn day_end(days_ahead: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10 + days_ahead, 23, 59, 59)
            .unwrap()
    }

    #[test]
    fn worked_scenario_capacity_eight() {
        let tasks = vec![
            task(1, Some(3.0)),
            task(2, Some(4.0)),
            task(3, Some(3.0)),
            task(4, Some(5.0)),
            task(5, Some(1.0)),
        ];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();

        let deadlines: Vec<_> = scheduled.iter().map(|t| t.deadline.unwrap()).collect();
        assert_eq!(
            deadlines,
            vec![day_end(0), day_end(0), day_end(1), day_end(1), day_end(2)]
        );
    }

    #[test]
    fn empty_input_empty_output() {
        let scheduled = schedule_tasks_from(vec![], 8.0, start()).unwrap();
        assert!(scheduled.is_empty());
    }

    #[test]
    fn preserves_order_number_sequence() {
        let tasks = vec![task(5, Some(1.0)), task(1, Some(1.0)), task(3, Some(1.0))];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();
        let orders: Vec<i32> = scheduled.iter().map(|t| t.order_number).collect();
        assert_eq!(orders, vec![1, 3, 5]);
    }

    #[test]
    fn stable_sort_keeps_input_order_on_ties() {
        let mut first = task(1, Some(1.0));
        first.title = "first".to_string();
        let mut second = task(1, Some(1.0));
        second.title = "second".to_string();

        let scheduled = schedule_tasks_from(vec![first, second], 8.0, start()).unwrap();
        assert_eq!(scheduled[0].title, "first");
        assert_eq!(scheduled[1].title, "second");
    }

    #[test]
    fn missing_or_zero_hours_default_to_one() {
        let tasks = vec![task(1, None), task(2, Some(0.0)), task(3, Some(-2.0))];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();
        for t in &scheduled {
            assert_eq!(t.estimated_hours, Some(1.0));
        }
        // 3 hours total fits a single day
        assert!(scheduled.iter().all(|t| t.deadline == Some(day_end(0))));
    }

    #[test]
    fn oversized_task_occupies_day_alone() {
        let tasks = vec![task(1, Some(2.0)), task(2, Some(12.0)), task(3, Some(2.0))];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();
        let deadlines: Vec<_> = scheduled.iter().map(|t| t.deadline.unwrap()).collect();
        // the 12h task doesn't fit day 0, moves to day 1 and legally exceeds
        // the capacity there; the next task starts day 2
        assert_eq!(deadlines, vec![day_end(0), day_end(1), day_end(2)]);
    }

    #[test]
    fn oversized_first_task_stays_on_day_zero() {
        let tasks = vec![task(1, Some(20.0)), task(2, Some(1.0))];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();
        assert_eq!(scheduled[0].deadline, Some(day_end(0)));
        assert_eq!(scheduled[1].deadline, Some(day_end(1)));
    }

    #[test]
    fn exact_fit_stays_on_same_day() {
        let tasks = vec![task(1, Some(4.0)), task(2, Some(4.0))];
        let scheduled = schedule_tasks_from(tasks, 8.0, start()).unwrap();
        assert_eq!(scheduled[0].deadline, scheduled[1].deadline);
    }

    #[test]
    fn non_positive_capacity_rejected() {
        assert!(matches!(
            schedule_tasks_from(vec![task(1, Some(1.0))], 0.0, start()),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            schedule_tasks_from(vec![task(1, Some(1.0))], -4.0, start()),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            schedule_tasks_from(vec![task(1, Some(1.0))], f64::NAN, start()),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn per_day_totals_respect_capacity() {
        use std::collections::BTreeMap;

        let capacity = 6.0;
        let hours = [2.5, 3.0, 1.0, 6.0, 0.5, 7.5, 2.0, 2.0, 2.0, 2.0];
        let tasks: Vec<NewTask> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| task(i as i32, Some(*h)))
            .collect();

        let scheduled = schedule_tasks_from(tasks, capacity, start()).unwrap();
        assert_eq!(scheduled.len(), hours.len());

        let mut per_day: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
        for t in &scheduled {
            let entry = per_day.entry(t.deadline.unwrap()).or_insert((0.0, 0));
            entry.0 += t.estimated_hours.unwrap();
            entry.1 += 1;
        }
        for (total, count) in per_day.values() {
            // a day may exceed capacity only when a single oversized task
            // occupies it alone
            assert!(*total <= capacity || *count == 1);
        }
    }
}
