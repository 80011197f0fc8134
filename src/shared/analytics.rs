//! Schedule analytics: S-curve, status histogram, delay totals and the next
//! upcoming critical activity.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::shared::tasks::{TaskNode, tree_ops};

/// Default label format for curve dates (`05-Jan-24`).
pub const DEFAULT_DATE_LABEL_FORMAT: &str = "%d-%b-%y";

/// One day on the S-curve. Percentages are cumulative and rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub planned: f64,
    pub actual: f64,
}

/// Planned-vs-actual cumulative completion by day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SCurve {
    pub points: Vec<CurvePoint>,
}

impl SCurve {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&CurvePoint> {
        self.points.last()
    }

    /// Column-oriented transport form with formatted date labels.
    pub fn to_data(&self, label_format: &str) -> SCurveData {
        SCurveData {
            dates: self
                .points
                .iter()
                .map(|p| p.date.format(label_format).to_string())
                .collect(),
            planned_progress: self.points.iter().map(|p| p.planned).collect(),
            actual_progress: self.points.iter().map(|p| p.actual).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SCurveData {
    pub dates: Vec<String>,
    pub planned_progress: Vec<f64>,
    pub actual_progress: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DelayTotals {
    pub weather: u64,
    pub contractor: u64,
    pub client: u64,
}

impl DelayTotals {
    pub fn total(&self) -> u64 {
        self.weather + self.contractor + self.client
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalActivity {
    pub wbs: String,
    pub task_name: Option<String>,
    pub planned_start_date: NaiveDate,
}

/// Everything the reporting view needs, computed from one forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub status_counts: BTreeMap<String, usize>,
    pub total_delays: DelayTotals,
    pub s_curve: SCurve,
    pub overall_actual_progress: u8,
    pub next_critical_activity: Option<CriticalActivity>,
}

/// JSON shape handed to chart front-ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub status_counts: BTreeMap<String, usize>,
    pub total_delays: DelayTotals,
    pub s_curve_data: SCurveData,
    pub overall_actual_progress: u8,
    pub next_critical_activity: Option<CriticalActivity>,
}

impl ProgressReport {
    pub fn payload(&self, label_format: &str) -> ReportPayload {
        ReportPayload {
            status_counts: self.status_counts.clone(),
            total_delays: self.total_delays,
            s_curve_data: self.s_curve.to_data(label_format),
            overall_actual_progress: self.overall_actual_progress,
            next_critical_activity: self.next_critical_activity.clone(),
        }
    }
}

/// Analyze an aggregated forest as of `today`.
pub fn analyze(forest: &[TaskNode], today: NaiveDate) -> ProgressReport {
    let all = tree_ops::flatten(forest);

    ProgressReport {
        status_counts: status_histogram(&all),
        total_delays: delay_totals(&all),
        s_curve: s_curve(forest, today),
        overall_actual_progress: forest.first().map_or(0, |root| root.progress),
        next_critical_activity: next_critical_activity(&all, today),
    }
}

pub fn status_histogram(nodes: &[&TaskNode]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for node in nodes {
        *counts.entry(node.status.label().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn delay_totals(nodes: &[&TaskNode]) -> DelayTotals {
    nodes.iter().fold(DelayTotals::default(), |acc, n| DelayTotals {
        weather: acc.weather + u64::from(n.delay_weather_days),
        contractor: acc.contractor + u64::from(n.delay_contractor_days),
        client: acc.client + u64::from(n.delay_client_days),
    })
}

/// Earliest critical task whose planned start is today or later. Ties go
/// to the first one in pre-order; unparsable starts are ignored.
pub fn next_critical_activity(nodes: &[&TaskNode], today: NaiveDate) -> Option<CriticalActivity> {
    let mut best: Option<(&TaskNode, NaiveDate)> = None;
    for node in nodes.iter().copied().filter(|n| n.is_critical) {
        let Some(start) = node.planned_start() else {
            continue;
        };
        if start < today {
            continue;
        }
        if best.is_none_or(|(_, current)| start < current) {
            best = Some((node, start));
        }
    }
    best.map(|(node, start)| CriticalActivity {
        wbs: node.wbs.clone(),
        task_name: node.task_name.clone(),
        planned_start_date: start,
    })
}

/// Running total of weight completed by each date.
struct Cumulative {
    events: Vec<(NaiveDate, f64)>,
    cursor: usize,
    done: f64,
}

impl Cumulative {
    fn new(mut events: Vec<(NaiveDate, f64)>) -> Self {
        events.sort_by_key(|(date, _)| *date);
        Self {
            events,
            cursor: 0,
            done: 0.0,
        }
    }

    /// Weight completed on or before `day`. Days must be fed in order.
    fn advance_to(&mut self, day: NaiveDate) -> f64 {
        while let Some(&(date, weight)) = self.events.get(self.cursor) {
            if date > day {
                break;
            }
            self.done += weight;
            self.cursor += 1;
        }
        self.done
    }
}

fn percent_of(done: f64, total: f64) -> f64 {
    let pct = done / total * 100.0;
    if !pct.is_finite() {
        return 0.0;
    }
    let pct = pct.clamp(0.0, 100.0);
    (pct * 100.0).round() / 100.0
}

/// Daily cumulative planned and actual completion, weighted by leaf
/// weightage.
///
/// Only leaves with positive weight take part. The window spans their
/// planned starts, planned ends and actual ends and stops at `today`. A
/// date that does not parse is simply absent for that leaf.
pub fn s_curve(forest: &[TaskNode], today: NaiveDate) -> SCurve {
    let selected: Vec<&TaskNode> = tree_ops::leaves(forest)
        .into_iter()
        .filter(|n| n.effective_weight() > 0.0)
        .collect();
    if selected.is_empty() {
        return SCurve::default();
    }

    // scaled by the largest weight so the running sums stay finite
    let max = selected
        .iter()
        .map(|n| n.effective_weight())
        .fold(0.0_f64, f64::max);
    let total: f64 = selected.iter().map(|n| n.effective_weight() / max).sum();

    let mut window: Option<(NaiveDate, NaiveDate)> = None;
    let mut planned = Vec::new();
    let mut actual = Vec::new();
    for node in &selected {
        let weight = node.effective_weight() / max;
        let planned_end = node.planned_end();
        let actual_end = node.actual_end();
        for date in [node.planned_start(), planned_end, actual_end]
            .into_iter()
            .flatten()
        {
            window = Some(match window {
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
                None => (date, date),
            });
        }
        if let Some(date) = planned_end {
            planned.push((date, weight));
        }
        if let Some(date) = actual_end {
            actual.push((date, weight));
        }
    }

    let Some((start, end)) = window else {
        return SCurve::default();
    };
    let last = end.min(today);

    let mut planned = Cumulative::new(planned);
    let mut actual = Cumulative::new(actual);
    let mut points = Vec::new();
    for day in start.iter_days().take_while(|d| *d <= last) {
        points.push(CurvePoint {
            date: day,
            planned: percent_of(planned.advance_to(day), total),
            actual: percent_of(actual.advance_to(day), total),
        });
    }

    SCurve { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::aggregate::recalculate_progress;
    use crate::shared::tasks::TaskStatus;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leaf(id: &str, weight: f64) -> TaskNode {
        let mut node = TaskNode::new(id);
        node.weightage = weight;
        node
    }

    /// Parent `1` with leaves `1.1` (weight 2) and `1.2` (weight 1).
    fn scenario() -> Vec<TaskNode> {
        let mut a = leaf("1.1", 2.0);
        a.planned_end_date = Some("2024-01-10".into());
        a.actual_end_date = Some("2024-01-12".into());
        a.progress = 100;

        let mut b = leaf("1.2", 1.0);
        b.planned_end_date = Some("2024-01-05".into());
        b.progress = 50;

        let mut root = TaskNode::new("1");
        root.weightage = 99.0;
        root.subtasks = vec![a, b];
        let mut forest = vec![root];
        recalculate_progress(&mut forest);
        forest
    }

    fn point_on(curve: &SCurve, day: NaiveDate) -> &CurvePoint {
        curve.points.iter().find(|p| p.date == day).unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let forest = scenario();
        assert_eq!(forest[0].progress, 83);

        let report = analyze(&forest, ymd(2024, 6, 1));
        assert_eq!(report.overall_actual_progress, 83);

        let curve = &report.s_curve;
        assert_eq!(curve.points.first().unwrap().date, ymd(2024, 1, 5));
        assert_eq!(curve.points.last().unwrap().date, ymd(2024, 1, 12));

        let jan5 = point_on(curve, ymd(2024, 1, 5));
        assert_eq!(jan5.planned, 33.33);
        assert_eq!(jan5.actual, 0.0);

        let jan10 = point_on(curve, ymd(2024, 1, 10));
        assert_eq!(jan10.planned, 100.0);
        assert_eq!(jan10.actual, 0.0);

        let jan12 = point_on(curve, ymd(2024, 1, 12));
        assert_eq!(jan12.actual, 66.67);
    }

    #[test]
    fn test_window_clamped_to_today() {
        let forest = scenario();
        let curve = s_curve(&forest, ymd(2024, 1, 7));
        assert_eq!(curve.points.len(), 3);
        assert_eq!(curve.last().unwrap().date, ymd(2024, 1, 7));
    }

    #[test]
    fn test_today_before_window_gives_no_points() {
        let forest = scenario();
        assert!(s_curve(&forest, ymd(2023, 12, 1)).is_empty());
    }

    #[test]
    fn test_planned_start_extends_window() {
        let mut forest = scenario();
        forest[0].subtasks[1].planned_start_date = Some("2024-01-01".into());
        let curve = s_curve(&forest, ymd(2024, 6, 1));
        assert_eq!(curve.points[0].date, ymd(2024, 1, 1));
        assert_eq!(curve.points[0].planned, 0.0);
    }

    #[test]
    fn test_huge_weights_keep_curve_finite() {
        let mut a = leaf("1", 1e308);
        a.planned_end_date = Some("2024-01-01".into());
        a.actual_end_date = Some("2024-01-02".into());
        let mut b = leaf("2", 1e308);
        b.planned_end_date = Some("2024-01-02".into());

        let curve = s_curve(&[a, b], ymd(2024, 6, 1));
        assert_eq!(curve.points.len(), 2);
        for p in &curve.points {
            assert!(p.planned.is_finite() && (0.0..=100.0).contains(&p.planned));
            assert!(p.actual.is_finite() && (0.0..=100.0).contains(&p.actual));
        }
        assert_eq!(curve.points[0].planned, 50.0);
        assert_eq!(curve.points[1].planned, 100.0);
        assert_eq!(curve.points[1].actual, 50.0);
    }

    #[test]
    fn test_no_dates_gives_empty_curve_but_other_fields() {
        let mut a = leaf("1", 1.0);
        a.status = TaskStatus::InProgress;
        a.delay_weather_days = 2;
        let report = analyze(&[a], ymd(2024, 1, 1));
        assert!(report.s_curve.is_empty());
        assert_eq!(report.status_counts["In Progress"], 1);
        assert_eq!(report.total_delays.weather, 2);
    }

    #[test]
    fn test_unparsable_date_only_drops_that_leaf() {
        let mut forest = scenario();
        forest[0].subtasks[1].planned_end_date = Some("sometime".into());
        let curve = s_curve(&forest, ymd(2024, 6, 1));
        assert_eq!(curve.points[0].date, ymd(2024, 1, 10));
        // 1.2 still counts in the denominator.
        assert_eq!(curve.points[0].planned, 66.67);
    }

    #[test]
    fn test_zero_weight_and_parents_excluded() {
        let mut zero = leaf("2", 0.0);
        zero.planned_end_date = Some("2023-01-01".into());
        let mut forest = scenario();
        forest.push(zero);
        let curve = s_curve(&forest, ymd(2024, 6, 1));
        assert_eq!(curve.points[0].date, ymd(2024, 1, 5));
    }

    #[test]
    fn test_empty_forest() {
        let report = analyze(&[], ymd(2024, 1, 1));
        assert!(report.status_counts.is_empty());
        assert_eq!(report.total_delays, DelayTotals::default());
        assert!(report.s_curve.is_empty());
        assert_eq!(report.overall_actual_progress, 0);
        assert!(report.next_critical_activity.is_none());
    }

    #[test]
    fn test_status_histogram_counts_all_nodes() {
        let mut forest = scenario();
        forest[0].subtasks[0].status = TaskStatus::Completed;
        forest[0].subtasks[1].status = TaskStatus::Other("On Hold".into());
        let report = analyze(&forest, ymd(2024, 1, 1));
        assert_eq!(report.status_counts["Not Started"], 1);
        assert_eq!(report.status_counts["Completed"], 1);
        assert_eq!(report.status_counts["On Hold"], 1);
    }

    #[test]
    fn test_delay_totals_sum_every_level() {
        let mut forest = scenario();
        forest[0].delay_client_days = 1;
        forest[0].subtasks[0].delay_client_days = 2;
        forest[0].subtasks[1].delay_contractor_days = 4;
        let totals = analyze(&forest, ymd(2024, 1, 1)).total_delays;
        assert_eq!(totals.client, 3);
        assert_eq!(totals.contractor, 4);
        assert_eq!(totals.weather, 0);
        assert_eq!(totals.total(), 7);
    }

    #[test]
    fn test_next_critical_activity() {
        let mut past = leaf("1", 1.0);
        past.is_critical = true;
        past.planned_start_date = Some("2024-01-01".into());
        let mut later = leaf("2", 1.0);
        later.is_critical = true;
        later.planned_start_date = Some("2024-03-01".into());
        let mut sooner = leaf("3", 1.0);
        sooner.is_critical = true;
        sooner.task_name = Some("Pour slab".into());
        sooner.planned_start_date = Some("2024-02-01".into());
        let mut tie = leaf("4", 1.0);
        tie.is_critical = true;
        tie.planned_start_date = Some("2024-02-01".into());
        let mut not_critical = leaf("5", 1.0);
        not_critical.planned_start_date = Some("2024-01-20".into());
        let mut garbled = leaf("6", 1.0);
        garbled.is_critical = true;
        garbled.planned_start_date = Some("??".into());

        let forest = vec![past, later, sooner, tie, not_critical, garbled];
        let next = analyze(&forest, ymd(2024, 1, 15))
            .next_critical_activity
            .unwrap();
        assert_eq!(next.wbs, "3");
        assert_eq!(next.task_name.as_deref(), Some("Pour slab"));
        assert_eq!(next.planned_start_date, ymd(2024, 2, 1));
    }

    #[test]
    fn test_critical_starting_today_counts() {
        let mut task = leaf("1", 1.0);
        task.is_critical = true;
        task.planned_start_date = Some("2024-01-15".into());
        let next = analyze(&[task], ymd(2024, 1, 15)).next_critical_activity;
        assert!(next.is_some());
    }

    #[test]
    fn test_payload_shape() {
        let forest = scenario();
        let payload = analyze(&forest, ymd(2024, 1, 6)).payload(DEFAULT_DATE_LABEL_FORMAT);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["s_curve_data"]["dates"][0], "05-Jan-24");
        assert_eq!(value["s_curve_data"]["planned_progress"][0], 33.33);
        assert_eq!(value["overall_actual_progress"], 83);
        assert_eq!(value["total_delays"]["weather"], 0);
        assert!(value["next_critical_activity"].is_null());
    }

    fn arb_leaf() -> impl Strategy<Value = TaskNode> {
        (
            0.0f64..5.0,
            prop::option::of(0i64..60),
            prop::option::of(0i64..60),
            prop::option::of(0i64..60),
        )
            .prop_map(|(w, start, end, actual)| {
                let base = ymd(2024, 1, 1);
                let fmt = |off: i64| (base + chrono::Duration::days(off)).to_string();
                let mut node = leaf("x", w);
                node.planned_start_date = start.map(fmt);
                node.planned_end_date = end.map(fmt);
                node.actual_end_date = actual.map(fmt);
                node
            })
    }

    proptest! {
        #[test]
        fn prop_curves_monotonic_and_bounded(
            leaves in prop::collection::vec(arb_leaf(), 0..20),
            today_offset in 0i64..90,
        ) {
            let today = ymd(2024, 1, 1) + chrono::Duration::days(today_offset);
            let curve = s_curve(&leaves, today);
            for pair in curve.points.windows(2) {
                prop_assert!(pair[0].planned <= pair[1].planned);
                prop_assert!(pair[0].actual <= pair[1].actual);
                prop_assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
            }
            for p in &curve.points {
                prop_assert!((0.0..=100.0).contains(&p.planned));
                prop_assert!((0.0..=100.0).contains(&p.actual));
                prop_assert!(p.date <= today);
            }
        }
    }
}
