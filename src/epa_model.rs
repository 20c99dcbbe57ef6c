use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::play_data::PlayRow;
use crate::situation::{SituationSlice, field_goal_attempts, yard_bin};

/// Aggregate EPA for one option in one bucket. `NoData` orders below every
/// defined value, so float NaN semantics never reach the selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpaEstimate {
    Defined(f64),
    NoData,
}

impl EpaEstimate {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(val) => Some(val),
            Self::NoData => None,
        }
    }

    /// Total ordering: defined values by `f64::total_cmp`, NoData last.
    pub fn ranking(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Defined(a), Self::Defined(b)) => a.total_cmp(&b),
            (Self::Defined(_), Self::NoData) => Ordering::Greater,
            (Self::NoData, Self::Defined(_)) => Ordering::Less,
            (Self::NoData, Self::NoData) => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, val: f64) {
        self.sum += val;
        self.count += 1;
    }

    fn mean(self) -> EpaEstimate {
        if self.count == 0 {
            EpaEstimate::NoData
        } else {
            EpaEstimate::Defined(self.sum / self.count as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOption {
    GoForIt,
    Punt,
    FieldGoal,
}

impl PlayOption {
    pub fn label(self) -> &'static str {
        match self {
            Self::GoForIt => "Go for it",
            Self::Punt => "Punt",
            Self::FieldGoal => "Field Goal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    InsufficientData,
    Recommend { option: PlayOption, epa: f64 },
}

impl DecisionOutcome {
    /// The recommendation line shown to the user, markdown emphasis included.
    pub fn summary(&self) -> String {
        match self {
            Self::InsufficientData => "Insufficient data for this situation.".to_string(),
            Self::Recommend { option, epa } => {
                format!(
                    "Recommended decision: **{}** (EPA: {epa:.2})",
                    option.label()
                )
            }
        }
    }

    pub fn console_label(&self) -> String {
        match self {
            Self::InsufficientData => "insufficient data".to_string(),
            Self::Recommend { option, epa } => format!("{} (EPA {epa:.2})", option.label()),
        }
    }
}

/// One complete recommendation pass over the immutable dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub decision: DecisionOutcome,
    pub vs_punt: Vec<(f64, f64)>,
    pub vs_field_goal: Vec<(f64, f64)>,
}

pub fn evaluate(dataset: &[PlayRow], ydstogo: u8, yardline: u8) -> QueryOutcome {
    let slice = SituationSlice::partition(dataset, ydstogo);
    QueryOutcome {
        decision: decide(&slice, yardline),
        vs_punt: punt_comparison(&slice),
        vs_field_goal: field_goal_comparison(&slice, &field_goal_attempts(dataset)),
    }
}

/// Conversion rate over a go-for-it group; None when the group carries no
/// conversion outcomes at all.
pub fn success_rate(go: &[&PlayRow]) -> Option<f64> {
    let converted = go.iter().filter(|play| play.converted).count();
    let failed = go.iter().filter(|play| play.failed).count();
    let total = converted + failed;
    if total == 0 {
        None
    } else {
        Some(converted as f64 / total as f64)
    }
}

/// Convex blend of the signed EPA means. A bucket missing either sign has no
/// blended estimate.
pub fn blend(positive: EpaEstimate, negative: EpaEstimate, rate: f64) -> EpaEstimate {
    match (positive, negative) {
        (EpaEstimate::Defined(pos), EpaEstimate::Defined(neg)) => {
            EpaEstimate::Defined(rate * pos + (1.0 - rate) * neg)
        }
        _ => EpaEstimate::NoData,
    }
}

/// Picks the option with the highest single-bucket EPA estimate for the
/// queried yardline. Without any conversion outcome at this distance the
/// whole query is unanswerable; no partial recommendation is produced.
pub fn decide(slice: &SituationSlice<'_>, yardline: u8) -> DecisionOutcome {
    let Some(rate) = success_rate(&slice.go) else {
        return DecisionOutcome::InsufficientData;
    };

    let bucket = yard_bin(yardline);
    let (positive, negative) = signed_means_in_bucket(&slice.go, bucket);
    let go = blend(positive, negative, rate);
    let punt = mean_in_bucket(&slice.punt, bucket);
    let field_goal = mean_in_bucket(&slice.field_goal, bucket);

    let mut best = (PlayOption::GoForIt, go);
    for candidate in [
        (PlayOption::Punt, punt),
        (PlayOption::FieldGoal, field_goal),
    ] {
        if candidate.1.ranking(best.1) == Ordering::Greater {
            best = candidate;
        }
    }

    match best.1 {
        EpaEstimate::Defined(epa) => DecisionOutcome::Recommend {
            option: best.0,
            epa,
        },
        EpaEstimate::NoData => DecisionOutcome::InsufficientData,
    }
}

/// Go-for-it minus punt EPA per bucket, the first comparison chart.
pub fn punt_comparison(slice: &SituationSlice<'_>) -> Vec<(f64, f64)> {
    let rate = success_rate(&slice.go).unwrap_or(0.0);
    let go = blended_go_by_bucket(&slice.go, rate);
    let punt = mean_by_bucket(&slice.punt);
    diff_series(&go, &punt)
}

/// Go-for-it minus blended field-goal EPA per bucket, the second chart. Go
/// plays beyond the longest attempted kick are not comparable and are cut
/// before bucketing.
pub fn field_goal_comparison(
    slice: &SituationSlice<'_>,
    all_attempts: &[&PlayRow],
) -> Vec<(f64, f64)> {
    let Some(max_kick) = slice.field_goal.iter().map(|play| play.yardline_100).max() else {
        return Vec::new();
    };
    let in_range: Vec<&PlayRow> = slice
        .go
        .iter()
        .copied()
        .filter(|play| play.yardline_100 <= max_kick)
        .collect();

    let rate = success_rate(&in_range).unwrap_or(0.0);
    let go = blended_go_by_bucket(&in_range, rate);
    let make_rates = fg_make_rates(all_attempts);
    let field_goal = blended_fg_by_bucket(&slice.field_goal, &make_rates);
    diff_series(&go, &field_goal)
}

/// Blended go-for-it EPA per bucket. Only buckets holding both a positive and
/// a negative play produce a point.
pub fn blended_go_by_bucket(go: &[&PlayRow], rate: f64) -> BTreeMap<u8, f64> {
    let (positive, negative) = signed_accumulators(go);
    let mut out = BTreeMap::new();
    for (bucket, pos) in &positive {
        let Some(neg) = negative.get(bucket) else {
            continue;
        };
        if let EpaEstimate::Defined(val) = blend(pos.mean(), neg.mean(), rate) {
            out.insert(*bucket, val);
        }
    }
    out
}

/// Plain per-bucket EPA mean (punts, and the single-bucket field-goal
/// estimate in the decision path).
pub fn mean_by_bucket(plays: &[&PlayRow]) -> BTreeMap<u8, f64> {
    let mut accs: BTreeMap<u8, MeanAcc> = BTreeMap::new();
    for play in plays {
        accs.entry(yard_bin(play.yardline_100))
            .or_default()
            .push(f64::from(play.epa));
    }
    accs.into_iter()
        .filter_map(|(bucket, acc)| acc.mean().value().map(|val| (bucket, val)))
        .collect()
}

/// Per-bucket make rate over every attempt: made / attempted, 0 when nothing
/// was made in the bucket.
pub fn fg_make_rates(attempts: &[&PlayRow]) -> BTreeMap<u8, f64> {
    let mut made: BTreeMap<u8, usize> = BTreeMap::new();
    let mut total: BTreeMap<u8, usize> = BTreeMap::new();
    for play in attempts {
        let bucket = yard_bin(play.yardline_100);
        *total.entry(bucket).or_default() += 1;
        if play.fg_made {
            *made.entry(bucket).or_default() += 1;
        }
    }
    total
        .into_iter()
        .map(|(bucket, count)| {
            let made = made.get(&bucket).copied().unwrap_or(0);
            (bucket, made as f64 / count as f64)
        })
        .collect()
}

/// Field-goal EPA per bucket, blending the signed means by that bucket's make
/// rate (0 when the bucket has no rate).
pub fn blended_fg_by_bucket(
    field_goal: &[&PlayRow],
    make_rates: &BTreeMap<u8, f64>,
) -> BTreeMap<u8, f64> {
    let (positive, negative) = signed_accumulators(field_goal);
    let mut out = BTreeMap::new();
    for (bucket, pos) in &positive {
        let Some(neg) = negative.get(bucket) else {
            continue;
        };
        let rate = make_rates.get(bucket).copied().unwrap_or(0.0);
        if let EpaEstimate::Defined(val) = blend(pos.mean(), neg.mean(), rate) {
            out.insert(*bucket, val);
        }
    }
    out
}

/// Bucket-wise lhs - rhs; buckets present on only one side yield no point.
pub fn diff_series(lhs: &BTreeMap<u8, f64>, rhs: &BTreeMap<u8, f64>) -> Vec<(f64, f64)> {
    lhs.iter()
        .filter_map(|(bucket, a)| rhs.get(bucket).map(|b| (f64::from(*bucket), a - b)))
        .collect()
}

fn signed_accumulators(plays: &[&PlayRow]) -> (BTreeMap<u8, MeanAcc>, BTreeMap<u8, MeanAcc>) {
    let mut positive: BTreeMap<u8, MeanAcc> = BTreeMap::new();
    let mut negative: BTreeMap<u8, MeanAcc> = BTreeMap::new();
    for play in plays {
        let bucket = yard_bin(play.yardline_100);
        let epa = f64::from(play.epa);
        if epa > 0.0 {
            positive.entry(bucket).or_default().push(epa);
        } else if epa < 0.0 {
            negative.entry(bucket).or_default().push(epa);
        }
    }
    (positive, negative)
}

fn signed_means_in_bucket(go: &[&PlayRow], bucket: u8) -> (EpaEstimate, EpaEstimate) {
    let mut positive = MeanAcc::default();
    let mut negative = MeanAcc::default();
    for play in go {
        if yard_bin(play.yardline_100) != bucket {
            continue;
        }
        let epa = f64::from(play.epa);
        if epa > 0.0 {
            positive.push(epa);
        } else if epa < 0.0 {
            negative.push(epa);
        }
    }
    (positive.mean(), negative.mean())
}

fn mean_in_bucket(plays: &[&PlayRow], bucket: u8) -> EpaEstimate {
    let mut acc = MeanAcc::default();
    for play in plays {
        if yard_bin(play.yardline_100) == bucket {
            acc.push(f64::from(play.epa));
        }
    }
    acc.mean()
}
