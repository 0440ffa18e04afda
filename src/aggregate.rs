//! Group-by summary statistics, ranking and the other aggregations behind the dashboard views.
//!
//! Statistics are computed by Polars in a single aggregation pass. Standard deviation is the
//! sample estimator (ddof = 1), so a group with one record has a NaN std. Statistics over zero
//! rows are NaN. Ranking is done here, not in Polars, so tie-breaking is explicit.

use crate::dataset::Dataset;
use crate::error::{QueryError, QueryResult};
use crate::format::round_to;
use crate::schema::{CategoricalColumn, NumericColumn};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Min,
    Max,
    Std,
    Count,
}

impl Statistic {
    pub const ALL: [Self; 5] = [Self::Mean, Self::Min, Self::Max, Self::Std, Self::Count];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Std => "std",
            Self::Count => "count",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    fn expr(self, value: NumericColumn) -> Expr {
        let c = col(value.header());
        let e = match self {
            Self::Mean => c.mean(),
            Self::Min => c.min(),
            Self::Max => c.max(),
            Self::Std => c.std(1),
            Self::Count => len(),
        };
        e.alias(stat_alias(value, self))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn stat_alias(value: NumericColumn, stat: Statistic) -> String {
    format!("{}::{}", value.header(), stat.name())
}

/// Which statistics an aggregation computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatSet(u8);

impl StatSet {
    pub const ALL: Self = Self(0b1_1111);

    pub fn of(stats: &[Statistic]) -> Self {
        Self(stats.iter().fold(0, |acc, s| acc | s.bit()))
    }

    pub fn with(self, stat: Statistic) -> Self {
        Self(self.0 | stat.bit())
    }

    pub fn contains(self, stat: Statistic) -> bool {
        self.0 & stat.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Statistic> {
        Statistic::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

/// Sort direction for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Descending,
    Ascending,
}

/// Statistics for one group. `None` means the statistic was not requested; `count` is always set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl GroupStats {
    pub fn get(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::Std => self.std,
            Statistic::Count => self.count.map(|c| c as f64),
        }
    }
}

/// Output of [`aggregate`]: groups in first-appearance order of their key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub group_by: CategoricalColumn,
    pub value: NumericColumn,
    #[serde(skip)]
    pub stats: StatSet,
    pub groups: Vec<GroupStats>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&GroupStats> {
        self.groups.iter().find(|g| g.key == key)
    }
}

/// Ungrouped statistics of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// One row of a statistics table, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub key: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Group `dataset` by `group_by` and compute `stats` over `value`.
///
/// Both columns are identifiers or source headers; an unknown name, or a group-by column that
/// is not categorical, is `UnknownColumn`. An empty dataset gives an empty result.
pub fn aggregate(
    dataset: &Dataset,
    group_by: &str,
    value: &str,
    stats: StatSet,
) -> QueryResult<AggregationResult> {
    let group_by: CategoricalColumn = group_by.parse()?;
    let value: NumericColumn = value.parse()?;
    aggregate_by(dataset, group_by, value, stats)
}

pub fn aggregate_by(
    dataset: &Dataset,
    group_by: CategoricalColumn,
    value: NumericColumn,
    stats: StatSet,
) -> QueryResult<AggregationResult> {
    let key = group_by.header();
    // Count is always computed so that a result with no statistics still lists its groups.
    let stats = stats.with(Statistic::Count);
    let exprs: Vec<Expr> = stats
        .iter()
        .map(|s| s.expr(value))
        .collect();
    let df = dataset
        .lazy()
        .group_by_stable([col(key)])
        .agg(exprs)
        .collect()?;

    let keys = df.column(key)?.as_materialized_series().str()?;
    let groups = (0..df.height())
        .map(|row| {
            let f = |stat: Statistic| {
                stats
                    .contains(stat)
                    .then(|| get_f64(&df, &stat_alias(value, stat), row))
            };
            GroupStats {
                key: keys.get(row).unwrap_or_default().to_string(),
                mean: f(Statistic::Mean),
                min: f(Statistic::Min),
                max: f(Statistic::Max),
                std: f(Statistic::Std),
                count: Some(get_usize(&df, &stat_alias(value, Statistic::Count), row)),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        group_by = group_by.ident(),
        value = value.ident(),
        rows = dataset.height(),
        groups = groups.len(),
        "aggregated"
    );

    Ok(AggregationResult {
        group_by,
        value,
        stats,
        groups,
    })
}

/// Mean, min, max, std and count of `value` over the whole dataset.
pub fn summarize(dataset: &Dataset, value: NumericColumn) -> QueryResult<Summary> {
    let exprs: Vec<Expr> = Statistic::ALL.iter().map(|s| s.expr(value)).collect();
    let df = dataset.lazy().select(exprs).collect()?;
    let f = |stat: Statistic| get_f64(&df, &stat_alias(value, stat), 0);
    Ok(Summary {
        count: get_usize(&df, &stat_alias(value, Statistic::Count), 0),
        mean: f(Statistic::Mean),
        min: f(Statistic::Min),
        max: f(Statistic::Max),
        std: f(Statistic::Std),
    })
}

/// Record count per label, most frequent first; equal counts by label ascending.
pub fn value_counts(dataset: &Dataset, column: CategoricalColumn) -> QueryResult<Vec<(String, usize)>> {
    let key = column.header();
    let df = dataset
        .lazy()
        .group_by_stable([col(key)])
        .agg([len().alias("count")])
        .collect()?;
    let keys = df.column(key)?.as_materialized_series().str()?;
    let mut counts: Vec<(String, usize)> = (0..df.height())
        .map(|row| {
            (
                keys.get(row).unwrap_or_default().to_string(),
                get_usize(&df, "count", row),
            )
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

/// Pearson correlation between two numeric columns. NaN with fewer than two rows or when
/// either column is constant.
pub fn correlation(dataset: &Dataset, x: NumericColumn, y: NumericColumn) -> QueryResult<f64> {
    let xs = dataset.numeric_values(x)?;
    let ys = dataset.numeric_values(y)?;
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(a, b)| Some((a?, b?)))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();
    if pairs.len() < 2 {
        return Ok(f64::NAN);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let numerator: f64 = pairs
        .iter()
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let var_x: f64 = pairs.iter().map(|(a, _)| (a - mean_x).powi(2)).sum();
    let var_y: f64 = pairs.iter().map(|(_, b)| (b - mean_y).powi(2)).sum();

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(f64::NAN);
    }
    Ok(numerator / (var_x.sqrt() * var_y.sqrt()))
}

/// NaN sorts after every number in both directions.
fn compare_values(a: f64, b: f64, order: Order) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match order {
                Order::Ascending => ord,
                Order::Descending => ord.reverse(),
            }
        }
    }
}

/// The first `n` groups by `stat` in `order`; equal values by key ascending.
pub fn rank(
    result: &AggregationResult,
    stat: Statistic,
    n: usize,
    order: Order,
) -> QueryResult<Vec<(String, f64)>> {
    if !result.stats.contains(stat) {
        return Err(QueryError::StatisticNotComputed(stat.name()));
    }
    let mut entries: Vec<(String, f64)> = result
        .groups
        .iter()
        .map(|g| (g.key.clone(), g.get(stat).unwrap_or(f64::NAN)))
        .collect();
    entries.sort_by(|a, b| compare_values(a.1, b.1, order).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    Ok(entries)
}

/// Key of the group with the largest (`Descending`) or smallest (`Ascending`) `stat`.
pub fn best_group(result: &AggregationResult, stat: Statistic, order: Order) -> QueryResult<String> {
    if result.is_empty() {
        return Err(QueryError::EmptyResult);
    }
    rank(result, stat, 1, order)?
        .into_iter()
        .next()
        .map(|(key, _)| key)
        .ok_or(QueryError::EmptyResult)
}

/// Mean/min/max/std per group rounded to two decimals, highest mean first.
pub fn stats_table(result: &AggregationResult) -> QueryResult<Vec<StatsRow>> {
    for stat in [Statistic::Mean, Statistic::Min, Statistic::Max, Statistic::Std] {
        if !result.stats.contains(stat) {
            return Err(QueryError::StatisticNotComputed(stat.name()));
        }
    }
    let mut rows: Vec<StatsRow> = result
        .groups
        .iter()
        .map(|g| StatsRow {
            key: g.key.clone(),
            mean: round_to(g.mean.unwrap_or(f64::NAN), 2),
            min: round_to(g.min.unwrap_or(f64::NAN), 2),
            max: round_to(g.max.unwrap_or(f64::NAN), 2),
            std: round_to(g.std.unwrap_or(f64::NAN), 2),
        })
        .collect();
    rows.sort_by(|a, b| {
        compare_values(a.mean, b.mean, Order::Descending).then_with(|| a.key.cmp(&b.key))
    });
    Ok(rows)
}

fn get_f64(df: &DataFrame, col_name: &str, row: usize) -> f64 {
    df.column(col_name)
        .ok()
        .and_then(|s| {
            let v = s.get(row).ok()?;
            match v {
                AnyValue::Float64(x) => Some(x),
                AnyValue::Float32(x) => Some(x as f64),
                AnyValue::Int32(x) => Some(x as f64),
                AnyValue::Int64(x) => Some(x as f64),
                AnyValue::UInt32(x) => Some(x as f64),
                AnyValue::UInt64(x) => Some(x as f64),
                AnyValue::Null => Some(f64::NAN),
                _ => None,
            }
        })
        .unwrap_or(f64::NAN)
}

fn get_usize(df: &DataFrame, col_name: &str, row: usize) -> usize {
    df.column(col_name)
        .ok()
        .and_then(|s| match s.get(row).ok()? {
            AnyValue::UInt32(x) => Some(x as usize),
            AnyValue::UInt64(x) => Some(x as usize),
            AnyValue::Int64(x) => usize::try_from(x).ok(),
            AnyValue::Int32(x) => usize::try_from(x).ok(),
            _ => None,
        })
        .unwrap_or(0)
}
