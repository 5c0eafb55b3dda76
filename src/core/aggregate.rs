//! Epoch aggregation: bucketing samples into fixed windows and reducing
//! each column under its rule.
//!
//! Windows are origin-anchored: a bucket boundary is a deterministic
//! function of the epoch length alone, never of the first sample. Every
//! bucket inside the observed span is emitted, including empty ones.

use crate::core::series::SeriesTable;
use chrono::{Duration, NaiveDateTime};
use statrs::statistics::Statistics;

/// How a column is reduced within one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationRule {
    /// Sum of present numeric values; empty bucket is missing, not zero
    Sum,
    /// Mean of present numeric values
    Mean,
    /// Most frequent value, first-encountered winning ties
    Mode,
    /// Dropped before aggregation and recomputed afterwards
    Ignore,
}

/// Closed set of known column kinds, matched case-insensitively by name.
///
/// Unknown columns fall into `Other`, which sums and formats like `PIM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCategory {
    Event,
    ExtTemperature,
    Pim,
    /// `PIMn`: rate derived from the `PIM` sum, never aggregated
    PimRate,
    Zcm,
    /// `ZCMn`: rate derived from the `ZCM` sum, never aggregated
    ZcmRate,
    Light,
    State,
    Other,
}

impl ColumnCategory {
    /// Classify a column by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "EVENT" => ColumnCategory::Event,
            "EXT TEMPERATURE" => ColumnCategory::ExtTemperature,
            "PIM" => ColumnCategory::Pim,
            "PIMN" => ColumnCategory::PimRate,
            "ZCM" => ColumnCategory::Zcm,
            "ZCMN" => ColumnCategory::ZcmRate,
            "LIGHT" => ColumnCategory::Light,
            "STATE" => ColumnCategory::State,
            _ => ColumnCategory::Other,
        }
    }

    /// The aggregation rule for this column kind.
    pub fn rule(self) -> AggregationRule {
        match self {
            ColumnCategory::State => AggregationRule::Mode,
            ColumnCategory::ExtTemperature | ColumnCategory::Light => AggregationRule::Mean,
            ColumnCategory::PimRate | ColumnCategory::ZcmRate => AggregationRule::Ignore,
            ColumnCategory::Event
            | ColumnCategory::Pim
            | ColumnCategory::Zcm
            | ColumnCategory::Other => AggregationRule::Sum,
        }
    }
}

/// A column of the aggregated table.
#[derive(Debug, Clone)]
pub struct AggregatedColumn {
    /// Column name as it will be matched against output headers
    pub name: String,
    pub category: ColumnCategory,
}

/// One fixed-length bucket of aggregated values.
#[derive(Debug, Clone)]
pub struct Epoch {
    /// Start of the bucket (inclusive)
    pub start: NaiveDateTime,
    /// Aggregates aligned to [`EpochTable::columns`]; `None` is missing
    pub values: Vec<Option<f64>>,
}

/// The aggregated series: one epoch per bucket across the observed span.
///
/// Columns are the input columns minus the ignored rate columns, followed
/// by the freshly derived `PIMn` and `ZCMn`.
#[derive(Debug, Clone)]
pub struct EpochTable {
    pub epoch_seconds: u32,
    pub columns: Vec<AggregatedColumn>,
    pub epochs: Vec<Epoch>,
}

impl EpochTable {
    /// Start of the first emitted epoch.
    pub fn first_epoch(&self) -> Option<NaiveDateTime> {
        self.epochs.first().map(|epoch| epoch.start)
    }

    /// Start of the last emitted epoch.
    pub fn last_epoch(&self) -> Option<NaiveDateTime> {
        self.epochs.last().map(|epoch| epoch.start)
    }

    /// Find a column by name, case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(wanted))
    }

    /// Number of epochs with no contributing samples.
    pub fn empty_epoch_count(&self) -> u64 {
        self.epochs
            .iter()
            .filter(|epoch| epoch.values.iter().all(Option::is_none))
            .count() as u64
    }
}

/// Truncate a timestamp to its origin-anchored bucket boundary.
fn bucket_start(timestamp: NaiveDateTime, epoch_seconds: i64) -> NaiveDateTime {
    let seconds = timestamp.and_utc().timestamp();
    timestamp - Duration::seconds(seconds.rem_euclid(epoch_seconds))
}

/// Most frequent value; ties go to the value encountered first.
///
/// Frequencies are kept in encounter order so the tie-break is a property
/// of the structure rather than of map iteration order.
fn mode_first_encountered(values: &[f64]) -> Option<f64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for &(value, count) in &counts {
        if best.map(|(_, best_count)| count > best_count).unwrap_or(true) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Reduce one bucket's values for a column under its rule.
fn reduce(rule: AggregationRule, values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match rule {
        AggregationRule::Sum => Some(values.iter().sum()),
        AggregationRule::Mean => Some(values.iter().mean()),
        AggregationRule::Mode => mode_first_encountered(values),
        AggregationRule::Ignore => None,
    }
}

/// Bucket a sorted series into fixed epochs and aggregate every column.
///
/// The returned table spans from the first occupied bucket to the last at
/// a fixed stride; buckets without samples carry all-missing values.
///
/// # Panics
///
/// Panics if `epoch_seconds` is zero; callers validate the duration at the
/// input boundary.
pub fn aggregate(series: &SeriesTable, epoch_seconds: u32) -> EpochTable {
    assert!(epoch_seconds > 0, "epoch_seconds must be positive");
    let step = i64::from(epoch_seconds);

    // Columns that survive aggregation, with their source slot in the series.
    let kept: Vec<(usize, AggregatedColumn)> = series
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let category = ColumnCategory::from_name(name);
            (category.rule() != AggregationRule::Ignore).then(|| {
                (
                    idx,
                    AggregatedColumn {
                        name: name.clone(),
                        category,
                    },
                )
            })
        })
        .collect();

    let mut columns: Vec<AggregatedColumn> =
        kept.iter().map(|(_, column)| column.clone()).collect();
    columns.push(AggregatedColumn {
        name: "PIMn".to_string(),
        category: ColumnCategory::PimRate,
    });
    columns.push(AggregatedColumn {
        name: "ZCMn".to_string(),
        category: ColumnCategory::ZcmRate,
    });

    // Samples are sorted, so buckets fill consecutively.
    let mut groups: Vec<(NaiveDateTime, Vec<Vec<f64>>)> = Vec::new();
    for sample in &series.samples {
        let start = bucket_start(sample.timestamp, step);
        if groups.last().map(|(existing, _)| *existing) != Some(start) {
            groups.push((start, vec![Vec::new(); kept.len()]));
        }
        if let Some((_, buckets)) = groups.last_mut() {
            for (slot, (source_idx, _)) in kept.iter().enumerate() {
                if let Some(value) = sample.values[*source_idx].as_number() {
                    buckets[slot].push(value);
                }
            }
        }
    }

    let (first, last) = match (groups.first(), groups.last()) {
        (Some((first, _)), Some((last, _))) => (*first, *last),
        _ => {
            return EpochTable {
                epoch_seconds,
                columns,
                epochs: Vec::new(),
            }
        }
    };

    let pim_slot = kept
        .iter()
        .position(|(_, column)| column.category == ColumnCategory::Pim);
    let zcm_slot = kept
        .iter()
        .position(|(_, column)| column.category == ColumnCategory::Zcm);

    let bucket_count = ((last - first).num_seconds() / step) as usize + 1;
    let mut epochs = Vec::with_capacity(bucket_count);
    let mut next_group = 0;

    for bucket_idx in 0..bucket_count {
        let start = first + Duration::seconds(step * bucket_idx as i64);

        let mut values: Vec<Option<f64>> = if next_group < groups.len()
            && groups[next_group].0 == start
        {
            let (_, buckets) = &groups[next_group];
            next_group += 1;
            kept.iter()
                .zip(buckets)
                .map(|((_, column), bucket)| reduce(column.category.rule(), bucket))
                .collect()
        } else {
            vec![None; kept.len()]
        };

        // Derived rates come from the just-aggregated sums, never the input.
        let pim_sum = pim_slot.and_then(|slot| values[slot]);
        let zcm_sum = zcm_slot.and_then(|slot| values[slot]);
        values.push(pim_sum.map(|sum| sum / f64::from(epoch_seconds)));
        values.push(zcm_sum.map(|sum| sum / f64::from(epoch_seconds)));

        epochs.push(Epoch { start, values });
    }

    EpochTable {
        epoch_seconds,
        columns,
        epochs,
    }
}
