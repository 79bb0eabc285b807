//! Sample-and-hold alignment of channel series
//!
//! Every observed timestamp becomes one row. Each channel contributes the value
//! of its latest sample at or before that timestamp. The lookup index is
//! clamped to the channel's own samples, so a channel holds its last value
//! after it stops reporting and shows its first value before it starts.

use crate::config::LeadingFill;
use crate::samples::ChannelSeries;
use crate::types::{AlignedRow, AlignedTable, Millis};

/// Index of the last item whose key is `<= target`, clamped to `0..len`
///
/// Returns `None` only for an empty slice. When every key is greater than
/// `target` the result is `0`.
pub fn clamped_floor_index<T, K, F>(items: &[T], target: &K, key: F) -> Option<usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    if items.is_empty() {
        return None;
    }
    let after = items.partition_point(|item| key(item) <= *target);
    Some(after.saturating_sub(1).min(items.len() - 1))
}

/// Builds the aligned table from completed channel series
#[derive(Debug, Clone, Copy, Default)]
pub struct Resampler {
    leading_fill: LeadingFill,
}

impl Resampler {
    pub fn new(leading_fill: LeadingFill) -> Self {
        Self { leading_fill }
    }

    /// Produce one row per distinct timestamp, one column per channel
    pub fn resample(&self, input: &ChannelSeries) -> AlignedTable {
        let channels: Vec<String> = input.series.keys().cloned().collect();
        let sorted: Vec<Vec<(Millis, f64)>> =
            input.series.values().map(|series| series.points()).collect();

        let rows: Vec<AlignedRow> = input
            .timestamps
            .iter()
            .map(|&timestamp| AlignedRow {
                timestamp,
                values: sorted
                    .iter()
                    .map(|points| self.value_at(points, timestamp))
                    .collect(),
            })
            .collect();

        log::debug!(
            "Resampled {} channels onto {} timestamps",
            channels.len(),
            rows.len()
        );

        AlignedTable { channels, rows }
    }

    fn value_at(&self, points: &[(Millis, f64)], timestamp: Millis) -> f64 {
        let Some(index) = clamped_floor_index(points, &timestamp, |&(t, _)| t) else {
            return f64::NAN;
        };
        let (found, value) = points[index];
        if found > timestamp && self.leading_fill == LeadingFill::Missing {
            return f64::NAN;
        }
        value
    }
}
