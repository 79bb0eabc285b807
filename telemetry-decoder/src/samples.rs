//! Per-channel sample accumulation
//!
//! Physical samples are collected into one ordered time series per channel.
//! A second write for the same (channel, timestamp) pair replaces the first.

use crate::types::{Millis, Sample};
use std::collections::{BTreeMap, BTreeSet};

/// Samples of one channel keyed by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: BTreeMap<Millis, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value at a timestamp
    pub fn insert(&mut self, timestamp: Millis, value: f64) -> Option<f64> {
        self.points.insert(timestamp, value)
    }

    pub fn get(&self, timestamp: Millis) -> Option<f64> {
        self.points.get(&timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending timestamp order
    pub fn points(&self) -> Vec<(Millis, f64)> {
        self.points.iter().map(|(&t, &v)| (t, v)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Millis, f64)> + '_ {
        self.points.iter().map(|(&t, &v)| (t, v))
    }
}

/// Completed per-channel series plus every timestamp that was observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSeries {
    /// Series keyed by channel name (iteration is in sorted name order)
    pub series: BTreeMap<String, TimeSeries>,
    /// Distinct timestamps of all frame boundaries and recorded samples
    pub timestamps: BTreeSet<Millis>,
}

impl ChannelSeries {
    /// Channel names in sorted order
    pub fn channel_names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn get(&self, channel_name: &str) -> Option<&TimeSeries> {
        self.series.get(channel_name)
    }

    /// Total number of stored points
    pub fn sample_count(&self) -> usize {
        self.series.values().map(TimeSeries::len).sum()
    }

    /// All samples, by channel name then timestamp
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.series.iter().flat_map(|(name, series)| {
            series.iter().map(move |(timestamp, value)| Sample {
                channel_name: name.clone(),
                timestamp,
                value,
            })
        })
    }
}

/// Accumulates samples while frames are decoded
#[derive(Debug, Default)]
pub struct SampleBuilder {
    inner: ChannelSeries,
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a later write for the same channel and timestamp wins
    pub fn record(&mut self, channel_name: &str, timestamp: Millis, value: f64) {
        let series = self
            .inner
            .series
            .entry(channel_name.to_string())
            .or_default();

        if let Some(previous) = series.insert(timestamp, value) {
            log::debug!(
                "Overwrote {} at {} ms: {} -> {}",
                channel_name,
                timestamp,
                previous,
                value
            );
        }
        self.inner.timestamps.insert(timestamp);
    }

    /// Register a frame boundary that may carry no samples
    pub fn mark_timestamp(&mut self, timestamp: Millis) {
        self.inner.timestamps.insert(timestamp);
    }

    pub fn record_sample(&mut self, sample: Sample) {
        self.record(&sample.channel_name, sample.timestamp, sample.value);
    }

    /// Current view of the accumulated series
    pub fn series(&self) -> &ChannelSeries {
        &self.inner
    }

    /// Finish accumulation
    pub fn finish(self) -> ChannelSeries {
        self.inner
    }
}
