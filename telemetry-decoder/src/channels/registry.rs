//! Channel registry
//!
//! Maps the numeric channel ids written by the device to display names and the
//! linear conversion from raw counts to physical units.

use crate::types::{ChannelId, DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;

/// A channel definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDef {
    /// Channel id as written by the device
    pub id: ChannelId,
    /// Column name in the output table
    pub name: String,
    /// Scale factor applied to the raw value
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Offset added after scaling
    #[serde(default)]
    pub additive: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl ChannelDef {
    pub fn new(id: ChannelId, name: impl Into<String>, multiplier: f64, additive: f64) -> Self {
        Self {
            id,
            name: name.into(),
            multiplier,
            additive,
        }
    }

    /// Definition used for ids missing from the registry
    pub fn fallback(id: ChannelId) -> Self {
        Self::new(id, id.to_string(), 1.0, 0.0)
    }

    /// Convert a raw value to physical units
    pub fn scale(&self, raw_value: f64) -> f64 {
        raw_value * self.multiplier + self.additive
    }
}

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedChannel<'a> {
    /// The id is defined in the registry
    Known(&'a ChannelDef),
    /// The id is unknown; identity scaling under the stringified id
    Fallback(ChannelDef),
}

impl ResolvedChannel<'_> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolvedChannel::Fallback(_))
    }
}

impl Deref for ResolvedChannel<'_> {
    type Target = ChannelDef;

    fn deref(&self) -> &ChannelDef {
        match self {
            ResolvedChannel::Known(def) => def,
            ResolvedChannel::Fallback(def) => def,
        }
    }
}

/// Read-only set of channel definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: HashMap<ChannelId, ChannelDef>,
}

impl ChannelRegistry {
    /// Create an empty registry (every id resolves to its fallback)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate ids
    pub fn from_defs<I>(defs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ChannelDef>,
    {
        let mut channels = HashMap::new();
        for def in defs {
            let id = def.id;
            if channels.insert(id, def).is_some() {
                return Err(DecoderError::DuplicateChannel(id));
            }
        }
        Ok(Self { channels })
    }

    /// Resolve an id, synthesizing a fallback definition when it is unknown
    pub fn lookup(&self, id: ChannelId) -> ResolvedChannel<'_> {
        match self.channels.get(&id) {
            Some(def) => ResolvedChannel::Known(def),
            None => {
                log::warn!(
                    "Channel id {} has no definition, using '{}' with identity scaling",
                    id,
                    id
                );
                ResolvedChannel::Fallback(ChannelDef::fallback(id))
            }
        }
    }

    /// Get a definition without synthesizing a fallback
    pub fn get(&self, id: ChannelId) -> Option<&ChannelDef> {
        self.channels.get(&id)
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.channels.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// All definitions sorted by id
    pub fn definitions(&self) -> Vec<&ChannelDef> {
        let mut defs: Vec<&ChannelDef> = self.channels.values().collect();
        defs.sort_unstable_by_key(|def| def.id);
        defs
    }
}

/// Collects definitions keyed by id; a later duplicate replaces an earlier one
impl FromIterator<ChannelDef> for ChannelRegistry {
    fn from_iter<I: IntoIterator<Item = ChannelDef>>(defs: I) -> Self {
        Self {
            channels: defs.into_iter().map(|def| (def.id, def)).collect(),
        }
    }
}
