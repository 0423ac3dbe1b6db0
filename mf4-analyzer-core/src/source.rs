//! Raw channel sources
//!
//! The analyzer never decodes the binary measurement format itself. A
//! [`ChannelSource`] hands out decoded channels by name; the pipeline asks
//! for each channel once and caches the result for the run.

use crate::config::SignalDefinition;
use crate::expression::raw_tokens;
use crate::types::{AnalyzerError, RawChannel, Result};
use std::collections::HashMap;

/// Anything that can produce a decoded channel by name
pub trait ChannelSource {
    /// Fetch one channel. Failing for one channel is not fatal to the run.
    fn get(&self, channel: &str) -> Result<RawChannel>;

    /// Names of all channels this source can produce
    fn channel_names(&self) -> Vec<String>;
}

/// In-memory source for already decoded data
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    channels: HashMap<String, RawChannel>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a channel
    pub fn insert(&mut self, name: impl Into<String>, channel: RawChannel) {
        self.channels.insert(name.into(), channel);
    }

    /// Builder method: add a channel
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        timestamps: Vec<f64>,
        samples: Vec<f64>,
        unit: &str,
    ) -> Self {
        self.insert(name, RawChannel::new(timestamps, samples, unit));
        self
    }
}

impl ChannelSource for MemorySource {
    fn get(&self, channel: &str) -> Result<RawChannel> {
        self.channels
            .get(channel)
            .cloned()
            .ok_or_else(|| AnalyzerError::ChannelNotFound(channel.to_string()))
    }

    fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Per-run cache of raw channels, keyed by alias
#[derive(Debug, Clone, Default)]
pub struct RawChannels {
    channels: HashMap<String, RawChannel>,
}

impl RawChannels {
    /// Fetch every alias referenced by the definitions, once each
    ///
    /// Tokens that are not known aliases are ignored. A channel the source
    /// cannot produce is logged and left out, so dependents later fail with
    /// a missing-signal skip.
    pub fn load(
        definitions: &[SignalDefinition],
        aliases: &HashMap<String, String>,
        source: &dyn ChannelSource,
    ) -> Self {
        let mut channels = HashMap::new();
        let mut failed: Vec<&str> = Vec::new();

        for definition in definitions {
            for token in raw_tokens(&definition.signal) {
                if channels.contains_key(token) || failed.contains(&token) {
                    continue;
                }
                let Some(channel_name) = aliases.get(token) else {
                    continue;
                };
                match source.get(channel_name) {
                    Ok(channel) if channel.is_empty() => {
                        log::warn!("Channel '{}' ({}) has no samples", token, channel_name);
                        failed.push(token);
                    }
                    Ok(channel) => {
                        log::debug!(
                            "Loaded channel '{}' from '{}' ({} samples)",
                            token,
                            channel_name,
                            channel.len()
                        );
                        channels.insert(token.to_string(), channel);
                    }
                    Err(e) => {
                        log::warn!("Failed to load: {} -> {}", token, e);
                        failed.push(token);
                    }
                }
            }
        }

        Self { channels }
    }

    /// Look up a cached channel by alias
    pub fn get(&self, alias: &str) -> Option<&RawChannel> {
        self.channels.get(alias)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
