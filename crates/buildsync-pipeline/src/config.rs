use std::ops::RangeInclusive;
use std::time::Duration;

use buildsync_fetch::{DEFAULT_BASE_URL, ItemId};
use buildsync_manifest::PathScheme;
use thiserror::Error;

use crate::error::RetryPolicy;
use crate::layout::Layout;
use crate::stage::SentinelSet;

/// Simultaneously in-flight items when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 500;

/// Attempts per item when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound on the delay between two attempts at one item.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start id {start} is greater than end id {end}")]
    InvertedRange { start: ItemId, end: ItemId },

    #[error("platform must not be empty")]
    EmptyPlatform,

    #[error("platform {0:?} must not contain '/', '?' or '#'")]
    InvalidPlatform(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("max attempts must be at least 1")]
    ZeroAttempts,
}

/// Everything one run needs, validated once at construction.
#[derive(Debug, Clone)]
pub struct RunConfig {
    start:        ItemId,
    end:          ItemId,
    platform:     String,
    generation:   u32,
    base_url:     String,
    concurrency:  usize,
    max_attempts: u32,
    backoff_base: Duration,
    retry_policy: RetryPolicy,
    layout:       Layout,
    sentinels:    SentinelSet,
}

impl RunConfig {
    /// Start a builder for the inclusive range `start..=end`.
    pub fn builder(
        start: ItemId,
        end: ItemId,
        platform: impl Into<String>,
        generation: u32,
        layout: Layout,
    ) -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                start,
                end,
                platform: platform.into(),
                generation,
                base_url: DEFAULT_BASE_URL.to_string(),
                concurrency: DEFAULT_CONCURRENCY,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                backoff_base: Duration::ZERO,
                retry_policy: RetryPolicy::default(),
                layout,
                sentinels: SentinelSet::default(),
            },
        }
    }

    pub fn ids(&self) -> RangeInclusive<ItemId> { self.start..=self.end }

    /// Number of ids in the range.
    pub fn item_count(&self) -> u64 { (self.end - self.start).saturating_add(1) }

    pub fn platform(&self) -> &str { &self.platform }

    pub fn generation(&self) -> u32 { self.generation }

    pub fn scheme(&self) -> PathScheme { PathScheme::new(self.platform.clone(), self.generation) }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn concurrency(&self) -> usize { self.concurrency }

    pub fn max_attempts(&self) -> u32 { self.max_attempts }

    pub fn backoff_base(&self) -> Duration { self.backoff_base }

    pub fn retry_policy(&self) -> RetryPolicy { self.retry_policy }

    pub fn layout(&self) -> &Layout { &self.layout }

    pub fn sentinels(&self) -> &SentinelSet { &self.sentinels }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::InvertedRange {
                start: self.start,
                end:   self.end,
            });
        }
        if self.platform.is_empty() {
            return Err(ConfigError::EmptyPlatform);
        }
        if self.platform.contains(['/', '?', '#']) {
            return Err(ConfigError::InvalidPlatform(self.platform.clone()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Base of the exponential delay between attempts. Zero retries immediately.
    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.config.backoff_base = base;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    pub fn sentinels(mut self, sentinels: SentinelSet) -> Self {
        self.config.sentinels = sentinels;
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
