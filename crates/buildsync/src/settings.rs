use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use buildsync_fetch::{ClientOptions, DEFAULT_BASE_URL};
use buildsync_pipeline::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_SENTINELS, Layout, RetryPolicy, RunConfig,
    SentinelSet,
};
use buildsync_verify::ContentHash;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::Cli;

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "buildsync.toml";

/// Prefix of environment overrides, e.g. `BUILDSYNC_CONCURRENCY=64`.
pub const ENV_PREFIX: &str = "BUILDSYNC_";

/// Merged configuration: defaults, then file, then environment, then flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub start:           Option<u64>,
    pub end:             Option<u64>,
    pub platform:        String,
    pub generation:      u32,
    pub base_url:        String,
    pub concurrency:     usize,
    pub max_attempts:    u32,
    pub backoff_ms:      u64,
    pub retry_malformed: bool,
    pub output:          PathBuf,
    pub staging:         Option<PathBuf>,
    pub manifest:        Option<PathBuf>,
    pub sentinels:       Vec<String>,
    pub http:            HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs:         u64,
    pub connect_timeout_secs: u64,
    pub user_agent:           Option<String>,
    pub proxies:              Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start:           None,
            end:             None,
            platform:        "windows".to_string(),
            generation:      2,
            base_url:        DEFAULT_BASE_URL.to_string(),
            concurrency:     DEFAULT_CONCURRENCY,
            max_attempts:    DEFAULT_MAX_ATTEMPTS,
            backoff_ms:      0,
            retry_malformed: false,
            output:          PathBuf::from("."),
            staging:         None,
            manifest:        None,
            sentinels:       DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            http:            HttpSettings::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        let client = ClientOptions::default();
        Self {
            timeout_secs:         client.timeout.as_secs(),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            user_agent:           None,
            proxies:              Vec::new(),
        }
    }
}

impl Settings {
    /// Layered figment without CLI flags. A missing file is skipped.
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(cli: &Cli) -> Result<Self> {
        let config_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if cli.config.is_some() && !config_file.is_file() {
            return Err(anyhow!("config file {} not found", config_file.display()));
        }

        Self::figment(&config_file)
            .merge(Serialized::defaults(cli.overrides()))
            .extract()
            .with_context(|| format!("invalid configuration (file {})", config_file.display()))
    }

    pub fn run_config(&self) -> Result<RunConfig> {
        let start = self.start.context("no start id; pass --start or set `start`")?;
        let end = self.end.context("no end id; pass --end or set `end`")?;

        let mut layout = Layout::new(&self.output);
        if let Some(staging) = &self.staging {
            layout = layout.staging_root(staging);
        }
        if let Some(manifest) = &self.manifest {
            layout = layout.manifest_path(manifest);
        }

        let sentinels = self
            .sentinels
            .iter()
            .map(|s| s.parse::<ContentHash>().with_context(|| format!("invalid sentinel {s:?}")))
            .collect::<Result<SentinelSet>>()?;

        RunConfig::builder(start, end, self.platform.clone(), self.generation, layout)
            .base_url(self.base_url.clone())
            .concurrency(self.concurrency)
            .max_attempts(self.max_attempts)
            .backoff_base(Duration::from_millis(self.backoff_ms))
            .retry_policy(RetryPolicy {
                retry_malformed: self.retry_malformed,
            })
            .sentinels(sentinels)
            .build()
            .context("invalid run configuration")
    }

    pub fn client_options(&self) -> Result<ClientOptions> {
        let mut options = ClientOptions::default()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_secs));
        if let Some(agent) = &self.http.user_agent {
            options = options.user_agent(agent.clone());
        }
        for proxy in &self.http.proxies {
            let url = Url::parse(proxy).with_context(|| format!("invalid proxy {proxy:?}"))?;
            options = options.proxy(url);
        }
        Ok(options)
    }
}
