use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt, TestWriter};
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// How remap crates report what they do.
///
/// Events are emitted under `remap.index`, `remap.mapping`, `remap.progress` and
/// `remap.config`; `targets` raises or lowers any of them independently of `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "default_level")]
    pub level: String,

    /// Per-target levels, e.g. `"remap.index" = "trace"`.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,

    /// One JSON object per event instead of human readable lines.
    #[serde(default)]
    pub json: bool,

    #[serde(default = "default_stderr")]
    pub stderr: bool,

    /// Also append events to this file. An unopenable file is skipped.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_owned()
}

fn default_stderr() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            targets: BTreeMap::new(),
            json: false,
            stderr: default_stderr(),
            file: None,
        }
    }
}

/// `Warning` and friends spelled the way people write them in config files.
fn canonical_level(level: &str) -> Option<&'static str> {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => return None,
    };
    Some(level)
}

impl LoggingConfig {
    /// Directives from this config alone, most general first.
    pub fn directives(&self) -> Vec<String> {
        let base = self.level.trim();
        let base = match canonical_level(base) {
            Some(level) => level.to_owned(),
            None if base.is_empty() => default_level(),
            None => base.to_owned(),
        };

        let mut directives = vec![base];
        for (target, level) in &self.targets {
            let level = canonical_level(level).unwrap_or(level.trim());
            directives.push(format!("{target}={level}"));
        }
        directives
    }

    fn filter_from(directives: &[String]) -> Option<EnvFilter> {
        EnvFilter::try_new(directives.join(",")).ok()
    }

    /// The filter `init_tracing` installs. `RUST_LOG` directives, when set, come last and so
    /// override this config; invalid directives fall back to this config, then to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let own = self.directives();
        let from_env = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty());

        from_env
            .and_then(|env| {
                let mut combined = own.clone();
                combined.push(env);
                Self::filter_from(&combined)
            })
            .or_else(|| Self::filter_from(&own))
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }

    fn writer(&self) -> BoxMakeWriter {
        let file = self
            .file
            .as_ref()
            .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok())
            .map(Arc::new);

        // `TestWriter` prints through `eprint!`, so test harnesses capture it.
        let stderr = || {
            if cfg!(debug_assertions) {
                BoxMakeWriter::new(TestWriter::with_stderr)
            } else {
                BoxMakeWriter::new(std::io::stderr)
            }
        };
        match (self.stderr, file) {
            (true, Some(file)) => BoxMakeWriter::new(stderr().and(file)),
            (true, None) => stderr(),
            (false, Some(file)) => BoxMakeWriter::new(file),
            (false, None) => BoxMakeWriter::new(std::io::sink),
        }
    }
}

/// Installs the process-wide subscriber described by `config`.
///
/// Only the first call in a process does anything. A subscriber installed by an embedding
/// application is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let fmt = tracing_subscriber::fmt::layer()
            .with_writer(config.writer())
            .with_ansi(false);
        let fmt: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            fmt.json().boxed()
        } else {
            fmt.boxed()
        };

        let installed = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(fmt)
            .try_init();
        if installed.is_ok() {
            tracing::debug!(
                target: "remap.config",
                level = %config.level,
                "tracing initialized"
            );
        }
    });
}
