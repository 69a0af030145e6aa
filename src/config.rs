use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::font::FontResolver;
use crate::compose::orchestrator::ComposeOptions;
use crate::encode::image_out::{DEFAULT_JPEG_QUALITY, OutputFormat};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::style::registry::StyleRegistry;

/// Settings shared by every composition of a process.
///
/// Every field has a default, so an empty JSON object (or no file at all) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Render resolutions concurrently.
    pub parallel: bool,
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// `png` or `jpeg`.
    pub output_format: String,
    /// Quality used for JPEG output.
    pub jpeg_quality: u8,
    /// Extra directories scanned for font files.
    pub font_dirs: Vec<PathBuf>,
    /// JSON style overrides applied on top of the built-in presets.
    pub styles_path: Option<PathBuf>,
    /// Rotate requested resolutions to the base frame's orientation.
    pub match_orientation: bool,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (e.g. `info`, `autothumb=debug,warn`). `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit structured JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            output_format: "png".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            font_dirs: Vec::new(),
            styles_path: None,
            match_orientation: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> ThumbResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| ThumbError::config(format!("parse engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> ThumbResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ThumbResult<()> {
        if self.threads == Some(0) {
            return Err(ThumbError::config("'threads' must be >= 1 when set"));
        }
        self.output_format()?;
        Ok(())
    }

    /// Output format selected by `output_format` and `jpeg_quality`.
    pub fn output_format(&self) -> ThumbResult<OutputFormat> {
        OutputFormat::parse(&self.output_format, self.jpeg_quality)
    }

    /// Scheduling options for a [`Composer`](crate::Composer).
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            parallel: self.parallel,
            threads: self.threads,
            match_orientation: self.match_orientation,
        }
    }

    /// Built-in styles plus the overrides at `styles_path`, if set.
    pub fn style_registry(&self) -> ThumbResult<StyleRegistry> {
        let builtin = StyleRegistry::builtin();
        match &self.styles_path {
            Some(path) => builtin.with_overrides_path(path),
            None => Ok(builtin),
        }
    }

    /// System fonts plus `font_dirs`.
    pub fn font_resolver(&self) -> FontResolver {
        FontResolver::with_dirs(&self.font_dirs)
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `config.level`. Calling this more than once keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
