// Configuration loading and parsing (rollcall.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub draw: DrawConfig,
    pub partition: PartitionConfig,
    pub naming: NamingConfig,
    pub export: ExportConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// rollcall.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire rollcall.toml file.
#[derive(Debug, Clone, Deserialize)]
struct RollcallFile {
    draw: DrawConfig,
    partition: PartitionConfig,
    naming: NamingConfig,
    #[serde(default)]
    export: ExportConfig,
}

/// Timing of the rolling animation.
///
/// Tick `k` (1-based) is followed by a delay of
/// `initial_delay_ms + k * delay_step_ms`, so delays strictly increase and
/// the animation visibly slows before settling.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    pub initial_delay_ms: u64,
    pub delay_step_ms: u64,
    pub min_ticks: u32,
    pub max_ticks: u32,
    #[serde(default)]
    pub allow_duplicates: bool,
}

impl DrawConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn delay_step(&self) -> Duration {
        Duration::from_millis(self.delay_step_ms)
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            initial_delay_ms: 50,
            delay_step_ms: 10,
            min_ticks: 30,
            max_ticks: 49,
            allow_duplicates: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartitionConfig {
    pub default_group_size: usize,
    /// Cosmetic pause between pressing "generate" and publishing groups.
    pub pacing_delay_ms: u64,
}

impl PartitionConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            default_group_size: 4,
            pacing_delay_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl NamingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 512,
            timeout_secs: 20,
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

/// Where CSV exports are written. An empty `dir` means "the user's download
/// directory".
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub dir: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/rollcall.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- rollcall.toml (required) ---
    let main_path = config_dir.join("rollcall.toml");
    let main_text = read_file(&main_path)?;
    let file: RollcallFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        draw: file.draw,
        partition: file.partition,
        naming: file.naming,
        export: file.export,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` with every file from `defaults/` it doesn't have yet.
///
/// `.example` templates are left alone. Returns the paths that were created.
/// A missing `defaults/` is fine as long as `config/` exists.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, false) => {
            return Err(copy_error(format!(
                "neither defaults/ nor config/ directory found in {}; \
                 run from the project root or ensure defaults/ is present",
                base_dir.display()
            )));
        }
        (false, true) => return Ok(Vec::new()),
        _ => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", defaults_dir.display())))?;

    let mut seeded = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        let target = config_dir.join(name);
        if source.extension().is_some_and(|ext| ext == "example") || target.exists() {
            continue;
        }

        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        debug!("Seeded {} from defaults", target.display());
        seeded.push(target);
    }

    Ok(seeded)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let draw = &config.draw;
    if draw.min_ticks == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.min_ticks".into(),
            message: "must be greater than 0".into(),
        });
    }
    if draw.delay_step_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.delay_step_ms".into(),
            message: "must be greater than 0 so the draw slows down".into(),
        });
    }
    if draw.max_ticks < draw.min_ticks {
        return Err(ConfigError::ValidationError {
            field: "draw.max_ticks".into(),
            message: format!(
                "must be >= draw.min_ticks ({}), got {}",
                draw.min_ticks, draw.max_ticks
            ),
        });
    }

    if config.partition.default_group_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "partition.default_group_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.naming.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "naming.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }
    if config.naming.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "naming.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
