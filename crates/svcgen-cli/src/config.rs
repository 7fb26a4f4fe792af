//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the values it needs
//! (deploy policy, tidy policy, commands), passed explicitly.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `SVCGEN__SECTION__KEY`
//! 3. Config file: `--config`, else `./.svcgen.toml`, else the user config dir
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use svcgen_adapters::process::DEFAULT_FORMAT_COMMAND;
use svcgen_core::{
    application::{DEFAULT_TIDY_COMMAND, TidyPolicy},
    domain::{DeployPolicy, DomainError},
};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".svcgen.toml";

const ENV_PREFIX: &str = "SVCGEN";
const ENV_SEPARATOR: &str = "__";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workspace: WorkspaceConfig,
    pub deploy: DeployConfig,
    pub post_generation: PostGenerationConfig,
    pub templates: TemplateConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Monorepo root. Relative paths are taken from the current directory.
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub primary_region: String,
    pub standby_regions: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            primary_region: DeployPolicy::DEFAULT_PRIMARY.into(),
            standby_regions: DeployPolicy::DEFAULT_STANDBYS.map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostGenerationConfig {
    pub tidy_command: String,
    pub tidy_policy: TidyPolicy,
    pub format_command: String,
    pub format_extensions: Vec<String>,
}

impl Default for PostGenerationConfig {
    fn default() -> Self {
        Self {
            tidy_command: DEFAULT_TIDY_COMMAND.into(),
            tidy_policy: TidyPolicy::default(),
            format_command: DEFAULT_FORMAT_COMMAND.into(),
            format_extensions: vec!["go".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory whose template sets replace the built-in ones by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the
    /// environment.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist.  The implicit locations are optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&AppConfig::default())
                .context("failed to serialise default configuration")?,
        );

        if let Some(path) = Self::source_path(config_file) {
            tracing::debug!(path = %path.display(), "reading configuration file");
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(config_file.is_some()),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("deploy.standby_regions")
                .with_list_parse_key("post_generation.format_extensions")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize::<AppConfig>()
            .context("invalid configuration")?;
        Ok(config)
    }

    /// The file `load` reads, if any.
    pub fn source_path(config_file: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(path) = config_file {
            return Some(path.clone());
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        Some(Self::config_path()).filter(|p| p.is_file())
    }

    /// Path of the user-level configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.svcgen.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "svcgen", "svcgen")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Workspace root, with `--workspace` taking precedence.
    pub fn workspace_root(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace.root.clone())
    }

    pub fn deploy_policy(&self) -> Result<DeployPolicy, DomainError> {
        DeployPolicy::new(
            self.deploy.primary_region.clone(),
            self.deploy.standby_regions.iter().cloned(),
        )
    }

    /// Look up a dotted key such as `deploy.primary_region`.
    ///
    /// Scalars are returned bare; tables and arrays as compact JSON.
    pub fn get(&self, key: &str) -> Option<String> {
        let root = serde_json::to_value(self).ok()?;
        let value = key
            .split('.')
            .try_fold(&root, |node, segment| node.get(segment))?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
