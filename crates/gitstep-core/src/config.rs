//! Configuration loading and discovery.
//!
//! Sources are layered with figment, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config: `~/.config/gitstep/config.<ext>`
//! 3. Project config: the nearest `.gitstep.<ext>` or `gitstep.<ext>` walking
//!    up from the working directory, stopping at a `.git` boundary
//! 4. Files passed explicitly (`--config`)
//!
//! `<ext>` is one of `toml`, `yaml`, `yml`, `json`.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use gitstep_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let config = ConfigLoader::new().with_project_search(&cwd).load().unwrap();
//! println!("{} commit types", config.commit_types().len());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Commit message template used when none is configured.
pub const DEFAULT_COMMIT_TEMPLATE: &str = "{type}{scope}{breaking}: {message}";

/// Branch name template used when none is configured.
pub const DEFAULT_BRANCH_TEMPLATE: &str = "{type}/{description}";

/// Branch prefixes offered when none are configured.
pub const DEFAULT_BRANCH_TYPES: &[&str] = &["feature", "fix", "chore", "docs", "refactor"];

const DEFAULT_COMMIT_TYPES: &[(&str, &str)] = &[
    ("feat", "A new feature"),
    ("fix", "A bug fix"),
    ("docs", "Documentation only changes"),
    ("style", "Formatting, missing semicolons, whitespace"),
    ("refactor", "A code change that neither fixes a bug nor adds a feature"),
    ("perf", "A code change that improves performance"),
    ("test", "Adding or correcting tests"),
    ("build", "Changes to the build system or dependencies"),
    ("ci", "Changes to CI configuration"),
    ("chore", "Other changes that don't modify src or test files"),
    ("revert", "Reverts a previous commit"),
];

/// The configuration for gitstep.
///
/// Every section is optional; accessors such as [`Config::commit_types`]
/// fill in defaults for whatever is left unset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// `gitstep commit` settings.
    pub commit: Option<CommitConfig>,
    /// `gitstep branch` settings.
    pub branch: Option<BranchConfig>,
    /// `gitstep pr` settings.
    pub pr: Option<PrConfig>,
}

/// Commit workflow settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommitConfig {
    /// Commit types offered at the type step, in display order.
    pub types: Option<Vec<CommitType>>,
    /// Known scopes. When empty, the scope step takes free text.
    pub scopes: Option<Vec<String>>,
    /// Message template.
    ///
    /// Supports `{type}`, `{scope}` (expands to `(scope)` or nothing),
    /// `{breaking}` (expands to `!` or nothing) and `{message}`.
    pub template: Option<String>,
    /// Ask for an extended body (default: `true`).
    pub body: Option<bool>,
}

/// A commit type and its one-line description.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommitType {
    /// The type as written in the message (e.g., `feat`).
    pub name: String,
    /// Shown next to the type in the picker.
    #[serde(default)]
    pub description: String,
}

impl CommitType {
    /// Create a commit type.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Branch workflow settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BranchConfig {
    /// Branch prefixes offered at the type step.
    pub types: Option<Vec<String>>,
    /// Name template. Supports `{type}` and `{description}` (slugified).
    pub template: Option<String>,
}

/// Pull request workflow settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrConfig {
    /// Candidate base branches. Defaults to the local branches.
    pub bases: Option<Vec<String>>,
    /// Always (`true`) or never (`false`) open drafts. Unset asks each time.
    pub draft: Option<bool>,
}

impl Config {
    /// A config with every section spelled out at its default value.
    ///
    /// Used as the starting point for a new config file.
    pub fn explicit_defaults() -> Self {
        let defaults = Self::default();
        Self {
            commit: Some(CommitConfig {
                types: Some(defaults.commit_types()),
                scopes: Some(Vec::new()),
                template: Some(DEFAULT_COMMIT_TEMPLATE.to_string()),
                body: Some(true),
            }),
            branch: Some(BranchConfig {
                types: Some(defaults.branch_types()),
                template: Some(DEFAULT_BRANCH_TEMPLATE.to_string()),
            }),
            pr: Some(PrConfig::default()),
            ..defaults
        }
    }

    /// Commit types to offer, falling back to the conventional set.
    pub fn commit_types(&self) -> Vec<CommitType> {
        self.commit
            .as_ref()
            .and_then(|c| c.types.clone())
            .filter(|types| !types.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_COMMIT_TYPES
                    .iter()
                    .map(|(name, description)| CommitType::new(*name, *description))
                    .collect()
            })
    }

    /// Configured commit scopes (possibly empty).
    pub fn commit_scopes(&self) -> &[String] {
        self.commit
            .as_ref()
            .and_then(|c| c.scopes.as_deref())
            .unwrap_or_default()
    }

    /// Commit message template.
    pub fn commit_template(&self) -> &str {
        self.commit
            .as_ref()
            .and_then(|c| c.template.as_deref())
            .unwrap_or(DEFAULT_COMMIT_TEMPLATE)
    }

    /// Whether the commit flow asks for a body.
    pub fn commit_body(&self) -> bool {
        self.commit.as_ref().and_then(|c| c.body).unwrap_or(true)
    }

    /// Branch prefixes to offer.
    pub fn branch_types(&self) -> Vec<String> {
        self.branch
            .as_ref()
            .and_then(|b| b.types.clone())
            .filter(|types| !types.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH_TYPES.iter().map(ToString::to_string).collect())
    }

    /// Branch name template.
    pub fn branch_template(&self) -> &str {
        self.branch
            .as_ref()
            .and_then(|b| b.template.as_deref())
            .unwrap_or(DEFAULT_BRANCH_TEMPLATE)
    }

    /// Configured PR base candidates, if any.
    pub fn pr_bases(&self) -> Option<&[String]> {
        self.pr
            .as_ref()
            .and_then(|p| p.bases.as_deref())
            .filter(|bases| !bases.is_empty())
    }

    /// Pinned draft setting, if any.
    pub fn pr_draft(&self) -> Option<bool> {
        self.pr.as_ref().and_then(|p| p.draft)
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "gitstep";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that includes user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/gitstep/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop the upward search at a directory containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load and merge every discovered source.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let sources = self.sources();
        for path in &sources {
            figment = merge_file(figment, path);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            sources = sources.len(),
            log_level = config.log_level.as_str(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but fails when no file was found at all.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        if self.sources().is_empty() {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    /// Config files in merge order (lowest precedence first).
    fn sources(&self) -> Vec<Utf8PathBuf> {
        let user = self
            .include_user_config
            .then(find_user_config)
            .flatten();
        let project = self
            .project_search_root
            .as_deref()
            .and_then(|root| self.find_project_config(root));

        user.into_iter()
            .chain(project)
            .chain(self.explicit_files.iter().cloned())
            .collect()
    }

    /// The directory holding the boundary marker is the last one searched,
    /// so a config at the repository root is found from any subdirectory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        for dir in start.ancestors() {
            let found = CONFIG_EXTENSIONS.iter().find_map(|ext| {
                [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")]
                    .into_iter()
                    .map(|name| dir.join(name))
                    .find(|path| path.is_file())
            });
            if found.is_some() {
                return found;
            }

            let at_boundary = self
                .boundary_marker
                .as_ref()
                .is_some_and(|marker| dir.join(marker).exists());
            if at_boundary {
                break;
            }
        }
        None
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let config_dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// Find the project config file path without loading it.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// The user config directory (`~/.config/gitstep/` on Linux).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// The local data directory (`~/.local/share/gitstep/` on Linux).
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}
