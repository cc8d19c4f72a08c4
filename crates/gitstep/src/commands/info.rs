//! Info command: show package, configuration, and repository information.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use gitstep_core::config::{self, Config};
use gitstep_core::git;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: &'static str,
    commit_types: Vec<String>,
    commit_scopes: Vec<String>,
    commit_template: String,
    branch_types: Vec<String>,
    branch_template: String,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            commit_types: config.commit_types().into_iter().map(|t| t.name).collect(),
            commit_scopes: config.commit_scopes().to_vec(),
            commit_template: config.commit_template().to_string(),
            branch_types: config.branch_types(),
            branch_template: config.branch_template().to_string(),
        }
    }
}

#[derive(Serialize)]
struct RepoInfo {
    inside_repo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_branch: Option<String>,
}

impl RepoInfo {
    fn gather() -> Self {
        let inside_repo = git::is_inside_repo().unwrap_or(false);
        if !inside_repo {
            return Self {
                inside_repo,
                branch: None,
                default_branch: None,
            };
        }
        Self {
            inside_repo,
            branch: git::current_branch().ok().flatten(),
            default_branch: git::detect_default_branch().ok().flatten(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    repository: RepoInfo,
}

/// Print package information.
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
        repository: RepoInfo::gather(),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", info.package.name.bold(), info.package.version.green());
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), info.package.license);
    }
    if !info.package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), info.package.repository.cyan());
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    match &info.config.config_file {
        Some(path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    println!("{}: {}", "Log level".dimmed(), info.config.log_level);
    println!("{}: {}", "Commit types".dimmed(), info.config.commit_types.join(", "));
    if !info.config.commit_scopes.is_empty() {
        println!("{}: {}", "Commit scopes".dimmed(), info.config.commit_scopes.join(", "));
    }
    println!("{}: {}", "Commit template".dimmed(), info.config.commit_template.cyan());
    println!("{}: {}", "Branch types".dimmed(), info.config.branch_types.join(", "));
    println!("{}: {}", "Branch template".dimmed(), info.config.branch_template.cyan());

    println!();
    println!("{}", "Repository".bold().underline());
    if info.repository.inside_repo {
        let branch = info.repository.branch.as_deref().unwrap_or("(detached HEAD)");
        println!("{}: {}", "Branch".dimmed(), branch.cyan());
        if let Some(default) = &info.repository.default_branch {
            println!("{}: {}", "Default branch".dimmed(), default.cyan());
        }
    } else {
        println!("  {} {}", "○".yellow(), "Not inside a git repository".yellow());
    }

    Ok(())
}
