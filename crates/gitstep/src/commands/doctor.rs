//! Doctor command: diagnose configuration and environment.

use clap::Args;
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use gitstep_core::config::{self, Config};
use gitstep_core::{git, github, template};

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct DoctorReport {
    directories: DirectoryPaths,
    config: ConfigStatus,
    tools: ToolStatus,
    environment: EnvironmentInfo,
}

#[derive(Serialize)]
struct DirectoryPaths {
    config: Option<String>,
    data_local: Option<String>,
}

#[derive(Serialize)]
struct ConfigStatus {
    /// Path to the project config file, if any
    file: Option<String>,
    /// Whether a config file was found
    found: bool,
    /// Template placeholders gitstep will not expand
    unknown_placeholders: Vec<String>,
}

#[derive(Serialize)]
struct ToolStatus {
    git: bool,
    gh: bool,
    inside_repo: bool,
}

#[derive(Serialize)]
struct EnvironmentInfo {
    /// Current working directory
    cwd: String,
    /// Relevant environment variables
    env_vars: Vec<EnvVar>,
}

#[derive(Serialize)]
struct EnvVar {
    name: &'static str,
    value: Option<String>,
    description: &'static str,
}

impl DoctorReport {
    fn gather(config: &Config, cwd: &camino::Utf8Path) -> Self {
        let config_file = config::find_project_config(cwd);
        let git_found = git::git_available();

        let mut unknown = template::unknown_placeholders(config.commit_template(), template::COMMIT_VARS);
        unknown.extend(template::unknown_placeholders(
            config.branch_template(),
            template::BRANCH_VARS,
        ));

        let env_var = |name: &'static str, description: &'static str| EnvVar {
            name,
            value: std::env::var(name).ok(),
            description,
        };

        Self {
            directories: DirectoryPaths {
                config: config::user_config_dir().map(|p| p.to_string()),
                data_local: config::user_data_local_dir().map(|p| p.to_string()),
            },
            config: ConfigStatus {
                found: config_file.is_some(),
                file: config_file.map(|p| p.to_string()),
                unknown_placeholders: unknown,
            },
            tools: ToolStatus {
                git: git_found,
                gh: github::gh_available(),
                inside_repo: git_found && git::is_inside_repo().unwrap_or(false),
            },
            environment: EnvironmentInfo {
                cwd: cwd.to_string(),
                env_vars: vec![
                    env_var("XDG_CONFIG_HOME", "Override config directory"),
                    env_var("XDG_DATA_HOME", "Override data directory"),
                    env_var("RUST_LOG", "Log filter directive"),
                    env_var("GITSTEP_LOG_PATH", "Explicit log file path"),
                    env_var("GITSTEP_LOG_DIR", "Log directory"),
                ],
            },
        }
    }
}

/// Run diagnostics and report configuration status.
#[instrument(name = "cmd_doctor", skip_all, fields(json_output))]
pub fn cmd_doctor(
    _args: DoctorArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing doctor command");

    let spinner = super::spinner("Gathering diagnostics...");
    let report = DoctorReport::gather(config, cwd);
    spinner.finish_and_clear();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Configuration".bold().underline());
    if report.config.found {
        println!(
            "  {} Config file: {}",
            "✓".green(),
            report.config.file.as_deref().unwrap_or("").cyan()
        );
    } else {
        println!("  {} No project config file found", "○".yellow());
        offer_config_creation()?;
    }
    for name in &report.config.unknown_placeholders {
        println!("  {} Template placeholder {{{name}}} will not be expanded", "!".yellow());
    }
    println!();

    println!("{}", "Tools".bold().underline());
    print_check("git", report.tools.git, "required");
    print_check("gh", report.tools.gh, "needed for `gitstep pr`");
    print_check("inside a repository", report.tools.inside_repo, "run from a git work tree");
    println!();

    println!("{}", "Directories".bold().underline());
    print_dir("  Config", report.directories.config.as_deref());
    print_dir("  Data (local)", report.directories.data_local.as_deref());
    println!();

    println!("{}", "Environment".bold().underline());
    println!("  {}: {}", "Working directory".dimmed(), cwd.cyan());
    let set_vars: Vec<_> = report
        .environment
        .env_vars
        .iter()
        .filter(|v| v.value.is_some())
        .collect();
    if set_vars.is_empty() {
        println!("  {} No XDG/logging overrides set", "○".dimmed());
    } else {
        for var in set_vars {
            println!(
                "  {}: {} {}",
                var.name.dimmed(),
                var.value.as_deref().unwrap_or("").cyan(),
                format!("({})", var.description).dimmed()
            );
        }
    }

    Ok(())
}

fn print_check(label: &str, ok: bool, hint: &str) {
    if ok {
        println!("  {} {label}", "✓".green());
    } else {
        println!("  {} {label} {}", "✗".red(), format!("({hint})").dimmed());
    }
}

fn print_dir(label: &str, path: Option<&str>) {
    print!("{}: ", label.dimmed());
    match path {
        Some(p) => println!("{}", p.cyan()),
        None => println!("{}", "(unavailable)".yellow()),
    }
}

/// Offer to write a starter user config when none exists.
fn offer_config_creation() -> anyhow::Result<()> {
    let Some(config_dir) = config::user_config_dir() else {
        return Ok(());
    };
    let config_path = config_dir.join("config.yaml");
    if config_path.exists() || !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Ok(());
    }

    let create = Confirm::new("Create a starter config file?")
        .with_default(false)
        .with_help_message(&format!("Will create {config_path}"))
        .prompt();

    if let Ok(true) = create {
        std::fs::create_dir_all(&config_dir)?;
        let yaml = serde_saphyr::to_string(&Config::explicit_defaults())?;
        std::fs::write(&config_path, yaml)?;
        println!("  {} Created {}", "✓".green(), config_path.cyan());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitstep_core::config::CommitConfig;

    fn test_cwd() -> camino::Utf8PathBuf {
        camino::Utf8PathBuf::from("/tmp")
    }

    #[test]
    fn test_cmd_doctor_json_succeeds() {
        assert!(cmd_doctor(DoctorArgs::default(), true, &Config::default(), &test_cwd()).is_ok());
    }

    #[test]
    fn report_flags_unknown_placeholders() {
        let config = Config {
            commit: Some(CommitConfig {
                template: Some("{type}: {message} ({ticket})".into()),
                ..CommitConfig::default()
            }),
            ..Config::default()
        };
        let report = DoctorReport::gather(&config, &test_cwd());
        assert_eq!(report.config.unknown_placeholders, ["ticket"]);
    }

    #[test]
    fn starter_config_serializes() {
        let yaml = serde_saphyr::to_string(&Config::explicit_defaults()).unwrap();
        assert!(yaml.contains("feat"));
        assert!(yaml.contains("{type}"));
    }
}
