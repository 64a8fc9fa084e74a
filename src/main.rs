use std::cmp::Ordering;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};

use dep_version::config::Config;
use dep_version::version::semver::{
    calculate_latest_major, calculate_latest_minor, calculate_latest_patch, find_max,
    sort_versions, to_semver,
};
use dep_version::version::{DepVersion, Requirement};

#[derive(Parser)]
#[command(name = "dep-version")]
#[command(version, about = "Validate, compare and match dep version strings")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether each version string is valid
    Check {
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Print `<`, `=` or `>` for the ordering of two versions
    Compare { left: String, right: String },
    /// Check whether a version satisfies a constraint such as ">= 1.0.0"
    Satisfies { version: String, constraint: String },
    /// Print valid versions in ascending order
    Sort { versions: Vec<String> },
    /// Print the latest patch, minor and major versions newer than CURRENT
    Latest {
        current: String,
        available: Vec<String>,
    },
    /// Print how a version string is interpreted, as JSON
    Show { version: String },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _guard = dep_version::logging::init(&config.log)?;
    debug!("Loaded config: {:?}", config);

    match cli.command {
        Command::Check { versions } => {
            let mut all_valid = true;
            for version in &versions {
                let valid = DepVersion::is_valid(version);
                all_valid &= valid;
                println!("{}\t{}", version, if valid { "valid" } else { "invalid" });
            }
            Ok(exit_code(all_valid))
        }
        Command::Compare { left, right } => {
            let symbol = match DepVersion::new(left).cmp(&DepVersion::new(right)) {
                Ordering::Less => "<",
                Ordering::Equal => "=",
                Ordering::Greater => ">",
            };
            println!("{}", symbol);
            Ok(ExitCode::SUCCESS)
        }
        Command::Satisfies {
            version,
            constraint,
        } => {
            let requirement = Requirement::parse(&constraint)
                .with_context(|| format!("Invalid constraint '{}'", constraint))?;
            let satisfied = requirement.is_satisfied_by(&DepVersion::new(version));
            println!("{}", satisfied);
            Ok(exit_code(satisfied))
        }
        Command::Sort { versions } => {
            let sorted = sort_versions(&versions);
            info!("Sorted {} of {} versions", sorted.len(), versions.len());
            sorted
                .iter()
                .filter(|v| config.versions.include_prereleases || !v.is_prerelease())
                .for_each(|v| println!("{}", v));
            Ok(ExitCode::SUCCESS)
        }
        Command::Latest { current, available } => {
            let lines = [
                ("patch", calculate_latest_patch(&current, &available)),
                ("minor", calculate_latest_minor(&current, &available)),
                ("major", calculate_latest_major(&current, &available)),
                (
                    "max",
                    find_max(&available, config.versions.include_prereleases),
                ),
            ];
            for (label, version) in lines {
                if let Some(version) = version {
                    println!("{}\t{}", label, version);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { version } => {
            let parsed = DepVersion::new(version.as_str());
            let output = json!({
                "original": parsed.original(),
                "display": parsed.to_string(),
                "valid": DepVersion::is_valid(&version),
                "prerelease": parsed.prerelease(),
                "incompatible": parsed.is_incompatible(),
                "pseudoVersion": parsed.is_pseudo_version(),
                "semver": to_semver(&parsed).map(|v| v.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
