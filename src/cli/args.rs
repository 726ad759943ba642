//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::catalog::TargetFilter;
use crate::config::ConfigOverrides;
use crate::probe::Concurrency;

use super::commands::cache::CacheArgs;

/// pkgprobe - Check which release artifacts exist on a download host.
#[derive(Debug, Parser)]
#[command(name = "pkgprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .pkgprobe/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that override config files and `PKGPROBE_*` variables.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct OverrideArgs {
    /// Download host substituted for {host}
    #[arg(long, global = true, value_name = "URL")]
    pub host: Option<String>,

    /// Package catalog file (YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Directory holding availability tables
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Probes in flight at once (a number or "unlimited")
    #[arg(long, global = true, value_name = "N")]
    pub max_concurrency: Option<Concurrency>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Retries after the first attempt
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Give up on the whole command after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub deadline: Option<u64>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            catalog: self.catalog.clone(),
            cache_dir: self.cache_dir.clone(),
            max_concurrency: self.max_concurrency,
            timeout_seconds: self.timeout,
            max_retries: self.max_retries,
            deadline_seconds: self.deadline,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Probe every package of one or more versions
    Check(CheckArgs),

    /// Find the newest build of a family with every package published
    Scan(ScanArgs),

    /// Probe recorded builds again and record what changed
    Recheck(RecheckArgs),

    /// Show what the cache knows about a version
    Lookup(LookupArgs),

    /// Show the newest recorded build with a given status
    Latest(LatestArgs),

    /// Manage availability tables
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Package selection shared by probing and lookup commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Only packages in these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Only packages with these names (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub name: Vec<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> TargetFilter {
        TargetFilter::new(self.category.clone(), self.name.clone())
    }
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Full versions to probe (e.g. 7.5.0.12)
    #[arg(required = true, value_name = "VERSION")]
    pub versions: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the grouped report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `scan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ScanArgs {
    /// Version family to scan (e.g. 7.5.0)
    #[arg(value_name = "BASE")]
    pub base: String,

    /// Highest build number to consider
    #[arg(long, default_value_t = 200)]
    pub max_builds: u32,

    /// Recheck this many of the newest recorded builds first
    #[arg(long, value_name = "N", conflicts_with_all = ["recheck_all", "no_recheck"])]
    pub recheck: Option<usize>,

    /// Recheck every recorded build first
    #[arg(long, conflicts_with = "no_recheck")]
    pub recheck_all: bool,

    /// Skip the recheck of recorded builds
    #[arg(long)]
    pub no_recheck: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for the `recheck` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RecheckArgs {
    /// Version family (e.g. 7.5.0)
    #[arg(value_name = "BASE")]
    pub base: String,

    /// Number of newest recorded builds to recheck
    #[arg(long, default_value_t = 2, conflicts_with = "all")]
    pub count: usize,

    /// Recheck every recorded build
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for the `lookup` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LookupArgs {
    /// Full version (e.g. 7.5.0.12)
    #[arg(value_name = "VERSION")]
    pub full_version: String,

    /// Package name
    #[arg(long)]
    pub name: Option<String>,

    /// Package category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `latest` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LatestArgs {
    /// Version family (e.g. 7.5.0)
    #[arg(value_name = "BASE")]
    pub base: String,

    /// Package name
    #[arg(long)]
    pub name: Option<String>,

    /// Package category
    #[arg(long)]
    pub category: Option<String>,

    /// Accept a build where any matching package was found
    #[arg(long)]
    pub any: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
