//! Cache command implementation.
//!
//! Provides `pkgprobe cache list`, `pkgprobe cache clear`, etc.

use clap::{Args, Subcommand};

use crate::cache::{AvailabilityCache, FamilySummary};
use crate::error::Result;
use crate::ui::{format_size, Table, UserInterface};
use crate::version::BaseVersion;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List stored version families.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete availability tables.
    Clear {
        /// Only this family (e.g. 7.5.0); every family when omitted.
        base: Option<String>,
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
    /// Show cache statistics.
    Stats,
}

/// The cache command implementation.
pub struct CacheCommand {
    context: CommandContext,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(context: CommandContext, args: CacheArgs) -> Self {
        Self { context, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = self.context.cache()?;

        match &self.args.command {
            CacheSubcommand::List { json } => list_cache(&cache, *json, ui)?,
            CacheSubcommand::Clear { base, force } => {
                let base = base.as_deref().map(BaseVersion::parse).transpose()?;
                clear_cache(&cache, base, *force, ui)?
            }
            CacheSubcommand::Stats => show_stats(&cache, ui)?,
        }

        Ok(CommandResult::success())
    }
}

fn summaries(cache: &AvailabilityCache) -> Result<Vec<FamilySummary>> {
    cache
        .families()?
        .into_iter()
        .map(|base| cache.summary(base))
        .collect()
}

fn list_cache(cache: &AvailabilityCache, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let summaries = summaries(cache)?;

    if json {
        let output = serde_json::to_string_pretty(&summaries).map_err(anyhow::Error::from)?;
        ui.message(&output);
        return Ok(());
    }

    if summaries.is_empty() {
        ui.message("Cache is empty");
        return Ok(());
    }

    let theme = ui.theme();
    let mut table = Table::new(&["Family", "Builds", "Rows", "Last checked", "Size", "Modified"]);
    for summary in &summaries {
        table.add_row([
            theme.highlight.apply_to(summary.base).to_string(),
            summary.versions.to_string(),
            summary.rows.to_string(),
            summary
                .last_checked
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_size(summary.size_bytes),
            summary
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    ui.message(&table.render());

    Ok(())
}

fn clear_cache(
    cache: &AvailabilityCache,
    base: Option<BaseVersion>,
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<()> {
    let families = cache.families()?;
    let count = match base {
        Some(base) => usize::from(families.contains(&base)),
        None => families.len(),
    };
    if count == 0 {
        ui.message("Nothing to clear");
        return Ok(());
    }

    if !force && ui.is_interactive() {
        let question = match base {
            Some(base) => format!("Clear the availability table for {}?", base),
            None => format!("Clear {} availability tables?", count),
        };
        if !ui.confirm(&question, false)? {
            ui.message("Cancelled");
            return Ok(());
        }
    }

    let cleared = cache.clear(base)?;
    ui.success(&format!("Cleared {} tables", cleared));
    Ok(())
}

fn show_stats(cache: &AvailabilityCache, ui: &mut dyn UserInterface) -> Result<()> {
    let summaries = summaries(cache)?;
    let rows: usize = summaries.iter().map(|s| s.rows).sum();
    let builds: usize = summaries.iter().map(|s| s.versions).sum();
    let size: u64 = summaries.iter().map(|s| s.size_bytes).sum();

    ui.message("Cache Statistics:\n");
    ui.message(&format!("  Families: {}", summaries.len()));
    ui.message(&format!("  Builds recorded: {}", builds));
    ui.message(&format!("  Rows: {}", rows));
    ui.message(&format!("  Total size: {}", format_size(size)));
    ui.message(&format!("  Location: {}", cache.root().display()));

    Ok(())
}
