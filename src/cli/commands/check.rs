//! Check command implementation.
//!
//! `pkgprobe check <VERSION>...` probes every selected package of each
//! version and prints the grouped report.

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::ui::{format_summary, report_lines, UserInterface};
use crate::version::Version;

use super::context::{build_orchestrator, progress_to_bar, run_async, CommandContext};
use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    context: CommandContext,
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(context: CommandContext, args: CheckArgs) -> Self {
        Self { context, args }
    }

    fn versions(&self) -> Result<Vec<Version>> {
        self.args.versions.iter().map(|v| Version::parse(v)).collect()
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let versions = self.versions()?;
        let settings = self.context.settings()?;
        let filter = self.args.filter.to_filter();

        let mut spinner = ui.start_spinner(&format!("Checking {} versions", versions.len()));
        let mut orchestrator = build_orchestrator(&settings)?;
        if let Some(bar) = spinner.progress_bar() {
            orchestrator = orchestrator.with_progress(progress_to_bar(bar));
        }

        let run = match run_async(settings.deadline(), orchestrator.run(&versions, &filter)) {
            Ok(run) => run,
            Err(e) => {
                spinner.finish_error("Check failed");
                return Err(e);
            }
        };
        spinner.finish_clear();

        if self.args.json {
            let json = serde_json::to_string_pretty(&run.report).map_err(anyhow::Error::from)?;
            ui.message(&json);
        } else {
            let theme = ui.theme();
            for line in report_lines(&run, &theme, ui.output_mode()) {
                ui.message(&line);
            }
            ui.message("");
            let summary = format_summary(&run.summary, run.duration, &theme);
            if run.summary.all_found() {
                ui.success(&summary);
            } else {
                ui.warning(&summary);
            }
        }

        Ok(CommandResult::from_bool(run.summary.all_found()))
    }
}
