//! Recheck command implementation.

use crate::cli::args::RecheckArgs;
use crate::error::Result;
use crate::orchestrator::RecheckScope;
use crate::ui::{format_change, UserInterface};
use crate::version::BaseVersion;

use super::context::{build_orchestrator, run_async, CommandContext};
use super::dispatcher::{Command, CommandResult};

/// The recheck command implementation.
pub struct RecheckCommand {
    context: CommandContext,
    args: RecheckArgs,
}

impl RecheckCommand {
    pub fn new(context: CommandContext, args: RecheckArgs) -> Self {
        Self { context, args }
    }

    fn scope(&self) -> RecheckScope {
        if self.args.all {
            RecheckScope::All
        } else {
            RecheckScope::Latest(self.args.count)
        }
    }
}

impl Command for RecheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let base = BaseVersion::parse(&self.args.base)?;
        let settings = self.context.settings()?;
        let filter = self.args.filter.to_filter();
        let orchestrator = build_orchestrator(&settings)?;

        let mut spinner = ui.start_spinner(&format!("Rechecking {}", base));
        let changes = run_async(
            settings.deadline(),
            orchestrator.recheck(base, self.scope(), &filter),
        );
        spinner.finish_clear();
        let changes = changes?;

        if changes.is_empty() {
            ui.success(&format!("No changes in recorded builds of {}", base));
            return Ok(CommandResult::success());
        }

        let theme = ui.theme();
        for change in &changes {
            ui.message(&format_change(change, &theme));
        }
        ui.success(&format!("{} packages changed", changes.len()));
        Ok(CommandResult::success())
    }
}
