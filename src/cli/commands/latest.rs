//! Latest command implementation.

use crate::cli::args::LatestArgs;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::version::BaseVersion;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The latest command implementation.
pub struct LatestCommand {
    context: CommandContext,
    args: LatestArgs,
}

impl LatestCommand {
    pub fn new(context: CommandContext, args: LatestArgs) -> Self {
        Self { context, args }
    }
}

impl Command for LatestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let base = BaseVersion::parse(&self.args.base)?;
        let cache = self.context.cache()?;

        let latest = cache.last_version_with_status(
            base,
            self.args.name.as_deref(),
            self.args.category.as_deref(),
            !self.args.any,
        )?;

        match latest {
            Some(version) => {
                ui.message(&version.to_string());
                Ok(CommandResult::success())
            }
            None => {
                ui.warning(&format!("No recorded build of {} matches", base));
                Ok(CommandResult::failure(1))
            }
        }
    }
}
