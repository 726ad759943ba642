//! Lookup command implementation.
//!
//! Answers from the cache only; nothing is probed.

use crate::cache::Lookup;
use crate::cli::args::LookupArgs;
use crate::error::Result;
use crate::probe::Existence;
use crate::ui::UserInterface;
use crate::version::Version;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The lookup command implementation.
pub struct LookupCommand {
    context: CommandContext,
    args: LookupArgs,
}

impl LookupCommand {
    pub fn new(context: CommandContext, args: LookupArgs) -> Self {
        Self { context, args }
    }
}

impl Command for LookupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let version = Version::parse(&self.args.full_version)?;
        let cache = self.context.cache()?;

        let lookup = cache.lookup(
            &version,
            self.args.name.as_deref(),
            self.args.category.as_deref(),
        )?;
        let line = ui.theme().format_lookup(lookup);
        ui.message(&line);

        Ok(CommandResult::from_bool(
            lookup == Lookup::Recorded(Existence::Found),
        ))
    }
}
