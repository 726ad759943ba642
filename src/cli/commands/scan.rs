//! Scan command implementation.
//!
//! `pkgprobe scan <BASE>` looks for the newest build of a family with
//! every selected package published.

use crate::cli::args::ScanArgs;
use crate::error::Result;
use crate::orchestrator::RecheckScope;
use crate::scanner::{ScanOptions, VersionScanner};
use crate::ui::UserInterface;
use crate::version::BaseVersion;

use super::context::{build_orchestrator, progress_to_bar, run_async, CommandContext};
use super::dispatcher::{Command, CommandResult};

/// The scan command implementation.
pub struct ScanCommand {
    context: CommandContext,
    args: ScanArgs,
}

impl ScanCommand {
    pub fn new(context: CommandContext, args: ScanArgs) -> Self {
        Self { context, args }
    }

    fn options(&self) -> ScanOptions {
        let recheck = if self.args.no_recheck {
            None
        } else if self.args.recheck_all {
            Some(RecheckScope::All)
        } else {
            Some(
                self.args
                    .recheck
                    .map(RecheckScope::Latest)
                    .unwrap_or_default(),
            )
        };
        ScanOptions { recheck }
    }
}

impl Command for ScanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let base = BaseVersion::parse(&self.args.base)?;
        let settings = self.context.settings()?;
        let filter = self.args.filter.to_filter();

        let mut spinner = ui.start_spinner(&format!(
            "Scanning {} up to build {}",
            base, self.args.max_builds
        ));
        let mut orchestrator = build_orchestrator(&settings)?;
        if let Some(bar) = spinner.progress_bar() {
            orchestrator = orchestrator.with_progress(progress_to_bar(bar));
        }

        let scanner = VersionScanner::new(&orchestrator).with_options(self.options());
        let found = run_async(
            settings.deadline(),
            scanner.find_latest_fully_available(base, self.args.max_builds, &filter),
        );
        spinner.finish_clear();

        match found? {
            Some(version) => {
                ui.success(&format!("Latest fully available build: {}", version));
                Ok(CommandResult::success())
            }
            None => {
                ui.warning(&format!(
                    "No new fully available build of {} up to build {}",
                    base, self.args.max_builds
                ));
                Ok(CommandResult::failure(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::FilterArgs;

    fn args() -> ScanArgs {
        ScanArgs {
            base: "7.5.0".into(),
            max_builds: 200,
            recheck: None,
            recheck_all: false,
            no_recheck: false,
            filter: FilterArgs::default(),
        }
    }

    fn options(args: ScanArgs) -> ScanOptions {
        ScanCommand::new(CommandContext::default(), args).options()
    }

    #[test]
    fn recheck_defaults_to_latest_two() {
        assert_eq!(options(args()).recheck, Some(RecheckScope::Latest(2)));
    }

    #[test]
    fn recheck_flags_map_to_scopes() {
        let count = ScanArgs {
            recheck: Some(5),
            ..args()
        };
        assert_eq!(options(count).recheck, Some(RecheckScope::Latest(5)));

        let all = ScanArgs {
            recheck_all: true,
            ..args()
        };
        assert_eq!(options(all).recheck, Some(RecheckScope::All));

        let none = ScanArgs {
            no_recheck: true,
            ..args()
        };
        assert_eq!(options(none).recheck, None);
    }
}
