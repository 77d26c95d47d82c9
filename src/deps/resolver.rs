//! The startup dependency check.
//!
//! [`resolve`] walks an explicit state machine:
//!
//! ```text
//! Checking ──(nothing missing)──▶ AllPresent
//!    │
//!    ▼
//! ReportingMissing ──(--no-install / no terminal)──────────────▶ Exiting
//!    │
//!    ▼
//! AwaitingUserChoice ──(anything but "y")──────────────────────▶ Exiting
//!    │
//!    ▼
//! Installing ──(unavailable / failed / error / installed)──────▶ Exiting
//! ```
//!
//! Once something is missing the run always ends in `Exiting`, even after a
//! successful install: the libraries are only picked up by a fresh process.

use crate::error::ViewerError;
use crate::ui::Console;

use super::installer::{InstallCommand, Installer, PackageManager};
use super::locate::Locator;
use super::{Dependency, DependencySpec};

/// Exit status for every path that found a missing dependency.
pub const EXIT_MISSING: u8 = 1;

/// Caller-controlled switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// `false` when `--no-install` was given.
    pub auto_install: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { auto_install: true }
    }
}

/// Collaborators the resolver talks to.
pub struct ResolverContext<'a> {
    pub locator: &'a dyn Locator,
    pub installer: &'a dyn Installer,
    pub ui: &'a mut dyn Console,
    pub manager: PackageManager,
    /// Whether the process already runs as root.
    pub elevated: bool,
}

/// States of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Checking,
    ReportingMissing,
    AwaitingUserChoice,
    Installing,
    Exiting,
}

/// Why a run that found missing dependencies ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// `--no-install` was given.
    InstallSkipped,
    /// No terminal to ask on.
    NonInteractive,
    /// The user answered anything other than `y`.
    Declined,
    /// The package manager (or `sudo`) is not on PATH.
    InstallerUnavailable,
    /// The installer exited non-zero.
    InstallFailed { code: Option<i32> },
    /// The installer could not be run at all.
    InstallError { message: String },
    /// The installer succeeded; a restart is required.
    Installed,
}

/// Terminal record of a run that found missing dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub missing: Vec<Dependency>,
    pub command: InstallCommand,
    pub reason: ExitReason,
    /// Every state visited, ending in [`State::Exiting`].
    pub trail: Vec<State>,
}

impl Exit {
    pub fn code(&self) -> u8 {
        EXIT_MISSING
    }

    pub fn installer_invoked(&self) -> bool {
        matches!(
            self.reason,
            ExitReason::InstallFailed { .. }
                | ExitReason::InstallError { .. }
                | ExitReason::Installed
        )
    }
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everything was found; the caller may continue.
    AllPresent,
    /// Something was missing; the caller must exit with [`Exit::code`].
    MissingAndExited(Exit),
}

/// Check every entry of `spec` and handle whatever is missing.
pub fn resolve(
    spec: &DependencySpec,
    options: ResolveOptions,
    ctx: &mut ResolverContext<'_>,
) -> Outcome {
    let mut trail = Vec::new();
    let mut state = State::Checking;
    let mut missing: Vec<Dependency> = Vec::new();
    let mut command: Option<InstallCommand> = None;
    let mut reason = ExitReason::NonInteractive;

    loop {
        trail.push(state);
        tracing::debug!("Resolver state: {:?}", state);

        state = match state {
            State::Checking => {
                missing = find_missing(spec, ctx.locator);
                if missing.is_empty() {
                    tracing::debug!("All {} runtime dependencies found", spec.len());
                    return Outcome::AllPresent;
                }
                State::ReportingMissing
            }
            State::ReportingMissing => {
                let cmd = InstallCommand::new(
                    ctx.manager,
                    missing.iter().map(|d| &d.package),
                    ctx.elevated,
                );
                report_missing(&missing, &cmd, ctx);
                command = Some(cmd);

                if !options.auto_install {
                    ctx.ui.message("Skipping installation due to --no-install flag.");
                    reason = ExitReason::InstallSkipped;
                    State::Exiting
                } else if !ctx.ui.is_interactive() {
                    tracing::debug!("No terminal to prompt on; not offering to install");
                    reason = ExitReason::NonInteractive;
                    State::Exiting
                } else {
                    State::AwaitingUserChoice
                }
            }
            State::AwaitingUserChoice => {
                match ctx.ui.ask("Would you like to install them now? (y/n)") {
                    Ok(answer) if answer.eq_ignore_ascii_case("y") => State::Installing,
                    Ok(_) => {
                        reason = ExitReason::Declined;
                        State::Exiting
                    }
                    Err(e) => {
                        tracing::warn!("Could not read an answer: {}", e);
                        reason = ExitReason::Declined;
                        State::Exiting
                    }
                }
            }
            State::Installing => {
                if let Some(cmd) = &command {
                    reason = install(cmd, ctx);
                }
                State::Exiting
            }
            State::Exiting => {
                let command = command.unwrap_or_else(|| {
                    InstallCommand::new(
                        ctx.manager,
                        missing.iter().map(|d| &d.package),
                        ctx.elevated,
                    )
                });
                tracing::info!(
                    "Exiting with status {}: {} missing ({:?})",
                    EXIT_MISSING,
                    missing.len(),
                    reason
                );
                return Outcome::MissingAndExited(Exit {
                    missing,
                    command,
                    reason,
                    trail,
                });
            }
        };
    }
}

/// Entries whose module cannot be located, in spec order.
fn find_missing(spec: &DependencySpec, locator: &dyn Locator) -> Vec<Dependency> {
    spec.iter()
        .filter(|dep| match locator.locate(&dep.module) {
            Some(path) => {
                tracing::debug!("Found {} at {}", dep.module, path.display());
                false
            }
            None => {
                tracing::debug!("Missing {} (package {})", dep.module, dep.package);
                true
            }
        })
        .cloned()
        .collect()
}

fn report_missing(missing: &[Dependency], command: &InstallCommand, ctx: &mut ResolverContext<'_>) {
    let packages: Vec<String> = missing.iter().map(|d| d.package.to_string()).collect();
    tracing::warn!(
        "{}",
        ViewerError::MissingDependency {
            packages: packages.join(" ")
        }
    );

    ctx.ui.error("Error: Missing dependencies required to run this program.");
    for dep in missing {
        ctx.ui.message(&format!("   {} (provided by {})", dep.module, dep.package));
    }
    ctx.ui.message("Please install them on your system by running the following command:");
    ctx.ui.message(&format!("\n   `{}`\n", command));
    ctx.ui.warning(
        "Warning: Installing packages can pose security risks. \
         Consider trying the program in a container or virtual machine for isolation.",
    );
    ctx.ui.message(&format!("For more info: {}", ctx.manager.docs_url()));
}

fn install(command: &InstallCommand, ctx: &mut ResolverContext<'_>) -> ExitReason {
    ctx.ui.message("⏳ Installing dependencies...");

    if !ctx.installer.is_available(command) {
        let program = if command.elevate {
            format!("sudo {}", command.program)
        } else {
            command.program.clone()
        };
        let err = ViewerError::InstallerUnavailable { program };
        ctx.ui.error(&format!("Error: {}. Please install the packages manually.", err));
        return ExitReason::InstallerUnavailable;
    }

    match ctx.installer.run(command) {
        Ok(report) if report.success => {
            ctx.ui.success("Dependencies installed successfully. Please re-run the program.");
            ExitReason::Installed
        }
        Ok(report) => {
            tracing::error!(
                "{}",
                ViewerError::InstallSubprocessFailed {
                    command: command.to_string(),
                    code: report.code,
                    output: report.output.clone(),
                }
            );
            ctx.ui.error("Installation failed. Output:");
            ctx.ui.message(&report.output);
            ctx.ui.message("Please run the command manually.");
            ExitReason::InstallFailed { code: report.code }
        }
        Err(e) => {
            ctx.ui.error(&format!("An unexpected error occurred: {}", e));
            ExitReason::InstallError {
                message: e.to_string(),
            }
        }
    }
}
