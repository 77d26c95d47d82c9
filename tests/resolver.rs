//! Integration tests for the startup dependency check.

use mdview::deps::{
    resolve, DependencySpec, ExitReason, InstallCommand, InstallReport, Installer, LibraryLocator,
    Outcome, PackageManager, PackageSpec, ResolveOptions, ResolverContext,
};
use mdview::ui::MockConsole;
use mdview::Result;
use std::cell::Cell;
use std::fs;
use tempfile::TempDir;

/// Installer that counts runs and always succeeds.
#[derive(Default)]
struct CountingInstaller {
    runs: Cell<usize>,
}

impl Installer for CountingInstaller {
    fn is_available(&self, _command: &InstallCommand) -> bool {
        true
    }

    fn run(&self, _command: &InstallCommand) -> Result<InstallReport> {
        self.runs.set(self.runs.get() + 1);
        Ok(InstallReport {
            success: true,
            code: Some(0),
            output: "done".into(),
        })
    }
}

fn spec() -> DependencySpec {
    DependencySpec::new([
        ("libfirst.so.1", PackageSpec::new("first")),
        ("libsecond.so.1", PackageSpec::at_least("second", "2.0")),
    ])
    .unwrap()
}

fn resolve_in(
    libdir: &TempDir,
    options: ResolveOptions,
    ui: &mut MockConsole,
    installer: &CountingInstaller,
) -> Outcome {
    let locator = LibraryLocator::with_dirs([libdir.path()]);
    let mut ctx = ResolverContext {
        locator: &locator,
        installer,
        ui,
        manager: PackageManager::Dnf,
        elevated: false,
    };
    resolve(&spec(), options, &mut ctx)
}

#[test]
fn libraries_on_disk_are_found() {
    let libdir = TempDir::new().unwrap();
    fs::write(libdir.path().join("libfirst.so.1"), b"").unwrap();
    fs::write(libdir.path().join("libsecond.so.1"), b"").unwrap();

    let mut ui = MockConsole::new();
    let installer = CountingInstaller::default();
    let outcome = resolve_in(&libdir, ResolveOptions::default(), &mut ui, &installer);

    assert_eq!(outcome, Outcome::AllPresent);
    assert_eq!(installer.runs.get(), 0);
}

#[test]
fn no_install_prints_command_once_and_exits_1() {
    let libdir = TempDir::new().unwrap();
    fs::write(libdir.path().join("libfirst.so.1"), b"").unwrap();

    let mut ui = MockConsole::interactive(&["y"]);
    let installer = CountingInstaller::default();
    let outcome = resolve_in(
        &libdir,
        ResolveOptions {
            auto_install: false,
        },
        &mut ui,
        &installer,
    );

    let Outcome::MissingAndExited(exit) = outcome else {
        panic!("Expected MissingAndExited");
    };
    assert_eq!(exit.code(), 1);
    assert_eq!(exit.reason, ExitReason::InstallSkipped);
    assert_eq!(installer.runs.get(), 0);
    assert!(ui.questions().is_empty());

    let command = "sudo dnf install -y 'second >= 2.0'";
    let printed = ui
        .all_output()
        .iter()
        .filter(|line| line.contains(command))
        .count();
    assert_eq!(printed, 1);
}

#[test]
fn security_caution_and_docs_link_are_shown() {
    let libdir = TempDir::new().unwrap();
    let mut ui = MockConsole::new();
    let installer = CountingInstaller::default();
    resolve_in(&libdir, ResolveOptions::default(), &mut ui, &installer);

    assert!(ui.warnings().iter().any(|w| w.contains("container")));
    assert!(ui
        .messages()
        .iter()
        .any(|m| m.contains(PackageManager::Dnf.docs_url())));
}

#[test]
fn successful_install_still_exits_1() {
    let libdir = TempDir::new().unwrap();
    let mut ui = MockConsole::interactive(&["y"]);
    let installer = CountingInstaller::default();
    let outcome = resolve_in(&libdir, ResolveOptions::default(), &mut ui, &installer);

    let Outcome::MissingAndExited(exit) = outcome else {
        panic!("Expected MissingAndExited");
    };
    assert_eq!(exit.reason, ExitReason::Installed);
    assert_eq!(exit.code(), 1);
    assert!(exit.installer_invoked());
    assert_eq!(installer.runs.get(), 1);
}

#[test]
fn declined_prompt_exits_1_without_install() {
    let libdir = TempDir::new().unwrap();
    let mut ui = MockConsole::interactive(&["n"]);
    let installer = CountingInstaller::default();
    let outcome = resolve_in(&libdir, ResolveOptions::default(), &mut ui, &installer);

    let Outcome::MissingAndExited(exit) = outcome else {
        panic!("Expected MissingAndExited");
    };
    assert_eq!(exit.reason, ExitReason::Declined);
    assert_eq!(
        ui.questions(),
        ["Would you like to install them now? (y/n)"]
    );
    assert_eq!(installer.runs.get(), 0);
}
