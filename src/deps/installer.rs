//! Package manager detection and the install subprocess.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::Result;

use super::PackageSpec;

/// System package managers the install command can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
}

impl PackageManager {
    const ALL: [PackageManager; 4] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
        }
    }

    /// Arguments that precede the package list. All of them skip the
    /// manager's own confirmation since the user already said yes.
    pub fn install_args(self) -> &'static [&'static str] {
        match self {
            PackageManager::Apt => &["install", "-y"],
            PackageManager::Dnf => &["install", "-y"],
            PackageManager::Pacman => &["-S", "--needed", "--noconfirm"],
            PackageManager::Zypper => &["--non-interactive", "install"],
        }
    }

    /// How this manager spells a package argument.
    ///
    /// dnf and zypper accept a version constraint in the argument; apt-get
    /// and pacman install the repository version, so only the name is passed.
    pub fn package_arg(self, spec: &PackageSpec) -> String {
        match (self, &spec.min_version) {
            (PackageManager::Dnf | PackageManager::Zypper, Some(version)) => {
                format!("{} >= {}", spec.name, version)
            }
            _ => spec.name.clone(),
        }
    }

    /// Where to read about what the manager is about to do.
    pub fn docs_url(self) -> &'static str {
        match self {
            PackageManager::Apt => "https://wiki.debian.org/AptCLI",
            PackageManager::Dnf => "https://dnf.readthedocs.io/en/latest/command_ref.html",
            PackageManager::Pacman => "https://wiki.archlinux.org/title/Pacman",
            PackageManager::Zypper => "https://en.opensuse.org/SDB:Zypper_usage",
        }
    }

    /// First known manager found on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| find_on_path(m.program()).is_some())
    }
}

/// Look up `program` in the directories of `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// A fully resolved install invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Run through `sudo` because the process is not already root.
    pub elevate: bool,
}

impl InstallCommand {
    pub fn new<'a, I>(manager: PackageManager, packages: I, elevated: bool) -> Self
    where
        I: IntoIterator<Item = &'a PackageSpec>,
    {
        let mut args: Vec<String> = manager
            .install_args()
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.extend(packages.into_iter().map(|p| manager.package_arg(p)));

        Self {
            program: manager.program().to_string(),
            args,
            elevate: !elevated,
        }
    }

    /// The argument vector, `sudo` first when elevation is needed.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if self.elevate {
            argv.push("sudo".to_string());
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .argv()
            .into_iter()
            .map(|arg| {
                if arg.contains(' ') {
                    format!("'{}'", arg)
                } else {
                    arg
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// What an install subprocess produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub success: bool,
    pub code: Option<i32>,
    /// stdout followed by stderr.
    pub output: String,
}

/// Runs install commands. Swapped for a fake in tests.
pub trait Installer {
    /// Whether every program `command` needs can be found.
    fn is_available(&self, command: &InstallCommand) -> bool;

    /// Run `command` to completion, capturing its output.
    fn run(&self, command: &InstallCommand) -> Result<InstallReport>;
}

/// Installer that spawns the real package manager.
#[derive(Debug, Default)]
pub struct SystemInstaller;

impl Installer for SystemInstaller {
    fn is_available(&self, command: &InstallCommand) -> bool {
        let manager_found = find_on_path(&command.program).is_some();
        let sudo_found = !command.elevate || find_on_path("sudo").is_some();
        manager_found && sudo_found
    }

    fn run(&self, command: &InstallCommand) -> Result<InstallReport> {
        let argv = command.argv();
        tracing::info!("Running: {}", command);

        let output = Command::new(&argv[0]).args(&argv[1..]).output()?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::debug!("Installer exited with {:?}", output.status.code());
        Ok(InstallReport {
            success: output.status.success(),
            code: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages() -> Vec<PackageSpec> {
        vec![
            PackageSpec::at_least("libxkbcommon", "0.5.0"),
            PackageSpec::new("libglvnd"),
        ]
    }

    #[test]
    fn apt_command_without_root_uses_sudo() {
        let pkgs = vec![
            PackageSpec::new("libegl1"),
            PackageSpec::new("libxkbcommon0"),
        ];
        let cmd = InstallCommand::new(PackageManager::Apt, &pkgs, false);
        assert!(cmd.elevate);
        assert_eq!(
            cmd.to_string(),
            "sudo apt-get install -y libegl1 libxkbcommon0"
        );
    }

    #[test]
    fn command_as_root_runs_manager_directly() {
        let cmd = InstallCommand::new(PackageManager::Pacman, &packages(), true);
        assert!(!cmd.elevate);
        assert_eq!(cmd.argv()[0], "pacman");
        assert_eq!(
            cmd.to_string(),
            "pacman -S --needed --noconfirm libxkbcommon libglvnd"
        );
    }

    #[test]
    fn dnf_passes_version_constraint_as_one_argument() {
        let cmd = InstallCommand::new(PackageManager::Dnf, &packages(), true);
        assert_eq!(cmd.args.last().map(String::as_str), Some("libglvnd"));
        assert!(cmd.args.contains(&"libxkbcommon >= 0.5.0".to_string()));
        assert!(cmd.to_string().contains("'libxkbcommon >= 0.5.0'"));
    }

    #[test]
    fn apt_drops_version_constraint() {
        let spec = PackageSpec::at_least("libxkbcommon0", "0.5.0");
        assert_eq!(PackageManager::Apt.package_arg(&spec), "libxkbcommon0");
    }

    #[test]
    fn zypper_global_flag_precedes_install() {
        assert_eq!(
            PackageManager::Zypper.install_args(),
            ["--non-interactive", "install"]
        );
    }

    #[test]
    fn docs_urls_are_https() {
        for manager in PackageManager::ALL {
            assert!(manager.docs_url().starts_with("https://"));
        }
    }

    #[test]
    fn find_on_path_misses_unknown_program() {
        assert!(find_on_path("mdview-definitely-not-installed").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn system_installer_reports_unavailable_program() {
        let cmd = InstallCommand {
            program: "mdview-definitely-not-installed".into(),
            args: vec![],
            elevate: false,
        };
        assert!(!SystemInstaller.is_available(&cmd));
    }

    #[cfg(unix)]
    #[test]
    fn system_installer_captures_output_and_status() {
        let cmd = InstallCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "echo out; echo err >&2; exit 3".into()],
            elevate: false,
        };
        let report = SystemInstaller.run(&cmd).unwrap();
        assert!(!report.success);
        assert_eq!(report.code, Some(3));
        assert!(report.output.contains("out"));
        assert!(report.output.contains("err"));
    }
}
