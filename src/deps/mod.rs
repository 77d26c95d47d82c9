//! Runtime dependency checks.
//!
//! The window backend loads a handful of shared libraries with `dlopen`
//! when it starts. A missing one makes the viewer die before it can show
//! anything useful, so they are checked up front and the user is told how
//! to install them.
//!
//! # Modules
//!
//! - [`locate`] - Finding a library on the loader search path
//! - [`installer`] - Package manager detection and the install subprocess
//! - [`resolver`] - The check / report / prompt / install sequence

pub mod installer;
pub mod locate;
pub mod resolver;

pub use installer::{InstallCommand, InstallReport, Installer, PackageManager, SystemInstaller};
pub use locate::{LibraryLocator, Locator};
pub use resolver::{resolve, Exit, ExitReason, Outcome, ResolveOptions, ResolverContext, State};

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, ViewerError};
use crate::ui::Console;

/// Run the startup check against the real system.
///
/// Detects the package manager (falling back to apt-get when none is on
/// `PATH`, so the printed command is still useful), searches the loader
/// path, and installs through the real package manager.
pub fn check_runtime(options: ResolveOptions, ui: &mut dyn Console) -> Outcome {
    let manager = PackageManager::detect().unwrap_or_else(|| {
        tracing::debug!("No known package manager on PATH, assuming apt-get");
        PackageManager::Apt
    });
    let session = DisplaySession::detect();
    tracing::debug!("Display session: {:?}", session);
    let spec = DependencySpec::for_platform(manager, session);
    let locator = LibraryLocator::from_env();
    let system = SystemInstaller;

    let mut ctx = ResolverContext {
        locator: &locator,
        installer: &system,
        ui,
        manager,
        elevated: installer::is_elevated(),
    };
    resolve(&spec, options, &mut ctx)
}

/// An installable package, optionally with a minimum version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub min_version: Option<String>,
}

impl PackageSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_version: None,
        }
    }

    pub fn at_least(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            min_version: Some(version.to_string()),
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.min_version {
            Some(version) => write!(f, "{}>={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One entry of a [`DependencySpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name the locator searches for, e.g. `libEGL.so.1`.
    pub module: String,
    /// Package that provides it.
    pub package: PackageSpec,
}

/// Ordered, immutable mapping from module name to the package providing it.
///
/// Module names are unique; order is kept so reports list packages in the
/// order they were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySpec {
    entries: Vec<Dependency>,
}

impl DependencySpec {
    /// Build a spec, rejecting a module that appears twice.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PackageSpec)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for (module, package) in entries {
            let module = module.into();
            if !seen.insert(module.clone()) {
                return Err(ViewerError::DuplicateDependency { module });
            }
            deps.push(Dependency { module, package });
        }
        Ok(Self { entries: deps })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The libraries the eframe backend opens at runtime in `session`,
    /// named the way `manager` packages them.
    ///
    /// X11 sessions need the xkbcommon X11 bridge; GL goes through GLX
    /// first there, so EGL is not required. Wayland sessions need the
    /// Wayland client library and EGL. Other platforms link everything the
    /// window needs, so their spec is empty.
    pub fn for_platform(manager: PackageManager, session: DisplaySession) -> Self {
        if !cfg!(target_os = "linux") {
            return Self::empty();
        }

        let xkb = match manager {
            PackageManager::Apt | PackageManager::Zypper => {
                PackageSpec::at_least("libxkbcommon0", "0.5.0")
            }
            PackageManager::Dnf | PackageManager::Pacman => {
                PackageSpec::at_least("libxkbcommon", "0.5.0")
            }
        };
        let mut entries = vec![Dependency {
            module: "libxkbcommon.so.0".to_string(),
            package: xkb,
        }];

        match session {
            DisplaySession::X11 => {
                let xkb_x11 = match manager {
                    PackageManager::Apt | PackageManager::Zypper => "libxkbcommon-x11-0",
                    PackageManager::Dnf | PackageManager::Pacman => "libxkbcommon-x11",
                };
                entries.push(Dependency {
                    module: "libxkbcommon-x11.so.0".to_string(),
                    package: PackageSpec::new(xkb_x11),
                });
            }
            DisplaySession::Wayland => {
                let (wayland, egl) = match manager {
                    PackageManager::Apt => ("libwayland-client0", "libegl1"),
                    PackageManager::Dnf => ("libwayland-client", "libglvnd-egl"),
                    PackageManager::Pacman => ("wayland", "libglvnd"),
                    PackageManager::Zypper => ("libwayland-client0", "libEGL1"),
                };
                entries.push(Dependency {
                    module: "libwayland-client.so.0".to_string(),
                    package: PackageSpec::new(wayland),
                });
                entries.push(Dependency {
                    module: "libEGL.so.1".to_string(),
                    package: PackageSpec::new(egl),
                });
            }
        }

        Self { entries }
    }
}

/// Windowing system the backend will connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySession {
    X11,
    Wayland,
}

impl DisplaySession {
    /// Pick the session the way winit does: Wayland when `WAYLAND_DISPLAY`
    /// or `WAYLAND_SOCKET` is set and non-empty, X11 otherwise.
    pub fn detect() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| var(name).is_some_and(|v| !v.is_empty());
        if set("WAYLAND_DISPLAY") || set("WAYLAND_SOCKET") {
            DisplaySession::Wayland
        } else {
            DisplaySession::X11
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_spec_display_includes_minimum_version() {
        assert_eq!(PackageSpec::new("libegl1").to_string(), "libegl1");
        assert_eq!(
            PackageSpec::at_least("libxkbcommon0", "0.5.0").to_string(),
            "libxkbcommon0>=0.5.0"
        );
    }

    #[test]
    fn spec_keeps_declaration_order() {
        let spec = DependencySpec::new([
            ("b.so", PackageSpec::new("pkg-b")),
            ("a.so", PackageSpec::new("pkg-a")),
        ])
        .unwrap();
        let modules: Vec<_> = spec.iter().map(|d| d.module.as_str()).collect();
        assert_eq!(modules, ["b.so", "a.so"]);
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn spec_rejects_duplicate_modules() {
        let err = DependencySpec::new([
            ("a.so", PackageSpec::new("one")),
            ("a.so", PackageSpec::new("two")),
        ])
        .unwrap_err();
        assert!(matches!(err, ViewerError::DuplicateDependency { module } if module == "a.so"));
    }

    #[test]
    fn empty_spec_is_empty() {
        assert!(DependencySpec::empty().is_empty());
    }

    fn modules(spec: &DependencySpec) -> Vec<&str> {
        spec.iter().map(|d| d.module.as_str()).collect()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn x11_spec_skips_wayland_and_egl() {
        let apt = DependencySpec::for_platform(PackageManager::Apt, DisplaySession::X11);
        assert_eq!(
            modules(&apt),
            ["libxkbcommon.so.0", "libxkbcommon-x11.so.0"]
        );
        assert!(apt.iter().any(|d| d.package.name == "libxkbcommon-x11-0"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn wayland_spec_skips_x11_bridge() {
        let pacman = DependencySpec::for_platform(PackageManager::Pacman, DisplaySession::Wayland);
        assert_eq!(
            modules(&pacman),
            ["libxkbcommon.so.0", "libwayland-client.so.0", "libEGL.so.1"]
        );
        assert!(pacman.iter().any(|d| d.package.name == "libglvnd"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn module_names_do_not_depend_on_manager() {
        for session in [DisplaySession::X11, DisplaySession::Wayland] {
            let apt = DependencySpec::for_platform(PackageManager::Apt, session);
            let dnf = DependencySpec::for_platform(PackageManager::Dnf, session);
            assert_eq!(modules(&apt), modules(&dnf));
        }
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn platform_spec_is_empty_off_linux() {
        let spec = DependencySpec::for_platform(PackageManager::Apt, DisplaySession::X11);
        assert!(spec.is_empty());
    }

    #[test]
    fn wayland_variables_select_wayland() {
        let vars = |set: &'static [(&'static str, &'static str)]| {
            move |name: &str| {
                set.iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.to_string())
            }
        };
        assert_eq!(
            DisplaySession::from_vars(vars(&[("WAYLAND_DISPLAY", "wayland-0")])),
            DisplaySession::Wayland
        );
        assert_eq!(
            DisplaySession::from_vars(vars(&[("WAYLAND_SOCKET", "3"), ("DISPLAY", ":0")])),
            DisplaySession::Wayland
        );
        assert_eq!(
            DisplaySession::from_vars(vars(&[("WAYLAND_DISPLAY", ""), ("DISPLAY", ":0")])),
            DisplaySession::X11
        );
        assert_eq!(DisplaySession::from_vars(vars(&[])), DisplaySession::X11);
    }
}
