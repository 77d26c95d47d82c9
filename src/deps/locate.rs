//! Locating shared libraries without loading them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Finds a module by name.
///
/// Implementations only check for existence. Nothing is loaded or executed.
pub trait Locator {
    /// Return where `module` lives, or `None` if it cannot be found.
    fn locate(&self, module: &str) -> Option<PathBuf>;
}

impl<F> Locator for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn locate(&self, module: &str) -> Option<PathBuf> {
        self(module)
    }
}

/// Searches the directories the dynamic loader would search.
#[derive(Debug, Clone)]
pub struct LibraryLocator {
    search_dirs: Vec<PathBuf>,
}

impl LibraryLocator {
    /// Search exactly `dirs`, in order.
    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let search_dirs = dirs
            .into_iter()
            .map(Into::into)
            .filter(|d: &PathBuf| seen.insert(d.clone()))
            .collect();
        Self { search_dirs }
    }

    /// Build the search path from `LD_LIBRARY_PATH`, `/etc/ld.so.conf.d`,
    /// and the usual system library directories.
    pub fn from_env() -> Self {
        let mut dirs: Vec<PathBuf> = Vec::new();

        if let Some(paths) = std::env::var_os("LD_LIBRARY_PATH") {
            for dir in std::env::split_paths(&paths) {
                if !dir.as_os_str().is_empty() {
                    dirs.push(dir);
                }
            }
        }

        dirs.extend(read_ld_conf_dir(Path::new("/etc/ld.so.conf.d")));

        let triple = format!("{}-linux-gnu", std::env::consts::ARCH);
        for prefix in ["/lib", "/usr/lib", "/usr/local/lib"] {
            dirs.push(Path::new(prefix).join(&triple));
            dirs.push(PathBuf::from(prefix));
        }
        dirs.push(PathBuf::from("/lib64"));
        dirs.push(PathBuf::from("/usr/lib64"));

        tracing::debug!("Library search path: {:?}", dirs);
        Self::with_dirs(dirs)
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }
}

impl Locator for LibraryLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(module))
            .find(|candidate| candidate.exists())
    }
}

/// Directories listed in the `*.conf` files of an `ld.so.conf.d` directory.
///
/// `include` lines and comments are skipped; a missing directory yields
/// nothing.
fn read_ld_conf_dir(conf_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(conf_dir) else {
        return Vec::new();
    };

    let mut conf_files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "conf"))
        .collect();
    conf_files.sort();

    conf_files
        .iter()
        .filter_map(|f| fs::read_to_string(f).ok())
        .flat_map(|content| parse_ld_conf(&content))
        .collect()
}

fn parse_ld_conf(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| line.starts_with('/'))
        .map(PathBuf::from)
        .collect()
}
