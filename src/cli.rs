//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::deps::ResolveOptions;

/// mdview - View a Markdown file rendered as styled HTML.
#[derive(Debug, Parser)]
#[command(name = "mdview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Report missing runtime libraries and exit instead of offering to install them
    #[arg(long, env = "MDVIEW_NO_INSTALL")]
    pub no_install: bool,

    /// Do not check for runtime libraries before opening the window
    #[arg(long, env = "MDVIEW_SKIP_CHECKS")]
    pub skip_checks: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Markdown file to open at startup
    pub file: Option<PathBuf>,
}

impl Cli {
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            auto_install: !self.no_install,
        }
    }
}
