//! Error types for mdview.
//!
//! Each failure is resolved where it happens: resolver errors end the
//! process, viewer errors become an inline panel. Nothing here is meant to
//! cross from one component into the other.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mdview operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// One or more runtime components could not be located.
    #[error("Missing dependencies: {packages}")]
    MissingDependency { packages: String },

    /// The package manager needed to install missing components is not on PATH.
    #[error("Installer '{program}' is not available")]
    InstallerUnavailable { program: String },

    /// The installer ran but exited unsuccessfully.
    #[error("Install command failed with exit code {code:?}: {command}")]
    InstallSubprocessFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    /// A Markdown file could not be read.
    #[error("Could not load file {}: {source}", path.display())]
    FileLoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The window could not be created.
    #[error("An error occurred: {message}")]
    UnhandledStartupError { message: String },

    /// A dependency spec listed the same module twice.
    #[error("Dependency '{module}' is listed more than once")]
    DuplicateDependency { module: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mdview operations.
pub type Result<T> = std::result::Result<T, ViewerError>;
