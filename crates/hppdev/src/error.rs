//! Scaffolding errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scaffolding or composing a package
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Invalid package name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Package already exists: {}", .0.display())]
    NameConflict(PathBuf),

    #[error("Dependency not found in workspace: {0}")]
    DependencyNotFound(String),

    #[error("Invalid dependency declaration {spec:?}: {reason}")]
    InvalidDependency { spec: String, reason: String },

    #[error("Invalid template variable {pair:?}: {reason}")]
    InvalidVariable { pair: String, reason: &'static str },

    #[error("Template path escapes the package layout: {0}")]
    TemplatePath(String),

    #[error("Invalid build entry {entry:?}: {reason}")]
    InvalidEntry { entry: String, reason: &'static str },

    #[error("Rule file not found: {}", .0.display())]
    MissingRuleFile(PathBuf),

    #[error("Subdirectory has no build description: {}", .0.display())]
    MissingSubdirBuild(PathBuf),

    #[error("Invalid package descriptor {}: {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScaffoldResult<T> = std::result::Result<T, ScaffoldError>;
