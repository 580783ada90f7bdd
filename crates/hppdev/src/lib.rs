//! hppdev - Package scaffolding for HPP
//!
//! Every HPP package starts the same way: a `doc`, `include`, `src` and
//! `unitTesting` tree, a top-level `Makefile.am` that pulls in the shared
//! build-aux rules, and a declared list of the packages it builds on.
//! This crate creates that skeleton and composes the build description.

pub mod compose;
pub mod error;
pub mod name;
pub mod package;
pub mod planner;
pub mod rules;
pub mod scaffold;
pub mod templates;
pub mod variables;
pub mod workspace;

pub use compose::Composition;
pub use error::{ScaffoldError, ScaffoldResult};
pub use package::{Dependency, PackageDescriptor};
pub use rules::{RuleFile, RuleSet};
pub use scaffold::{ScaffoldRequest, Scaffolder, LAYOUT};
pub use variables::Variables;
pub use workspace::Workspace;
