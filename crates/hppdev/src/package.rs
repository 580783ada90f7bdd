//! Package descriptors
//!
//! Every scaffolded package records its name and declared dependencies in a
//! `package.json` at its root. Workspaces discover packages through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::name::{derive_build_id, is_build_id, validate_name};

/// Descriptor file name at a package root
pub const DESCRIPTOR_FILE: &str = "package.json";

/// A declared dependency: display name plus build identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name, e.g. `hppCore`
    pub name: String,
    /// Build identifier token, e.g. `HPPCORE`
    pub id: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Parse `NAME:ID`, `NAME=ID` or a bare `NAME`
    pub fn parse(spec: &str) -> ScaffoldResult<Self> {
        let spec = spec.trim();
        let invalid = |reason: String| ScaffoldError::InvalidDependency {
            spec: spec.to_string(),
            reason,
        };

        let (name, id) = match spec.split_once([':', '=']) {
            Some((name, id)) => (name.trim(), id.trim().to_string()),
            None => (spec, derive_build_id(spec)),
        };

        let dep = Self::new(name, id);
        dep.validate().map_err(invalid)?;
        Ok(dep)
    }

    /// Check the name and build identifier of a declaration
    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name).map_err(|e| e.to_string())?;
        if !is_build_id(&self.id) {
            return Err(format!(
                "build identifier {:?} must match [A-Z_][A-Z0-9_]*",
                self.id
            ));
        }
        Ok(())
    }

    /// Check a list of declarations, rejecting invalid entries and duplicate names
    pub fn validate_all(deps: &[Self]) -> ScaffoldResult<()> {
        for (i, dep) in deps.iter().enumerate() {
            dep.validate()
                .map_err(|reason| ScaffoldError::InvalidDependency {
                    spec: dep.to_string(),
                    reason,
                })?;
            if deps[..i].iter().any(|d| d.name == dep.name) {
                return Err(ScaffoldError::InvalidDependency {
                    spec: dep.to_string(),
                    reason: format!("{} is declared twice", dep.name),
                });
            }
        }
        Ok(())
    }

    /// Parse a list of declarations, rejecting duplicate names
    pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> ScaffoldResult<Vec<Self>> {
        let deps = specs
            .iter()
            .map(|spec| Self::parse(spec.as_ref()))
            .collect::<ScaffoldResult<Vec<_>>>()?;
        Self::validate_all(&deps)?;
        Ok(deps)
    }
}

impl FromStr for Dependency {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}

/// Recorded metadata of a scaffolded package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Package name, unique within a workspace
    pub name: String,

    /// One-line description
    #[serde(default)]
    pub description: String,

    /// Package version
    #[serde(default = "default_version")]
    pub version: String,

    /// Declared dependencies, in build-include order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Creation time
    pub created: DateTime<Utc>,

    /// Package root directory (not serialized)
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl PackageDescriptor {
    pub fn new(name: &str, root: PathBuf, dependencies: Vec<Dependency>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            version: default_version(),
            dependencies,
            created: Utc::now(),
            root,
        }
    }

    /// Path of the descriptor file
    pub fn path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }

    /// Load the descriptor of the package rooted at `root`
    pub fn load(root: &Path) -> ScaffoldResult<Self> {
        let path = root.join(DESCRIPTOR_FILE);
        let content = fs::read_to_string(&path)?;
        let mut descriptor: Self = serde_json::from_str(&content)
            .map_err(|source| ScaffoldError::Descriptor { path, source })?;
        descriptor.root = root.to_path_buf();
        Ok(descriptor)
    }

    /// Write the descriptor to the package root
    pub fn save(&self) -> ScaffoldResult<()> {
        let path = self.path();
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ScaffoldError::Descriptor {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, json + "\n")?;
        Ok(())
    }

    /// Whether this package declares a dependency on `name`
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Dependency::parse("hppCore:HPPCORE").unwrap(),
            Dependency::new("hppCore", "HPPCORE")
        );
        assert_eq!(
            Dependency::parse(" kwsPlus = KWSPLUS ").unwrap(),
            Dependency::new("kwsPlus", "KWSPLUS")
        );
        assert_eq!(
            "hpp-model".parse::<Dependency>().unwrap(),
            Dependency::new("hpp-model", "HPP_MODEL")
        );
    }

    #[test]
    fn test_parse_rejects_bad_declarations() {
        assert!(Dependency::parse("hppCore:hppcore").is_err());
        assert!(Dependency::parse(":HPPCORE").is_err());
        assert!(Dependency::parse("hpp core:HPPCORE").is_err());
    }

    #[test]
    fn test_parse_all_rejects_duplicates() {
        let err = Dependency::parse_all(&["hppCore", "hppCore:CORE"]).unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidDependency { .. }));

        let deps = Dependency::parse_all(&["hppCore", "kwsPlus:KWS"]).unwrap();
        assert_eq!(deps[1].to_string(), "kwsPlus:KWS");
    }

    #[test]
    fn test_validate_all() {
        assert!(Dependency::validate_all(&[Dependency::new("hppCore", "HPPCORE")]).is_ok());
        for deps in [
            vec![Dependency::new("bad name", "BAD")],
            vec![Dependency::new("hppCore", "lower)])")],
            vec![
                Dependency::new("hppCore", "HPPCORE"),
                Dependency::new("hppCore", "DUP"),
            ],
        ] {
            assert!(matches!(
                Dependency::validate_all(&deps),
                Err(ScaffoldError::InvalidDependency { .. })
            ));
        }
    }

    #[test]
    fn test_descriptor_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut descriptor = PackageDescriptor::new(
            "hppNewAlgo",
            dir.path().to_path_buf(),
            vec![Dependency::new("hppCore", "HPPCORE")],
        );
        descriptor.description = "A new planner".to_string();
        descriptor.save().unwrap();

        let loaded = PackageDescriptor::load(dir.path()).unwrap();
        assert_eq!(loaded.name, "hppNewAlgo");
        assert_eq!(loaded.root, dir.path());
        assert!(loaded.depends_on("hppCore"));
        assert_eq!(loaded.dependencies, descriptor.dependencies);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTOR_FILE), "{not json").unwrap();
        assert!(matches!(
            PackageDescriptor::load(dir.path()),
            Err(ScaffoldError::Descriptor { .. })
        ));
    }
}
