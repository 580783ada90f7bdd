//! Workspace discovery
//!
//! A workspace is a directory whose children are packages. A child counts
//! as a package when it carries a `package.json` descriptor.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::package::{Dependency, PackageDescriptor, DESCRIPTOR_FILE};

pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a package with this name occupies
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether anything already occupies the package's directory
    pub fn contains(&self, name: &str) -> bool {
        self.package_dir(name).symlink_metadata().is_ok()
    }

    /// All packages of the workspace, sorted by name
    ///
    /// Children with an unreadable descriptor are skipped with a warning.
    pub fn packages(&self) -> ScaffoldResult<Vec<PackageDescriptor>> {
        let mut packages = Vec::new();
        if !self.root.is_dir() {
            return Ok(packages);
        }

        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_name() != DESCRIPTOR_FILE {
                continue;
            }
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            match PackageDescriptor::load(dir) {
                Ok(descriptor) => packages.push(descriptor),
                Err(e) => tracing::warn!(path = %dir.display(), error = %e, "skipping package"),
            }
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Find a package by name
    pub fn find(&self, name: &str) -> ScaffoldResult<Option<PackageDescriptor>> {
        let dir = self.package_dir(name);
        if !dir.join(DESCRIPTOR_FILE).is_file() {
            return Ok(None);
        }
        PackageDescriptor::load(&dir).map(Some)
    }

    /// Check that every dependency is a package of this workspace
    pub fn resolve(&self, dependencies: &[Dependency]) -> ScaffoldResult<()> {
        for dep in dependencies {
            if self.find(&dep.name)?.is_none() {
                return Err(ScaffoldError::DependencyNotFound(dep.name.clone()));
            }
        }
        Ok(())
    }

    /// Packages that declare a dependency on `name`
    pub fn dependents(&self, name: &str) -> ScaffoldResult<Vec<PackageDescriptor>> {
        Ok(self
            .packages()?
            .into_iter()
            .filter(|p| p.depends_on(name))
            .collect())
    }
}
