//! Package scaffolding
//!
//! Creates the fixed package layout, writes the template files wired to the
//! declared dependencies, composes the top-level build description and
//! records the package descriptor.

use hppdev_core::Config;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::compose::{Composition, BUILD_FILE};
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::name::validate_name;
use crate::package::{Dependency, PackageDescriptor, DESCRIPTOR_FILE};
use crate::templates::{FileTemplate, TEMPLATES};
use crate::variables::Variables;
use crate::workspace::Workspace;

/// Subdirectories every package has
pub const LAYOUT: [&str; 4] = ["doc", "include", "src", "unitTesting"];

/// Variables the scaffolder derives from the package itself
///
/// Overriding them would make the generated files disagree with the
/// recorded descriptor or move files out of the layout.
pub const RESERVED_VARIABLES: [&str; 9] = [
    "NAME",
    "NAME_CANON",
    "DESCRIPTION",
    "VERSION",
    "BUILD_AUX",
    "PKG_CHECKS",
    "REQUIRES",
    "DEP_CFLAGS",
    "DEP_LIBS",
];

/// What to scaffold
#[derive(Debug, Clone, Default)]
pub struct ScaffoldRequest {
    pub name: String,
    pub dependencies: Vec<Dependency>,
    pub description: Option<String>,
    /// Extra template variables as KEY=VALUE
    pub vars: Vec<String>,
}

impl ScaffoldRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn dependency(mut self, dep: Dependency) -> Self {
        self.dependencies.push(dep);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Creates packages inside a workspace
pub struct Scaffolder {
    config: Config,
    workspace: Workspace,
    templates: &'static [FileTemplate],
}

impl Scaffolder {
    pub fn new(config: Config, workspace: Workspace) -> Self {
        Self {
            config,
            workspace,
            templates: TEMPLATES,
        }
    }

    /// Use a different set of template files
    pub fn with_templates(mut self, templates: &'static [FileTemplate]) -> Self {
        self.templates = templates;
        self
    }

    /// Top-level build description of every scaffolded package
    pub fn composition(&self) -> Composition {
        Composition::new(self.config.build_aux_dir.clone())
            .with_includes(self.config.includes.iter().cloned())
            .with_subdirs(LAYOUT)
            .with_extra_dist([DESCRIPTOR_FILE])
    }

    /// Scaffold a new package
    ///
    /// All checks run before anything is written. If writing fails halfway,
    /// the partially created package directory is removed again.
    pub fn scaffold(&self, request: &ScaffoldRequest) -> ScaffoldResult<PackageDescriptor> {
        validate_name(&request.name)?;
        Dependency::validate_all(&request.dependencies)?;
        validate_vars(&request.vars)?;
        self.composition().check()?;

        if self.config.check_dependencies {
            self.workspace.resolve(&request.dependencies)?;
        }

        let root = self.workspace.package_dir(&request.name);
        if self.workspace.contains(&request.name) {
            return Err(ScaffoldError::NameConflict(root));
        }

        fs::create_dir_all(self.workspace.root())?;
        fs::create_dir(&root).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ScaffoldError::NameConflict(root.clone()),
            _ => ScaffoldError::Io(e),
        })?;

        let mut descriptor =
            PackageDescriptor::new(&request.name, root.clone(), request.dependencies.clone());
        if let Some(description) = &request.description {
            descriptor.description = description.clone();
        }

        if let Err(e) = self.write_package(&descriptor, request) {
            warn!(path = %root.display(), error = %e, "scaffolding failed, removing partial package");
            if let Err(cleanup) = fs::remove_dir_all(&root) {
                warn!(path = %root.display(), error = %cleanup, "failed to remove partial package");
            }
            return Err(e);
        }

        info!(
            package = %descriptor.name,
            dependencies = descriptor.dependencies.len(),
            "package scaffolded"
        );
        Ok(descriptor)
    }

    fn write_package(
        &self,
        descriptor: &PackageDescriptor,
        request: &ScaffoldRequest,
    ) -> ScaffoldResult<()> {
        let root = &descriptor.root;

        for dir in LAYOUT {
            fs::create_dir(root.join(dir))?;
        }

        write_file(&root.join(BUILD_FILE), &self.composition().render())?;

        let vars = self.variables(descriptor, request);
        for template in self.templates {
            let path = root.join(layout_path(&vars.substitute(template.path))?);
            write_file(&path, &vars.substitute(template.body))?;
        }

        descriptor.save()?;
        debug!(path = %descriptor.path().display(), "recorded descriptor");
        Ok(())
    }

    /// Template variables for a package
    pub fn variables(&self, descriptor: &PackageDescriptor, request: &ScaffoldRequest) -> Variables {
        let deps = &descriptor.dependencies;
        let mut vars = Variables::new(&descriptor.name);

        if let Some(author) = &self.config.author {
            vars.set("AUTHOR", author);
        }
        if let Some(email) = &self.config.email {
            vars.set("EMAIL", email);
        }
        if !descriptor.description.is_empty() {
            vars.set_description(&descriptor.description);
        }

        vars.set("VERSION", &descriptor.version);
        vars.set("BUILD_AUX", &self.config.build_aux_dir);
        vars.set("NAME_CANON", &canonical(&descriptor.name));
        vars.set("PKG_CHECKS", &pkg_checks(deps));
        vars.set("REQUIRES", &join_deps(deps, |d| d.name.clone()));
        vars.set("DEP_CFLAGS", &join_deps(deps, |d| format!("$({}_CFLAGS)", d.id)));
        vars.set("DEP_LIBS", &join_deps(deps, |d| format!("$({}_LIBS)", d.id)));

        vars.add_from_pairs(&request.vars);
        vars
    }
}

/// Check user variables: KEY=VALUE pairs that leave derived variables alone
fn validate_vars(pairs: &[String]) -> ScaffoldResult<()> {
    for pair in pairs {
        let invalid = |reason| {
            Err(ScaffoldError::InvalidVariable {
                pair: pair.clone(),
                reason,
            })
        };
        let Some((key, _)) = pair.split_once('=') else {
            return invalid("expected KEY=VALUE");
        };
        let key = key.trim().to_uppercase();
        if key.is_empty() {
            return invalid("empty variable name");
        }
        if RESERVED_VARIABLES.contains(&key.as_str()) {
            return invalid("variable is derived from the package and cannot be set");
        }
    }
    Ok(())
}

/// Validate a substituted template path
///
/// The path must be relative, free of `.`/`..`, and either a top-level file
/// or a file below one of the layout directories.
fn layout_path(rel: &str) -> ScaffoldResult<PathBuf> {
    let path = PathBuf::from(rel);
    let components: Vec<_> = path.components().collect();
    let escapes = || ScaffoldError::TemplatePath(rel.to_string());

    if components.is_empty() || !components.iter().all(|c| matches!(c, Component::Normal(_))) {
        return Err(escapes());
    }
    if components.len() > 1 {
        let top = components[0].as_os_str();
        if !LAYOUT.iter().any(|dir| top == *dir) {
            return Err(escapes());
        }
    }
    Ok(path)
}

fn write_file(path: &Path, content: &str) -> ScaffoldResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Automake canonical form of a name: `hpp-model` -> `hpp_model`
fn canonical(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn pkg_checks(deps: &[Dependency]) -> String {
    if deps.is_empty() {
        return "dnl No dependencies declared".to_string();
    }
    deps.iter()
        .map(|d| format!("PKG_CHECK_MODULES([{}], [{}])", d.id, d.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_deps(deps: &[Dependency], f: impl Fn(&Dependency) -> String) -> String {
    deps.iter().map(f).collect::<Vec<_>>().join(" ")
}
