//! Build composition
//!
//! A package's top-level `Makefile.am` is nothing but an ordered list of
//! shared rule-file includes plus the subdirectories that take part in the
//! recursive build. Include order matters (a later rule file may redefine
//! what an earlier one set); subdirectories form a set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::rules::{AssignOp, RuleSet};

/// Name of the build description file in every package directory
pub const BUILD_FILE: &str = "Makefile.am";

const HEADER: &str = "# Generated by hppdev. Edit freely; hppdev never rewrites this file.\n";
const TOP_SRCDIR: &str = "$(top_srcdir)/";

/// The parts a top-level build description is composed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Shared rule directory, relative to the top source directory
    pub build_aux_dir: String,
    /// Rule files, in include order
    pub includes: Vec<String>,
    /// Subdirectories of the recursive build
    pub subdirs: BTreeSet<String>,
    /// Extra files shipped in the distribution
    pub extra_dist: Vec<String>,
}

/// Final value of a variable after all includes were applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub value: String,
    /// Rule file that last wrote the variable
    pub origin: String,
}

/// What the composed includes define, once override order is applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    pub variables: BTreeMap<String, Definition>,
    /// Target name -> rule file that defines it last
    pub targets: BTreeMap<String, String>,
}

impl Composition {
    pub fn new(build_aux_dir: impl Into<String>) -> Self {
        Self {
            build_aux_dir: build_aux_dir.into(),
            includes: Vec::new(),
            subdirs: BTreeSet::new(),
            extra_dist: Vec::new(),
        }
    }

    /// Append a rule file include
    pub fn include(mut self, rule: impl Into<String>) -> Self {
        self.includes.push(rule.into());
        self
    }

    pub fn with_includes<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Add a subdirectory to the recursive build
    pub fn subdir(mut self, name: impl Into<String>) -> Self {
        self.subdirs.insert(name.into());
        self
    }

    pub fn with_subdirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdirs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_extra_dist<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_dist.extend(files.into_iter().map(Into::into));
        self
    }

    /// Check that every entry renders as a single token
    ///
    /// An entry with whitespace would split into several `SUBDIRS` words and
    /// no longer read back as written.
    pub fn check(&self) -> ScaffoldResult<()> {
        let entries = self
            .includes
            .iter()
            .chain(&self.subdirs)
            .chain(&self.extra_dist)
            .chain(std::iter::once(&self.build_aux_dir));
        for entry in entries {
            check_entry(entry)?;
        }
        Ok(())
    }

    /// Render the build description
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);

        if !self.includes.is_empty() {
            out.push('\n');
            for rule in &self.includes {
                out.push_str(&format!("include {}{}/{}\n", TOP_SRCDIR, self.build_aux_dir, rule));
            }
        }

        if !self.subdirs.is_empty() {
            let subdirs: Vec<&str> = self.subdirs.iter().map(String::as_str).collect();
            out.push_str(&format!("\nSUBDIRS = {}\n", subdirs.join(" ")));
        }

        if !self.extra_dist.is_empty() {
            out.push_str(&format!("\nEXTRA_DIST = {}\n", self.extra_dist.join(" ")));
        }

        out
    }

    /// Read a composition back from a build description
    ///
    /// Lines other than includes, `SUBDIRS` and `EXTRA_DIST` are ignored.
    pub fn parse(text: &str) -> Self {
        let mut composition = Self::new(String::new());
        let mut build_aux_dir: Option<String> = None;

        for line in text.lines().map(str::trim) {
            if let Some(path) = line.strip_prefix("include ") {
                let path = path.trim();
                let path = path.strip_prefix(TOP_SRCDIR).unwrap_or(path);
                let (dir, file) = path.rsplit_once('/').unwrap_or(("", path));
                build_aux_dir.get_or_insert_with(|| dir.to_string());
                composition.includes.push(file.to_string());
            } else if let Some(value) = assignment_value(line, "SUBDIRS") {
                composition
                    .subdirs
                    .extend(value.split_whitespace().map(String::from));
            } else if let Some(value) = assignment_value(line, "EXTRA_DIST") {
                composition
                    .extra_dist
                    .extend(value.split_whitespace().map(String::from));
            }
        }

        composition.build_aux_dir = build_aux_dir.unwrap_or_default();
        composition
    }

    /// Apply the includes in order and report what ends up defined
    ///
    /// Later includes override variables and targets of earlier ones; `+=`
    /// appends and `?=` only sets variables nobody set before.
    pub fn effective_definitions(&self, rules: &RuleSet) -> ScaffoldResult<Definitions> {
        let mut defs = Definitions::default();

        for name in &self.includes {
            let rule = rules
                .get(name)
                .ok_or_else(|| ScaffoldError::MissingRuleFile(self.rule_path(name)))?;

            for assignment in &rule.assignments {
                let origin = rule.name.clone();
                match assignment.op {
                    AssignOp::Set => {
                        defs.variables.insert(
                            assignment.name.clone(),
                            Definition {
                                value: assignment.value.clone(),
                                origin,
                            },
                        );
                    }
                    AssignOp::Append => {
                        let entry = defs
                            .variables
                            .entry(assignment.name.clone())
                            .or_insert_with(|| Definition {
                                value: String::new(),
                                origin: origin.clone(),
                            });
                        if !entry.value.is_empty() {
                            entry.value.push(' ');
                        }
                        entry.value.push_str(&assignment.value);
                        entry.origin = origin;
                    }
                    AssignOp::Default => {
                        defs.variables
                            .entry(assignment.name.clone())
                            .or_insert_with(|| Definition {
                                value: assignment.value.clone(),
                                origin,
                            });
                    }
                }
            }

            for target in &rule.targets {
                defs.targets.insert(target.clone(), rule.name.clone());
            }
        }

        Ok(defs)
    }

    /// Path of an include relative to the top source directory
    fn rule_path(&self, rule: &str) -> PathBuf {
        Path::new(&self.build_aux_dir).join(rule)
    }

    /// Check that every include exists in the given build-aux directory
    pub fn verify_includes(&self, build_aux: &Path) -> ScaffoldResult<()> {
        for rule in &self.includes {
            let path = build_aux.join(rule);
            if !path.is_file() {
                return Err(ScaffoldError::MissingRuleFile(path));
            }
        }
        Ok(())
    }

    /// Check that every subdirectory of `root` exists with its own build description
    pub fn verify_subdirs(&self, root: &Path) -> ScaffoldResult<()> {
        for subdir in &self.subdirs {
            let build_file = root.join(subdir).join(BUILD_FILE);
            if !build_file.is_file() {
                return Err(ScaffoldError::MissingSubdirBuild(root.join(subdir)));
            }
        }
        Ok(())
    }
}

fn check_entry(entry: &str) -> ScaffoldResult<()> {
    let invalid = |reason| {
        Err(ScaffoldError::InvalidEntry {
            entry: entry.to_string(),
            reason,
        })
    };
    if entry.is_empty() {
        return invalid("entry is empty");
    }
    if entry.chars().any(char::is_whitespace) {
        return invalid("entry contains whitespace");
    }
    if entry.contains(['#', '\\']) {
        return invalid("entry contains a comment or continuation character");
    }
    Ok(())
}

fn assignment_value<'a>(line: &'a str, variable: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(variable)?.trim_start();
    let rest = rest.strip_prefix("+=").or_else(|| rest.strip_prefix('='))?;
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleFile;
    use std::fs;
    use tempfile::TempDir;

    fn overlapping_rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert(RuleFile::parse(
            "a.mk",
            "DOC_DIR = doc\nCLEANFILES += a.tmp\ndist-hook:\n\techo a\n",
        ));
        rules.insert(RuleFile::parse(
            "b.mk",
            "DOC_DIR = share/doc\nCLEANFILES += b.tmp\nDOC_FORMAT ?= html\ndist-hook:\n\techo b\n",
        ));
        rules
    }

    #[test]
    fn test_render_default_package() {
        let text = Composition::new("build-aux")
            .with_includes(["doc-recursive.mk", "pkg-config.mk", "git-version.mk"])
            .subdir("doc")
            .render();

        let expected = format!(
            "{}\ninclude $(top_srcdir)/build-aux/doc-recursive.mk\n\
             include $(top_srcdir)/build-aux/pkg-config.mk\n\
             include $(top_srcdir)/build-aux/git-version.mk\n\
             \nSUBDIRS = doc\n",
            HEADER
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_empty_is_header_only() {
        assert_eq!(Composition::new("build-aux").render(), HEADER);
    }

    #[test]
    fn test_include_order_is_preserved() {
        let ab = Composition::new("build-aux").include("a.mk").include("b.mk");
        let ba = Composition::new("build-aux").include("b.mk").include("a.mk");
        assert_ne!(ab.render(), ba.render());
    }

    #[test]
    fn test_include_order_changes_effective_definitions() {
        let rules = overlapping_rules();
        let ab = Composition::new("build-aux")
            .with_includes(["a.mk", "b.mk"])
            .effective_definitions(&rules)
            .unwrap();
        let ba = Composition::new("build-aux")
            .with_includes(["b.mk", "a.mk"])
            .effective_definitions(&rules)
            .unwrap();

        assert_ne!(ab, ba);
        assert_eq!(ab.variables["DOC_DIR"].value, "share/doc");
        assert_eq!(ba.variables["DOC_DIR"].value, "doc");
        assert_eq!(ab.targets["dist-hook"], "b.mk");
        assert_eq!(ba.targets["dist-hook"], "a.mk");
        assert_eq!(ab.variables["CLEANFILES"].value, "a.tmp b.tmp");
        assert_eq!(ab.variables["DOC_FORMAT"].value, "html");
    }

    #[test]
    fn test_default_assignment_does_not_override() {
        let mut rules = RuleSet::new();
        rules.insert(RuleFile::parse("set.mk", "DOC_FORMAT = pdf\n"));
        rules.insert(RuleFile::parse("default.mk", "DOC_FORMAT ?= html\n"));

        let defs = Composition::new("build-aux")
            .with_includes(["set.mk", "default.mk"])
            .effective_definitions(&rules)
            .unwrap();
        assert_eq!(defs.variables["DOC_FORMAT"].value, "pdf");
        assert_eq!(defs.variables["DOC_FORMAT"].origin, "set.mk");
    }

    #[test]
    fn test_effective_definitions_missing_rule() {
        let err = Composition::new("build-aux")
            .include("nope.mk")
            .effective_definitions(&RuleSet::new())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::MissingRuleFile(p) if p.ends_with("build-aux/nope.mk")));
    }

    #[test]
    fn test_subdir_order_is_irrelevant() {
        let first = Composition::new("build-aux").subdir("doc").subdir("src");
        let second = Composition::new("build-aux").with_subdirs(["src", "doc", "src"]);
        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_check_rejects_split_entries() {
        let good = Composition::new("build-aux").include("a.mk").subdir("doc");
        assert!(good.check().is_ok());

        for bad in [
            Composition::new("build-aux").subdir("doc src"),
            Composition::new("build-aux").subdir(""),
            Composition::new("build-aux").include("a.mk #b"),
            Composition::new("build aux").include("a.mk"),
        ] {
            assert!(matches!(bad.check(), Err(ScaffoldError::InvalidEntry { .. })));
        }
    }

    #[test]
    fn test_parse_reads_back_render() {
        let original = Composition::new("build-aux")
            .with_includes(["git-version.mk", "pkg-config.mk"])
            .with_subdirs(["src", "doc"])
            .with_extra_dist(["README"]);
        assert_eq!(Composition::parse(&original.render()), original);
    }

    #[test]
    fn test_parse_handwritten_file() {
        let text = "include $(top_srcdir)/aux/init.mk\n\nSUBDIRS=doc\nSUBDIRS += src\nACLOCAL_AMFLAGS = -I m4\n";
        let composition = Composition::parse(text);
        assert_eq!(composition.build_aux_dir, "aux");
        assert_eq!(composition.includes, vec!["init.mk"]);
        assert_eq!(
            composition.subdirs.into_iter().collect::<Vec<_>>(),
            vec!["doc", "src"]
        );
    }

    #[test]
    fn test_verify_includes_and_subdirs() {
        let dir = TempDir::new().unwrap();
        let build_aux = dir.path().join("build-aux");
        fs::create_dir_all(&build_aux).unwrap();
        fs::write(build_aux.join("a.mk"), "").unwrap();
        fs::create_dir_all(dir.path().join("doc")).unwrap();

        let composition = Composition::new("build-aux").include("a.mk").subdir("doc");
        assert!(composition.verify_includes(&build_aux).is_ok());
        assert!(matches!(
            composition.verify_subdirs(dir.path()),
            Err(ScaffoldError::MissingSubdirBuild(_))
        ));

        fs::write(dir.path().join("doc").join(BUILD_FILE), "").unwrap();
        assert!(composition.verify_subdirs(dir.path()).is_ok());

        let missing = composition.include("b.mk");
        assert!(matches!(
            missing.verify_includes(&build_aux),
            Err(ScaffoldError::MissingRuleFile(_))
        ));
    }
}
