//! Shared build-rule files
//!
//! Rule files live in the shared build-aux directory and are pulled into a
//! package's `Makefile.am` through `include` lines. Only what a rule file
//! defines is read here: variable assignments and target names. Recipes,
//! conditionals and nested includes are the build engine's business.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ScaffoldResult;

/// Assignment operator used in a rule file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=` or `:=`
    Set,
    /// `+=`
    Append,
    /// `?=`
    Default,
}

/// A single variable assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub op: AssignOp,
    pub value: String,
}

/// Definitions extracted from one rule file
#[derive(Debug, Clone, Default)]
pub struct RuleFile {
    /// File name, e.g. `pkg-config.mk`
    pub name: String,
    /// Assignments in file order
    pub assignments: Vec<Assignment>,
    /// Targets in file order
    pub targets: Vec<String>,
}

impl RuleFile {
    /// Extract assignments and targets from rule file text
    pub fn parse(name: &str, text: &str) -> Self {
        let mut rule = Self {
            name: name.to_string(),
            ..Default::default()
        };

        for raw in text.lines() {
            // Recipe lines
            if raw.starts_with('\t') {
                continue;
            }

            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();

            if line.is_empty() || is_directive(line) {
                continue;
            }

            if let Some(assignment) = parse_assignment(line) {
                rule.assignments.push(assignment);
                continue;
            }

            if let Some((lhs, _)) = line.split_once(':') {
                for target in lhs.split_whitespace() {
                    if !rule.targets.iter().any(|t| t == target) {
                        rule.targets.push(target.to_string());
                    }
                }
            }
        }

        rule
    }

    /// Read and parse a rule file from disk
    pub fn load(path: &Path) -> ScaffoldResult<Self> {
        let text = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::parse(&name, &text))
    }
}

fn is_directive(line: &str) -> bool {
    let keyword = line.split_whitespace().next().unwrap_or_default();
    matches!(
        keyword,
        "include" | "-include" | "if" | "ifdef" | "ifndef" | "ifeq" | "ifneq" | "else" | "endif"
    )
}

fn parse_assignment(line: &str) -> Option<Assignment> {
    let eq = line.find('=')?;
    let (lhs, op) = match line[..eq].chars().last() {
        Some('+') => (&line[..eq - 1], AssignOp::Append),
        Some('?') => (&line[..eq - 1], AssignOp::Default),
        Some(':') => (&line[..eq - 1], AssignOp::Set),
        _ => (&line[..eq], AssignOp::Set),
    };

    let name = lhs.trim();
    // `target: VAR=value` and friends are not plain assignments
    if name.is_empty() || name.contains(':') || name.split_whitespace().count() != 1 {
        return None;
    }

    Some(Assignment {
        name: name.to_string(),
        op,
        value: line[eq + 1..].trim().to_string(),
    })
}

/// All rule files of a build-aux directory, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    files: BTreeMap<String, RuleFile>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.mk` file in a build-aux directory
    pub fn load(dir: &Path) -> ScaffoldResult<Self> {
        let mut set = Self::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "mk") {
                set.insert(RuleFile::load(&path)?);
            }
        }
        tracing::debug!(dir = %dir.display(), count = set.files.len(), "loaded rule files");
        Ok(set)
    }

    pub fn insert(&mut self, rule: RuleFile) {
        self.files.insert(rule.name.clone(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&RuleFile> {
        self.files.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PKG_CONFIG_MK: &str = "\
# pkg-config metadata
pkgconfigdir = $(libdir)/pkgconfig
pkgconfig_DATA = $(PACKAGE_TARNAME).pc
CLEANFILES += $(pkgconfig_DATA)
DOC_DIR ?= doc

$(PACKAGE_TARNAME).pc: $(PACKAGE_TARNAME).pc.in
\tsed -e 's/@VERSION@/$(VERSION)/' $< > $@
";

    #[test]
    fn test_parse_assignments() {
        let rule = RuleFile::parse("pkg-config.mk", PKG_CONFIG_MK);
        let ops: Vec<_> = rule
            .assignments
            .iter()
            .map(|a| (a.name.as_str(), a.op))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("pkgconfigdir", AssignOp::Set),
                ("pkgconfig_DATA", AssignOp::Set),
                ("CLEANFILES", AssignOp::Append),
                ("DOC_DIR", AssignOp::Default),
            ]
        );
        assert_eq!(rule.assignments[0].value, "$(libdir)/pkgconfig");
    }

    #[test]
    fn test_parse_targets_skip_recipes() {
        let rule = RuleFile::parse("pkg-config.mk", PKG_CONFIG_MK);
        assert_eq!(rule.targets, vec!["$(PACKAGE_TARNAME).pc".to_string()]);
        assert!(rule.assignments.iter().all(|a| a.name != "sed"));
    }

    #[test]
    fn test_parse_ignores_directives_and_target_vars() {
        let text = "include other.mk\nif ENABLE_DOC\nall-local: VERBOSE=1\nendif\nGIT := git\n";
        let rule = RuleFile::parse("x.mk", text);
        assert_eq!(rule.targets, vec!["all-local".to_string()]);
        assert_eq!(rule.assignments.len(), 1);
        assert_eq!(rule.assignments[0].name, "GIT");
        assert_eq!(rule.assignments[0].op, AssignOp::Set);
    }

    #[test]
    fn test_rule_set_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pkg-config.mk"), PKG_CONFIG_MK).unwrap();
        fs::write(dir.path().join("git-version.mk"), "VERSION_FILE = .version\n").unwrap();
        fs::write(dir.path().join("README"), "not a rule file").unwrap();

        let set = RuleSet::load(dir.path()).unwrap();
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["git-version.mk", "pkg-config.mk"]
        );
        assert_eq!(set.get("git-version.mk").unwrap().assignments[0].name, "VERSION_FILE");
    }
}
