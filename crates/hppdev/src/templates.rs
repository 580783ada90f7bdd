//! Built-in file templates for new packages
//!
//! Paths and bodies use {{PLACEHOLDER}} syntax, see [`crate::variables`].
//! Besides the standard variables, the scaffolder provides:
//! - `{{VERSION}}`, `{{BUILD_AUX}}`
//! - `{{NAME_CANON}}`: the name as an automake canonical token
//! - `{{PKG_CHECKS}}`: one `PKG_CHECK_MODULES` line per dependency
//! - `{{REQUIRES}}`: dependency names for the pkg-config file
//! - `{{DEP_CFLAGS}}`, `{{DEP_LIBS}}`: per-dependency compiler and linker flags

/// A file written into every new package
#[derive(Debug, Clone, Copy)]
pub struct FileTemplate {
    /// Path relative to the package root
    pub path: &'static str,
    pub body: &'static str,
}

pub const CONFIGURE_AC: &str = r#"# {{NAME}}: {{DESCRIPTION}}
# Copyright (C) {{YEAR}} {{AUTHOR}} <{{EMAIL}}>

AC_PREREQ([2.59])
AC_INIT([{{NAME}}], [{{VERSION}}], [{{EMAIL}}])
AC_CONFIG_AUX_DIR([{{BUILD_AUX}}])
AC_CONFIG_MACRO_DIR([{{BUILD_AUX}}])
AM_INIT_AUTOMAKE([foreign subdir-objects])

AC_PROG_CXX
LT_INIT

# Dependencies, in declaration order
{{PKG_CHECKS}}

AC_CONFIG_FILES([
  Makefile
  {{NAME}}.pc
  doc/Makefile
  include/Makefile
  src/Makefile
  unitTesting/Makefile
])
AC_OUTPUT
"#;

pub const PKG_CONFIG_IN: &str = r#"prefix=@prefix@
exec_prefix=@exec_prefix@
libdir=@libdir@
includedir=@includedir@

Name: {{NAME}}
Description: {{DESCRIPTION}}
Version: @VERSION@
Requires: {{REQUIRES}}
Libs: -L${libdir} -l{{NAME}}
Cflags: -I${includedir}
"#;

pub const DOC_MAKEFILE: &str = r#"# Documentation of {{NAME}}
DOXYGEN_INPUT = $(top_srcdir)/include/{{NAME}} $(srcdir)

EXTRA_DIST = $(srcdir)/*.txt
"#;

pub const INCLUDE_MAKEFILE: &str = r#"# Public headers of {{NAME}}, installed under include/{{NAME}}
nobase_include_HEADERS =
"#;

pub const SRC_MAKEFILE: &str = r#"lib_LTLIBRARIES = lib{{NAME}}.la

lib{{NAME_CANON}}_la_SOURCES =
lib{{NAME_CANON}}_la_CPPFLAGS = -I$(top_srcdir)/include {{DEP_CFLAGS}}
lib{{NAME_CANON}}_la_LIBADD = {{DEP_LIBS}}
"#;

pub const UNIT_TESTING_MAKEFILE: &str = r#"# Unit tests of {{NAME}}
AM_CPPFLAGS = -I$(top_srcdir)/include {{DEP_CFLAGS}}
LDADD = $(top_builddir)/src/lib{{NAME}}.la {{DEP_LIBS}}

check_PROGRAMS =
TESTS = $(check_PROGRAMS)
"#;

/// Every template file, in write order
pub const TEMPLATES: &[FileTemplate] = &[
    FileTemplate {
        path: "configure.ac",
        body: CONFIGURE_AC,
    },
    FileTemplate {
        path: "{{NAME}}.pc.in",
        body: PKG_CONFIG_IN,
    },
    FileTemplate {
        path: "doc/Makefile.am",
        body: DOC_MAKEFILE,
    },
    FileTemplate {
        path: "include/Makefile.am",
        body: INCLUDE_MAKEFILE,
    },
    FileTemplate {
        path: "src/Makefile.am",
        body: SRC_MAKEFILE,
    },
    FileTemplate {
        path: "unitTesting/Makefile.am",
        body: UNIT_TESTING_MAKEFILE,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Variables;

    #[test]
    fn test_every_subdir_template_is_a_build_file() {
        for dir in crate::scaffold::LAYOUT {
            let path = format!("{}/Makefile.am", dir);
            assert!(
                TEMPLATES.iter().any(|t| t.path == path),
                "missing build description for {dir}"
            );
        }
    }

    #[test]
    fn test_templates_only_use_known_placeholders() {
        let known = [
            "NAME",
            "NAME_CANON",
            "AUTHOR",
            "EMAIL",
            "YEAR",
            "DESCRIPTION",
            "VERSION",
            "BUILD_AUX",
            "PKG_CHECKS",
            "REQUIRES",
            "DEP_CFLAGS",
            "DEP_LIBS",
        ];
        for template in TEMPLATES {
            for var in Variables::find_used_variables(template.body)
                .into_iter()
                .chain(Variables::find_used_variables(template.path))
            {
                assert!(known.contains(&var.as_str()), "{} uses {var}", template.path);
            }
        }
    }
}
