//! hppdev - Package scaffolding for HPP
//!
//! Create new packages with the standard layout and compose their
//! top-level build descriptions.
//!
//! Commands:
//! - new <NAME>: Create a new package
//! - compose: Print a build description from includes and subdirectories
//! - list: List packages of the workspace
//! - show <NAME>: Show a package descriptor and tree
//! - verify <NAME>: Check a package's build description against the disk
//! - config: Show the effective configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hppdev::compose::BUILD_FILE;
use hppdev::{Composition, Dependency, RuleSet, ScaffoldRequest, Scaffolder, Workspace};
use hppdev_core::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hppdev")]
#[command(about = "Package scaffolding for HPP - create new packages and compose their build descriptions")]
#[command(version)]
#[command(after_help = r#"PACKAGE LAYOUT:
    doc/            Documentation sources
    include/        Public headers
    src/            Implementation sources
    unitTesting/    Test sources

DEPENDENCIES:
    --dep NAME:ID   Declare a dependency (e.g. hppCore:HPPCORE)
    --dep NAME      Identifier defaults to the uppercased name

EXAMPLES:
    hppdev new hppNewAlgo --dep hppCore:HPPCORE
    hppdev compose --include doc-recursive.mk --subdir doc
    hppdev verify hppNewAlgo --build-aux ../build-aux
    hppdev list --json
"#)]
struct Cli {
    /// Workspace directory (default: config value or current directory)
    #[arg(long, short = 'w', global = true)]
    workspace: Option<PathBuf>,

    /// Config file (default: ~/.config/hppdev/config.toml)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new package
    New {
        /// Package name
        name: String,

        /// Declare a dependency (NAME:ID, NAME=ID or NAME)
        #[arg(long = "dep", value_name = "NAME[:ID]")]
        deps: Vec<String>,

        /// One-line package description
        #[arg(long, short)]
        description: Option<String>,

        /// Set template variable (KEY=VALUE)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Fail when a dependency is not a package of the workspace
        #[arg(long)]
        check_deps: bool,

        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a build description
    Compose {
        /// Rule file to include, in order
        #[arg(long = "include", value_name = "RULE")]
        includes: Vec<String>,

        /// Subdirectory of the recursive build
        #[arg(long = "subdir", value_name = "DIR")]
        subdirs: Vec<String>,

        /// Shared rule directory; enables include checks
        #[arg(long)]
        build_aux: Option<PathBuf>,

        /// Show the effective variables and targets (requires --build-aux)
        #[arg(long)]
        explain: bool,
    },

    /// List packages of the workspace
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a package
    Show {
        /// Package name
        name: String,
    },

    /// Check a package's build description against the disk
    Verify {
        /// Package name
        name: String,

        /// Shared rule directory (default: <package>/<build_aux_dir>)
        #[arg(long)]
        build_aux: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workspace) = cli.workspace {
        config.workspace = Some(workspace);
    }

    match cli.command {
        Some(Commands::New {
            name,
            deps,
            description,
            vars,
            check_deps,
            json,
        }) => {
            config.check_dependencies |= check_deps;
            let request = ScaffoldRequest {
                name,
                dependencies: Dependency::parse_all(&deps)?,
                description,
                vars,
            };
            cmd_new(config, &request, json)
        }

        Some(Commands::Compose {
            includes,
            subdirs,
            build_aux,
            explain,
        }) => cmd_compose(&config, includes, subdirs, build_aux.as_deref(), explain),

        Some(Commands::List { json }) => cmd_list(&workspace(&config)?, json),

        Some(Commands::Show { name }) => cmd_show(&workspace(&config)?, &name),

        Some(Commands::Verify { name, build_aux }) => {
            cmd_verify(&config, &workspace(&config)?, &name, build_aux.as_deref())
        }

        Some(Commands::Config) => cmd_config(&config),

        None => cmd_list(&workspace(&config)?, false),
    }
}

fn workspace(config: &Config) -> Result<Workspace> {
    Ok(Workspace::open(config.workspace_dir()?))
}

/// Create a new package
fn cmd_new(config: Config, request: &ScaffoldRequest, json: bool) -> Result<()> {
    let workspace = workspace(&config)?;
    let scaffolder = Scaffolder::new(config, workspace);

    if !json {
        println!("info: Creating package: {}", request.name);
    }

    let descriptor = scaffolder
        .scaffold(request)
        .with_context(|| format!("Failed to create package: {}", request.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("success: Package created: {}", descriptor.root.display());
    for dep in &descriptor.dependencies {
        println!("  depends on {} ({})", dep.name, dep.id);
    }
    println!();
    println!("Next steps:");
    println!("  cd {}", descriptor.root.display());
    println!("  add the shared rules under {}/", scaffolder.composition().build_aux_dir);
    println!("  autoreconf -i && ./configure");

    Ok(())
}

/// Print a composed build description
fn cmd_compose(
    config: &Config,
    includes: Vec<String>,
    subdirs: Vec<String>,
    build_aux: Option<&Path>,
    explain: bool,
) -> Result<()> {
    if explain && build_aux.is_none() {
        bail!("--explain requires --build-aux");
    }

    let includes = if includes.is_empty() {
        config.includes.clone()
    } else {
        includes
    };

    let composition = Composition::new(config.build_aux_dir.clone())
        .with_includes(includes)
        .with_subdirs(subdirs);
    composition.check()?;

    if let Some(dir) = build_aux {
        composition.verify_includes(dir)?;
    }

    print!("{}", composition.render());

    if let (true, Some(dir)) = (explain, build_aux) {
        let rules = RuleSet::load(dir)
            .with_context(|| format!("Failed to load rule files from {}", dir.display()))?;
        let defs = composition.effective_definitions(&rules)?;

        println!();
        println!("# Rule files: {}", rules.names().collect::<Vec<_>>().join(", "));
        println!("# Effective variables");
        for (name, def) in &defs.variables {
            println!("#   {} = {}    ({})", name, def.value, def.origin);
        }
        println!("# Effective targets");
        for (target, origin) in &defs.targets {
            println!("#   {}    ({})", target, origin);
        }
    }

    Ok(())
}

/// List all packages of the workspace
fn cmd_list(workspace: &Workspace, json: bool) -> Result<()> {
    let packages = workspace.packages()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    println!("\x1b[1mPackages in {}\x1b[0m", workspace.root().display());
    println!();

    if packages.is_empty() {
        println!("\x1b[2mNo packages found.\x1b[0m");
        println!("Create one with: hppdev new <NAME>");
        return Ok(());
    }

    for package in &packages {
        println!("  \x1b[32m{}\x1b[0m {}", package.name, package.version);
        if !package.description.is_empty() {
            println!("    \x1b[2m{}\x1b[0m", package.description);
        }
        if !package.dependencies.is_empty() {
            let deps: Vec<_> = package.dependencies.iter().map(|d| d.name.as_str()).collect();
            println!("    \x1b[2mdepends on: {}\x1b[0m", deps.join(", "));
        }
    }

    Ok(())
}

/// Show a package descriptor and its tree
fn cmd_show(workspace: &Workspace, name: &str) -> Result<()> {
    let package = workspace
        .find(name)?
        .ok_or_else(|| anyhow::anyhow!("Package not found: {}", name))?;

    println!("\x1b[1mPackage: {}\x1b[0m", package.name);
    println!("\x1b[2mPath: {}\x1b[0m", package.root.display());
    println!();

    println!("\x1b[36mDescriptor:\x1b[0m");
    println!("{}", serde_json::to_string_pretty(&package)?);
    println!();

    let dependents = workspace.dependents(name)?;
    if !dependents.is_empty() {
        println!("\x1b[36mUsed by:\x1b[0m");
        for dependent in &dependents {
            println!("  {}", dependent.name);
        }
        println!();
    }

    println!("\x1b[36mStructure:\x1b[0m");
    print_tree(&package.root, "", true)?;

    Ok(())
}

/// Print directory tree structure
fn print_tree(path: &Path, prefix: &str, is_last: bool) -> Result<()> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(".");

    let connector = if prefix.is_empty() {
        ""
    } else if is_last {
        "--- "
    } else {
        "|-- "
    };

    println!("{}{}{}", prefix, connector, name);

    if path.is_dir() {
        let mut entries: Vec<_> = fs::read_dir(path)?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        let count = entries.len();
        for (i, entry) in entries.into_iter().enumerate() {
            let new_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}|   ", prefix)
            };

            print_tree(&entry.path(), &new_prefix, i == count - 1)?;
        }
    }

    Ok(())
}

/// Check a package against its own build description
fn cmd_verify(
    config: &Config,
    workspace: &Workspace,
    name: &str,
    build_aux: Option<&Path>,
) -> Result<()> {
    let package = workspace
        .find(name)?
        .ok_or_else(|| anyhow::anyhow!("Package not found: {}", name))?;

    let build_file = package.root.join(BUILD_FILE);
    let text = fs::read_to_string(&build_file)
        .with_context(|| format!("Failed to read {}", build_file.display()))?;
    let composition = Composition::parse(&text);

    composition.verify_subdirs(&package.root)?;
    println!("success: {} subdirectories have build descriptions", composition.subdirs.len());

    let aux_name = if composition.build_aux_dir.is_empty() {
        config.build_aux_dir.as_str()
    } else {
        composition.build_aux_dir.as_str()
    };
    let build_aux = build_aux
        .map(Path::to_path_buf)
        .unwrap_or_else(|| package.root.join(aux_name));

    composition.verify_includes(&build_aux)?;
    println!(
        "success: {} rule files found in {}",
        composition.includes.len(),
        build_aux.display()
    );

    Ok(())
}

/// Show the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    println!("\x1b[2m# {}\x1b[0m", Config::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_new_collects_deps() {
        let cli = Cli::parse_from([
            "hppdev",
            "new",
            "hppNewAlgo",
            "--dep",
            "hppCore:HPPCORE",
            "--dep",
            "kwsPlus",
        ]);
        match cli.command {
            Some(Commands::New { name, deps, .. }) => {
                assert_eq!(name, "hppNewAlgo");
                assert_eq!(deps, vec!["hppCore:HPPCORE", "kwsPlus"]);
            }
            _ => panic!("expected new command"),
        }
    }
}
