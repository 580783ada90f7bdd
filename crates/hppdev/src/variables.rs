//! Template variable handling
//!
//! Provides variable substitution using {{PLACEHOLDER}} syntax.
//! Variables are replaced in both file content and file names.

use chrono::Local;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::process::Command;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Z_][A-Z0-9_]*)\}\}").expect("placeholder pattern is valid"))
}

/// Template variables container
#[derive(Debug, Clone)]
pub struct Variables {
    /// Variable name -> value mapping
    vars: HashMap<String, String>,
}

impl Variables {
    /// Create a new Variables container with standard variables populated
    pub fn new(package_name: &str) -> Self {
        let mut vars = HashMap::new();

        vars.insert("NAME".to_string(), package_name.to_string());
        vars.insert("AUTHOR".to_string(), Self::get_author());
        vars.insert("EMAIL".to_string(), Self::get_email());
        vars.insert("DATE".to_string(), Local::now().format("%Y-%m-%d").to_string());
        vars.insert("YEAR".to_string(), Local::now().format("%Y").to_string());
        vars.insert("DESCRIPTION".to_string(), "A new HPP package".to_string());

        Self { vars }
    }

    /// Get the author name from git config or environment
    fn get_author() -> String {
        git_config("user.name")
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()))
    }

    /// Get the email from git config
    fn get_email() -> String {
        git_config("user.email").unwrap_or_else(|| {
            let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
            format!("{}@localhost", user)
        })
    }

    /// Set a variable value
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_uppercase(), value.to_string());
    }

    /// Set the description variable
    pub fn set_description(&mut self, desc: &str) {
        self.set("DESCRIPTION", desc);
    }

    /// Parse KEY=VALUE strings and add them as variables
    pub fn add_from_pairs(&mut self, pairs: &[String]) {
        for pair in pairs {
            if let Some((key, value)) = pair.split_once('=') {
                self.set(key.trim(), value.trim());
            }
        }
    }

    /// Replace all {{PLACEHOLDER}} patterns in a string
    ///
    /// Unknown placeholders are left untouched.
    pub fn substitute(&self, content: &str) -> String {
        placeholder_re()
            .replace_all(content, |caps: &Captures| {
                let key = &caps[1];
                self.vars
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| format!("{{{{{}}}}}", key))
            })
            .into_owned()
    }

    /// Find all variables used in a string
    pub fn find_used_variables(content: &str) -> Vec<String> {
        let mut vars: Vec<String> = placeholder_re()
            .captures_iter(content)
            .map(|cap| cap[1].to_string())
            .collect();

        vars.sort();
        vars.dedup();
        vars
    }
}

fn git_config(key: &str) -> Option<String> {
    let output = Command::new("git").args(["config", key]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
