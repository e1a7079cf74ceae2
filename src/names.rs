//! Branch naming rules, the integration-method registry and the
//! case-insensitive name table.

use std::collections::HashMap;

use thiserror::Error;

use crate::error::Diagnostic;

/// Names no branch or alias may take, compared upper-cased.
pub const RESERVED_BRANCH_NAMES: [&str; 5] = ["NONE", "DEFAULT", "IGNORE", "DEADEND", ""];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Names must be alphanumeric, dash, underscore or dot: '{0}'")]
    InvalidCharacters(String),

    #[error("'{0}' is a reserved branch name")]
    Reserved(String),
}

/// Check a branch name or alias against `^[-a-zA-Z0-9_.]+$` and the
/// reserved list.
pub fn check_name(name: &str) -> Result<(), NameError> {
    let well_formed = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !well_formed {
        return Err(NameError::InvalidCharacters(name.to_string()));
    }

    let upper = name.to_uppercase();
    if RESERVED_BRANCH_NAMES.contains(&upper.as_str()) {
        return Err(NameError::Reserved(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationMethod {
    Normal,
    ConvertToEdit,
}

impl IntegrationMethod {
    pub const ALL: [IntegrationMethod; 2] = [IntegrationMethod::Normal, IntegrationMethod::ConvertToEdit];

    pub fn as_str(self) -> &'static str {
        match self {
            IntegrationMethod::Normal => "normal",
            IntegrationMethod::ConvertToEdit => "convert-to-edit",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(method: &str) -> Option<Self> {
        let lower = method.to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == lower)
    }
}

/// Record an `Unknown integrationMethod` diagnostic unless `method` is registered.
pub fn check_integration_method(method: &str, owner: &str, diagnostics: &mut Vec<Diagnostic>) {
    if IntegrationMethod::parse(method).is_none() {
        let message = format!("Unknown integrationMethod '{}' in '{}'", method, owner);
        let diagnostic = if owner == "config" {
            Diagnostic::config("C002", message)
        } else {
            Diagnostic::schema("C002", message, Some(owner))
        };
        diagnostics.push(diagnostic);
    }
}

/// Upper-cased name or alias → upper-cased canonical branch name.
///
/// The single source of truth for whether a name exists. Built once per
/// validation run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: HashMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canonical branch name. Returns `false` if the upper-cased
    /// name was already claimed; the first registration is kept.
    pub fn register_branch(&mut self, name: &str) -> bool {
        let upper = name.to_uppercase();
        if self.names.contains_key(&upper) {
            return false;
        }
        self.names.insert(upper.clone(), upper);
        true
    }

    /// Register `alias` for `branch`. Both must already be upper-cased;
    /// `ignored` is the upper-cased `branchNamesToIgnore` list.
    pub fn add_alias(
        &mut self,
        branch: &str,
        alias: &str,
        ignored: &[String],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if ignored.iter().any(|n| n == branch) {
            diagnostics.push(Diagnostic::alias(
                "A001",
                format!("{} branch is in branchNamesToIgnore", branch),
                branch,
            ));
        }
        if ignored.iter().any(|n| n == alias) {
            diagnostics.push(Diagnostic::alias(
                "A001",
                format!("{} alias is in branchNamesToIgnore", alias),
                branch,
            ));
        }

        if alias.is_empty() {
            diagnostics.push(Diagnostic::alias(
                "A002",
                format!("Empty alias for '{}'", branch),
                branch,
            ));
            return;
        }
        if let Err(e) = check_name(alias) {
            diagnostics.push(Diagnostic::alias("A002", e.to_string(), branch));
            return;
        }

        match self.names.get(alias) {
            Some(existing) if existing != branch => {
                diagnostics.push(Diagnostic::alias(
                    "A003",
                    format!(
                        "Duplicate alias '{}' for '{}' and '{}'",
                        alias, existing, branch
                    ),
                    branch,
                ));
            }
            _ => {
                self.names.insert(alias.to_string(), branch.to_string());
            }
        }
    }

    /// Resolve any name or alias, case-insensitively, to its canonical
    /// upper-cased branch name.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(&name.to_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_branch_names() {
        for name in ["Main", "Release-5.1", "dev_feature.x", "a"] {
            assert_eq!(check_name(name), Ok(()), "{name}");
        }
    }

    #[test]
    fn rejects_bad_characters() {
        assert_eq!(
            check_name("Main/Sub").unwrap_err().to_string(),
            "Names must be alphanumeric, dash, underscore or dot: 'Main/Sub'"
        );
        assert!(matches!(check_name(""), Err(NameError::InvalidCharacters(_))));
        assert!(matches!(check_name("has space"), Err(NameError::InvalidCharacters(_))));
    }

    #[test]
    fn rejects_reserved_names_in_any_case() {
        for name in ["NONE", "none", "Default", "ignore", "DeadEnd"] {
            assert_eq!(check_name(name), Err(NameError::Reserved(name.to_string())));
        }
    }

    #[test]
    fn integration_method_lookup_is_case_insensitive() {
        assert_eq!(IntegrationMethod::parse("NORMAL"), Some(IntegrationMethod::Normal));
        assert_eq!(
            IntegrationMethod::parse("Convert-To-Edit"),
            Some(IntegrationMethod::ConvertToEdit)
        );
        assert_eq!(IntegrationMethod::parse("squash"), None);
    }

    #[test]
    fn first_alias_registrant_wins() {
        let mut names = NameTable::new();
        let mut diagnostics = Vec::new();
        names.register_branch("Main");
        names.register_branch("Dev");
        names.add_alias("MAIN", "TRUNK", &[], &mut diagnostics);
        names.add_alias("DEV", "TRUNK", &[], &mut diagnostics);

        assert_eq!(names.resolve("trunk"), Some("MAIN"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Duplicate alias 'TRUNK' for 'MAIN' and 'DEV'"
        );
    }

    #[test]
    fn re_adding_own_alias_is_not_a_duplicate() {
        let mut names = NameTable::new();
        let mut diagnostics = Vec::new();
        names.register_branch("Main");
        names.add_alias("MAIN", "MAIN", &[], &mut diagnostics);
        names.add_alias("MAIN", "TRUNK", &[], &mut diagnostics);
        names.add_alias("MAIN", "TRUNK", &[], &mut diagnostics);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn ignored_names_are_flagged_but_still_registered() {
        let mut names = NameTable::new();
        let mut diagnostics = Vec::new();
        names.register_branch("Main");
        let ignored = vec!["MAIN".to_string(), "OLD".to_string()];
        names.add_alias("MAIN", "OLD", &ignored, &mut diagnostics);

        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "MAIN branch is in branchNamesToIgnore",
                "OLD alias is in branchNamesToIgnore"
            ]
        );
        assert_eq!(names.resolve("old"), Some("MAIN"));
    }

    #[test]
    fn empty_and_malformed_aliases_are_rejected() {
        let mut names = NameTable::new();
        let mut diagnostics = Vec::new();
        names.register_branch("Main");
        names.add_alias("MAIN", "", &[], &mut diagnostics);
        names.add_alias("MAIN", "BAD ALIAS", &[], &mut diagnostics);
        names.add_alias("MAIN", "NONE", &[], &mut diagnostics);

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].message, "Empty alias for 'MAIN'");
        assert!(diagnostics[2].message.contains("reserved branch name"));
        assert_eq!(names.len(), 1);
    }
}
