//! Alias registration, explicit and implicit (stream-name) aliases.

use crate::config::BotConfig;
use crate::error::Diagnostic;
use crate::names::NameTable;

use super::branches::BranchEntry;

/// Register every branch's aliases in table order; the first registrant of
/// a contested alias keeps it.
pub fn resolve_aliases(
    entries: &[BranchEntry],
    config: &BotConfig,
    names: &mut NameTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let ignored = &config.branch_names_to_ignore;

    for entry in entries {
        let branch = entry.upper_name();
        let options = &entry.options;

        for alias in options.aliases.iter().flatten() {
            names.add_alias(&branch, &alias.to_uppercase(), ignored, diagnostics);
        }

        let has_subpath = options.stream_subpath.as_deref().is_some_and(|s| !s.is_empty());
        if let Some(stream_name) = options.stream_name.as_deref().filter(|s| !s.is_empty()) {
            if !has_subpath && !config.no_stream_aliases {
                names.add_alias(&branch, &stream_name.to_uppercase(), ignored, diagnostics);
            }
        }
    }
}
