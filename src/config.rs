//! Whole-bot settings: fixed defaults overridden by top-level document keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Diagnostic, StructuralError};
use crate::names::check_integration_method;
use crate::parse::{RawDocument, StringOrList};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub default_stream_depot: Option<String>,
    pub default_integration_method: Option<String>,
    pub is_default_bot: bool,
    pub no_stream_aliases: bool,
    pub global_notify: Vec<String>,
    pub triager: Option<String>,
    pub nag_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_leeway: Option<f64>,
    pub nag_when_blocked: Option<bool>,
    pub email_on_blockage: bool,
    pub check_interval_secs: f64,
    pub exclude_authors: Vec<String>,
    pub visibility: StringOrList,
    pub slack_channel: String,
    pub report_to_build_health: bool,
    pub mirror_path: Vec<String>,
    /// Alternative names for the bot; the first is used in incognito mode.
    pub aliases: Vec<String>,
    pub badge_url_override: String,
    /// Upper-cased once extracted.
    pub branch_names_to_ignore: Vec<String>,
    /// Macro name (lower-cased) → command lines.
    pub macros: BTreeMap<String, Vec<String>>,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            default_stream_depot: None,
            default_integration_method: None,
            is_default_bot: false,
            no_stream_aliases: false,
            global_notify: vec![],
            triager: None,
            nag_schedule: None,
            nag_acknowledged_schedule: None,
            nag_acknowledged_leeway: None,
            nag_when_blocked: None,
            email_on_blockage: true,
            check_interval_secs: 30.0,
            exclude_authors: vec![],
            visibility: StringOrList::Many(vec!["fte".into()]),
            slack_channel: String::new(),
            report_to_build_health: false,
            mirror_path: vec![],
            aliases: vec![],
            badge_url_override: String::new(),
            branch_names_to_ignore: vec![],
            macros: BTreeMap::new(),
        }
    }
}

/// Document keys that override [`BotConfig`] fields.
pub const BOT_CONFIG_FIELDS: &[&str] = &[
    "defaultStreamDepot",
    "defaultIntegrationMethod",
    "isDefaultBot",
    "noStreamAliases",
    "globalNotify",
    "triager",
    "nagSchedule",
    "nagAcknowledgedSchedule",
    "nagAcknowledgedLeeway",
    "nagWhenBlocked",
    "emailOnBlockage",
    "checkIntervalSecs",
    "excludeAuthors",
    "visibility",
    "slackChannel",
    "reportToBuildHealth",
    "mirrorPath",
    "aliases",
    "badgeUrlOverride",
    "branchNamesToIgnore",
    "macros",
];

/// Build the bot configuration for one validation run.
///
/// A value of the wrong type is reported and the default kept. A malformed
/// macro table is structural.
pub fn extract_bot_config(
    document: &RawDocument,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<BotConfig, StructuralError> {
    let mut merged = match serde_json::to_value(BotConfig::default())? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for &key in BOT_CONFIG_FIELDS {
        let value = if key == "aliases" {
            bot_aliases(document)
        } else {
            document.get(key).cloned()
        };
        let Some(value) = value else { continue };
        let value = if key == "macros" {
            lower_case_macros(&value)?
        } else {
            value
        };

        let previous = merged.insert(key.to_string(), value);
        if let Err(e) = serde_json::from_value::<BotConfig>(Value::Object(merged.clone())) {
            diagnostics.push(Diagnostic::config(
                "C001",
                format!("Invalid value for bot property '{}': {}", key, e),
            ));
            if let Some(previous) = previous {
                merged.insert(key.to_string(), previous);
            }
        }
    }

    let mut config: BotConfig = serde_json::from_value(Value::Object(merged))?;

    if let Some(method) = config.default_integration_method.as_deref().filter(|m| !m.is_empty()) {
        check_integration_method(method, "config", diagnostics);
    }

    config.branch_names_to_ignore = config
        .branch_names_to_ignore
        .iter()
        .map(|n| n.to_uppercase())
        .collect();

    debug!(
        depot = ?config.default_stream_depot,
        macros = config.macros.len(),
        "bot config extracted"
    );
    Ok(config)
}

/// `aliases`, with a singular `alias` prepended when given.
fn bot_aliases(document: &RawDocument) -> Option<Value> {
    let aliases = document.get("aliases").cloned();
    let alias = match document.get("alias") {
        None | Some(Value::Null) => return aliases,
        Some(Value::String(s)) if s.is_empty() => return aliases,
        Some(alias) => alias.clone(),
    };
    match aliases {
        None | Some(Value::Null) => Some(Value::Array(vec![alias])),
        Some(Value::Array(mut rest)) => {
            rest.insert(0, alias);
            Some(Value::Array(rest))
        }
        Some(other) => Some(other),
    }
}

fn lower_case_macros(value: &Value) -> Result<Value, StructuralError> {
    let invalid = || StructuralError::InvalidMacros(value.to_string());

    let Value::Object(macros) = value else {
        return Err(invalid());
    };
    let mut lowered = Map::new();
    for (name, lines) in macros {
        let is_command_list = lines
            .as_array()
            .is_some_and(|lines| lines.iter().all(Value::is_string));
        if !is_command_list {
            return Err(invalid());
        }
        lowered.insert(name.to_lowercase(), lines.clone());
    }
    Ok(Value::Object(lowered))
}
