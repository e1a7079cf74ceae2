//! Typed projections of the branch graph document.
//!
//! Wire names are camelCase. Every struct here has a matching field-name
//! allowlist below; keep the two aligned (the tests at the bottom check it).

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::names::NameTable;

// =============================================================================
// SHARED VALUE SHAPES
// =============================================================================

/// A field accepting either one string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangelistRef {
    Number(u64),
    Path(String),
}

/// `flowsTo` / `forceFlowTo`. A value that is not a list of names is kept
/// as-is so flow validation can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowTargets {
    List(Vec<String>),
    Malformed(Value),
}

impl FlowTargets {
    pub fn names(&self) -> &[String] {
        match self {
            FlowTargets::List(names) => names,
            FlowTargets::Malformed(_) => &[],
        }
    }
}

// =============================================================================
// COMMON OPTIONS (nodes and edges)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationWindowPane {
    /// Daily when absent.
    pub days_of_the_week: Option<Vec<String>>,
    #[serde(rename = "startHourUTC")]
    pub start_hour_utc: Option<f64>,
    pub duration_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonOptions {
    #[serde(rename = "lastGoodCLPath")]
    pub last_good_cl_path: Option<ChangelistRef>,
    #[serde(rename = "waitingForCISLink")]
    pub waiting_for_cis_link: Option<String>,
    #[serde(rename = "pauseCISUnlessAtGate")]
    pub pause_cis_unless_at_gate: Option<bool>,
    #[serde(rename = "initialCL")]
    pub initial_cl: Option<u64>,
    pub force_pause: Option<bool>,
    pub disallow_skip: Option<bool>,
    pub incognito_mode: Option<bool>,
    /// Completely overrides the bot-level list when present.
    pub exclude_authors: Option<Vec<String>>,
    /// When gate catch-ups are allowed, or disallowed if inverted.
    pub integration_window: Option<Vec<IntegrationWindowPane>>,
    pub invert_integration_window: Option<bool>,
    #[serde(rename = "_comment")]
    pub comment: Option<String>,
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOptions {
    #[serde(default)]
    pub name: String,
    pub root_path: Option<String>,
    pub unique_branch: Option<bool>,
    pub is_default_bot: Option<bool>,
    pub email_on_blockage: Option<bool>,
    pub notify: Option<Vec<String>>,
    pub flows_to: Option<FlowTargets>,
    pub force_flow_to: Option<FlowTargets>,
    pub default_flow: Option<Vec<String>>,
    pub macros: Option<BTreeMap<String, Vec<String>>>,
    pub resolver: Option<String>,
    pub triager: Option<String>,
    pub nag_when_blocked: Option<bool>,
    pub nag_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_leeway: Option<f64>,
    pub aliases: Option<Vec<String>>,
    pub badge_project: Option<String>,

    #[serde(flatten)]
    pub common: CommonOptions,

    pub disabled: Option<bool>,
    pub integration_method: Option<String>,
    pub force_all: Option<bool>,
    pub visibility: Option<StringOrList>,
    pub block_asset_flow: Option<Vec<String>>,
    pub disallow_deadend: Option<bool>,
    pub stream_depot: Option<String>,
    pub stream_name: Option<String>,
    pub stream_subpath: Option<String>,
    pub graph_node_color: Option<String>,
    pub additional_slack_channel_for_blockages: Option<String>,
    pub post_messages_to_additional_channel_only: Option<bool>,
    pub ignore_branchspecs: Option<bool>,
    pub badge_url_override: Option<String>,
}

impl NodeOptions {
    pub fn flows_to(&self) -> &[String] {
        self.flows_to.as_ref().map_or(&[], FlowTargets::names)
    }

    pub fn force_flow_to(&self) -> &[String] {
        self.force_flow_to.as_ref().map_or(&[], FlowTargets::names)
    }
}

// =============================================================================
// EDGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOptions {
    pub description: String,
    pub channel_id: String,
    #[serde(default = "default_block")]
    pub block: bool,
}

fn default_block() -> bool {
    true
}

/// Policy overlay for changes flowing along one `from -> to` path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeProperties {
    pub from: String,
    pub to: String,

    #[serde(flatten)]
    pub common: CommonOptions,

    pub branchspec: Option<String>,
    pub additional_slack_channel: Option<String>,
    pub post_only_to_additional_channel: Option<bool>,
    pub resolver: Option<String>,
    pub triager: Option<String>,
    pub nag_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_schedule: Option<Vec<f64>>,
    pub nag_acknowledged_leeway: Option<f64>,
    pub nag_when_blocked: Option<bool>,
    /// Changes go along terminal edges but no further.
    pub terminal: Option<bool>,
    pub implicit_commands: Option<Vec<String>>,
    pub ignore_in_cycle_detection: Option<bool>,
    /// Still generate a workspace, but under this name.
    pub workspace_name_override: Option<String>,
    pub approval: Option<ApprovalOptions>,
}

// =============================================================================
// BRANCHSPECS + GRAPH
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSpecDefinition {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub name: String,
}

/// A fully validated branch graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchGraphDefinition {
    pub branches: Vec<NodeOptions>,
    pub edges: Option<Vec<EdgeProperties>>,
    pub branchspecs: Option<Vec<BranchSpecDefinition>>,
    #[serde(skip)]
    pub names: NameTable,
}

impl BranchGraphDefinition {
    /// Find a branch by name or alias, case-insensitively.
    pub fn find_branch(&self, name: &str) -> Option<&NodeOptions> {
        let canonical = self.names.resolve(name)?;
        self.branches
            .iter()
            .find(|b| b.name.to_uppercase() == canonical)
    }
}

// =============================================================================
// FIELD ALLOWLISTS
// =============================================================================

const BRANCH_BASE_FIELDS: &[&str] = &[
    "name",
    "rootPath",
    "uniqueBranch",
    "isDefaultBot",
    "emailOnBlockage",
    "notify",
    "flowsTo",
    "forceFlowTo",
    "defaultFlow",
    "macros",
    "resolver",
    "triager",
    "nagWhenBlocked",
    "nagSchedule",
    "nagAcknowledgedSchedule",
    "nagAcknowledgedLeeway",
    "aliases",
    "badgeProject",
];

const COMMON_OPTION_FIELDS: &[&str] = &[
    "lastGoodCLPath",
    "waitingForCISLink",
    "pauseCISUnlessAtGate",
    "initialCL",
    "forcePause",
    "disallowSkip",
    "incognitoMode",
    "excludeAuthors",
    "integrationWindow",
    "invertIntegrationWindow",
    "_comment",
];

const NODE_ONLY_FIELDS: &[&str] = &[
    "disabled",
    "integrationMethod",
    "forceAll",
    "visibility",
    "blockAssetFlow",
    "disallowDeadend",
    "streamDepot",
    "streamName",
    "streamSubpath",
    "graphNodeColor",
    "additionalSlackChannelForBlockages",
    "postMessagesToAdditionalChannelOnly",
    "ignoreBranchspecs",
    "badgeUrlOverride",
];

const EDGE_ONLY_FIELDS: &[&str] = &[
    "branchspec",
    "additionalSlackChannel",
    "postOnlyToAdditionalChannel",
    "resolver",
    "triager",
    "nagSchedule",
    "nagAcknowledgedSchedule",
    "nagAcknowledgedLeeway",
    "nagWhenBlocked",
    "terminal",
    "implicitCommands",
    "ignoreInCycleDetection",
    "workspaceNameOverride",
    "approval",
];

/// Keys a branch object may carry.
pub static NODE_OPTION_FIELDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    BRANCH_BASE_FIELDS
        .iter()
        .chain(COMMON_OPTION_FIELDS)
        .chain(NODE_ONLY_FIELDS)
        .copied()
        .collect()
});

/// Keys an edge object may carry besides `from` and `to`.
pub static EDGE_OPTION_FIELDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    COMMON_OPTION_FIELDS
        .iter()
        .chain(EDGE_ONLY_FIELDS)
        .copied()
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn serialized_keys<T: Serialize>(value: &T) -> HashSet<String> {
        match serde_json::to_value(value).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn node_allowlist_matches_node_options() {
        let keys = serialized_keys(&NodeOptions::default());
        let allowed: HashSet<String> = NODE_OPTION_FIELDS.iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, allowed);
    }

    #[test]
    fn edge_allowlist_matches_edge_properties() {
        let mut keys = serialized_keys(&EdgeProperties::default());
        keys.remove("from");
        keys.remove("to");
        let allowed: HashSet<String> = EDGE_OPTION_FIELDS.iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, allowed);
    }

    #[test]
    fn malformed_flow_targets_are_preserved() {
        let node: NodeOptions =
            serde_json::from_value(serde_json::json!({"name": "Main", "flowsTo": "Dev"})).unwrap();
        assert_eq!(
            node.flows_to,
            Some(FlowTargets::Malformed(Value::String("Dev".into())))
        );
        assert!(node.flows_to().is_empty());
    }

    #[test]
    fn window_hours_are_optional_numbers() {
        let pane: IntegrationWindowPane =
            serde_json::from_value(serde_json::json!({"daysOfTheWeek": ["mon"], "startHourUTC": 1.5}))
                .unwrap();
        assert_eq!(pane.start_hour_utc, Some(1.5));
        assert_eq!(pane.duration_hours, None);
    }

    #[test]
    fn approval_block_defaults_to_true() {
        let approval: ApprovalOptions =
            serde_json::from_value(serde_json::json!({"description": "d", "channelId": "C1"}))
                .unwrap();
        assert!(approval.block);
    }
}
