//! Generates Move module scaffolding from a canvas graph.
//!
//! Generation runs in two passes. [`identify_relationships`] groups nodes by
//! edge fan-out (one-to-many) and fan-in (many-to-one). [`generate_move_code`]
//! then walks the nodes in array order and appends a fixed template for each
//! recognized node kind and label. The output is illustrative scaffolding; it
//! is never compiled or type-checked.

use std::collections::HashMap;

use db::models::canvas::{CanvasEdge, CanvasNode, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

const MODULE_HEADER: &str = "module SmartContract {
    use std::signer;
    use std::vector;
    use aptos_framework::coin;
    use aptos_framework::account;

";

const RESOURCE_ACCOUNT_STRUCT: &str = "    // Resource account for many-to-one relationships
    struct ResourceAccount {
        signer_cap: account::SignerCapability
    }

";

const TOKEN_STRUCTS: &str = "    // Token definitions
    struct CoinType {}

    // Token capabilities
    struct TokenCapabilities {
        mint_cap: coin::MintCapability<CoinType>,
        burn_cap: coin::BurnCapability<CoinType>
    }

";

const DEPOSIT_FN: &str = "    public entry fun deposit(
        account: &signer,
        amount: u64
    ) {
        // Check if account has enough balance
        // Handle deposit logic
    }

";

const WITHDRAW_FN: &str = "    public entry fun withdraw(
        account: &signer,
        amount: u64
    ) {
        // Verify account has enough deposited
        // Handle withdrawal logic
    }

";

const TRANSFER_FN: &str = "    public entry fun transfer(
        from: &signer,
        to: address,
        amount: u64
    ) {
        // Verify sender authorization
        // Handle transfer logic
    }

";

const CHOICE_FN: &str = "    public entry fun make_choice(
        account: &signer,
        choice_id: u64,
        choice_value: u64
    ) {
        // Record the choice made by the account
    }

";

const NOTIFICATION_FN: &str = "    public entry fun notify(
        account: &signer,
        message: vector<u8>
    ) {
        // Emit notification event
    }

";

const COLLECTION_FNS: &str = "    // Functions for one-to-many relationships
    public fun add_to_collection(
        owner: &signer,
        collection_name: vector<u8>,
        item_id: u64
    ) {
        // Add item to the collection
    }

    public fun remove_from_collection(
        owner: &signer,
        collection_name: vector<u8>,
        item_id: u64
    ) {
        // Remove item from the collection
    }

";

const RESOURCE_ACCOUNT_FNS: &str = "    // Functions for many-to-one relationships
    public fun initialize_resource_account(
        admin: &signer,
        seed: vector<u8>
    ) {
        // Create a resource account and store its capability
    }

    public fun execute_as_resource(
        admin: &signer,
        action: u64
    ) {
        // Execute actions as the resource account
    }

";

const TOKEN_FNS: &str = "    // Initialize and mint tokens
    public fun initialize_token(
        admin: &signer,
        name: vector<u8>,
        symbol: vector<u8>,
        decimals: u8
    ) {
        // Initialize token with metadata
    }

    public entry fun mint_token(
        admin: &signer,
        to: address,
        amount: u64
    ) {
        // Mint tokens to the specified address
    }

    public entry fun burn_token(
        owner: &signer,
        amount: u64
    ) {
        // Burn tokens from the owner
    }

";

/// A node whose outgoing edges reach more than one existing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct OneToMany {
    pub source: CanvasNode,
    pub targets: Vec<CanvasNode>,
}

/// A node reached by edges from more than one existing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ManyToOne {
    pub target: CanvasNode,
    pub sources: Vec<CanvasNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Relationships {
    pub one_to_many: Vec<OneToMany>,
    pub many_to_one: Vec<ManyToOne>,
}

/// Request body for previewing generated code
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct GenerateRequest {
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GenerationReport {
    pub code: String,
    pub relationships: Relationships,
}

/// Groups `edges` by the id `key` picks out, keeping first-appearance order
/// of each key and edge order within a group.
fn group_edges<'a>(
    edges: &'a [CanvasEdge],
    key: impl Fn(&'a CanvasEdge) -> &'a str,
    member: impl Fn(&'a CanvasEdge) -> &'a str,
) -> Vec<(&'a str, Vec<&'a str>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for edge in edges {
        let k = key(edge);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(member(edge));
    }
    groups
}

/// Detects fan-out and fan-in groups. Edge endpoints that name no node are
/// dropped silently; a group needs its anchor and at least two members to exist.
pub fn identify_relationships(nodes: &[CanvasNode], edges: &[CanvasEdge]) -> Relationships {
    // First node wins when ids repeat
    let mut by_id: HashMap<&str, &CanvasNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let resolve = |ids: &[&str]| -> Vec<CanvasNode> {
        ids.iter()
            .filter_map(|id| by_id.get(id).map(|n| (*n).clone()))
            .collect()
    };

    let mut relationships = Relationships::default();

    for (target_id, source_ids) in group_edges(edges, |e| e.target.as_str(), |e| e.source.as_str()) {
        if source_ids.len() < 2 {
            continue;
        }
        let Some(target) = by_id.get(target_id) else {
            continue;
        };
        let sources = resolve(&source_ids);
        if sources.len() > 1 {
            relationships.many_to_one.push(ManyToOne {
                target: (*target).clone(),
                sources,
            });
        }
    }

    for (source_id, target_ids) in group_edges(edges, |e| e.source.as_str(), |e| e.target.as_str()) {
        if target_ids.len() < 2 {
            continue;
        }
        let Some(source) = by_id.get(source_id) else {
            continue;
        };
        let targets = resolve(&target_ids);
        if targets.len() > 1 {
            relationships.one_to_many.push(OneToMany {
                source: (*source).clone(),
                targets,
            });
        }
    }

    relationships
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replaces each run of whitespace in `s` with `with`.
fn replace_whitespace_runs(s: &str, with: &str) -> String {
    WHITESPACE_RUN.replace_all(s, with).into_owned()
}

/// Function name used for action labels without a dedicated template.
pub fn fallback_function_name(label: &str) -> String {
    replace_whitespace_runs(&label.to_lowercase(), "_")
}

fn action_function(label: &str) -> String {
    match label {
        "Deposit" => DEPOSIT_FN.to_string(),
        "Withdraw" => WITHDRAW_FN.to_string(),
        "Transfer" => TRANSFER_FN.to_string(),
        "Choice" => CHOICE_FN.to_string(),
        "Notification" => NOTIFICATION_FN.to_string(),
        other => format!(
            "    public entry fun {}(
        account: &signer
    ) {{
        // Implementation for {}
    }}

",
            fallback_function_name(other),
            other
        ),
    }
}

pub fn generate_move_code(nodes: &[CanvasNode], edges: &[CanvasEdge]) -> String {
    let relationships = identify_relationships(nodes, edges);
    emit(nodes, &relationships)
}

/// Generates code and returns it together with the relationships it was based on.
pub fn generate(nodes: &[CanvasNode], edges: &[CanvasEdge]) -> GenerationReport {
    let relationships = identify_relationships(nodes, edges);
    let code = emit(nodes, &relationships);
    GenerationReport {
        code,
        relationships,
    }
}

fn emit(nodes: &[CanvasNode], relationships: &Relationships) -> String {
    let mut code = String::from(MODULE_HEADER);

    for node in nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Value | NodeKind::Bound))
    {
        code.push_str(&format!(
            "    struct {} {{\n        value: u64\n    }}\n\n",
            node.label()
        ));
    }

    for rel in &relationships.one_to_many {
        let source_name = replace_whitespace_runs(rel.source.label(), "");
        code.push_str(&format!(
            "    // One-to-many relationship for {0}
    struct {0}Collection {{
        owner: address,
        items: vector<u64>
    }}

",
            source_name
        ));
    }

    if !relationships.many_to_one.is_empty() {
        code.push_str(RESOURCE_ACCOUNT_STRUCT);
    }

    let has_tokens = nodes.iter().any(|n| n.kind == NodeKind::Token);
    if has_tokens {
        code.push_str(TOKEN_STRUCTS);
    }

    for node in nodes.iter().filter(|n| n.kind == NodeKind::Action) {
        code.push_str(&action_function(node.label()));
    }

    if !relationships.one_to_many.is_empty() {
        code.push_str(COLLECTION_FNS);
    }

    if !relationships.many_to_one.is_empty() {
        code.push_str(RESOURCE_ACCOUNT_FNS);
    }

    if has_tokens {
        code.push_str(TOKEN_FNS);
    }

    code.push('}');
    code
}
