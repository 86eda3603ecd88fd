use crate::ast::{AstEntry, AstOverlay, KeywordTriple, KeywordValue, SchemaAst};
use crate::classify::{self, BOOLEAN_SCHEMA_KEY};
use crate::graph::{
    Graph, GraphEdge, GraphNode, Handle, HandleSide, KeywordDisplay, KeywordTable, ROOT_PARENT_ID,
};
use crate::keyword::{self, Strategy};
use crate::palette::Palette;
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Mutex;

/// Recursion ceiling per compilation pass. Cycles are broken by the
/// visited set, so only pathologically deep straight-line nesting can
/// get here; past the ceiling sub-schemas render as collapsed
/// placeholders instead of risking the stack.
pub const MAX_DEPTH: usize = 128;

pub const FALLBACK_PLACEHOLDER: &str = "This keyword handler is not implemented yet!";

static WARNED_KEYWORDS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Shared accumulators threaded through the traversal. Rebuilt fresh
/// for every compilation pass.
struct CompileCtx<'a> {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    visited: HashSet<String>,
    palette: &'a Palette,
    depth_warned: bool,
}

/// What one keyword handler reports back to the node builder: the
/// rendered table row, whether the keyword is a leaf (no egress
/// handles), and whether it is the segregated definitions subtree.
struct Outcome {
    key: Option<String>,
    display: KeywordDisplay,
    leaf: bool,
    defs: bool,
}

/// Compiles a normalized AST into an unpositioned graph. Each schema
/// location becomes at most one node; every further reference to an
/// already-visited location adds only an edge and a fresh target
/// handle, which is what keeps `$ref` cycles finite.
pub fn compile(ast: &SchemaAst, palette: &Palette) -> Graph {
    let mut ctx = CompileCtx {
        nodes: Vec::new(),
        edges: Vec::new(),
        visited: HashSet::new(),
        palette,
        depth_warned: false,
    };
    let mut overlay = AstOverlay::new(ast);
    visit(&mut ctx, &mut overlay, &ast.root, ROOT_PARENT_ID, None, "root", 0);
    Graph {
        nodes: ctx.nodes,
        edges: ctx.edges,
    }
}

fn visit(
    ctx: &mut CompileCtx,
    overlay: &mut AstOverlay,
    location: &str,
    parent_id: &str,
    child_key: Option<&str>,
    label: &str,
    depth: usize,
) {
    let source_handle = match child_key {
        Some(child) => format!("{parent_id}-{child}"),
        None => parent_id.to_string(),
    };
    let target_handle = format!("{source_handle}-target");

    if ctx.visited.contains(location) {
        // Back-reference: no new node, just an extra ingress edge on
        // the existing one.
        // TODO: color back-reference edges with the target node's
        // color instead of the neutral fallback.
        ctx.edges.push(GraphEdge::new(
            parent_id,
            source_handle,
            location,
            target_handle.clone(),
            ctx.palette.others.clone(),
        ));
        update_node(&mut ctx.nodes, location, |node| {
            node.target_handles
                .push(Handle::new(target_handle, HandleSide::Top));
        });
        return;
    }

    let Some(entry) = overlay.entry(location).cloned() else {
        log::warn!("schema location {location} missing from AST; subtree skipped");
        return;
    };

    ctx.visited.insert(location.to_string());
    let mut shell = GraphNode::shell(location, label, depth);
    shell.is_boolean_schema = matches!(entry, AstEntry::Boolean(_));
    ctx.nodes.push(shell);

    let mut table = KeywordTable::default();
    let mut source_handles: Vec<Handle> = Vec::new();

    match entry {
        AstEntry::Boolean(value) => {
            table.insert(BOOLEAN_SCHEMA_KEY, KeywordDisplay::plain(json!(value)));
        }
        AstEntry::Keywords(triples) => {
            for triple in &triples {
                let outcome = handle_keyword(ctx, overlay, triple, location, depth);
                if let Some(key) = &outcome.key {
                    table.insert(key.clone(), outcome.display.clone());
                }
                if !outcome.leaf {
                    source_handles.extend(egress_handles(
                        outcome.key.as_deref(),
                        &outcome.display.value,
                        location,
                        outcome.defs,
                    ));
                }
            }
        }
    }

    let classification = classify::classify(&table);
    let color = classify::color_for(classification.subtype, ctx.palette);

    ctx.edges.push(GraphEdge::new(
        parent_id,
        source_handle,
        location,
        target_handle.clone(),
        color.clone(),
    ));
    update_node(&mut ctx.nodes, location, |node| {
        node.keywords = table;
        node.color = color;
        node.source_handles = source_handles;
        node.target_handles
            .push(Handle::new(target_handle, HandleSide::Left));
    });
}

/// Dispatches one keyword triple through the closed strategy table.
/// `node_depth` is the depth of the node the keyword belongs to;
/// children recurse at `node_depth + 1`, the definitions subtree at
/// `node_depth` (sibling column).
fn handle_keyword(
    ctx: &mut CompileCtx,
    overlay: &mut AstOverlay,
    triple: &KeywordTriple,
    node_location: &str,
    node_depth: usize,
) -> Outcome {
    let Some(spec) = keyword::resolve(&triple.keyword_id) else {
        return fallback(&triple.keyword_id);
    };
    let child_depth = node_depth + 1;

    match (spec.strategy, &triple.value) {
        (Strategy::Leaf, KeywordValue::Literal(value)) => {
            let display = if spec.name == "unknown" {
                KeywordDisplay::plain(json!(value.to_string()))
            } else {
                KeywordDisplay::plain(value.clone())
            };
            Outcome {
                key: Some(spec.name.to_string()),
                display,
                leaf: true,
                defs: false,
            }
        }
        (Strategy::Ref, KeywordValue::Reference(target)) => {
            if !can_descend(ctx, child_depth) {
                return collapsed_leaf(spec.name, target);
            }
            visit(ctx, overlay, target, node_location, Some("$ref"), "", child_depth);
            Outcome {
                key: Some(spec.name.to_string()),
                display: KeywordDisplay::collapsed(json!(target)),
                leaf: false,
                defs: false,
            }
        }
        (Strategy::Single, KeywordValue::Reference(target)) => {
            if !can_descend(ctx, child_depth) {
                return collapsed_leaf(spec.name, target);
            }
            visit(
                ctx,
                overlay,
                target,
                node_location,
                Some(spec.name),
                spec.name,
                child_depth,
            );
            Outcome {
                key: Some(spec.name.to_string()),
                display: KeywordDisplay::collapsed(json!(target)),
                leaf: false,
                defs: false,
            }
        }
        (Strategy::List | Strategy::DefsList, KeywordValue::ReferenceList(targets)) => {
            if !can_descend(ctx, child_depth) {
                return Outcome {
                    key: Some(spec.name.to_string()),
                    display: KeywordDisplay::collapsed(json!(targets.len())),
                    leaf: true,
                    defs: false,
                };
            }
            for (index, target) in targets.iter().enumerate() {
                let child = index.to_string();
                let label = if spec.strategy == Strategy::DefsList {
                    format!("defs[{index}]")
                } else {
                    format!("{}[{index}]", spec.name)
                };
                visit(
                    ctx,
                    overlay,
                    target,
                    node_location,
                    Some(child.as_str()),
                    &label,
                    child_depth,
                );
            }
            let indices: Vec<usize> = (0..targets.len()).collect();
            Outcome {
                key: Some(spec.name.to_string()),
                display: KeywordDisplay::plain(json!(indices)),
                leaf: false,
                defs: false,
            }
        }
        (Strategy::Map, KeywordValue::ReferenceMap(entries)) => {
            if !can_descend(ctx, child_depth) {
                let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
                return Outcome {
                    key: Some(spec.name.to_string()),
                    display: KeywordDisplay::collapsed(json!(names)),
                    leaf: true,
                    defs: false,
                };
            }
            let mut names = Vec::with_capacity(entries.len());
            for (name, target) in entries {
                names.push(name.clone());
                let label = format!("{}[\"{name}\"]", spec.name);
                visit(
                    ctx,
                    overlay,
                    target,
                    node_location,
                    Some(name.as_str()),
                    &label,
                    child_depth,
                );
            }
            Outcome {
                key: Some(spec.name.to_string()),
                display: KeywordDisplay::plain(json!(names)),
                leaf: false,
                defs: false,
            }
        }
        (Strategy::Definitions, KeywordValue::ReferenceList(_)) => {
            // Definitions render as a sibling subtree, one column back,
            // reached through a single bottom handle. The payload is
            // re-rooted under a synthetic `{parent}/$defs` entry so the
            // input AST stays untouched.
            let synthetic = format!("{node_location}/$defs");
            overlay.insert_synthetic(
                synthetic.clone(),
                AstEntry::Keywords(vec![KeywordTriple {
                    keyword_id: keyword::keyword_iri("$defs"),
                    location: synthetic.clone(),
                    value: triple.value.clone(),
                }]),
            );
            visit(
                ctx,
                overlay,
                &synthetic,
                node_location,
                Some("definitions"),
                "definitions",
                node_depth,
            );
            Outcome {
                key: None,
                display: KeywordDisplay::plain(json!("definitions")),
                leaf: false,
                defs: true,
            }
        }
        // Arity mismatches cannot normally occur: KeywordValue is
        // decoded from the same strategy table. Degrade like an
        // unknown keyword rather than panic.
        _ => fallback(&triple.keyword_id),
    }
}

fn fallback(keyword_id: &str) -> Outcome {
    let name = keyword::short_name(keyword_id);
    if let Ok(mut warned) = WARNED_KEYWORDS.lock() {
        if warned.insert(keyword_id.to_string()) {
            log::warn!("keyword handler for \"{name}\" is not implemented yet");
        }
    }
    Outcome {
        key: Some(name.to_string()),
        display: KeywordDisplay::plain(json!(FALLBACK_PLACEHOLDER)),
        leaf: true,
        defs: false,
    }
}

fn collapsed_leaf(name: &str, target: &str) -> Outcome {
    Outcome {
        key: Some(name.to_string()),
        display: KeywordDisplay::collapsed(json!(target)),
        leaf: true,
        defs: false,
    }
}

fn can_descend(ctx: &mut CompileCtx, child_depth: usize) -> bool {
    if child_depth <= MAX_DEPTH {
        return true;
    }
    if !ctx.depth_warned {
        log::warn!("schema nesting exceeds depth {MAX_DEPTH}; deeper sub-schemas are collapsed");
        ctx.depth_warned = true;
    }
    false
}

/// Egress handle synthesis: one handle per element for array-valued
/// summaries, one handle for scalars, and exactly one bottom handle
/// for the definitions subtree regardless of how many definitions it
/// nests.
fn egress_handles(key: Option<&str>, value: &Value, node_id: &str, defs: bool) -> Vec<Handle> {
    if defs {
        return vec![Handle::new(
            format!("{node_id}-definitions"),
            HandleSide::Bottom,
        )];
    }
    if let Some(items) = value.as_array() {
        return items
            .iter()
            .map(|item| Handle::new(format!("{node_id}-{}", scalar_text(item)), HandleSide::Right))
            .collect();
    }
    vec![Handle::new(
        format!("{node_id}-{}", key.unwrap_or_default()),
        HandleSide::Right,
    )]
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Updates addressed at ids the accumulator does not hold are logged
/// and skipped; the partially built graph stays intact.
fn update_node(nodes: &mut [GraphNode], id: &str, apply: impl FnOnce(&mut GraphNode)) {
    match nodes.iter_mut().find(|node| node.id == id) {
        Some(node) => apply(node),
        None => log::warn!("node with id {id} not found; update skipped"),
    }
}
