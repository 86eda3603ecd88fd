use crate::ast::SchemaAst;
use crate::collide::{all_measured, resolve_collisions};
use crate::compile::compile;
use crate::config::GraphConfig;
use crate::graph::{Graph, Size};
use crate::layout::position_nodes;
use crate::normalize::normalize;
use std::time::{Duration, Instant};

/// The out-of-scope text-to-AST collaborator, injected as a callback.
/// Structural errors it reports keep the previous graph on screen.
pub type AstCompiler = Box<dyn FnMut(&str) -> anyhow::Result<SchemaAst>>;

/// Single-threaded, cooperative compilation driver.
///
/// Edits are debounced: each one supersedes the pending compile and
/// re-arms the quiet-period deadline (last-edit-wins, no backlog).
/// Once `poll` observes an elapsed deadline, the whole pipeline —
/// normalize, compile, classify, layout — runs synchronously to
/// completion. Collision resolution is decoupled: it waits until the
/// rendering surface has measured every node, runs at most once per
/// compiled graph, and re-arms on the next schema change.
pub struct Session {
    config: GraphConfig,
    compiler: AstCompiler,
    pending: Option<Pending>,
    graph: Graph,
    collision_resolved: bool,
}

struct Pending {
    text: String,
    deadline: Instant,
}

impl Session {
    pub fn new(config: GraphConfig, compiler: AstCompiler) -> Self {
        Self {
            config,
            compiler,
            pending: None,
            graph: Graph::default(),
            collision_resolved: false,
        }
    }

    /// Current node/edge snapshot. Reading never triggers a compile.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a schema edit. Any compile still waiting on its quiet
    /// period is cancelled and replaced.
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) {
        let deadline = now + Duration::from_millis(self.config.session.debounce_ms);
        self.pending = Some(Pending {
            text: text.into(),
            deadline,
        });
    }

    /// Runs the pending compilation if its quiet period has elapsed.
    /// Returns true when a new graph was produced.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending.take_if(|pending| now >= pending.deadline) else {
            return false;
        };

        let ast = match (self.compiler)(&pending.text) {
            Ok(ast) => ast,
            Err(err) => {
                log::error!("error generating visualization graph: {err}");
                return false;
            }
        };

        let mut graph = compile(&normalize(&ast), &self.config.palette);
        position_nodes(&mut graph, &self.config.layout);
        self.graph = graph;
        self.collision_resolved = false;
        true
    }

    /// Feeds back one node's rendered size from the surface. Unknown
    /// ids are logged and skipped.
    pub fn set_measured(&mut self, id: &str, size: Size) {
        match self.graph.node_mut(id) {
            Some(node) => node.measured = size,
            None => log::warn!("measured size for unknown node {id}; ignored"),
        }
    }

    /// Render-commit hook. Resolves collisions once per compiled
    /// graph, and only after every node reports a non-zero measured
    /// size; idempotent no-op afterwards.
    pub fn commit(&mut self) -> bool {
        if self.collision_resolved || !all_measured(&self.graph.nodes) {
            return false;
        }
        resolve_collisions(&mut self.graph.nodes, &self.config.collision);
        self.collision_resolved = true;
        true
    }
}
