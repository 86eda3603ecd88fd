pub mod ast;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collide;
pub mod compile;
pub mod config;
pub mod graph;
pub mod keyword;
pub mod layout;
pub mod normalize;
pub mod palette;
pub mod session;

pub use ast::{AstError, SchemaAst};
pub use collide::resolve_collisions;
pub use compile::compile;
pub use config::{CollisionConfig, GraphConfig, LayoutConfig, load_config};
pub use graph::{Graph, GraphEdge, GraphNode};
pub use layout::position_nodes;
pub use normalize::normalize;
pub use palette::Palette;
pub use session::Session;

#[cfg(feature = "cli")]
pub use cli::run;
