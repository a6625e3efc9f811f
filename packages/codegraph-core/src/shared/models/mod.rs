//! Shared domain models: nodes, edges, spans, events, and the unified error type.

mod edge;
mod error;
mod event;
mod node;
mod span;

pub use edge::{derive_edge_id, is_unresolved, unresolved_target, Edge, EdgeKind, UNRESOLVED_PREFIX};
pub use error::{CodegraphError, ErrorKind, Result};
pub use event::{EventKind, GraphEvent};
pub use node::{derive_node_id, intern, InternedString, Node, NodeKind, NodeLocation};
pub use span::{Location, Span};
