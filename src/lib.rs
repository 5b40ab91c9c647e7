//! Parse-tree visualizer for a stopped process.
//!
//! The crate walks the parse tree behind a value exposed by an introspection
//! host, following pointers and tagged unions, and turns it into a nested
//! [`tree::TreeNode`]. Trees are written as JSON, laid out as DOT or Cytoscape
//! graphs, and call stacks can be drawn as clustered call graphs.

pub mod backtrace;
pub mod callgraph;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod host;
pub mod render;
pub mod session;
pub mod sink;
pub mod snapshot;
pub mod tag;
pub mod telemetry;
pub mod traverse;
pub mod tree;
pub mod type_classifier;
pub mod visitor;

pub use error::{PtvizError, PtvizResult};
pub use host::{InspectedValue, IntrospectionHost, StackFrame};
pub use session::Session;
pub use traverse::{TraversalOptions, TreeBuilder, TreeReport};
pub use tree::{TreeEntry, TreeNode};
