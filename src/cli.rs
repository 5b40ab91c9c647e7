use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ptviz CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "ptviz",
    version,
    about = "Walk parse trees in a stopped process and write them as JSON, DOT or Cytoscape"
)]
pub struct Args {
    /// JSON memory snapshot to inspect.
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Config file. Defaults to the nearest ptviz.toml above the current directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory, overriding the config file.
    #[arg(long, global = true, value_name = "DIR")]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the tree of an expression as JSON.
    Json {
        name: String,
        /// Root expression, e.g. `*statement` or `node->next`.
        expr: String,
    },

    /// Write the tree of an expression as a DOT graph.
    Dot {
        name: String,
        expr: String,
        /// Also render PNG with Graphviz.
        #[arg(long)]
        png: bool,
    },

    /// Write the tree of an expression as Cytoscape elements.
    Cyto { name: String, expr: String },

    /// Build a call graph from the snapshot stack or a backtrace file and write it.
    Callgraph {
        name: String,
        /// Debugger `bt` output to read instead of the snapshot's stack.
        #[arg(long, value_name = "FILE")]
        backtrace: Option<PathBuf>,
        #[arg(long)]
        png: bool,
    },

    /// Read commands from stdin, one per line, into a single session.
    Shell,
}
