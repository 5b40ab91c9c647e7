//! Command front end: parse a command line and run it against a session.

use crate::backtrace::parse_backtrace;
use crate::diagnostics::Diagnostic;
use crate::error::{PtvizError, PtvizResult};
use crate::host::IntrospectionHost;
use crate::ptviz_bail;
use crate::render::{call_graph_dot, parse_tree_cytoscape, parse_tree_dot};
use crate::session::Session;
use crate::sink;
use std::fmt;
use std::path::PathBuf;

pub const COMMAND_NAMES: &[&str] = &["create", "write", "json", "dot", "cyto", "init", "list"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontEndCommand {
    /// Build a named call graph from a backtrace file, or from the host's
    /// current stack when no file is given.
    Create {
        graph: String,
        backtrace: Option<PathBuf>,
    },
    Write {
        graph: String,
        png: bool,
    },
    Json {
        name: String,
        expr: String,
    },
    Dot {
        name: String,
        expr: String,
        png: bool,
    },
    Cyto {
        name: String,
        expr: String,
    },
    Init {
        dir: PathBuf,
    },
    List,
}

impl FrontEndCommand {
    /// Parse `word args...`. Everything after the name of a root is joined
    /// back into the expression, so expressions may contain spaces.
    pub fn parse(line: &str) -> PtvizResult<Self> {
        let mut words: Vec<&str> = line.split_whitespace().collect();
        let png = take_flag(&mut words, "--png");
        let Some((&word, args)) = words.split_first() else {
            ptviz_bail!("empty command");
        };

        let cmd = match word {
            "create" => match args {
                [graph] => Self::Create {
                    graph: graph.to_string(),
                    backtrace: None,
                },
                [graph, file] => Self::Create {
                    graph: graph.to_string(),
                    backtrace: Some(PathBuf::from(file)),
                },
                _ => ptviz_bail!("usage: create <graph> [backtrace-file]"),
            },
            "write" => match args {
                [graph] => Self::Write {
                    graph: graph.to_string(),
                    png,
                },
                _ => ptviz_bail!("usage: write <graph> [--png]"),
            },
            "json" | "dot" | "cyto" => {
                let [name, expr @ ..] = args else {
                    ptviz_bail!("usage: {word} <name> <expr>");
                };
                if expr.is_empty() {
                    ptviz_bail!("usage: {word} <name> <expr>");
                }
                let (name, expr) = (name.to_string(), expr.join(" "));
                match word {
                    "json" => Self::Json { name, expr },
                    "dot" => Self::Dot { name, expr, png },
                    _ => Self::Cyto { name, expr },
                }
            }
            "init" => match args {
                [dir] => Self::Init {
                    dir: PathBuf::from(dir),
                },
                _ => ptviz_bail!("usage: init <dir>"),
            },
            "list" if args.is_empty() => Self::List,
            "list" => ptviz_bail!("usage: list"),
            other => return Err(PtvizError::UnsupportedCommand(other.to_string())),
        };
        Ok(cmd)
    }

    pub fn execute<H: IntrospectionHost>(
        &self,
        session: &mut Session,
        host: &H,
    ) -> PtvizResult<CommandOutcome> {
        let span = tracing::debug_span!("command", cmd = ?self);
        let _guard = span.enter();

        match self {
            Self::Create { graph, backtrace } => {
                let frames = match backtrace {
                    Some(path) => parse_backtrace(&std::fs::read_to_string(path)?),
                    None => host.backtrace()?,
                };
                let created = session.create_call_graph(graph, &frames)?;
                Ok(CommandOutcome::GraphCreated {
                    name: graph.clone(),
                    nodes: created.nodes.len(),
                    edges: created.edges.len(),
                })
            }
            Self::Write { graph, png } => {
                let dot = call_graph_dot(session.graph(graph)?);
                let gv = sink::write_dot(session.output_dir(), graph, &dot)?;
                let mut paths = vec![gv.clone()];
                if *png || session.render_png() {
                    paths.push(sink::render_png(&gv)?);
                }
                Ok(CommandOutcome::Written {
                    paths,
                    diagnostics: Vec::new(),
                })
            }
            Self::Json { name, expr } => {
                let root = host.evaluate(expr)?;
                let report = session.build_tree(name, &root)?;
                let path = sink::write_json(session.output_dir(), name, &report.tree)?;
                Ok(CommandOutcome::Written {
                    paths: vec![path],
                    diagnostics: report.diagnostics,
                })
            }
            Self::Dot { name, expr, png } => {
                let root = host.evaluate(expr)?;
                let (graph, report) = session.build_graph(name, &root)?;
                let gv = sink::write_dot(session.output_dir(), name, &parse_tree_dot(&graph))?;
                let mut paths = vec![gv.clone()];
                if *png || session.render_png() {
                    paths.push(sink::render_png(&gv)?);
                }
                Ok(CommandOutcome::Written {
                    paths,
                    diagnostics: report.diagnostics,
                })
            }
            Self::Cyto { name, expr } => {
                let root = host.evaluate(expr)?;
                let (graph, report) = session.build_graph(name, &root)?;
                let path = sink::write_cytoscape(
                    session.output_dir(),
                    name,
                    &parse_tree_cytoscape(&graph),
                )?;
                Ok(CommandOutcome::Written {
                    paths: vec![path],
                    diagnostics: report.diagnostics,
                })
            }
            Self::Init { dir } => {
                let dir = session.init_output_dir(dir)?.to_path_buf();
                Ok(CommandOutcome::OutputDir(dir))
            }
            Self::List => Ok(CommandOutcome::Listing {
                trees: session.tree_names().map(str::to_string).collect(),
                graphs: session.graph_names().map(str::to_string).collect(),
            }),
        }
    }
}

fn take_flag(words: &mut Vec<&str>, flag: &str) -> bool {
    let before = words.len();
    words.retain(|w| *w != flag);
    words.len() != before
}

/// What a command did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    GraphCreated {
        name: String,
        nodes: usize,
        edges: usize,
    },
    /// Files written, plus fields left out of the tree they came from.
    Written {
        paths: Vec<PathBuf>,
        diagnostics: Vec<Diagnostic>,
    },
    OutputDir(PathBuf),
    Listing {
        trees: Vec<String>,
        graphs: Vec<String>,
    },
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GraphCreated { name, nodes, edges } => {
                write!(f, "created graph {name} ({nodes} nodes, {edges} edges)")
            }
            Self::Written { paths, diagnostics } => {
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "wrote {}", path.display())?;
                }
                if !diagnostics.is_empty() {
                    write!(f, "\n{} field(s) skipped", diagnostics.len())?;
                }
                Ok(())
            }
            Self::OutputDir(dir) => write!(f, "output directory: {}", dir.display()),
            Self::Listing { trees, graphs } => {
                write!(f, "trees: {}\ngraphs: {}", trees.join(", "), graphs.join(", "))
            }
        }
    }
}
