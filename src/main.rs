use anyhow::Context;
use clap::Parser;
use ptviz::cli::{Args, Command};
use ptviz::commands::FrontEndCommand;
use ptviz::config;
use ptviz::session::Session;
use ptviz::snapshot::{Snapshot, SnapshotHost};
use std::io::BufRead;
use std::process::ExitCode;

fn main() -> ExitCode {
    ptviz::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let cfg = match config::load_config(args.config.as_deref(), &cwd)? {
        Some((path, cfg)) => {
            tracing::debug!(path = %path.display(), "loaded config");
            cfg
        }
        None => config::PtvizConfig::default(),
    };

    let host = match &args.snapshot {
        Some(path) => SnapshotHost::load(path)
            .with_context(|| format!("failed to load snapshot: {}", path.display()))?,
        None => SnapshotHost::new(Snapshot::default())?,
    };

    let options = cfg.traversal_options();
    if args.snapshot.is_some() {
        for name in options.schema.missing_types(&host) {
            tracing::warn!(type_name = name, "snapshot does not declare schema type");
        }
    }

    let out_dir = args.out.clone().unwrap_or_else(|| cfg.output_dir());
    let mut session = Session::new(options, out_dir).with_render_png(cfg.output.render_png);

    let commands = match args.command {
        Command::Json { name, expr } => vec![FrontEndCommand::Json { name, expr }],
        Command::Dot { name, expr, png } => vec![FrontEndCommand::Dot { name, expr, png }],
        Command::Cyto { name, expr } => vec![FrontEndCommand::Cyto { name, expr }],
        Command::Callgraph {
            name,
            backtrace,
            png,
        } => vec![
            FrontEndCommand::Create {
                graph: name.clone(),
                backtrace,
            },
            FrontEndCommand::Write { graph: name, png },
        ],
        Command::Shell => return shell(&mut session, &host),
    };

    for cmd in commands {
        let outcome = cmd.execute(&mut session, &host)?;
        println!("{outcome}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Failed commands are reported and the session carries on; the exit code
/// is 1 if any command failed.
fn shell(session: &mut Session, host: &SnapshotHost) -> anyhow::Result<ExitCode> {
    let stdin = std::io::stdin();
    let mut failed = false;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = FrontEndCommand::parse(line).and_then(|cmd| cmd.execute(session, host));
        match result {
            Ok(outcome) => println!("{outcome}"),
            Err(err) => {
                failed = true;
                eprintln!("error: {err}");
            }
        }
    }

    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
