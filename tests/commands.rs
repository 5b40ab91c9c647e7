mod support;

use ptviz::commands::{CommandOutcome, FrontEndCommand};
use ptviz::{PtvizError, Session, TraversalOptions, TreeNode};
use support::parse_tree::select_host;

fn run(session: &mut Session, line: &str) -> Result<CommandOutcome, PtvizError> {
    let host = select_host();
    FrontEndCommand::parse(line).and_then(|cmd| cmd.execute(session, &host))
}

fn written(outcome: CommandOutcome) -> Vec<std::path::PathBuf> {
    match outcome {
        CommandOutcome::Written { paths, .. } => paths,
        other => panic!("expected files to be written, got {other:?}"),
    }
}

#[test]
fn json_command_round_trips_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    let paths = written(run(&mut session, "json lit lit").unwrap());
    assert_eq!(paths, vec![tmp.path().join("lit.json")]);

    let raw = std::fs::read_to_string(&paths[0]).unwrap();
    assert!(raw.starts_with("{\n    \"TYPE\": \"PT_NODE\""));
    let parsed: TreeNode = serde_json::from_str(&raw).unwrap();
    assert_eq!(Some(&parsed), session.tree("lit"));
}

#[test]
fn dot_and_cyto_commands_write_graphs() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    let dot = written(run(&mut session, "dot s1 stmt").unwrap());
    let text = std::fs::read_to_string(&dot[0]).unwrap();
    assert!(text.starts_with("digraph \"s1\" {"));
    assert!(text.contains("0 -> 1 [label=\"info\"];"));

    let cyto = written(run(&mut session, "cyto s2 stmt").unwrap());
    assert_eq!(cyto[0], tmp.path().join("s2.cyjs"));
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cyto[0]).unwrap()).unwrap();
    assert_eq!(doc["elements"]["nodes"][0]["data"]["node_type"], "PT_SELECT");
}

#[test]
fn reused_root_name_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    run(&mut session, "json q stmt").unwrap();
    let before = std::fs::read_to_string(tmp.path().join("q.json")).unwrap();

    let err = run(&mut session, "json q lit").unwrap_err();
    assert!(matches!(err, PtvizError::DuplicateName(_)));
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("q.json")).unwrap(),
        before
    );
}

#[test]
fn create_then_write_call_graph() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    let created = run(&mut session, "create g1").unwrap();
    assert_eq!(
        created,
        CommandOutcome::GraphCreated {
            name: "g1".into(),
            nodes: 3,
            edges: 2
        }
    );

    let paths = written(run(&mut session, "write g1").unwrap());
    let dot = std::fs::read_to_string(&paths[0]).unwrap();
    assert!(dot.contains("subgraph \"cluster_parser/compile.c\""));
    assert!(dot.contains("\"main\" -> \"pt_compile\" [label=\"40\"];"));
    assert!(dot.contains("\"pt_compile\" -> \"pt_bind_names\" [label=\"377\"];"));

    assert!(matches!(
        run(&mut session, "create g1"),
        Err(PtvizError::DuplicateName(_))
    ));
    assert!(matches!(
        run(&mut session, "write g2"),
        Err(PtvizError::UnknownGraph(_))
    ));
}

#[test]
fn create_reads_backtrace_file() {
    let tmp = tempfile::tempdir().unwrap();
    let bt = tmp.path().join("bt.txt");
    std::fs::write(
        &bt,
        "#0  inner () at /src/a/x.c:3\n#1  0x0000 in outer () at /src/a/y.c:9\n",
    )
    .unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    run(&mut session, &format!("create g {}", bt.display())).unwrap();
    let graph = session.graph("g").unwrap();
    assert_eq!(graph.edges[0].caller, "outer");
    assert_eq!(graph.edges[0].callee, "inner");
    assert_eq!(graph.edges[0].call_site.as_deref(), Some("9"));
}

#[test]
fn init_and_list() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());

    assert_eq!(
        run(&mut session, &format!("init {}", out.display())).unwrap(),
        CommandOutcome::OutputDir(out.clone())
    );
    run(&mut session, "json lit lit").unwrap();
    assert!(out.join("lit.json").is_file());

    run(&mut session, "create g1").unwrap();
    let listing = run(&mut session, "list").unwrap();
    assert_eq!(listing.to_string(), "trees: lit\ngraphs: g1");
}

#[test]
fn bad_expression_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::new(TraversalOptions::default(), tmp.path());
    let err = run(&mut session, "json x no_such_symbol").unwrap_err();
    assert!(matches!(err, PtvizError::Evaluation { .. }));
    assert!(session.tree("x").is_none());
}
