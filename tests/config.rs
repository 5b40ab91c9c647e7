use ptviz::config;
use ptviz::tag::TagRule;
use std::fs;

#[test]
fn config_overrides_traversal_and_output() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join(config::DEFAULT_CONFIG_FILE_NAME);
    fs::write(
        &cfg_path,
        r#"
[output]
dir = "/tmp/ptviz-out"
render_png = true

[traversal]
excluded_fields = ["xasl", "parser_id"]
sentinel_addresses = [0]
max_depth = 64
variant_prefix = "NODE_"

[traversal.tags]
PT_MERGE = { type = "PT_MERGE_INFO", field = "merge" }
PT_SELECT = { type = "PT_QUERY_INFO", field = "select_query" }

[traversal.schema]
node_type = "PARSER_NODE"
"#,
    )
    .unwrap();

    let cfg = config::load_config_file(&cfg_path).expect("config should load");
    assert_eq!(cfg.output_dir(), std::path::Path::new("/tmp/ptviz-out"));
    assert!(cfg.output.render_png);

    let options = cfg.traversal_options();
    assert_eq!(options.excluded_fields, vec!["xasl", "parser_id"]);
    assert_eq!(options.sentinel_addresses, vec![0]);
    assert_eq!(options.max_depth, 64);
    assert_eq!(options.schema.node_type, "PARSER_NODE");
    assert_eq!(options.schema.tag_field, "node_type");
    assert_eq!(
        options.tags.get("PT_MERGE"),
        Some(&TagRule::new("PT_MERGE_INFO", "merge"))
    );
    assert_eq!(
        options.tags.get("PT_SELECT").map(|r| r.field.as_str()),
        Some("select_query")
    );
    assert!(options.tags.get("PT_VALUE").is_some());
    assert_eq!(options.tags.variant_field_name("NODE_JOIN_INFO"), "join");
}

#[test]
fn empty_config_uses_defaults() {
    let cfg: config::PtvizConfig = toml::from_str("").unwrap();
    let options = cfg.traversal_options();
    assert_eq!(options, ptviz::TraversalOptions::default());
    assert!(cfg.output_dir().ends_with(config::DEFAULT_OUTPUT_DIR_NAME));
    assert!(!cfg.output.render_png);
}

#[test]
fn config_is_found_in_parent_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let nested = tmp.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        tmp.path().join(config::DEFAULT_CONFIG_FILE_NAME),
        "[output]\nrender_png = true\n",
    )
    .unwrap();

    let (path, cfg) = config::load_config(None, &nested)
        .unwrap()
        .expect("config should be discovered");
    assert_eq!(path, tmp.path().join(config::DEFAULT_CONFIG_FILE_NAME));
    assert!(cfg.output.render_png);
}

#[test]
fn malformed_config_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("bad.toml");
    fs::write(&cfg_path, "[traversal]\nexcluded_fields = 3\n").unwrap();

    let err = config::load_config(Some(&cfg_path), tmp.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config file"));
}
