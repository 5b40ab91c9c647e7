use crate::dispatch::Schema;
use crate::tag::{DEFAULT_VARIANT_PREFIX, DEFAULT_VARIANT_SUFFIX, TagRule, TagTable};
use crate::traverse::TraversalOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct PtvizConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Defaults to `~/ptviz`.
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub render_png: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TraversalConfig {
    pub excluded_fields: Option<Vec<String>>,
    pub sentinel_addresses: Option<Vec<u64>>,
    pub max_depth: Option<usize>,
    pub variant_prefix: Option<String>,
    pub variant_suffix: Option<String>,

    /// Added to, or replacing entries of, the built-in tag table.
    #[serde(default)]
    pub tags: BTreeMap<String, TagRule>,

    pub schema: Option<Schema>,
}

pub const DEFAULT_CONFIG_FILE_NAME: &str = "ptviz.toml";
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "ptviz";

impl PtvizConfig {
    pub fn traversal_options(&self) -> TraversalOptions {
        let t = &self.traversal;
        let mut options = TraversalOptions::default();

        if let Some(fields) = &t.excluded_fields {
            options.excluded_fields = fields.clone();
        }
        if let Some(sentinels) = &t.sentinel_addresses {
            options.sentinel_addresses = sentinels.clone();
        }
        if let Some(max_depth) = t.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(schema) = &t.schema {
            options.schema = schema.clone();
        }

        let mut tags = TagTable::default().with_affixes(
            t.variant_prefix.as_deref().unwrap_or(DEFAULT_VARIANT_PREFIX),
            t.variant_suffix.as_deref().unwrap_or(DEFAULT_VARIANT_SUFFIX),
        );
        tags.extend(t.tags.clone());
        options.tags = tags;
        options
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output.dir.clone().unwrap_or_else(default_output_dir)
    }
}

pub fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_OUTPUT_DIR_NAME)
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(start_dir);
    while let Some(dir) = cur {
        let candidate = dir.join(DEFAULT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        cur = dir.parent();
    }
    None
}

pub fn load_config_file(path: &Path) -> Result<PtvizConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg: PtvizConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_config(
    explicit_path: Option<&Path>,
    start_dir: &Path,
) -> Result<Option<(PathBuf, PtvizConfig)>> {
    if let Some(p) = explicit_path {
        let cfg = load_config_file(p)?;
        return Ok(Some((p.to_path_buf(), cfg)));
    }

    let Some(p) = find_config_file(start_dir) else {
        return Ok(None);
    };
    let cfg = load_config_file(&p)?;
    Ok(Some((p, cfg)))
}
