//! Project configuration, persisted as TOML in `.renku/aqs.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::graph::Namespaces;

/// Looked up relative to the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = ".renku/aqs.toml";

/// Paths and rendering options for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqsConfig {
    /// Provenance graph used when no paths are given on the command line.
    #[serde(default = "default_provenance_graph")]
    pub provenance_graph: PathBuf,
    /// Directory the astroquery hook writes run annotations to.
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_subgraph_file")]
    pub subgraph_file: String,
    #[serde(default = "default_image_file")]
    pub image_file: String,
    #[serde(default = "default_graphviz_binary")]
    pub graphviz_binary: String,
    /// Project root; binds the `local-renku` prefix when set.
    #[serde(default)]
    pub renku_path: Option<PathBuf>,
    /// Extra prefix → namespace bindings.
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
}

fn default_provenance_graph() -> PathBuf {
    PathBuf::from(".renku/provenance.json")
}
fn default_metadata_dir() -> PathBuf {
    PathBuf::from(".renku/aqs/common")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_subgraph_file() -> String {
    "subgraph.ttl".into()
}
fn default_image_file() -> String {
    "graph.png".into()
}
fn default_graphviz_binary() -> String {
    "dot".into()
}

impl Default for AqsConfig {
    fn default() -> Self {
        Self {
            provenance_graph: default_provenance_graph(),
            metadata_dir: default_metadata_dir(),
            output_dir: default_output_dir(),
            subgraph_file: default_subgraph_file(),
            image_file: default_image_file(),
            graphviz_binary: default_graphviz_binary(),
            renku_path: None,
            prefixes: BTreeMap::new(),
        }
    }
}

impl AqsConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// `explicit` if given, else [`DEFAULT_CONFIG_PATH`] under `root` when it
    /// exists, else defaults.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(DEFAULT_CONFIG_PATH);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config: loaded");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn subgraph_path(&self) -> PathBuf {
        self.output_dir.join(&self.subgraph_file)
    }

    /// Where to write the diagram; `filename` overrides the configured name.
    pub fn image_path(&self, filename: Option<&str>) -> PathBuf {
        self.output_dir
            .join(filename.unwrap_or(self.image_file.as_str()))
    }

    /// Default bindings plus `local-renku` and the configured extras.
    pub fn namespaces(&self) -> Namespaces {
        let mut ns = Namespaces::new();
        if let Some(root) = &self.renku_path {
            ns.bind("local-renku", format!("file://{}/", root.display()));
        }
        for (prefix, namespace) in &self.prefixes {
            ns.bind(prefix.as_str(), namespace.as_str());
        }
        ns
    }
}
