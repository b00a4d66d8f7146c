use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::BomError;

pub const MANIFEST_FILE: &str = "pcb-bom.toml";

/// `pcb-bom.toml`: which project BOMs to consolidate and where the results go.
///
/// Project `name` is read from `<name>/<subdirectory>/<name>.csv` relative to
/// the manifest's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Manifest {
    pub projects: Vec<String>,

    #[serde(default = "default_subdirectory")]
    pub subdirectory: String,

    /// Trusted BOM to take supplier part numbers from. May be the output file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Rewrite each project BOM in the output layout after backfilling.
    #[serde(default = "default_true")]
    pub rewrite_projects: bool,

    #[serde(skip)]
    root: PathBuf,
}

fn default_subdirectory() -> String {
    "manufacture".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("master_bom.csv")
}

fn default_true() -> bool {
    true
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, BomError> {
        let content = fs::read_to_string(path).map_err(|e| BomError::from(e).at(path))?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&content, root).map_err(|e| e.at(path))
    }

    /// Parse manifest text; relative paths resolve against `root`.
    pub fn parse(content: &str, root: impl Into<PathBuf>) -> Result<Self, BomError> {
        let mut manifest: Manifest = toml::from_str(content)?;
        manifest.root = root.into();
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), BomError> {
        if self.projects.is_empty() {
            return Err(BomError::InvalidManifest(
                "at least one project is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.projects {
            if name.trim().is_empty() {
                return Err(BomError::InvalidManifest("empty project name".to_string()));
            }
            if !seen.insert(name) {
                return Err(BomError::InvalidManifest(format!(
                    "project '{name}' listed twice"
                )));
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project names and BOM paths, in manifest order.
    pub fn project_paths(&self) -> Vec<(String, PathBuf)> {
        self.projects
            .iter()
            .map(|name| {
                let path = self
                    .root
                    .join(name)
                    .join(&self.subdirectory)
                    .join(format!("{name}.csv"));
                (name.clone(), path)
            })
            .collect()
    }

    pub fn sample_path(&self) -> Option<PathBuf> {
        self.sample.as_ref().map(|p| self.root.join(p))
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}
