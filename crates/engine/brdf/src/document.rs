//! JSON documents describing a BRDF
//!
//! Layout:
//! ```json
//! { "alias": "MyBRDF", "type": "composite",
//!   "components": [ { "name": "base", "type": "Lambertian", "albedo": {"r":0.8,"g":0.8,"b":0.8} } ] }
//! ```

use crate::error::{Error, Result};
use crate::model::{self, Brdf, Composite, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Simple,
    Composite,
}

/// One model inside a document; parameters are flattened next to `name`/`type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub model: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, ParamValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrdfDocument {
    pub alias: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub components: Vec<ComponentDocument>,
}

/// Where a saved document is written below the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Picked up by the offline renderer
    Sunflow,
    /// User-defined models listed by the registry refresh
    Custom,
}

impl Destination {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Destination::Sunflow => "sunflow",
            Destination::Custom => "custom",
        }
    }
}

impl BrdfDocument {
    /// Capture the current parameters of `brdf` under `alias`
    pub fn capture(alias: &str, brdf: &dyn Brdf) -> Self {
        Self {
            alias: alias.to_string(),
            kind: if brdf.is_composite() {
                DocumentKind::Composite
            } else {
                DocumentKind::Simple
            },
            components: brdf.components(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Path the document is written to for `destination`
    pub fn path_in(&self, output_dir: &Path, destination: Destination) -> PathBuf {
        output_dir
            .join(destination.dir_name())
            .join(format!("{}.json", self.alias))
    }

    /// Write the document below `output_dir`, creating the directory if needed
    pub fn save(&self, output_dir: &Path, destination: Destination) -> Result<PathBuf> {
        check_alias(&self.alias)?;
        let path = self.path_in(output_dir, destination);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, self.to_json()?)?;
        tracing::info!("Saved BRDF {} to {}", self.alias, path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Rebuild a model from the document
    pub fn instantiate(&self) -> Result<Box<dyn Brdf>> {
        match self.kind {
            DocumentKind::Simple => {
                let [component] = self.components.as_slice() else {
                    return Err(Error::InvalidDocument(format!(
                        "simple BRDF {} must have exactly one component, found {}",
                        self.alias,
                        self.components.len()
                    )));
                };
                build_component(component)
            }
            DocumentKind::Composite => {
                if self.components.is_empty() {
                    return Err(Error::InvalidDocument(format!(
                        "composite BRDF {} has no components",
                        self.alias
                    )));
                }
                let parts = self
                    .components
                    .iter()
                    .map(|c| Ok((c.name.clone(), build_component(c)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(Composite::new(parts)))
            }
        }
    }
}

fn build_component(component: &ComponentDocument) -> Result<Box<dyn Brdf>> {
    let mut brdf = model::from_model(&component.model)?;
    let model = brdf.model();
    for (name, value) in &component.params {
        brdf.set_param(model, name, *value)?;
    }
    Ok(brdf)
}

/// Aliases become file stems and must stay inside the destination directory
fn check_alias(alias: &str) -> Result<()> {
    let invalid = alias.trim().is_empty()
        || alias == "."
        || alias == ".."
        || alias.contains(['/', '\\', ':'])
        || Path::new(alias).is_absolute();
    if invalid {
        return Err(Error::InvalidAlias(alias.to_string()));
    }
    Ok(())
}
