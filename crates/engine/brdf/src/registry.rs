//! Alias-keyed BRDF collection
//!
//! Built-in models are registered on construction. Documents saved to the
//! `custom/` output directory are added by [`BrdfRegistry::refresh`].

use crate::document::{BrdfDocument, Destination};
use crate::error::{Error, Result};
use crate::model::{Brdf, Composite, Lambertian, Phong, ShinyDiffuse};
use std::collections::BTreeMap;
use std::path::Path;

/// Alias selected when the viewer starts
pub const DEFAULT_ALIAS: &str = "ShinyDiffuseBRDF";

#[derive(Debug)]
struct Entry {
    current: Box<dyn Brdf>,
    defaults: Box<dyn Brdf>,
}

impl Entry {
    fn new(brdf: Box<dyn Brdf>) -> Self {
        Self {
            defaults: brdf.clone(),
            current: brdf,
        }
    }
}

#[derive(Debug)]
pub struct BrdfRegistry {
    entries: BTreeMap<String, Entry>,
}

impl Default for BrdfRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BrdfRegistry {
    /// Registry holding the built-in models
    pub fn new() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        registry.insert("LambertianBRDF", Box::new(Lambertian::default()));
        registry.insert("PhongBRDF", Box::new(Phong::default()));
        registry.insert(DEFAULT_ALIAS, Box::new(ShinyDiffuse::default()));
        registry.insert(
            "LayeredBRDF",
            Box::new(Composite::new(vec![
                ("base".to_string(), Box::new(Lambertian::default()) as Box<dyn Brdf>),
                ("coat".to_string(), Box::new(Phong::default()) as Box<dyn Brdf>),
            ])),
        );
        registry
    }

    /// Register (or replace) a model; its current parameters become its defaults
    pub fn insert(&mut self, alias: &str, brdf: Box<dyn Brdf>) {
        self.entries.insert(alias.to_string(), Entry::new(brdf));
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, alias: &str) -> Option<&dyn Brdf> {
        self.entries.get(alias).map(|e| e.current.as_ref())
    }

    pub fn get_mut(&mut self, alias: &str) -> Option<&mut (dyn Brdf + 'static)> {
        self.entries.get_mut(alias).map(|e| e.current.as_mut())
    }

    /// Restore the parameters the alias was registered with
    pub fn reset(&mut self, alias: &str) -> Result<()> {
        let entry = self
            .entries
            .get_mut(alias)
            .ok_or_else(|| Error::UnknownAlias(alias.to_string()))?;
        entry.current = entry.defaults.clone();
        Ok(())
    }

    /// Document for the alias with its current parameters
    pub fn document(&self, alias: &str) -> Result<BrdfDocument> {
        let brdf = self
            .get(alias)
            .ok_or_else(|| Error::UnknownAlias(alias.to_string()))?;
        Ok(BrdfDocument::capture(alias, brdf))
    }

    /// Load every document in `<output_dir>/custom`
    ///
    /// Unreadable documents are logged and skipped. Returns the number of
    /// models registered.
    pub fn refresh(&mut self, output_dir: &Path) -> Result<usize> {
        let dir = output_dir.join(Destination::Custom.dir_name());
        if !dir.is_dir() {
            tracing::debug!("No custom BRDF directory at {}", dir.display());
            return Ok(0);
        }

        let mut loaded = 0;
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match BrdfDocument::load(&path).and_then(|doc| Ok((doc.instantiate()?, doc))) {
                Ok((brdf, doc)) => {
                    tracing::debug!("Loaded BRDF {} from {}", doc.alias, path.display());
                    self.insert(&doc.alias, brdf);
                    loaded += 1;
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        tracing::info!("Refreshed BRDF list: {} custom models", loaded);
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamValue;

    #[test]
    fn test_default_alias_is_registered() {
        let registry = BrdfRegistry::new();
        assert!(registry.contains(DEFAULT_ALIAS));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut registry = BrdfRegistry::new();
        let before = registry.get("PhongBRDF").unwrap().params();

        registry
            .get_mut("PhongBRDF")
            .unwrap()
            .set_param("Phong", "exponent", ParamValue::Float(1.0))
            .unwrap();
        assert_ne!(registry.get("PhongBRDF").unwrap().params(), before);

        registry.reset("PhongBRDF").unwrap();
        assert_eq!(registry.get("PhongBRDF").unwrap().params(), before);
    }

    #[test]
    fn test_reset_unknown_alias() {
        let mut registry = BrdfRegistry::new();
        assert!(matches!(
            registry.reset("Missing"),
            Err(Error::UnknownAlias(_))
        ));
    }

    #[test]
    fn test_refresh_without_directory() {
        let mut registry = BrdfRegistry::new();
        let loaded = registry
            .refresh(Path::new("/nonexistent/brdf/output"))
            .unwrap();
        assert_eq!(loaded, 0);
    }
}
