//! Viewer configuration loaded from config.toml

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ViewerConfig {
    #[serde(default = "default_brdf_output_path")]
    pub brdf_output_path: PathBuf,
    #[serde(default = "default_java_binary")]
    pub java_binary: String,
    #[serde(default = "default_sunflow_jar_path")]
    pub sunflow_jar_path: PathBuf,
    #[serde(default = "default_sunflow_output_path")]
    pub sunflow_output_path: PathBuf,
    /// JVM heap size, passed as `-Xmx<ram>`
    #[serde(default = "default_sunflow_ram")]
    pub sunflow_ram: String,
    #[serde(default = "default_sunflow_scenes_path")]
    pub sunflow_scenes_path: PathBuf,
    #[serde(default = "default_brdf")]
    pub default_brdf: String,
    #[serde(default)]
    pub lobe: LobeConfig,
    /// Display name to scene file
    #[serde(default = "default_scenes")]
    pub scenes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LobeConfig {
    #[serde(default = "default_resolution")]
    pub rings: usize,
    #[serde(default = "default_resolution")]
    pub sectors: usize,
}

impl Default for LobeConfig {
    fn default() -> Self {
        Self {
            rings: default_resolution(),
            sectors: default_resolution(),
        }
    }
}

fn default_brdf_output_path() -> PathBuf {
    PathBuf::from("output/brdf")
}

fn default_java_binary() -> String {
    "java".to_string()
}

fn default_sunflow_jar_path() -> PathBuf {
    PathBuf::from("sunflow/sunflow.jar")
}

fn default_sunflow_output_path() -> PathBuf {
    PathBuf::from("output/renders")
}

fn default_sunflow_ram() -> String {
    "2G".to_string()
}

fn default_sunflow_scenes_path() -> PathBuf {
    PathBuf::from("sunflow/scenes")
}

fn default_brdf() -> String {
    brdf::DEFAULT_ALIAS.to_string()
}

fn default_resolution() -> usize {
    renderer::lobe::DEFAULT_RINGS
}

fn default_scenes() -> BTreeMap<String, String> {
    [
        ("Aliens", "aliens_shiny.sc"),
        ("Cornell Box", "cornell_box_jensen.sc"),
        ("Julia", "julia.sc"),
        ("Sphere Flake", "sphereflake.sc"),
        ("Standford Bunny", "bunny_ibl.sc"),
        ("Teapot", "gumbo_and_teapot.sc"),
    ]
    .into_iter()
    .map(|(name, file)| (name.to_string(), file.to_string()))
    .collect()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            brdf_output_path: default_brdf_output_path(),
            java_binary: default_java_binary(),
            sunflow_jar_path: default_sunflow_jar_path(),
            sunflow_output_path: default_sunflow_output_path(),
            sunflow_ram: default_sunflow_ram(),
            sunflow_scenes_path: default_sunflow_scenes_path(),
            default_brdf: default_brdf(),
            lobe: LobeConfig::default(),
            scenes: default_scenes(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Invalid viewer configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text)
    }

    /// Load `path` if given; fall back to defaults on any failure
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}; using default configuration", e);
                Self::default()
            }
        }
    }

    /// Scene file for a display name, resolved against the scenes directory
    pub fn scene_path(&self, scene: &str) -> Option<PathBuf> {
        self.scenes
            .get(scene)
            .map(|file| self.sunflow_scenes_path.join(file))
    }
}
