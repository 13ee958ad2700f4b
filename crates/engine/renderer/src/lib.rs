//! OpenGL rendering core for the BRDF lobe viewer
//!
//! - [`Camera`] and [`transformation`]: viewer placement and matrices
//! - [`LobeSampler`]: hemisphere tessellation deformed by a BRDF
//! - [`GlMesh`]: GPU buffer ownership for one drawable
//! - [`Scene`] and [`FrameRenderer`]: the three-entity scene and its per-frame draw

pub mod camera;
pub mod entity;
pub mod error;
pub mod frame;
pub mod lobe;
pub mod mesh;
pub mod scene;
pub mod shader;
pub mod shapes;
pub mod transformation;

pub use camera::Camera;
pub use entity::{Entity, Transform};
pub use error::{Error, Result};
pub use frame::{FrameRenderer, Viewport};
pub use lobe::{LobeSampler, SphereTemplate};
pub use mesh::{GlMesh, MeshData};
pub use scene::Scene;
pub use shader::ShaderProgram;
