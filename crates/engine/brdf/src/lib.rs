//! Reflectance models for the lobe viewer
//!
//! - [`Brdf`] trait: evaluation contract consumed by the lobe sampler
//! - [`Spectrum`] / [`Response`]: RGB reflectance and its scalar luminance
//! - [`BrdfRegistry`]: alias-keyed collection of editable models
//! - [`BrdfDocument`]: JSON form of a model, as consumed by the offline renderer

pub mod document;
pub mod error;
pub mod model;
pub mod registry;
pub mod spectrum;

pub use document::{BrdfDocument, ComponentDocument, Destination, DocumentKind};
pub use error::{Error, Result};
pub use model::{Brdf, Composite, Lambertian, Param, ParamValue, Phong, ShinyDiffuse};
pub use registry::{BrdfRegistry, DEFAULT_ALIAS};
pub use spectrum::{Response, Spectrum};
