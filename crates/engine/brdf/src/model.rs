//! BRDF evaluation contract and the built-in models
//!
//! Directions are unit vectors pointing away from the surface, with the
//! surface normal along +Y.

use crate::document::ComponentDocument;
use crate::error::{Error, Result};
use crate::spectrum::{Response, Spectrum};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// Editable parameter value
///
/// Only two kinds are understood by the property panel; any other shape in a
/// document is rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Spectrum(Spectrum),
    Float(f32),
}

impl ParamValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Spectrum(_) => "Spectrum",
            ParamValue::Float(_) => "Float",
        }
    }

    fn as_spectrum(&self, name: &str) -> Result<Spectrum> {
        match self {
            ParamValue::Spectrum(s) => Ok(*s),
            ParamValue::Float(_) => Err(Error::ParamKind {
                name: name.to_string(),
                expected: "Spectrum",
            }),
        }
    }

    fn as_float(&self, name: &str) -> Result<f32> {
        match self {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Spectrum(_) => Err(Error::ParamKind {
                name: name.to_string(),
                expected: "Float",
            }),
        }
    }
}

/// One editable parameter of a (possibly composite) BRDF
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Component the parameter belongs to
    pub component: String,
    pub name: String,
    pub value: ParamValue,
}

/// Reflectance model evaluated by the lobe sampler
pub trait Brdf: fmt::Debug + Send {
    /// Model identifier, written as the component `type` in documents
    fn model(&self) -> &'static str;

    /// Reflected response for light arriving from `incident` and leaving along `outgoing`
    fn evaluate(&self, incident: Vec3, outgoing: Vec3) -> Response;

    /// Current parameters in display order
    fn params(&self) -> Vec<Param>;

    /// Set one parameter of the named component
    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) -> Result<()>;

    fn is_composite(&self) -> bool {
        false
    }

    /// Components in document form
    fn components(&self) -> Vec<ComponentDocument> {
        vec![ComponentDocument {
            name: self.model().to_string(),
            model: self.model().to_string(),
            params: self
                .params()
                .into_iter()
                .map(|p| (p.name, p.value))
                .collect(),
        }]
    }

    fn box_clone(&self) -> Box<dyn Brdf>;
}

impl Clone for Box<dyn Brdf> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Construct a model with default parameters from its identifier
pub fn from_model(model: &str) -> Result<Box<dyn Brdf>> {
    match model {
        Lambertian::MODEL => Ok(Box::new(Lambertian::default())),
        Phong::MODEL => Ok(Box::new(Phong::default())),
        ShinyDiffuse::MODEL => Ok(Box::new(ShinyDiffuse::default())),
        other => Err(Error::UnknownModel(other.to_string())),
    }
}

fn check_component(expected: &str, component: &str, name: &str) -> Result<()> {
    if component == expected {
        Ok(())
    } else {
        Err(Error::UnknownParam {
            component: component.to_string(),
            name: name.to_string(),
        })
    }
}

fn unknown_param(component: &str, name: &str) -> Error {
    Error::UnknownParam {
        component: component.to_string(),
        name: name.to_string(),
    }
}

fn param(component: &str, name: &str, value: ParamValue) -> Param {
    Param {
        component: component.to_string(),
        name: name.to_string(),
        value,
    }
}

/// Mirror direction of `incident` about the +Y normal
fn mirror(incident: Vec3) -> Vec3 {
    Vec3::new(-incident.x, incident.y, -incident.z)
}

fn specular_term(incident: Vec3, outgoing: Vec3, exponent: f32) -> f32 {
    let cos_alpha = mirror(incident).dot(outgoing).max(0.0);
    cos_alpha.powf(exponent.max(0.0))
}

// ============================================================================
// Lambertian
// ============================================================================

/// Ideal diffuse reflector
#[derive(Debug, Clone, PartialEq)]
pub struct Lambertian {
    pub albedo: Spectrum,
}

impl Lambertian {
    pub const MODEL: &'static str = "Lambertian";
}

impl Default for Lambertian {
    fn default() -> Self {
        Self {
            albedo: Spectrum::gray(0.8),
        }
    }
}

impl Brdf for Lambertian {
    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn evaluate(&self, _incident: Vec3, _outgoing: Vec3) -> Response {
        Response::from(self.albedo * (1.0 / PI))
    }

    fn params(&self) -> Vec<Param> {
        vec![param(Self::MODEL, "albedo", ParamValue::Spectrum(self.albedo))]
    }

    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) -> Result<()> {
        check_component(Self::MODEL, component, name)?;
        match name {
            "albedo" => self.albedo = value.as_spectrum(name)?,
            _ => return Err(unknown_param(component, name)),
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Brdf> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Phong
// ============================================================================

/// Glossy lobe around the mirror direction
#[derive(Debug, Clone, PartialEq)]
pub struct Phong {
    pub specular: Spectrum,
    pub exponent: f32,
}

impl Phong {
    pub const MODEL: &'static str = "Phong";
}

impl Default for Phong {
    fn default() -> Self {
        Self {
            specular: Spectrum::gray(1.0),
            exponent: 4.0,
        }
    }
}

impl Brdf for Phong {
    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn evaluate(&self, incident: Vec3, outgoing: Vec3) -> Response {
        Response::from(self.specular * specular_term(incident, outgoing, self.exponent))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            param(Self::MODEL, "specular", ParamValue::Spectrum(self.specular)),
            param(Self::MODEL, "exponent", ParamValue::Float(self.exponent)),
        ]
    }

    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) -> Result<()> {
        check_component(Self::MODEL, component, name)?;
        match name {
            "specular" => self.specular = value.as_spectrum(name)?,
            "exponent" => self.exponent = value.as_float(name)?,
            _ => return Err(unknown_param(component, name)),
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Brdf> {
        Box::new(self.clone())
    }
}

// ============================================================================
// ShinyDiffuse
// ============================================================================

/// Diffuse base with a glossy highlight, weighted by a single shininess factor
#[derive(Debug, Clone, PartialEq)]
pub struct ShinyDiffuse {
    pub diffuse: Spectrum,
    pub shininess: f32,
    pub exponent: f32,
}

impl ShinyDiffuse {
    pub const MODEL: &'static str = "ShinyDiffuse";
}

impl Default for ShinyDiffuse {
    fn default() -> Self {
        Self {
            diffuse: Spectrum::new(0.6, 0.2, 0.2),
            shininess: 0.5,
            exponent: 8.0,
        }
    }
}

impl Brdf for ShinyDiffuse {
    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn evaluate(&self, incident: Vec3, outgoing: Vec3) -> Response {
        let weight = self.shininess.clamp(0.0, 1.0);
        let diffuse = self.diffuse * ((1.0 - weight) / PI);
        let gloss = specular_term(incident, outgoing, self.exponent) * weight;
        Response::from(diffuse + Spectrum::gray(gloss))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            param(Self::MODEL, "diffuse", ParamValue::Spectrum(self.diffuse)),
            param(Self::MODEL, "shininess", ParamValue::Float(self.shininess)),
            param(Self::MODEL, "exponent", ParamValue::Float(self.exponent)),
        ]
    }

    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) -> Result<()> {
        check_component(Self::MODEL, component, name)?;
        match name {
            "diffuse" => self.diffuse = value.as_spectrum(name)?,
            "shininess" => self.shininess = value.as_float(name)?,
            "exponent" => self.exponent = value.as_float(name)?,
            _ => return Err(unknown_param(component, name)),
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Brdf> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Composite
// ============================================================================

/// Sum of named component models
#[derive(Debug, Clone)]
pub struct Composite {
    parts: Vec<(String, Box<dyn Brdf>)>,
}

impl Composite {
    pub const MODEL: &'static str = "Composite";

    pub fn new(parts: Vec<(String, Box<dyn Brdf>)>) -> Self {
        Self { parts }
    }
}

impl Brdf for Composite {
    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn evaluate(&self, incident: Vec3, outgoing: Vec3) -> Response {
        let mut color = Spectrum::BLACK;
        let mut scalar = 0.0;
        for (_, part) in &self.parts {
            let response = part.evaluate(incident, outgoing);
            color = color + response.color;
            scalar += response.scalar;
        }
        Response::new(color, scalar)
    }

    fn params(&self) -> Vec<Param> {
        self.parts
            .iter()
            .flat_map(|(name, part)| {
                part.params().into_iter().map(move |p| Param {
                    component: name.clone(),
                    ..p
                })
            })
            .collect()
    }

    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) -> Result<()> {
        let (_, part) = self
            .parts
            .iter_mut()
            .find(|(part_name, _)| part_name == component)
            .ok_or_else(|| unknown_param(component, name))?;
        let model = part.model();
        part.set_param(model, name, value)
    }

    fn is_composite(&self) -> bool {
        true
    }

    fn components(&self) -> Vec<ComponentDocument> {
        self.parts
            .iter()
            .flat_map(|(name, part)| {
                part.components().into_iter().map(move |c| ComponentDocument {
                    name: name.clone(),
                    ..c
                })
            })
            .collect()
    }

    fn box_clone(&self) -> Box<dyn Brdf> {
        Box::new(self.clone())
    }
}
