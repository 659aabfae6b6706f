//! Hand-off descriptors for the volume renderer.
//!
//! Nothing here talks to a GPU. These are the values a ray-marching renderer
//! needs to build a 3D texture, position the bounding box mesh and fill its
//! shader uniforms from a decoded [`Volume`].

use serde::{Deserialize, Serialize};

use crate::decode::Volume;
use crate::element::{element_spec, TexelType};

/// Ray-march step in texel units; must stay below 1.
pub const STEP_SIZE: f32 = 0.5;

/// Bisection steps used to refine an isosurface hit.
pub const REFINEMENT_STEPS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Layout of the single-channel 3D texture built from a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextureDescriptor {
    /// Fastest-varying axis (the volume's z)
    pub width: usize,
    pub height: usize,
    /// Slowest-varying axis (the volume's x)
    pub depth: usize,
    pub texel: TexelType,
    pub filter: TextureFilter,
    pub unpack_alignment: u32,
}

impl TextureDescriptor {
    pub fn for_volume(volume: &Volume) -> Self {
        let (x, y, z) = volume.extents();
        Self {
            width: z,
            height: y,
            depth: x,
            texel: element_spec(volume.element_type()).texel,
            filter: TextureFilter::Linear,
            unpack_alignment: 1,
        }
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }
}

/// Mesh transform and shader defines for ray marching a texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RayMarchParams {
    /// Box center, at half the texture extents
    pub position: [f32; 3],
    /// Box scale, equal to the texture extents
    pub scale: [f32; 3],
    pub step_size: f32,
    pub max_steps: u32,
    pub refinement_steps: u32,
}

impl RayMarchParams {
    /// Parameters for a texture of the given extents.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        let (x, y, z) = (width as f32, height as f32, depth as f32);
        let diagonal = (x * x + y * y + z * z).sqrt();
        Self {
            position: [x / 2.0, y / 2.0, z / 2.0],
            scale: [x, y, z],
            step_size: STEP_SIZE,
            max_steps: (diagonal / STEP_SIZE).ceil() as u32,
            refinement_steps: REFINEMENT_STEPS,
        }
    }

    /// Parameters for `texture`, or a unit box when there is none yet.
    pub fn for_texture(texture: Option<&TextureDescriptor>) -> Self {
        let (w, h, d) = texture.map_or((1, 1, 1), TextureDescriptor::dimensions);
        Self::new(w, h, d)
    }
}

/// How the ray accumulates samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Maximum intensity projection
    #[default]
    Mip,
    /// First isosurface crossing, shaded
    Iso,
}

impl RenderStyle {
    /// Value of the `u_renderstyle` uniform.
    pub fn uniform_value(&self) -> i32 {
        match self {
            Self::Mip => 0,
            Self::Iso => 1,
        }
    }
}

/// Caller-supplied render settings, passed through to the renderer unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Color limits `(low, high)`
    pub clim: (f32, f32),
    pub render_style: RenderStyle,
    pub iso_threshold: f32,
    pub iso_ambient_color: String,
    pub iso_diffuse_color: String,
    pub iso_specular_color: String,
    pub iso_shininess: f32,
    /// Colormap lookup texture reference
    pub colormap: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clim: (0.0, 1.0),
            render_style: RenderStyle::Mip,
            iso_threshold: 0.15,
            iso_ambient_color: "#000000".to_string(),
            iso_diffuse_color: "#ffffff".to_string(),
            iso_specular_color: "#ffffff".to_string(),
            iso_shininess: 30.0,
            colormap: "viridis".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse from a JSON string; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
