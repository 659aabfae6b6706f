//! JSON summary printed by the probe.

use serde::Serialize;
use volume_stream::{
    AcquisitionPath, Header, NetCdfSession, RayMarchParams, RenderConfig, TextureDescriptor,
    VariableDescriptor, Volume,
};

#[derive(Debug, Serialize)]
pub struct ProbeReport<'a> {
    pub source: &'a str,
    pub bytes_received: u64,
    pub content_length: Option<u64>,
    pub accept_ranges: bool,
    pub header: &'a Header,
    pub variable: &'a VariableDescriptor,
    pub acquisition: AcquisitionPath,
    pub volume: VolumeSummary,
    pub texture: TextureDescriptor,
    pub ray_march: RayMarchParams,
    pub render: RenderUniforms<'a>,
}

#[derive(Debug, Serialize)]
pub struct VolumeSummary {
    pub extents: (usize, usize, usize),
    pub size: usize,
    pub min: f64,
    pub max: f64,
    pub normalized: bool,
}

/// Render settings as the shader receives them.
#[derive(Debug, Serialize)]
pub struct RenderUniforms<'a> {
    pub u_renderstyle: i32,
    pub u_clim: (f32, f32),
    pub u_iso_threshold: f32,
    pub u_iso_ambient_color: &'a str,
    pub u_iso_diffuse_color: &'a str,
    pub u_iso_specular_color: &'a str,
    pub u_iso_shininess: f32,
    pub colormap: &'a str,
}

impl<'a> ProbeReport<'a> {
    /// Assemble the report. `bytes_received` and `content_length` are
    /// taken from the session as it stands after the fetch.
    pub fn new(
        source: &'a str,
        session: &'a NetCdfSession,
        variable: &'a VariableDescriptor,
        acquisition: AcquisitionPath,
        volume: &Volume,
        render: &'a RenderConfig,
    ) -> Self {
        let texture = TextureDescriptor::for_volume(volume);
        Self {
            source,
            bytes_received: session.state().bytes_received(),
            content_length: session.state().content_length(),
            accept_ranges: session.state().accept_ranges(),
            header: session.header(),
            variable,
            acquisition,
            volume: VolumeSummary {
                extents: volume.extents(),
                size: volume.size(),
                min: volume.min(),
                max: volume.max(),
                normalized: volume.is_normalized(),
            },
            texture,
            ray_march: RayMarchParams::for_texture(Some(&texture)),
            render: RenderUniforms {
                u_renderstyle: render.render_style.uniform_value(),
                u_clim: render.clim,
                u_iso_threshold: render.iso_threshold,
                u_iso_ambient_color: &render.iso_ambient_color,
                u_iso_diffuse_color: &render.iso_diffuse_color,
                u_iso_specular_color: &render.iso_specular_color,
                u_iso_shininess: render.iso_shininess,
                colormap: &render.colormap,
            },
        }
    }
}
