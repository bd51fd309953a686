//! GPU field evaluation: the nearest-seed rule as a fragment program.
//!
//! Two offscreen framebuffer/texture pairs sized to the domain implement
//! the two-pass pipeline: the first pass rasterizes the nearest-seed color
//! field, the optional second pass derives the region-boundary overlay by
//! sampling the first pass's texture, and a final blit presents the chosen
//! texture into the egui viewport, flipped to the screen's orientation.
//!
//! Seed colors are a fixed palette lookup table uploaded once at startup;
//! seed count and positions are refreshed every frame before dispatch. All
//! GL calls are confined to this module and require the context to be
//! current. Every failure here is a startup failure: shaders that do not
//! compile or surfaces that cannot be allocated abort app creation before
//! the tick loop starts.

use std::num::NonZeroU32;

use glow::HasContext;
use thiserror::Error;
use voronoi_core::config::{Config, SEEDS_N_MAX};
use voronoi_core::palette::{PALETTE, palette_to_normalized};
use voronoi_core::state::SimulationState;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("no glow context available; the GPU strategy requires eframe's glow backend")]
    NoContext,
    #[error("failed to allocate {what}: {detail}")]
    Resource { what: &'static str, detail: String },
    #[error("{name} shader failed to compile: {log}")]
    Compile { name: &'static str, log: String },
    #[error("{name} program failed to link: {log}")]
    Link { name: &'static str, log: String },
    #[error("offscreen framebuffer is incomplete (status {status:#x})")]
    IncompleteFramebuffer { status: u32 },
}

/// Per-frame uniform values, captured on the driving thread before the
/// paint callback runs.
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms {
    pub seed_count: i32,
    /// Interleaved x/y pairs for the first `seed_count` seeds.
    pub seed_positions: [f32; SEEDS_N_MAX * 2],
    pub edge_thickness: f32,
    pub show_edges: bool,
}

impl FrameUniforms {
    pub fn capture(state: &SimulationState) -> Self {
        let mut seed_positions = [0.0; SEEDS_N_MAX * 2];
        for (i, seed) in state.seeds.iter().enumerate() {
            seed_positions[i * 2] = seed.position.x;
            seed_positions[i * 2 + 1] = seed.position.y;
        }

        Self {
            seed_count: state.seeds.len() as i32,
            seed_positions,
            edge_thickness: state.params.edge_thickness,
            show_edges: !state.params.hide_edges,
        }
    }
}

const FULLSCREEN_VERT: &str = r#"
#version 330 core
out vec2 v_uv;
void main() {
    vec2 corners[3] = vec2[3](vec2(-1.0, -1.0), vec2(3.0, -1.0), vec2(-1.0, 3.0));
    vec2 pos = corners[gl_VertexID];
    v_uv = pos * 0.5 + 0.5;
    gl_Position = vec4(pos, 0.0, 1.0);
}
"#;

const VORONOI_FRAG: &str = r#"
#version 330 core
const int MAX_SEEDS = 10;
uniform int seedCount;
uniform vec2 seedPositions[MAX_SEEDS];
uniform vec4 seedColors[MAX_SEEDS];
uniform vec2 resolution;
in vec2 v_uv;
out vec4 fragColor;
void main() {
    vec2 p = v_uv * resolution;
    float bestDist = 3.402823e38;
    int winner = 0;
    for (int i = 0; i < seedCount; ++i) {
        vec2 d = p - seedPositions[i];
        float dist = dot(d, d);
        if (dist < bestDist) {
            bestDist = dist;
            winner = i;
        }
    }
    fragColor = seedColors[winner];
}
"#;

const EDGE_FRAG: &str = r#"
#version 330 core
uniform sampler2D fieldTexture;
uniform float edgeThickness;
uniform vec4 edgeColor;
uniform vec2 resolution;
in vec2 v_uv;
out vec4 fragColor;
void main() {
    vec2 texel = edgeThickness / resolution;
    vec4 c = texture(fieldTexture, v_uv);
    bool boundary =
        any(notEqual(texture(fieldTexture, v_uv + vec2(-texel.x, 0.0)), c)) ||
        any(notEqual(texture(fieldTexture, v_uv + vec2(texel.x, 0.0)), c)) ||
        any(notEqual(texture(fieldTexture, v_uv + vec2(0.0, -texel.y)), c)) ||
        any(notEqual(texture(fieldTexture, v_uv + vec2(0.0, texel.y)), c));
    fragColor = boundary ? edgeColor : c;
}
"#;

const BLIT_FRAG: &str = r#"
#version 330 core
uniform sampler2D sourceTexture;
in vec2 v_uv;
out vec4 fragColor;
void main() {
    fragColor = texture(sourceTexture, vec2(v_uv.x, 1.0 - v_uv.y));
}
"#;

/// An offscreen render target usable as both a framebuffer attachment and
/// a readable texture.
struct Offscreen {
    framebuffer: glow::Framebuffer,
    texture: glow::Texture,
}

impl Offscreen {
    fn new(gl: &glow::Context, width: i32, height: i32) -> Result<Self, GpuError> {
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|detail| GpuError::Resource { what: "texture", detail })?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );

            let framebuffer = gl
                .create_framebuffer()
                .map_err(|detail| GpuError::Resource { what: "framebuffer", detail })?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                return Err(GpuError::IncompleteFramebuffer { status });
            }

            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self { framebuffer, texture })
        }
    }

    fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.texture);
        }
    }
}

/// Renders the Voronoi field (and optionally its edge overlay) with
/// fragment programs, then blits the result into the current viewport.
///
/// Holds only GL resource handles; the context itself is threaded in by
/// the caller (the paint callback's painter, or eframe's exit hook).
pub struct GlowFieldRenderer {
    size: [i32; 2],

    field_program: glow::Program,
    edge_program: glow::Program,
    blit_program: glow::Program,
    vertex_array: glow::VertexArray,

    field_target: Offscreen,
    edge_target: Offscreen,

    // Uniform handles resolved once at startup.
    seed_count_loc: Option<glow::UniformLocation>,
    seed_positions_loc: Option<glow::UniformLocation>,
    edge_thickness_loc: Option<glow::UniformLocation>,
}

impl GlowFieldRenderer {
    /// Compiles the programs, allocates both offscreen targets at domain
    /// size, and uploads the one-time uniforms (palette color table,
    /// resolution, edge color).
    pub fn new(gl: &glow::Context, cfg: &Config) -> Result<Self, GpuError> {
        let size = [cfg.domain.x as i32, cfg.domain.y as i32];

        let field_program = link_program(gl, FULLSCREEN_VERT, VORONOI_FRAG, "voronoi field")?;
        let edge_program = link_program(gl, FULLSCREEN_VERT, EDGE_FRAG, "edge overlay")?;
        let blit_program = link_program(gl, FULLSCREEN_VERT, BLIT_FRAG, "present blit")?;

        let field_target = Offscreen::new(gl, size[0], size[1])?;
        let edge_target = Offscreen::new(gl, size[0], size[1])?;

        unsafe {
            let vertex_array = gl
                .create_vertex_array()
                .map_err(|detail| GpuError::Resource { what: "vertex array", detail })?;

            // One-time uniforms: the palette lookup table, the domain
            // resolution, and the edge color never change after startup.
            gl.use_program(Some(field_program));
            let colors = palette_to_normalized(&PALETTE);
            gl.uniform_4_f32_slice(
                gl.get_uniform_location(field_program, "seedColors").as_ref(),
                &colors,
            );
            gl.uniform_2_f32(
                gl.get_uniform_location(field_program, "resolution").as_ref(),
                cfg.domain.x,
                cfg.domain.y,
            );

            gl.use_program(Some(edge_program));
            gl.uniform_2_f32(
                gl.get_uniform_location(edge_program, "resolution").as_ref(),
                cfg.domain.x,
                cfg.domain.y,
            );
            gl.uniform_4_f32_slice(
                gl.get_uniform_location(edge_program, "edgeColor").as_ref(),
                &cfg.edge_color.to_normalized(),
            );
            gl.uniform_1_i32(
                gl.get_uniform_location(edge_program, "fieldTexture").as_ref(),
                0,
            );

            gl.use_program(Some(blit_program));
            gl.uniform_1_i32(
                gl.get_uniform_location(blit_program, "sourceTexture").as_ref(),
                0,
            );

            gl.use_program(None);

            let seed_count_loc = gl.get_uniform_location(field_program, "seedCount");
            let seed_positions_loc = gl.get_uniform_location(field_program, "seedPositions");
            let edge_thickness_loc = gl.get_uniform_location(edge_program, "edgeThickness");

            Ok(Self {
                size,
                field_program,
                edge_program,
                blit_program,
                vertex_array,
                field_target,
                edge_target,
                seed_count_loc,
                seed_positions_loc,
                edge_thickness_loc,
            })
        }
    }

    /// Runs the field pass, the optional edge pass, and the present blit.
    ///
    /// Called from inside an egui paint callback: the viewport is already
    /// set to the target rect, so it is saved around the offscreen passes
    /// and restored for the blit. The dispatch blocks until the draw calls
    /// are issued; the driver synchronizes before the frame is presented,
    /// so no work overlaps into the next tick.
    pub fn paint(&self, gl: &glow::Context, uniforms: &FrameUniforms) {
        unsafe {
            // Save the callback's state: viewport, scissor, blend, and the
            // framebuffer egui is rendering into.
            let mut viewport = [0i32; 4];
            gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);
            let scissor_was_on = gl.is_enabled(glow::SCISSOR_TEST);
            let blend_was_on = gl.is_enabled(glow::BLEND);
            let prev_framebuffer = NonZeroU32::new(
                gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING) as u32,
            )
            .map(glow::NativeFramebuffer);

            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::BLEND);
            gl.bind_vertex_array(Some(self.vertex_array));

            // Pass 1: nearest-seed field into the first offscreen target.
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.field_target.framebuffer));
            gl.viewport(0, 0, self.size[0], self.size[1]);
            gl.use_program(Some(self.field_program));
            gl.uniform_1_i32(self.seed_count_loc.as_ref(), uniforms.seed_count);
            let live = uniforms.seed_count.max(0) as usize * 2;
            gl.uniform_2_f32_slice(
                self.seed_positions_loc.as_ref(),
                &uniforms.seed_positions[..live],
            );
            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            // Pass 2: boundary overlay derived from the field texture.
            let presented = if uniforms.show_edges {
                gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.edge_target.framebuffer));
                gl.use_program(Some(self.edge_program));
                gl.uniform_1_f32(self.edge_thickness_loc.as_ref(), uniforms.edge_thickness);
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, Some(self.field_target.texture));
                gl.draw_arrays(glow::TRIANGLES, 0, 3);
                self.edge_target.texture
            } else {
                self.field_target.texture
            };

            // Present: blit the chosen texture into the egui viewport,
            // flipped to screen orientation.
            gl.bind_framebuffer(glow::FRAMEBUFFER, prev_framebuffer);
            gl.viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
            if scissor_was_on {
                gl.enable(glow::SCISSOR_TEST);
            }
            gl.use_program(Some(self.blit_program));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(presented));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            if blend_was_on {
                gl.enable(glow::BLEND);
            }
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// Releases every GL resource. Called once on app exit.
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.field_program);
            gl.delete_program(self.edge_program);
            gl.delete_program(self.blit_program);
            gl.delete_vertex_array(self.vertex_array);
        }
        self.field_target.destroy(gl);
        self.edge_target.destroy(gl);
    }
}

fn link_program(
    gl: &glow::Context,
    vert_src: &str,
    frag_src: &str,
    name: &'static str,
) -> Result<glow::Program, GpuError> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|detail| GpuError::Resource { what: "program", detail })?;

        let stages = [
            (glow::VERTEX_SHADER, vert_src),
            (glow::FRAGMENT_SHADER, frag_src),
        ];
        let mut shaders = Vec::with_capacity(stages.len());
        for (stage, src) in stages {
            let shader = gl
                .create_shader(stage)
                .map_err(|detail| GpuError::Resource { what: "shader", detail })?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(GpuError::Compile { name, log });
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(GpuError::Link { name, log });
        }

        Ok(program)
    }
}
