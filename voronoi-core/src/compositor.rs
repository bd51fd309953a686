use crate::config::{Config, RenderParams};
use crate::field::ColorField;
use crate::palette::{Rgba, SEED_MARKER_COLOR};
use crate::seed::SeedSet;
use glam::Vec2;

/// Assembles the final displayable frame.
///
/// Layers, bottom to top:
/// 1. The base layer — the raw color field, or the edge overlay when the
///    boundary pass ran.
/// 2. Unless `params.hide_seeds`, a filled circular marker per seed in
///    translucent near-black at the seed's current (already advanced)
///    position.
///
/// The frame is fully repopulated from `base` on every call; nothing from
/// the previous frame survives.
///
/// ### Parameters
/// - `base` - Field or overlay buffer to copy as the bottom layer.
/// - `seeds` - Seed set providing current marker positions.
/// - `cfg` - Configuration supplying the marker radius.
/// - `params` - Render parameters; only `hide_seeds` is consulted.
/// - `frame` - Output buffer, same dimensions as `base`.
pub fn composite(
    base: &ColorField,
    seeds: &SeedSet,
    cfg: &Config,
    params: &RenderParams,
    frame: &mut ColorField,
) {
    frame.copy_from(base);

    if params.hide_seeds {
        return;
    }

    let scale = Vec2::new(
        frame.width() as f32 / frame.domain().x,
        frame.height() as f32 / frame.domain().y,
    );
    let radius = (cfg.seed_radius * scale.x).max(1.0);

    for seed in seeds.iter() {
        draw_marker(frame, seed.position * scale, radius, SEED_MARKER_COLOR);
    }
}

/// Rasterizes a filled circle into the frame, alpha-blending `color` over
/// the existing pixels. The bounding box is clamped to the buffer.
fn draw_marker(frame: &mut ColorField, center: Vec2, radius: f32, color: Rgba) {
    let r2 = radius * radius;
    let x0 = (center.x - radius).floor().max(0.0) as usize;
    let y0 = (center.y - radius).floor().max(0.0) as usize;
    let x1 = (center.x + radius).ceil().min(frame.width() as f32 - 1.0) as usize;
    let y1 = (center.y + radius).ceil().min(frame.height() as f32 - 1.0) as usize;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - center.x;
            let dy = y as f32 - center.y;
            if dx * dx + dy * dy <= r2 {
                frame.set_pixel(x, y, blend(frame.pixel(x, y), color));
            }
        }
    }
}

/// Source-over blend of `src` onto an opaque `dst`.
fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let alpha = src.a as f32 / 255.0;
    let mix = |d: u8, s: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    Rgba::opaque(mix(dst.r, src.r), mix(dst.g, src.g), mix(dst.b, src.b))
}
