use crate::field::ColorField;
use crate::palette::Rgba;

/// Renders a region-boundary overlay from a computed color field.
///
/// Each output pixel compares the field color at its own position against
/// the four axis-aligned neighbors at `offset` pixels, where `offset` is
/// the edge thickness scaled from domain units into field pixels. A
/// differing neighbor marks a boundary: that pixel is written in
/// `edge_color`; otherwise the field color passes through unchanged.
/// Neighbor lookups clamp at the buffer border, so border pixels compare
/// against themselves and never produce spurious boundaries.
///
/// The filter is stateless across frames and deterministic given the field
/// and thickness.
///
/// ### Panics
/// Panics if `field` and `overlay` have different dimensions.
pub fn render_overlay(field: &ColorField, thickness: f32, edge_color: Rgba, overlay: &mut ColorField) {
    assert_eq!(field.width(), overlay.width());
    assert_eq!(field.height(), overlay.height());

    let scale = field.width() as f32 / field.domain().x;
    let offset = ((thickness * scale).round() as isize).max(1);
    let w = field.width() as isize;
    let h = field.height() as isize;

    for y in 0..h {
        for x in 0..w {
            let center = field.pixel(x as usize, y as usize);
            let sample = |dx: isize, dy: isize| {
                let sx = (x + dx).clamp(0, w - 1) as usize;
                let sy = (y + dy).clamp(0, h - 1) as usize;
                field.pixel(sx, sy)
            };

            let boundary = sample(-offset, 0) != center
                || sample(offset, 0) != center
                || sample(0, -offset) != center
                || sample(0, offset) != center;

            overlay.set_pixel(
                x as usize,
                y as usize,
                if boundary { edge_color } else { center },
            );
        }
    }
}
