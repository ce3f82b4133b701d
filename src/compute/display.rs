//! Display pass (CPU path) - map concentrations to RGBA pixels.

use super::field::Field;
use crate::schema::{ColorRamp, DisplayChannel};

/// Render the field into an RGBA8 buffer, row-major, 4 bytes per cell.
///
/// Pure mapping of the configured species through the color ramp; the
/// simulation state is untouched. The buffer is resized to fit.
pub fn render_rgba(
    field: &Field,
    ramp: &ColorRamp,
    channel: DisplayChannel,
    out: &mut Vec<u8>,
) {
    out.resize(field.width * field.height * 4, 0);

    let plane = match channel {
        DisplayChannel::U => &field.u,
        DisplayChannel::V => &field.v,
    };

    for (pixel, &value) in out.chunks_exact_mut(4).zip(plane.iter()) {
        let color = ramp.sample(value);
        for (byte, component) in pixel.iter_mut().zip(color.iter()) {
            *byte = (component.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}
