use super::color::{ColorScale, Rgba};
use super::surface::Surface;
use super::text::TextOverlay;

/// Number of evenly spaced tick marks on the frequency label strip. One
/// extra trailing mark for the absolute max frequency is always added.
const LABEL_COUNT: u32 = 16;

/// Tick marks this close to the right edge (as a fraction of the width) are
/// suppressed so they do not crowd the trailing mark.
const RIGHT_EDGE_GUARD: f32 = 0.02;

const WAVEFORM_STROKE_WIDTH: u32 = 2;

/// Draw the time-domain polyline. The whole line takes a single stroke color
/// from the loudest sample in the snapshot, a coarse loudness cue rather
/// than per-sample coloring. Byte 128 is the vertical centerline.
pub fn draw_waveform(time_domain: &[u8], surface: &mut Surface, scale: &ColorScale) {
    surface.clear(Rgba::BLACK);
    if time_domain.is_empty() {
        return;
    }

    let width = surface.width() as f32;
    let height = surface.height() as f32;
    let loudest = *time_domain.iter().max().unwrap_or(&128);
    let stroke = scale.color(loudest as f32);

    let slice_width = width / time_domain.len() as f32;
    let sample_y = |v: u8| -> i32 { ((v as f32 / 128.0) * (height / 2.0)) as i32 };

    let mut prev_x = 0i32;
    let mut prev_y = sample_y(time_domain[0]);
    for (i, &v) in time_domain.iter().enumerate().skip(1) {
        let x = (i as f32 * slice_width) as i32;
        let y = sample_y(v);
        surface.draw_line(prev_x, prev_y, x, y, WAVEFORM_STROKE_WIDTH, stroke);
        prev_x = x;
        prev_y = y;
    }
    // Close the stroke on the centerline at the right edge.
    surface.draw_line(
        prev_x,
        prev_y,
        surface.width() as i32 - 1,
        (height / 2.0) as i32,
        WAVEFORM_STROKE_WIDTH,
        stroke,
    );
}

/// Draw the frequency-magnitude bars. Bin `i` is a 1-px-wide bar at `x = i`,
/// anchored at the bottom; magnitude 255 reaches the top of the surface.
pub fn draw_spectrum(frequency: &[u8], surface: &mut Surface, scale: &ColorScale) {
    surface.clear(Rgba::BLACK);
    let height = surface.height();

    for (i, &v) in frequency.iter().enumerate() {
        let top = (height * (255 - v as u32)) / 255;
        surface.fill_rect(i as i32, top as i32, 1, height - top, scale.color(v as f32));
    }
}

/// Scroll the spectrogram history down one row and stamp this tick's
/// magnitudes as a new 1-px row at the top. The history lives entirely in
/// the surface's own pixel buffer; the shift reads the previous content
/// before the new row is painted.
pub fn draw_spectrogram(frequency: &[u8], surface: &mut Surface, scale: &ColorScale) {
    surface.shift_down_one_row();
    for (i, &v) in frequency.iter().enumerate() {
        surface.set_pixel(i as i32, 0, scale.color(v as f32));
    }
}

/// Static render of the frequency axis: evenly spaced tick marks annotated
/// with formatted hertz values, plus one trailing mark for the max
/// frequency. Redrawn once per track (the max frequency is half the track's
/// sample rate).
pub fn draw_frequency_labels(
    surface: &mut Surface,
    min_hz: f32,
    max_hz: f32,
    overlay: Option<&TextOverlay>,
) {
    surface.clear(Rgba::BLACK);

    let width = surface.width();
    let pixels_per_tick = width as f32 / LABEL_COUNT as f32;
    let hz_per_tick = (max_hz - min_hz) / LABEL_COUNT as f32;
    let text_y = 15;

    let mut tick = 0u32;
    while (tick as f32 * pixels_per_tick) < width as f32 {
        let x = tick as f32 * pixels_per_tick;
        if near_right_edge(x, width) {
            break;
        }
        surface.fill_rect(x as i32, 0, 1, 8, Rgba::WHITE);

        if let Some(overlay) = overlay {
            let hz = min_hz + tick as f32 * hz_per_tick;
            let label = format_hertz(hz, hertz_precision(hz));
            let text_x = if tick == 0 {
                x as i32
            } else {
                x as i32 - overlay.measure_width(&label) as i32 / 2
            };
            overlay.composite(surface, &label, text_x, text_y, Rgba::WHITE);
        }
        tick += 1;
    }

    // The max-frequency mark is always drawn, right-aligned.
    surface.fill_rect(width as i32 - 1, 0, 1, 8, Rgba::WHITE);
    if let Some(overlay) = overlay {
        let label = format_hertz(max_hz, hertz_precision(max_hz));
        let text_x = width as i32 - overlay.measure_width(&label) as i32;
        overlay.composite(surface, &label, text_x, text_y, Rgba::WHITE);
    }
}

fn near_right_edge(x: f32, width: u32) -> bool {
    (x - width as f32).abs() < width as f32 * RIGHT_EDGE_GUARD
}

fn hertz_precision(hz: f32) -> usize {
    if hz > 1e9 {
        1
    } else {
        0
    }
}

/// Format a frequency with a unit suffix, e.g. `format_hertz(22050.0, 0)`
/// is `"22 kHz"`.
pub fn format_hertz(hz: f32, precision: usize) -> String {
    if hz >= 1e9 {
        format!("{:.*} GHz", precision, hz / 1e9)
    } else if hz >= 1e6 {
        format!("{:.*} MHz", precision, hz / 1e6)
    } else if hz >= 1e3 {
        format!("{:.*} kHz", precision, hz / 1e3)
    } else {
        format!("{:.*} Hz", precision, hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> ColorScale {
        let names: Vec<String> = ["blue", "cyan", "green", "yellow", "red"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        ColorScale::from_names(&names, 0.0, 255.0).unwrap()
    }

    #[test]
    fn silent_waveform_is_flat_at_half_height() {
        let s = scale();
        let mut surface = Surface::new(16, 8, Rgba::WHITE);
        let data = [128u8; 16];
        draw_waveform(&data, &mut surface, &s);

        let stroke = s.color(128.0);
        for x in 0..16 {
            assert_eq!(surface.pixel(x, 4), stroke, "x={}", x);
        }
        // Nothing above the stroke: the clear repainted the background.
        assert_eq!(surface.pixel(3, 1), Rgba::BLACK);
    }

    #[test]
    fn waveform_stroke_color_tracks_loudest_sample() {
        let s = scale();
        let mut surface = Surface::new(8, 8, Rgba::BLACK);
        let mut data = [128u8; 8];
        data[2] = 255;
        draw_waveform(&data, &mut surface, &s);

        let stroke = s.color(255.0);
        assert_eq!(surface.pixel(0, 4), stroke);
    }

    #[test]
    fn spectrum_bar_positions_and_extents() {
        let s = scale();
        let mut surface = Surface::new(4, 10, Rgba::BLACK);
        let data = [255u8, 0, 128, 0];
        draw_spectrum(&data, &mut surface, &s);

        // Magnitude 255 reaches the top at x = bin index.
        assert_eq!(surface.pixel(0, 0), s.color(255.0));
        assert_eq!(surface.pixel(0, 9), s.color(255.0));
        // Magnitude 0 draws nothing.
        for y in 0..10 {
            assert_eq!(surface.pixel(1, y), Rgba::BLACK, "y={}", y);
        }
        // Mid magnitude starts partway down and is anchored at the bottom.
        assert_eq!(surface.pixel(2, 0), Rgba::BLACK);
        assert_eq!(surface.pixel(2, 9), s.color(128.0));
    }

    #[test]
    fn spectrogram_scrolls_history_down_one_row() {
        let s = scale();
        let mut surface = Surface::new(3, 4, Rgba::BLACK);

        let tick1 = [255u8, 0, 0];
        let tick2 = [0u8, 255, 0];
        draw_spectrogram(&tick1, &mut surface, &s);
        draw_spectrogram(&tick2, &mut surface, &s);

        // Tick 2 occupies the top row.
        assert_eq!(surface.pixel(1, 0), s.color(255.0));
        // Tick 1's row moved one pixel down.
        assert_eq!(surface.pixel(0, 1), s.color(255.0));
        assert_eq!(surface.pixel(1, 1), s.color(0.0));
    }

    #[test]
    fn frequency_labels_draw_first_and_trailing_ticks() {
        let mut surface = Surface::new(160, 20, Rgba::WHITE);
        draw_frequency_labels(&mut surface, 0.0, 22050.0, None);

        assert_eq!(surface.pixel(0, 0), Rgba::WHITE);
        assert_eq!(surface.pixel(159, 0), Rgba::WHITE);
        // Interior ticks land at multiples of width/16.
        assert_eq!(surface.pixel(10, 0), Rgba::WHITE);
        assert_eq!(surface.pixel(5, 0), Rgba::BLACK);
        // Below the tick bars the strip is background.
        assert_eq!(surface.pixel(0, 12), Rgba::BLACK);
    }

    #[test]
    fn right_edge_guard_suppresses_only_near_ticks() {
        assert!(near_right_edge(99.0, 100));
        assert!(near_right_edge(98.5, 100));
        assert!(!near_right_edge(93.0, 100));
    }

    #[test]
    fn hertz_formatting_uses_unit_suffixes() {
        assert_eq!(format_hertz(0.0, 0), "0 Hz");
        assert_eq!(format_hertz(440.0, 0), "440 Hz");
        assert_eq!(format_hertz(22050.0, 0), "22 kHz");
        assert_eq!(format_hertz(1_500_000.0, 0), "2 MHz");
        assert_eq!(format_hertz(2_500_000_000.0, 1), "2.5 GHz");
    }

    #[test]
    fn precision_rule_follows_magnitude() {
        assert_eq!(hertz_precision(22050.0), 0);
        assert_eq!(hertz_precision(2e9), 1);
    }
}
