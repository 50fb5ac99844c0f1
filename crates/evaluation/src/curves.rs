//! Console Training Curves

/// Render a named per-epoch metric as an aligned table with a bar
/// proportional to the value within the observed range.
pub fn render_curve(name: &str, values: &[f64]) -> String {
    const BAR_WIDTH: usize = 30;

    if values.is_empty() {
        return format!("{}: (no epochs)\n", name);
    }

    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let span = (max - min).max(f64::EPSILON);

    let mut out = format!("{} per epoch:\n", name);
    for (i, &v) in values.iter().enumerate() {
        let filled = (((v - min) / span) * BAR_WIDTH as f64).round() as usize;
        out.push_str(&format!(
            "  epoch {:>3}  {:>10.4}  {}{}\n",
            i + 1,
            v,
            "█".repeat(filled),
            "·".repeat(BAR_WIDTH - filled),
        ));
    }
    out
}

/// Render a series as a single-line unicode sparkline, downsampled to
/// at most `width` columns. Used for the flux waveform preview.
pub fn sparkline(values: &[f64], width: usize) -> String {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    if values.is_empty() || width == 0 {
        return String::new();
    }

    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let span = (max - min).max(f64::EPSILON);

    let columns = width.min(values.len());
    let per_column = values.len() as f64 / columns as f64;

    let mut out = String::with_capacity(columns);
    for col in 0..columns {
        let start = (col as f64 * per_column) as usize;
        let end = (((col + 1) as f64 * per_column) as usize).max(start + 1);
        let bucket = &values[start..end.min(values.len())];
        let mean = bucket.iter().sum::<f64>() / bucket.len() as f64;
        let level = (((mean - min) / span) * 7.0).round() as usize;
        out.push(LEVELS[level.min(7)]);
    }
    out
}
