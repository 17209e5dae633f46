//! Comparison chart: original vs processed intensity, rendered straight into
//! an `RgbImage` so no plotting backend or system font is needed.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

use crate::data::model::SampleSeries;
use crate::data::writer::sibling_with_suffix;
use crate::error::{Result, SparkError};

/// Suffix appended to the input base name for the chart.
pub const PLOT_SUFFIX: &str = "-comparison.jpg";

const WIDTH: u32 = 1600;
const HEIGHT: u32 = 960;
const MARGIN_LEFT: u32 = 150;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 80;
const MARGIN_BOTTOM: u32 = 110;
const N_TICKS: u32 = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([228, 228, 232]);
const FRAME: Rgb<u8> = Rgb([90, 90, 100]);
const TEXT: Rgb<u8> = Rgb([40, 40, 50]);
const ORIGINAL: Rgb<u8> = Rgb([220, 40, 40]);
const PROCESSED: Rgb<u8> = Rgb([30, 70, 200]);

/// `<dir>/<base>-comparison.jpg` next to the input file.
pub fn plot_path_for(input: &Path) -> PathBuf {
    sibling_with_suffix(input, PLOT_SUFFIX)
}

/// Render both traces against the independent axis and save as JPEG.
pub fn render_comparison(
    path: &Path,
    original: &SampleSeries,
    processed: &SampleSeries,
    title: &str,
) -> Result<()> {
    let img = draw_comparison(original, processed, title);
    img.save_with_format(path, ImageFormat::Jpeg)
        .map_err(|e| SparkError::ArtifactWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    log::debug!("Saved comparison chart to {}", path.display());
    Ok(())
}

/// Draw the chart into memory.
pub fn draw_comparison(original: &SampleSeries, processed: &SampleSeries, title: &str) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let area = PlotArea::new(original, processed);

    area.draw_grid(&mut img);
    area.draw_frame(&mut img);
    area.draw_trace(&mut img, original, ORIGINAL);
    area.draw_trace(&mut img, processed, PROCESSED);
    area.draw_tick_labels(&mut img);

    draw_text(&mut img, title, MARGIN_LEFT as i32, 28, TEXT, 4);
    let x_label = "Wavelength";
    let x_label_w = text_width(x_label, 3);
    draw_text(
        &mut img,
        x_label,
        (MARGIN_LEFT + area.plot_w / 2) as i32 - x_label_w / 2,
        (HEIGHT - 40) as i32,
        TEXT,
        3,
    );
    draw_text(&mut img, "Intensity", 12, (MARGIN_TOP - 36) as i32, TEXT, 3);

    draw_legend(&mut img, &area);
    img
}

// ---------------------------------------------------------------------------
// Data → pixel mapping
// ---------------------------------------------------------------------------

struct PlotArea {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    plot_w: u32,
    plot_h: u32,
}

impl PlotArea {
    fn new(original: &SampleSeries, processed: &SampleSeries) -> Self {
        let xs = original.x.iter().chain(&processed.x);
        let ys = original.y.iter().chain(&processed.y);
        let (x_min, x_max) = padded_range(xs.copied(), 0.0);
        let (y_min, y_max) = padded_range(ys.copied(), 0.05);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            plot_w: WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            plot_h: HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let fx = (x - self.x_min) / (self.x_max - self.x_min);
        let fy = 1.0 - (y - self.y_min) / (self.y_max - self.y_min);
        let px = MARGIN_LEFT as f64 + fx * self.plot_w as f64;
        let py = MARGIN_TOP as f64 + fy.clamp(0.0, 1.0) * self.plot_h as f64;
        (px.round() as i32, py.round() as i32)
    }

    fn draw_grid(&self, img: &mut RgbImage) {
        for k in 1..N_TICKS {
            let gx = MARGIN_LEFT + self.plot_w * k / N_TICKS;
            for y in MARGIN_TOP..MARGIN_TOP + self.plot_h {
                img.put_pixel(gx, y, GRID);
            }
            let gy = MARGIN_TOP + self.plot_h * k / N_TICKS;
            for x in MARGIN_LEFT..MARGIN_LEFT + self.plot_w {
                img.put_pixel(x, gy, GRID);
            }
        }
    }

    fn draw_frame(&self, img: &mut RgbImage) {
        let (x0, y0) = (MARGIN_LEFT, MARGIN_TOP);
        let (x1, y1) = (MARGIN_LEFT + self.plot_w, MARGIN_TOP + self.plot_h);
        for x in x0..=x1 {
            img.put_pixel(x, y0, FRAME);
            img.put_pixel(x, y1, FRAME);
        }
        for y in y0..=y1 {
            img.put_pixel(x0, y, FRAME);
            img.put_pixel(x1, y, FRAME);
        }
    }

    fn draw_trace(&self, img: &mut RgbImage, series: &SampleSeries, color: Rgb<u8>) {
        let mut prev: Option<(i32, i32)> = None;
        for (&x, &y) in series.x.iter().zip(&series.y) {
            let p = self.to_pixel(x, y);
            match prev {
                Some(q) => draw_thick_line(img, q, p, color),
                None => draw_thick_line(img, p, p, color),
            }
            prev = Some(p);
        }
    }

    fn draw_tick_labels(&self, img: &mut RgbImage) {
        let x_step = (self.x_max - self.x_min) / N_TICKS as f64;
        let y_step = (self.y_max - self.y_min) / N_TICKS as f64;
        let base = MARGIN_TOP + self.plot_h;

        for k in 0..=N_TICKS {
            let label = format_tick(self.x_min + x_step * k as f64, x_step);
            let gx = (MARGIN_LEFT + self.plot_w * k / N_TICKS) as i32;
            for dy in 0..8 {
                put_clipped(img, gx, (base + dy) as i32, FRAME);
            }
            draw_text(img, &label, gx - text_width(&label, 2) / 2, base as i32 + 14, TEXT, 2);

            let label = format_tick(self.y_min + y_step * k as f64, y_step);
            let gy = (base - self.plot_h * k / N_TICKS) as i32;
            for dx in 1..=8 {
                put_clipped(img, MARGIN_LEFT as i32 - dx, gy, FRAME);
            }
            draw_text(
                img,
                &label,
                MARGIN_LEFT as i32 - 14 - text_width(&label, 2),
                gy - 5,
                TEXT,
                2,
            );
        }
    }
}

/// Min / max of `values`, widened by `pad` of the span. A zero span is
/// widened by one unit on each side.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * pad, hi + span * pad)
}

fn format_tick(value: f64, step: f64) -> String {
    let step = step.abs();
    if step >= 10.0 {
        format!("{value:.0}")
    } else if step >= 1.0 {
        format!("{value:.1}")
    } else if step >= 0.01 {
        format!("{value:.3}")
    } else {
        format!("{value:.2e}")
    }
}

fn draw_legend(img: &mut RgbImage, area: &PlotArea) {
    let entries = [("Original", ORIGINAL), ("Processed", PROCESSED)];
    let box_w = 260;
    let x0 = (MARGIN_LEFT + area.plot_w) as i32 - box_w - 20;
    let y0 = MARGIN_TOP as i32 + 20;

    for (row, (label, color)) in entries.iter().enumerate() {
        let y = y0 + 16 + row as i32 * 40;
        draw_thick_line(img, (x0 + 16, y), (x0 + 76, y), *color);
        draw_text(img, label, x0 + 92, y - 10, TEXT, 4);
    }
    let y1 = y0 + 16 + entries.len() as i32 * 40 - 14;
    for x in x0..=x0 + box_w {
        put_clipped(img, x, y0, FRAME);
        put_clipped(img, x, y1, FRAME);
    }
    for y in y0..=y1 {
        put_clipped(img, x0, y, FRAME);
        put_clipped(img, x0 + box_w, y, FRAME);
    }
}

// ---------------------------------------------------------------------------
// Raster primitives
// ---------------------------------------------------------------------------

fn put_clipped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, two pixels wide so it survives JPEG compression.
fn draw_thick_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (mut cx, mut cy) = from;
    let (x1, y1) = to;
    let dx = (x1 - cx).abs();
    let dy = -(y1 - cy).abs();
    let sx = if cx < x1 { 1 } else { -1 };
    let sy = if cy < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_clipped(img, cx, cy, color);
        put_clipped(img, cx + 1, cy, color);
        put_clipped(img, cx, cy + 1, color);
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
}

// ---------------------------------------------------------------------------
// 3×5 bitmap font
// ---------------------------------------------------------------------------

fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 4 * scale
}

fn draw_text(img: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>, scale: i32) {
    for (n, c) in text.chars().enumerate() {
        let origin = x + n as i32 * 4 * scale;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        put_clipped(
                            img,
                            origin + col * scale + sx,
                            y + row as i32 * scale + sy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Rows top to bottom, three bits each (MSB = left column). Case-insensitive.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b011, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0; 5],
        _ => [0b111, 0b101, 0b101, 0b101, 0b111],
    }
}
