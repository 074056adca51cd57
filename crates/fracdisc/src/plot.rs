//! Diagnostic PNG: area outline plus traces colored by dip class.
//!
//! - World coordinates are fit into a square canvas with a margin, aspect
//!   preserved, y axis pointing up.
//! - A title runs along the top margin. The legend is a column of labelled
//!   swatches (vertical, subvertical, other, missing, then an outlined swatch
//!   for the area) in the top-right corner.

use crate::area::{Area, Bounds};
use crate::config::MAX_PLOT_SIZE_PX;
use crate::ensure_parent_dir;
use crate::error::{Error, Result};
use crate::orientation::DipClass;
use crate::trace::Trace;
use ab_glyph::{FontRef, PxScale};
use geo::Coord;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use nalgebra::Vector2;
use std::path::Path;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// DejaVu Sans, see `assets/DejaVuSans.LICENSE`.
static FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// World → pixel mapping.
#[derive(Clone, Copy, Debug)]
struct View {
    origin: Vector2<f64>,
    scale: f64,
    offset: Vector2<f64>,
    size: f64,
}

impl View {
    fn fit(bounds: Bounds, size: u32) -> Self {
        let size = size as f64;
        let margin = size / 20.0;
        let usable = (size - 2.0 * margin).max(1.0);
        let extent = bounds.x_diff().max(bounds.y_diff());
        let scale = if extent > 0.0 { usable / extent } else { 1.0 };
        // center the shorter axis
        let offset = Vector2::new(
            margin + (usable - bounds.x_diff() * scale) / 2.0,
            margin + (usable - bounds.y_diff() * scale) / 2.0,
        );
        Self {
            origin: bounds.min,
            scale,
            offset,
            size,
        }
    }

    fn px(&self, p: Coord<f64>) -> (f32, f32) {
        let q = (Vector2::new(p.x, p.y) - self.origin) * self.scale + self.offset;
        (q.x as f32, (self.size - q.y) as f32)
    }
}

fn draw_segment(img: &mut RgbImage, a: (f32, f32), b: (f32, f32), width: u32, color: Rgb<u8>) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 0.0) };
    for k in 0..width.max(1) {
        let o = k as f32 - (width.max(1) - 1) as f32 / 2.0;
        draw_line_segment_mut(
            img,
            (a.0 + nx * o, a.1 + ny * o),
            (b.0 + nx * o, b.1 + ny * o),
            color,
        );
    }
}

/// Render area rings (black, 2 px) and traces (1 px, colored by `DipClass`).
pub fn render(area: &Area, traces: &[Trace], size: u32, title: &str) -> Result<RgbImage> {
    let font = FontRef::try_from_slice(FONT)?;
    let mut bounds = area.bounds();
    for t in traces {
        for line in t.geometry.parts() {
            for c in line.coords() {
                bounds.include(Vector2::new(c.x, c.y));
            }
        }
    }
    let view = View::fit(bounds, size);
    let mut img = RgbImage::from_pixel(size, size, WHITE);

    for ring in area.rings() {
        for seg in ring.lines() {
            draw_segment(&mut img, view.px(seg.start), view.px(seg.end), 2, BLACK);
        }
    }

    // later classes paint over earlier ones, matching the legend order
    for class in DipClass::ALL {
        let color = Rgb(class.rgb());
        let mut count = 0usize;
        for t in traces.iter().filter(|t| DipClass::classify(t.dip) == class) {
            for seg in t.geometry.segments() {
                draw_segment(&mut img, view.px(seg.start), view.px(seg.end), 1, color);
            }
            count += 1;
        }
        tracing::debug!(class = class.label(), traces = count, "plot");
    }

    draw_title(&mut img, size, &font, title);
    draw_legend(&mut img, size, &font);
    Ok(img)
}

fn draw_title(img: &mut RgbImage, size: u32, font: &FontRef<'_>, title: &str) {
    let margin = size / 20;
    let avail = size.saturating_sub(2 * margin).max(1) as f32;
    let mut scale = PxScale::from((margin as f32 * 0.6).max(1.0));
    let (w, _) = text_size(scale, font, title);
    if w as f32 > avail {
        scale = PxScale::from((scale.y * avail / w as f32).max(1.0));
    }
    let (w, _) = text_size(scale, font, title);
    let x = size.saturating_sub(w) / 2;
    draw_text_mut(img, BLACK, x as i32, (margin / 5) as i32, scale, font, title);
}

fn draw_legend(img: &mut RgbImage, size: u32, font: &FontRef<'_>) {
    let swatch = (size / 40).max(6);
    let gap = swatch / 3 + 1;
    let margin = size / 20;
    let scale = PxScale::from(swatch as f32 * 1.2);
    let x = size.saturating_sub(margin + swatch) as i32;
    let mut y = margin as i32;
    let label = |img: &mut RgbImage, y: i32, text: &str| {
        let (w, _) = text_size(scale, font, text);
        draw_text_mut(img, BLACK, x - (gap + w) as i32, y, scale, font, text);
    };
    for class in DipClass::ALL {
        draw_filled_rect_mut(img, Rect::at(x, y).of_size(swatch, swatch), Rgb(class.rgb()));
        label(img, y, class.label());
        y += (swatch + gap) as i32;
    }
    draw_hollow_rect_mut(img, Rect::at(x, y).of_size(swatch, swatch), BLACK);
    label(img, y, "Area");
}

/// Render and save as PNG, creating the parent directory if needed.
pub fn save_plot(path: &Path, area: &Area, traces: &[Trace], size: u32, title: &str) -> Result<()> {
    if size == 0 || size > MAX_PLOT_SIZE_PX {
        return Err(Error::config(format!(
            "plot size {size} outside 1..={MAX_PLOT_SIZE_PX}"
        )));
    }
    ensure_parent_dir(path)?;
    let img = render(area, traces, size, title)?;
    img.save(path)?;
    tracing::info!(path = %path.display(), size, traces = traces.len(), "save_plot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Polyline;
    use geo::LineString;

    fn area10() -> Area {
        Area::from_exterior(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
            .unwrap()
    }

    fn vertical(x: f64, dip: Option<f64>) -> Trace {
        Trace {
            index: 0,
            geometry: Polyline::from(LineString::from(vec![(x, 3.0), (x, 7.0)])),
            dip,
            dip_dir: None,
        }
    }

    fn ink(img: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) != WHITE)
            .count()
    }

    #[test]
    fn traces_and_outline_are_colored() {
        let img = render(
            &area10(),
            &[vertical(5.0, Some(85.0)), vertical(2.5, None)],
            200,
            "",
        )
        .unwrap();
        assert_eq!(img.dimensions(), (200, 200));
        // margin 10, scale 18: world (5, 5) -> pixel (100, 100)
        assert_eq!(*img.get_pixel(100, 100), Rgb(DipClass::Vertical.rgb()));
        // world (2.5, 5) -> pixel (55, 100)
        assert_eq!(*img.get_pixel(55, 100), Rgb(DipClass::Missing.rgb()));
        // bottom edge y = 0 -> pixel row 190
        assert_eq!(*img.get_pixel(100, 190), BLACK);
        assert_eq!(*img.get_pixel(30, 100), WHITE);
    }

    #[test]
    fn legend_swatches_in_corner() {
        let img = render(&area10(), &[], 400, "").unwrap();
        let swatch = 10;
        let x = 400 - 20 - swatch;
        assert_eq!(*img.get_pixel(x + 2, 20 + 2), Rgb(DipClass::Vertical.rgb()));
    }

    #[test]
    fn legend_and_title_carry_text() {
        let blank = render(&area10(), &[], 400, "").unwrap();
        let titled = render(&area10(), &[], 400, "Traces and area").unwrap();
        // swatch column starts at x = 370; labels sit to its left, title in the top margin
        assert!(ink(&blank, 300..366, 23..32) > 0);
        assert_eq!(ink(&blank, 40..360, 0..18), 0);
        assert!(ink(&titled, 40..360, 0..18) > 0);
    }

    #[test]
    fn save_plot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("plot.png");
        save_plot(&path, &area10(), &[vertical(5.0, Some(70.0))], 64, "t").unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!(back.width(), 64);
    }

    #[test]
    fn oversized_plot_is_refused_before_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.png");
        let err = save_plot(&path, &area10(), &[], 4_000_000_000, "").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(!path.exists());
    }
}
