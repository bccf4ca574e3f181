//! Coverage masks and the transparent overlay they are painted onto.
//!
//! Text is rasterized into a [`TextMask`] tight around its ink. The stroke is
//! the same mask dilated by the stroke radius. Both are painted onto a
//! transparent [`RgbaImage`] the size of the target, which is then
//! alpha-composited over the base image.

use image::{Rgba, RgbaImage};

/// Per-pixel glyph coverage in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl TextMask {
    /// An empty (fully uncovered) mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)`; zero outside the mask.
    pub fn get(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    /// Accumulate coverage at `(x, y)`, saturating at 1.0. Out-of-range
    /// coordinates are ignored.
    pub fn add(&mut self, x: i64, y: i64, value: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.coverage[idx] = (self.coverage[idx] + value).min(1.0);
    }

    /// Whether any pixel carries coverage.
    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c <= 0.0)
    }

    /// Grow the mask by a disc of `radius` pixels.
    ///
    /// The result is `2 * radius` larger on each axis; pixel `(x, y)` of the
    /// original maps to `(x + radius, y + radius)`. Each output pixel takes
    /// the strongest coverage found within the disc around it.
    pub fn dilate(&self, radius: u32) -> TextMask {
        let r = radius as i64;
        let mut out = TextMask::new(self.width + 2 * radius, self.height + 2 * radius);
        if r == 0 {
            out.coverage.copy_from_slice(&self.coverage);
            return out;
        }

        let offsets: Vec<(i64, i64)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        for oy in 0..out.height as i64 {
            for ox in 0..out.width as i64 {
                let (sx, sy) = (ox - r, oy - r);
                let mut best = 0.0f32;
                for &(dx, dy) in &offsets {
                    best = best.max(self.get(sx + dx, sy + dy));
                    if best >= 1.0 {
                        break;
                    }
                }
                out.coverage[oy as usize * out.width as usize + ox as usize] = best;
            }
        }
        out
    }
}

/// Paint `mask` onto `canvas` with its top-left at `(left, top)`.
///
/// Each pixel moves toward `color` in proportion to its coverage, so fully
/// covered pixels take `color` exactly and replace what was painted before.
/// Pixels falling outside the canvas are clipped.
pub fn paint_mask(
    canvas: &mut RgbaImage,
    mask: &TextMask,
    left: i64,
    top: i64,
    color: Rgba<u8>,
) {
    for my in 0..mask.height() as i64 {
        let y = top + my;
        if y < 0 || y >= canvas.height() as i64 {
            continue;
        }
        for mx in 0..mask.width() as i64 {
            let x = left + mx;
            if x < 0 || x >= canvas.width() as i64 {
                continue;
            }
            let coverage = mask.get(mx, my);
            if coverage <= 0.0 {
                continue;
            }
            let existing = *canvas.get_pixel(x as u32, y as u32);
            canvas.put_pixel(x as u32, y as u32, mix(existing, color, coverage));
        }
    }
}

/// Interpolate from `existing` toward `ink` by `coverage`, in premultiplied
/// space so color channels of transparent pixels do not bleed in.
pub fn mix(existing: Rgba<u8>, ink: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let c = coverage.clamp(0.0, 1.0);
    let existing_alpha = existing[3] as f32 / 255.0 * (1.0 - c);
    let ink_alpha = ink[3] as f32 / 255.0 * c;

    let out_alpha = existing_alpha + ink_alpha;
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |e: u8, i: u8| -> u8 {
        let v = (e as f32 * existing_alpha + i as f32 * ink_alpha) / out_alpha;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(existing[0], ink[0]),
        channel(existing[1], ink[1]),
        channel(existing[2], ink[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Straight-alpha "over" blend of `top` onto `bottom`.
pub fn blend_over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = top[3] as f32 / 255.0;
    let bottom_alpha = bottom[3] as f32 / 255.0;

    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let result = (t * top_alpha + b * bottom_alpha * (1.0 - top_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Composite `overlay` over `base` pixel by pixel. Both must share dimensions.
pub fn composite(base: &mut RgbaImage, overlay: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        if src[3] == 0 {
            continue;
        }
        *dst = blend_over(*dst, *src);
    }
}
