//! Font loading, text measurement, and the font-size search.
//!
//! Font files are tried in priority order. For each one that loads, sizes are
//! searched from the target dimension downward in steps of [`SIZE_STEP`]
//! while they stay above [`MIN_FONT_SIZE`]; the first size whose ink box fits
//! wins and later files are not consulted. When nothing fits, the built-in
//! bitmap face is used at its natural size.

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::builtin;
use super::overlay::TextMask;

/// Decrement between successive candidate sizes.
pub const SIZE_STEP: usize = 5;

/// Sizes at or below this are never tried.
pub const MIN_FONT_SIZE: u32 = 10;

/// Integer pixel rectangle, `max` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl TextBox {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }

    /// The larger of width and height.
    pub fn max_dimension(&self) -> u32 {
        self.width().max(self.height())
    }

    pub fn union(&self, other: &TextBox) -> TextBox {
        TextBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

/// A font file that parsed successfully.
#[derive(Clone)]
pub struct LoadedFont {
    /// Where the font was read from
    pub source: PathBuf,
    font: Arc<FontVec>,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("source", &self.source)
            .finish()
    }
}

impl LoadedFont {
    /// Read and parse a TrueType/OpenType file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Font {:?} unavailable: {}", path, e);
                return None;
            }
        };
        Self::from_bytes(path, data)
    }

    /// Parse font bytes, labelling them with `source`.
    pub fn from_bytes(source: &Path, data: Vec<u8>) -> Option<Self> {
        match FontVec::try_from_vec(data) {
            Ok(font) => Some(Self {
                source: source.to_path_buf(),
                font: Arc::new(font),
            }),
            Err(e) => {
                tracing::debug!("Font {:?} failed to parse: {}", source, e);
                None
            }
        }
    }

    /// Pixel scale for an em size of `size` pixels.
    fn scale_for(&self, size: u32) -> PxScale {
        let size = size as f32;
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * self.font.height_unscaled() / upem),
            _ => PxScale::from(size),
        }
    }

    /// Position every glyph of `text`, one line per `\n`, baseline of the
    /// first line at the ascent.
    fn layout(&self, text: &str, scale: PxScale) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(scale);
        let line_advance = scaled.height() + scaled.line_gap();
        let mut glyphs = Vec::new();

        for (line_no, line) in text.split('\n').enumerate() {
            let baseline = scaled.ascent() + line_no as f32 * line_advance;
            let mut caret = 0.0f32;
            let mut prev = None;
            for c in line.chars().filter(|c| !c.is_control()) {
                let id = scaled.glyph_id(c);
                if let Some(prev) = prev {
                    caret += scaled.kern(prev, id);
                }
                glyphs.push(id.with_scale_and_position(scale, point(caret, baseline)));
                caret += scaled.h_advance(id);
                prev = Some(id);
            }
        }
        glyphs
    }

    fn measure(&self, text: &str, size: u32) -> TextBox {
        let mut bbox: Option<TextBox> = None;
        for glyph in self.layout(text, self.scale_for(size)) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                let glyph_box = TextBox::new(
                    b.min.x.floor() as i64,
                    b.min.y.floor() as i64,
                    b.max.x.ceil() as i64,
                    b.max.y.ceil() as i64,
                );
                bbox = Some(match bbox {
                    Some(acc) => acc.union(&glyph_box),
                    None => glyph_box,
                });
            }
        }
        bbox.unwrap_or_default()
    }

    fn rasterize(&self, text: &str, size: u32) -> TextMask {
        let bbox = self.measure(text, size);
        let mut mask = TextMask::new(bbox.width(), bbox.height());
        for glyph in self.layout(text, self.scale_for(size)) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                let left = b.min.x.floor() as i64 - bbox.min_x;
                let top = b.min.y.floor() as i64 - bbox.min_y;
                outlined.draw(|x, y, coverage| {
                    mask.add(left + x as i64, top + y as i64, coverage);
                });
            }
        }
        mask
    }
}

/// The ordered set of font files available for watermark text.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    fonts: Vec<LoadedFont>,
}

impl FontCatalog {
    /// Load every candidate that can be read and parsed, preserving order.
    /// Unavailable candidates are skipped.
    pub fn load(candidates: &[PathBuf]) -> Self {
        let fonts: Vec<LoadedFont> = candidates
            .iter()
            .filter_map(|path| LoadedFont::from_path(path))
            .collect();
        tracing::debug!(
            "Loaded {} of {} font candidate(s)",
            fonts.len(),
            candidates.len()
        );
        Self { fonts }
    }

    /// A catalog with no font files; rendering always uses the built-in face.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fonts(&self) -> &[LoadedFont] {
        &self.fonts
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// The face chosen for a piece of text.
#[derive(Debug, Clone)]
pub enum FittedFace {
    /// A font file at a fitted em size
    Outline { font: LoadedFont, size: u32 },
    /// The built-in bitmap face at its natural size
    Builtin,
}

impl FittedFace {
    /// Coverage mask of `text`, tight around its ink box.
    pub fn rasterize(&self, text: &str) -> TextMask {
        match self {
            FittedFace::Outline { font, size } => font.rasterize(text, *size),
            FittedFace::Builtin => builtin::rasterize(text),
        }
    }

    /// Whether this is the degraded built-in face.
    pub fn is_builtin(&self) -> bool {
        matches!(self, FittedFace::Builtin)
    }

    /// Em size in pixels, or the bitmap cell size for the built-in face.
    pub fn size(&self) -> u32 {
        match self {
            FittedFace::Outline { size, .. } => *size,
            FittedFace::Builtin => builtin::CELL,
        }
    }
}

/// Finds the largest font size that keeps text inside a square bound.
pub struct GlyphFitter<'a> {
    catalog: &'a FontCatalog,
}

impl<'a> GlyphFitter<'a> {
    pub fn new(catalog: &'a FontCatalog) -> Self {
        Self { catalog }
    }

    /// Candidate sizes for `target`, largest first.
    pub fn candidate_sizes(target: u32) -> impl Iterator<Item = u32> {
        (MIN_FONT_SIZE + 1..=target.max(MIN_FONT_SIZE))
            .rev()
            .step_by(SIZE_STEP)
    }

    /// Pick the face and size for `text` so that its ink box's larger side
    /// does not exceed `target`.
    ///
    /// Never fails: with no usable font file the built-in face is returned.
    pub fn fit(&self, text: &str, target: u32) -> FittedFace {
        for font in self.catalog.fonts() {
            for size in Self::candidate_sizes(target) {
                let bbox = font.measure(text, size);
                if bbox.max_dimension() <= target {
                    tracing::debug!(
                        "Font {:?} fits at {}px ({}x{} <= {})",
                        font.source,
                        size,
                        bbox.width(),
                        bbox.height(),
                        target
                    );
                    return FittedFace::Outline {
                        font: font.clone(),
                        size,
                    };
                }
            }
            tracing::debug!("Font {:?} has no size within {}px", font.source, target);
        }

        tracing::warn!(
            "No font candidate fits {}px, using the built-in face",
            target
        );
        FittedFace::Builtin
    }
}
