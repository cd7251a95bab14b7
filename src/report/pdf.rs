//! Paginated PDF rendering with a two-tier layout fallback
//!
//! Rendering always attempts Unicode mode first (an external TTF located
//! among known system font paths); any failure during that attempt
//! triggers one full fresh retry in ASCII mode with the built-in Helvetica
//! family. If the fallback also fails the error propagates; there is no
//! third tier. Both modes share the same section layout and differ only in
//! font set and sanitization range.

use crate::report::Section;
use anyhow::{anyhow, Context, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use regex::Regex;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 15.0;

/// Execution logs are clamped to this many characters.
const LOG_CLAMP: usize = 20_000;

/// Rendering tier: full-range external font, or built-in ASCII-safe fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Unicode,
    Ascii,
}

impl RenderMode {
    /// Highest char kept by sanitization in this mode.
    fn char_ceiling(&self) -> u32 {
        match self {
            RenderMode::Unicode => 0xFF,
            RenderMode::Ascii => 0x7F,
        }
    }
}

/// Strip characters outside the printable byte range of the active mode.
/// Lossy by design: emoji and most non-Latin text are dropped, not
/// transliterated.
pub fn sanitize(text: &str, mode: RenderMode) -> String {
    let ceiling = mode.char_ceiling();
    text.chars()
        .filter(|c| (*c as u32) <= ceiling && (!c.is_control() || *c == '\n' || *c == '\t'))
        .collect()
}

fn ansi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"))
}

/// Strip ANSI color escapes and clamp to the log length limit.
pub fn clean_log(log: &str) -> String {
    let stripped = ansi_regex().replace_all(log, "");
    if stripped.chars().count() <= LOG_CLAMP {
        return stripped.into_owned();
    }
    let cut = stripped
        .char_indices()
        .nth(LOG_CLAMP)
        .map(|(i, _)| i)
        .unwrap_or(stripped.len());
    format!("{}\n...[truncated]...", &stripped[..cut])
}

/// Greedy word wrap; overlong words are hard-split.
fn wrap(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let cut = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            out.push(word[..cut].to_string());
            word = &word[cut..];
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// Approximate characters that fit one text line at a font size.
fn chars_per_line(font_size: f64) -> usize {
    let usable_mm = PAGE_WIDTH - 2.0 * MARGIN;
    // Average glyph width ~0.5 em; 1 pt = 0.3528 mm.
    ((usable_mm / (0.5 * font_size * 0.3528)) as usize).max(10)
}

struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    mono: IndirectFontRef,
}

/// Page cursor: tracks the current layer and y position, breaking to a
/// fresh page when a write would cross the bottom margin.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, needed: f64) {
        if self.y - needed < MARGIN {
            self.new_page();
        }
    }

    fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    /// Write a block of text at the left margin, wrapping and paginating.
    fn write(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        size: f64,
        line_height: f64,
        color: Color,
        mode: RenderMode,
    ) {
        self.layer.set_fill_color(color);
        let width = chars_per_line(size);
        for raw_line in text.split('\n') {
            let clean = sanitize(raw_line, mode);
            for line in wrap(&clean, width) {
                self.ensure(line_height);
                if !line.is_empty() {
                    self.layer
                        .use_text(line, size as f32, Mm(MARGIN as f32), Mm(self.y as f32), font);
                }
                self.advance(line_height);
            }
        }
    }

    /// Write one centered line (approximate glyph metrics).
    fn write_centered(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        size: f64,
        line_height: f64,
        color: Color,
        mode: RenderMode,
    ) {
        let clean = sanitize(text, mode);
        let text_width = clean.chars().count() as f64 * 0.5 * size * 0.3528;
        let x = ((PAGE_WIDTH - text_width) / 2.0).max(MARGIN);
        self.ensure(line_height);
        self.layer.set_fill_color(color);
        self.layer.use_text(clean, size as f32, Mm(x as f32), Mm(self.y as f32), font);
        self.advance(line_height);
    }

    /// Horizontal divider across the text column.
    fn divider(&mut self) {
        self.ensure(4.0);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN as f32), Mm(self.y as f32)), false),
                (Point::new(Mm((PAGE_WIDTH - MARGIN) as f32), Mm(self.y as f32)), false),
            ],
            is_closed: false,
        });
        self.advance(6.0);
    }
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn heading_blue() -> Color {
    Color::Rgb(Rgb::new(30.0 / 255.0, 144.0 / 255.0, 255.0 / 255.0, None))
}

fn code_green() -> Color {
    Color::Rgb(Rgb::new(34.0 / 255.0, 139.0 / 255.0, 34.0 / 255.0, None))
}

fn log_red() -> Color {
    Color::Rgb(Rgb::new(220.0 / 255.0, 53.0 / 255.0, 69.0 / 255.0, None))
}

/// Two-tier PDF renderer.
pub struct PdfRenderer {
    reports_dir: PathBuf,
    font_candidates: Vec<PathBuf>,
}

impl PdfRenderer {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            font_candidates: default_font_candidates(),
        }
    }

    /// Override the Unicode font search list (empty forces ASCII mode).
    pub fn with_font_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.font_candidates = candidates;
        self
    }

    /// First existing candidate font, if any.
    fn find_font(&self) -> Option<PathBuf> {
        self.font_candidates.iter().find(|p| p.exists()).cloned()
    }

    /// Render the report, Unicode tier first, ASCII tier on any failure.
    /// Returns the relative document path (`reports/<filename>`).
    pub fn render(
        &self,
        title: &str,
        repository: &str,
        sections: &[Section],
        log: Option<&str>,
    ) -> Result<String> {
        fs::create_dir_all(&self.reports_dir).with_context(|| {
            format!("Failed to create reports dir {}", self.reports_dir.display())
        })?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let filename = format!("devmate_report_{}.pdf", timestamp);
        let out_path = self.reports_dir.join(&filename);

        let unicode_result = match self.find_font() {
            Some(font) => self.render_document(
                RenderMode::Unicode,
                Some(font.as_path()),
                title,
                repository,
                sections,
                log,
                &out_path,
            ),
            None => Err(anyhow!("No Unicode font found; forcing fallback")),
        };

        match unicode_result {
            Ok(()) => {
                info!("Report generated (unicode): {}", out_path.display());
            }
            Err(e) => {
                warn!("Unicode rendering failed ({}); retrying with built-in fonts", e);
                self.render_document(
                    RenderMode::Ascii,
                    None,
                    title,
                    repository,
                    sections,
                    log,
                    &out_path,
                )?;
                info!("Report generated (fallback): {}", out_path.display());
            }
        }

        Ok(format!("reports/{}", filename))
    }

    /// One full rendering pass in the given mode. Both tiers run exactly
    /// this routine; only the font set and sanitization range differ.
    #[allow(clippy::too_many_arguments)]
    fn render_document(
        &self,
        mode: RenderMode,
        font_path: Option<&Path>,
        title: &str,
        repository: &str,
        sections: &[Section],
        log: Option<&str>,
        out_path: &Path,
    ) -> Result<()> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");

        let fonts = match mode {
            RenderMode::Unicode => {
                let path = font_path.ok_or_else(|| anyhow!("Unicode mode requires a font path"))?;
                let data = fs::read(path)
                    .with_context(|| format!("Failed to read font {}", path.display()))?;
                let body = doc
                    .add_external_font(data.as_slice())
                    .map_err(|e| anyhow!("Failed to register external font: {}", e))?;
                FontSet {
                    regular: body.clone(),
                    bold: body.clone(),
                    italic: body,
                    mono: builtin(&doc, BuiltinFont::Courier)?,
                }
            }
            RenderMode::Ascii => FontSet {
                regular: builtin(&doc, BuiltinFont::Helvetica)?,
                bold: builtin(&doc, BuiltinFont::HelveticaBold)?,
                italic: builtin(&doc, BuiltinFont::HelveticaOblique)?,
                mono: builtin(&doc, BuiltinFont::Courier)?,
            },
        };

        let layer = doc.get_page(page).get_layer(layer);
        let mut cursor = PageCursor::new(&doc, layer);

        cursor.write_centered(title, &fonts.bold, 16.0, 10.0, black(), mode);
        cursor.advance(4.0);

        let meta = format!(
            "Repository: {}\nGenerated on: {}",
            repository,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        cursor.write(&meta, &fonts.regular, 12.0, 7.0, black(), mode);
        cursor.advance(4.0);

        for section in sections {
            cursor.write(&section.header, &fonts.bold, 14.0, 9.0, heading_blue(), mode);
            cursor.advance(2.0);

            let sub = format!("File: {}  |  Line: {}", section.file, section.line);
            cursor.write(&sub, &fonts.regular, 11.0, 6.0, black(), mode);

            let issue = format!("Issue: {}", section.message);
            cursor.write(&issue, &fonts.regular, 11.0, 6.0, black(), mode);
            cursor.advance(2.0);

            if !section.body.is_empty() {
                cursor.write(&section.body, &fonts.regular, 10.0, 5.5, black(), mode);
                cursor.advance(2.0);
            }

            if section.code_blocks.is_empty() {
                cursor.write(
                    "No code suggestions available.",
                    &fonts.italic,
                    10.0,
                    5.5,
                    black(),
                    mode,
                );
                cursor.advance(2.0);
            } else {
                for (idx, code) in section.code_blocks.iter().enumerate() {
                    let label = format!("Code Suggestion {}:", idx + 1);
                    cursor.write(&label, &fonts.bold, 11.0, 6.0, code_green(), mode);
                    cursor.write(code, &fonts.mono, 9.0, 4.5, black(), mode);
                    cursor.advance(3.0);
                }
            }

            cursor.divider();
        }

        if let Some(log) = log {
            cursor.new_page();
            cursor.write(
                "Full Execution Log",
                &fonts.bold,
                14.0,
                9.0,
                log_red(),
                mode,
            );
            cursor.advance(2.0);
            let text = clean_log(log);
            cursor.write(&text, &fonts.regular, 9.0, 4.5, black(), mode);
        }

        let file = fs::File::create(out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| anyhow!("Failed to write PDF: {}", e))?;
        Ok(())
    }
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| anyhow!("Failed to register built-in font: {}", e))
}

fn default_font_candidates() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}
