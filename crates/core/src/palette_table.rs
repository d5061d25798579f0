//! Persisted palette table: a flat `name,r,g,b` file with one swatch per row.
//!
//! The table is shared, process-wide durable state. It is created at most
//! once by [`PaletteTable::bootstrap`], which writes the default palette to a
//! temporary file and links it into place with no-clobber semantics: when
//! several processes race on first start, exactly one table appears, fully
//! written, and an existing table is never overwritten.
//!
//! Loading is strict. A missing column, a non-numeric cell or a channel
//! outside [0, 1] fails the whole load with [`PosterError::Persistence`];
//! there is no partial palette.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::color::Srgb;
use crate::error::PosterError;
use crate::palette::{Palette, Swatch};

/// Required columns, in the order they are written.
pub const TABLE_COLUMNS: [&str; 4] = ["name", "r", "g", "b"];

/// Conventional file name for the table.
pub const DEFAULT_TABLE_FILE: &str = "palette.csv";

/// A source of the persisted palette.
///
/// The composer only sees this trait, so tests and embedders can supply a
/// palette without touching the file system.
pub trait PaletteStore {
    /// Loads the full palette, in stored order.
    fn load(&self) -> Result<Palette, PosterError>;
}

impl PaletteStore for Palette {
    fn load(&self) -> Result<Palette, PosterError> {
        Ok(self.clone())
    }
}

/// Result of [`PaletteTable::bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// This call wrote the default table.
    Created,
    /// A valid table was already present and was left untouched.
    Existing,
}

/// The palette table at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTable {
    path: PathBuf,
}

impl PaletteTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes [`Palette::ocean`] if no table exists yet, then validates
    /// whatever table is in place.
    ///
    /// Idempotent: an existing table's bytes are never changed. A malformed
    /// existing table is reported, not repaired.
    pub fn bootstrap(&self) -> Result<Bootstrap, PosterError> {
        self.bootstrap_with(&Palette::ocean())
    }

    /// Same as [`bootstrap`](Self::bootstrap) with a caller-chosen default.
    ///
    /// An existing table is only read: its directory may be read-only.
    pub fn bootstrap_with(&self, default: &Palette) -> Result<Bootstrap, PosterError> {
        if !self.exists() && self.create(default)? {
            info!(path = %self.path.display(), rows = default.len(), "created palette table");
            return Ok(Bootstrap::Created);
        }
        self.load()?;
        debug!(path = %self.path.display(), "palette table already present");
        Ok(Bootstrap::Existing)
    }

    /// Atomically creates the table holding `palette`.
    ///
    /// Returns `Ok(false)` without touching anything if the file already
    /// exists.
    pub fn create(&self, palette: &Palette) -> Result<bool, PosterError> {
        let text = render_table(palette)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(PosterError::Io(format!(
                "cannot create {}: {}",
                self.path.display(),
                e.error
            ))),
        }
    }

    /// Reads and validates the table.
    pub fn load(&self) -> Result<Palette, PosterError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            PosterError::Io(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let palette = parse_table(&text, &self.path)?;
        debug!(path = %self.path.display(), rows = palette.len(), "loaded palette table");
        Ok(palette)
    }
}

impl PaletteStore for PaletteTable {
    fn load(&self) -> Result<Palette, PosterError> {
        PaletteTable::load(self)
    }
}

/// Loads the persisted palette from any store, in stored order.
///
/// The swatch count requested for procedural palettes does not apply here.
pub fn load_palette(store: &dyn PaletteStore) -> Result<Palette, PosterError> {
    store.load()
}

/// Serializes a palette as table text: header row, then one row per swatch.
///
/// Channels are written with Rust's shortest round-trip float formatting, so
/// reading the text back reproduces every `f64` exactly. Unnamed swatches are
/// written as `color_<index>`. Names that would not read back unchanged
/// (blank, padded with whitespace, or holding a comma or line break) are
/// rejected.
pub fn render_table(palette: &Palette) -> Result<String, PosterError> {
    let mut out = TABLE_COLUMNS.join(",");
    out.push('\n');
    for (i, swatch) in palette.swatches().iter().enumerate() {
        let name = swatch
            .name
            .clone()
            .unwrap_or_else(|| format!("color_{i}"));
        if name.trim().is_empty() || name.trim() != name || name.contains([',', '\n', '\r']) {
            return Err(PosterError::InvalidPalette(format!(
                "swatch {i} name {name:?} cannot be stored in the palette table"
            )));
        }
        let c = swatch.color;
        Srgb::try_new(c.r, c.g, c.b)
            .map_err(|e| PosterError::InvalidPalette(format!("swatch '{name}': {e}")))?;
        out.push_str(&format!("{name},{},{},{}\n", c.r, c.g, c.b));
    }
    Ok(out)
}

/// Parses table text. `path` is only used in error messages.
///
/// Columns are located by header name, so their order may vary and extra
/// columns are ignored. Blank lines are skipped. Line numbers in errors are
/// 1-based.
pub fn parse_table(text: &str, path: &Path) -> Result<Palette, PosterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| PosterError::persistence(path, 1, "table is empty"))?;
    let header: Vec<&str> = header.split(',').map(str::trim).collect();

    let mut columns = [0usize; 4];
    for (slot, wanted) in columns.iter_mut().zip(TABLE_COLUMNS) {
        *slot = header.iter().position(|h| *h == wanted).ok_or_else(|| {
            PosterError::persistence(path, header_line, format!("missing column '{wanted}'"))
        })?;
    }
    let [name_col, r_col, g_col, b_col] = columns;

    let mut swatches = Vec::new();
    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() {
            return Err(PosterError::persistence(
                path,
                line_no,
                format!("expected {} cells, found {}", header.len(), cells.len()),
            ));
        }

        let name = cells[name_col];
        if name.is_empty() {
            return Err(PosterError::persistence(path, line_no, "empty name"));
        }

        let channel = |col: usize, label: &str| -> Result<f64, PosterError> {
            let raw = cells[col];
            let value: f64 = raw.parse().map_err(|_| {
                PosterError::persistence(
                    path,
                    line_no,
                    format!("channel '{label}' is not a number: '{raw}'"),
                )
            })?;
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PosterError::persistence(
                    path,
                    line_no,
                    format!("channel '{label}' = {value} is outside [0, 1]"),
                ));
            }
            Ok(value)
        };

        let color = Srgb::new(channel(r_col, "r")?, channel(g_col, "g")?, channel(b_col, "b")?);
        swatches.push(Swatch::named(name, color));
    }

    if swatches.is_empty() {
        return Err(PosterError::persistence(path, header_line, "table has no rows"));
    }
    Palette::new(swatches)
}
