#![deny(unsafe_code)]
//! CLI binary for the poster-engine.
//!
//! Subcommands:
//! - `render` compose a poster, rasterize it, write PNG
//! - `inspect` compose a poster and dump the scene as JSON
//! - `palette init` / `palette show` manage the persisted palette table
//! - `list` print presets, palette modes, fixed palettes, hue bands and layouts

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use poster_engine_core::palette::{FixedPalette, PaletteSampler};
use poster_engine_core::palette_table::{Bootstrap, PaletteStore, DEFAULT_TABLE_FILE};
use poster_engine_core::poster_spec::{ValueRange, Wobble};
use poster_engine_core::{
    Composer, HueBand, LayoutKind, Palette, PaletteMode, PaletteTable, PosterSpec, Srgb,
    StylePreset, Xorshift64,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "poster-engine", about = "Generative wave and blob poster CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose and rasterize a poster, then write it as PNG.
    Render {
        #[command(flatten)]
        spec: SpecArgs,

        /// Directory the PNG is written into under its default file name.
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Explicit output file, overriding `--out-dir`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compose a poster and print the scene as JSON.
    Inspect {
        #[command(flatten)]
        spec: SpecArgs,
    },
    /// Manage the persisted palette table.
    Palette {
        #[command(subcommand)]
        command: PaletteCommand,
    },
    /// List presets, palette modes, fixed palettes, hue bands and layouts.
    List,
}

#[derive(Subcommand)]
enum PaletteCommand {
    /// Write the default table unless one already exists.
    Init {
        /// Palette table path.
        #[arg(long, default_value = DEFAULT_TABLE_FILE)]
        table: PathBuf,
    },
    /// Print the colors of a palette.
    Show {
        /// Palette mode (pastel, vivid, mono, random, persisted).
        #[arg(short, long, default_value = "pastel")]
        mode: String,

        /// Show a fixed palette (pastel, vivid, noise-touch) instead of a mode.
        #[arg(long)]
        fixed: Option<String>,

        /// PRNG seed for procedural modes.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Number of colors for procedural modes.
        #[arg(short, long, default_value_t = poster_engine_core::palette::DEFAULT_SWATCH_COUNT)]
        k: usize,

        /// Base hue for the mono mode, in [0, 1).
        #[arg(long, default_value_t = poster_engine_core::palette::DEFAULT_BASE_HUE)]
        base_hue: f64,

        /// Hue band (full, blue-green).
        #[arg(long, default_value = "full")]
        hue_band: String,

        /// Palette table path for the persisted mode.
        #[arg(long, default_value = DEFAULT_TABLE_FILE)]
        table: PathBuf,
    },
}

/// Flags shared by `render` and `inspect`. They override `--spec`.
#[derive(Args)]
struct SpecArgs {
    /// JSON poster request to start from.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// PRNG seed (0..=9999). Defaults to 0 without `--spec`.
    #[arg(long)]
    seed: Option<u64>,

    /// Style preset (minimal, vivid, noise-touch, ocean, depth).
    #[arg(long)]
    preset: Option<String>,

    /// Number of layers (1..=20).
    #[arg(short = 'n', long)]
    layers: Option<usize>,

    /// Blob wobble, either a value (`0.15`) or a range (`0.05..0.25`).
    #[arg(short, long, value_parser = parse_wobble)]
    wobble: Option<Wobble>,

    /// Palette mode (pastel, vivid, mono, random, persisted).
    #[arg(short, long)]
    palette: Option<String>,

    /// Fixed palette (pastel, vivid, noise-touch), used instead of the mode.
    #[arg(long)]
    fixed_palette: Option<String>,

    /// Hue band (full, blue-green).
    #[arg(long)]
    hue_band: Option<String>,

    /// Output resolution in dots per inch.
    #[arg(long)]
    dpi: Option<u32>,

    /// Background color as hex, e.g. `#f8f5ef`.
    #[arg(long)]
    background: Option<String>,

    /// Palette table used by the persisted palette mode.
    #[arg(long, default_value = DEFAULT_TABLE_FILE)]
    palette_table: PathBuf,

    /// Title text; empty to omit.
    #[arg(long)]
    title: Option<String>,

    /// Subtitle text; empty to omit.
    #[arg(long)]
    subtitle: Option<String>,

    /// Disable the drop shadows of the depth layout.
    #[arg(long)]
    no_shadows: bool,

    /// Disable the foam accents of the wave layout.
    #[arg(long)]
    no_foam: bool,
}

fn parse_wobble(s: &str) -> Result<Wobble, String> {
    let num = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid wobble {v:?}: {e}"))
    };
    match s.split_once("..") {
        Some((lo, hi)) => Ok(Wobble::Range(ValueRange::new(num(lo)?, num(hi)?))),
        None => Ok(Wobble::Fixed(num(s)?)),
    }
}

impl SpecArgs {
    /// Builds the request: the `--spec` file first, then each flag on top.
    fn to_spec(&self) -> Result<PosterSpec, CliError> {
        let mut spec = match &self.spec {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
                PosterSpec::from_json(&text)?
            }
            None => PosterSpec::new(0),
        };
        if let Some(seed) = self.seed {
            spec.seed = seed;
        }
        if let Some(preset) = &self.preset {
            spec.style_preset = Some(preset.parse::<StylePreset>()?);
        }
        if let Some(n) = self.layers {
            spec.n_layers = Some(n);
        }
        if let Some(wobble) = self.wobble {
            spec.wobble = Some(wobble);
        }
        if let Some(mode) = &self.palette {
            spec.palette_mode = Some(mode.parse::<PaletteMode>()?);
        }
        if let Some(fixed) = &self.fixed_palette {
            spec.fixed_palette = Some(fixed.parse::<FixedPalette>()?);
        }
        if let Some(band) = &self.hue_band {
            spec.hue_band = Some(band.parse::<HueBand>()?);
        }
        if let Some(dpi) = self.dpi {
            spec.dpi = Some(dpi);
        }
        if let Some(hex) = &self.background {
            spec.background = Some(Srgb::from_hex(hex)?);
        }
        if let Some(title) = &self.title {
            spec.title = Some(title.clone());
        }
        if let Some(subtitle) = &self.subtitle {
            spec.subtitle = Some(subtitle.clone());
        }
        if self.no_shadows {
            spec.shadows = Some(false);
        }
        if self.no_foam {
            spec.foam = Some(false);
        }
        Ok(spec)
    }
}

/// Bootstraps the table when the request needs it and hands it out as a store.
fn table_for(spec: &PosterSpec, path: &Path) -> Result<Option<PaletteTable>, CliError> {
    let resolved = spec.resolve()?;
    if resolved.fixed_palette.is_some() || resolved.palette_mode.is_procedural() {
        return Ok(None);
    }
    let table = PaletteTable::new(path);
    table.bootstrap()?;
    Ok(Some(table))
}

/// Palette printed by `palette show`, with its heading name.
fn shown_palette(
    mode: &str,
    fixed: Option<&str>,
    seed: u64,
    k: usize,
    base_hue: f64,
    hue_band: &str,
    table: &Path,
) -> Result<(String, Palette), CliError> {
    if let Some(fixed) = fixed {
        let fixed: FixedPalette = fixed.parse()?;
        return Ok((format!("fixed {fixed}"), fixed.palette()));
    }
    let mode: PaletteMode = mode.parse()?;
    let palette = if mode.is_procedural() {
        let band: HueBand = hue_band.parse()?;
        let sampler = PaletteSampler::new(mode, base_hue, band)?;
        sampler.sample(k, &mut Xorshift64::seeded(seed))?
    } else {
        PaletteTable::new(table).load()?
    };
    Ok((mode.to_string(), palette))
}

fn print_palette(palette: &Palette, json: bool) -> Result<(), CliError> {
    if json {
        let swatches: Vec<_> = palette
            .swatches()
            .iter()
            .map(|s| serde_json::json!({"name": s.name, "hex": s.color.to_hex()}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&swatches)?);
    } else {
        for (i, s) in palette.swatches().iter().enumerate() {
            let name = s.name.clone().unwrap_or_else(|| format!("color_{i}"));
            println!("  {name:<12} {}", s.color.to_hex());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets: Vec<_> = StylePreset::ALL.iter().map(|p| p.slug()).collect();
            let modes: Vec<_> = PaletteMode::ALL.iter().map(|m| m.name()).collect();
            let fixed: Vec<_> = FixedPalette::ALL.iter().map(|f| f.name()).collect();
            let bands: Vec<_> = HueBand::ALL.iter().map(|b| b.name()).collect();
            let layouts: Vec<_> = LayoutKind::ALL.iter().map(|l| l.name()).collect();
            if cli.json {
                let info = serde_json::json!({
                    "presets": presets,
                    "palette_modes": modes,
                    "fixed_palettes": fixed,
                    "hue_bands": bands,
                    "layouts": layouts,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Presets:");
                for preset in StylePreset::ALL {
                    let ranges = preset.ranges();
                    println!(
                        "  {:<12} {} layout, {} layers, {} palette",
                        preset.slug(),
                        ranges.layout,
                        ranges.n_layers,
                        ranges.palette_mode
                    );
                }
                println!("Palette modes:");
                println!("  {}", modes.join(", "));
                println!("Fixed palettes:");
                println!("  {}", fixed.join(", "));
                println!("Hue bands:");
                println!("  {}", bands.join(", "));
                println!("Layouts:");
                println!("  {}", layouts.join(", "));
            }
        }
        Command::Render {
            spec,
            out_dir,
            output,
        } => {
            let request = spec.to_spec()?;
            let table = table_for(&request, &spec.palette_table)?;
            let store = table.as_ref().map(|t| t as &dyn PaletteStore);
            let rendered = poster_engine_render::generate(&request, store)?;

            let path = match output {
                Some(path) => {
                    rendered.write_png(&path)?;
                    path
                }
                None => rendered.save_in(&out_dir)?,
            };

            let poster = rendered.poster();
            if cli.json {
                let info = serde_json::json!({
                    "seed": poster.seed(),
                    "layout": poster.layout().name(),
                    "layers": poster.layer_count(),
                    "shapes": poster.shapes().len(),
                    "width": poster.width(),
                    "height": poster.height(),
                    "output": path.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} poster ({}x{}, {} layers, seed {}) -> {}",
                    poster.layout(),
                    poster.width(),
                    poster.height(),
                    poster.layer_count(),
                    poster.seed(),
                    path.display()
                );
            }
        }
        Command::Inspect { spec } => {
            let request = spec.to_spec()?;
            let table = table_for(&request, &spec.palette_table)?;
            let mut composer = Composer::new(&request)?;
            if let Some(table) = &table {
                composer = composer.with_palette_store(table);
            }
            let poster = composer.compose()?;
            println!("{}", serde_json::to_string_pretty(&poster)?);
        }
        Command::Palette { command } => match command {
            PaletteCommand::Init { table } => {
                let table = PaletteTable::new(table);
                let outcome = table.bootstrap()?;
                let created = outcome == Bootstrap::Created;
                if cli.json {
                    let info = serde_json::json!({
                        "path": table.path().display().to_string(),
                        "created": created,
                    });
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else if created {
                    eprintln!("created palette table {}", table.path().display());
                } else {
                    eprintln!("palette table {} already exists", table.path().display());
                }
            }
            PaletteCommand::Show {
                mode,
                fixed,
                seed,
                k,
                base_hue,
                hue_band,
                table,
            } => {
                let (name, palette) = shown_palette(
                    &mode,
                    fixed.as_deref(),
                    seed,
                    k,
                    base_hue,
                    &hue_band,
                    &table,
                )?;
                if !cli.json {
                    println!("{name} palette ({} colors):", palette.len());
                }
                print_palette(&palette, cli.json)?;
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
                "exit_code": e.exit_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
