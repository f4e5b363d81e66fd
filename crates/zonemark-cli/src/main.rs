//! zonemark CLI - color-zone detection tool

mod output;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use zonemark::prelude::*;
use zonemark::{group_similar_colors, open_session};

#[derive(Parser, Debug)]
#[command(name = "zonemark")]
#[command(
    author,
    version,
    about = "Detect color-coded data zones and their header labels in spreadsheets"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file (xlsx, xlsm)
        input: PathBuf,
    },

    /// Show the fill colors used on a sheet, most frequent first
    Colors {
        /// Input spreadsheet file
        input: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Fold colors whose HSV components differ by less than TOL
        #[arg(long, value_name = "TOL")]
        group_similar: Option<f64>,
    },

    /// Detect zones and labels and export them
    Detect {
        /// Input spreadsheet file
        input: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Palette JSON file
        #[arg(long, conflicts_with_all = ["zone_color", "pairs"])]
        palette: Option<PathBuf>,

        /// Fill color of data cells, as RRGGBB
        #[arg(long, value_name = "HEX", required_unless_present = "palette")]
        zone_color: Option<String>,

        /// Display name of the data zones
        #[arg(long, default_value = "Data")]
        zone_name: String,

        /// Header color pair ROW_HEX:COL_HEX, repeatable
        #[arg(long = "pair", value_name = "ROW_HEX:COL_HEX", value_parser = parse_pair)]
        pairs: Vec<ColorPair>,

        /// Merge zones whose bounds are at most N cells apart
        #[arg(long, value_name = "N")]
        merge_gap: Option<u32>,

        /// Repeat merging until no more zones join
        #[arg(long, requires = "merge_gap")]
        merge_until_stable: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full JSON document
    Json,
    /// One summary row per zone
    Csv,
    /// Plain-text report
    Report,
    /// JSON list of cells with their headers
    Points,
}

/// Parse `ROW_HEX:COL_HEX`
fn parse_pair(s: &str) -> std::result::Result<ColorPair, String> {
    let (row, col) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ROW_HEX:COL_HEX, got '{}'", s))?;
    let row = ColorKey::parse(row).map_err(|e| e.to_string())?;
    let col = ColorKey::parse(col).map_err(|e| e.to_string())?;
    Ok(ColorPair::new(row, col))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Colors {
            input,
            sheet,
            group_similar,
        } => show_colors(&input, sheet.as_deref(), group_similar),
        Commands::Detect {
            input,
            sheet,
            palette,
            zone_color,
            zone_name,
            pairs,
            merge_gap,
            merge_until_stable,
            format,
            output,
        } => {
            let palette = build_palette(palette.as_deref(), zone_color.as_deref(), &zone_name, pairs)?;
            let options = DetectionOptions {
                merge_gap,
                merge_until_stable,
            };
            detect(&input, sheet.as_deref(), palette, &options, format, output.as_deref())
        }
    }
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook =
        Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!("Sheets in '{}':", input.display());
    for (i, sheet) in workbook.sheets().enumerate() {
        let (rows, cols) = sheet.dimensions();
        println!("  {}: {} ({} cells, {}x{})", i, sheet.name(), sheet.cell_count(), rows, cols);
    }
    Ok(())
}

fn show_colors(input: &Path, sheet: Option<&str>, group_similar: Option<f64>) -> Result<()> {
    let session = open_session(input, sheet)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let summary = session.color_summary();

    if summary.is_empty() {
        eprintln!("Warning: no filled cells on sheet '{}'", session.sheet().name());
        return Ok(());
    }

    match group_similar {
        Some(tolerance) => {
            let groups = group_similar_colors(&summary, tolerance);
            print!("{}", output::color_group_table(&groups));
        }
        None => print!("{}", output::color_table(&summary)),
    }
    Ok(())
}

/// Palette from a JSON file, or from the color flags
fn build_palette(
    file: Option<&Path>,
    zone_color: Option<&str>,
    zone_name: &str,
    pairs: Vec<ColorPair>,
) -> Result<Palette> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read palette '{}'", path.display()))?;
        let palette: Palette = serde_json::from_str(&text)
            .with_context(|| format!("Invalid palette file '{}'", path.display()))?;
        return Ok(palette);
    }

    let Some(zone_color) = zone_color else {
        bail!("either --palette or --zone-color is required");
    };
    let zone_color = ColorKey::parse(zone_color).context("Invalid --zone-color")?;

    Ok(pairs
        .into_iter()
        .fold(Palette::new(zone_color, zone_name), Palette::with_pair))
}

fn detect(
    input: &Path,
    sheet: Option<&str>,
    palette: Palette,
    options: &DetectionOptions,
    format: OutputFormat,
    out_path: Option<&Path>,
) -> Result<()> {
    let mut session = open_session(input, sheet)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    if palette.pairs.is_empty() {
        tracing::warn!("no header pairs given, zones will have no labels");
    }
    session.configure(palette).context("Invalid palette")?;

    let count = session.detect_with(options).context("Detection failed")?;
    tracing::info!("{} zones on sheet '{}'", count, session.sheet().name());

    let text = output::render(&session, format)?;

    if let Some(path) = out_path {
        std::fs::write(path, &text)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        eprintln!("Wrote {} zones to '{}'", count, path.display());
    } else {
        print!("{}", text);
    }
    Ok(())
}
