use crate::config::OutputFormat;
use crate::error::AppError;
use colored::{Color, Colorize};
use gridmap_solver::{ContradictionReport, SolveOutcome, TileCatalog, TileGrid};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// JSON document written by `--format json`.
#[derive(Debug, Serialize)]
pub struct GridDocument<'a> {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub attempts: usize,
    pub joker_substitutions: usize,
    pub rows: Vec<Vec<&'a str>>,
}

impl<'a> GridDocument<'a> {
    pub fn new(grid: &'a TileGrid, outcome: &SolveOutcome) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            seed: outcome.seed,
            attempts: outcome.attempts,
            joker_substitutions: outcome.joker_substitutions,
            rows: grid.rows(),
        }
    }
}

/// Space-separated type ids, one line per row.
pub fn render_text(grid: &TileGrid) -> String {
    let mut text = String::new();
    for row in grid.rows() {
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}

/// Writes the grid in `format` to `writer`.
pub fn write_grid<W: Write>(
    grid: &TileGrid,
    outcome: &SolveOutcome,
    format: OutputFormat,
    mut writer: W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Text => writer.write_all(render_text(grid).as_bytes())?,
        OutputFormat::Csv => {
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut writer);
            for row in grid.rows() {
                csv_writer.write_record(&row)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &GridDocument::new(grid, outcome))?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Saves the grid to `output_path`, or prints it to stdout when there is none.
pub fn save_grid(
    grid: &TileGrid,
    outcome: &SolveOutcome,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<(), AppError> {
    match output_path {
        Some(path) => {
            log::info!("Saving {format:?} grid to {path:?}...");
            let file = File::create(path)?;
            write_grid(grid, outcome, format, BufWriter::new(file))?;
            log::info!("Successfully saved grid to {path:?}");
        }
        None => write_grid(grid, outcome, format, io::stdout().lock())?,
    }
    Ok(())
}

/// Writes a contradiction report as pretty JSON.
pub fn write_report(report: &ContradictionReport, path: &Path) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    log::info!("Contradiction report written to {path:?}");
    Ok(())
}

const PALETTE: [Color; 6] = [
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Red,
];

/// Colored one-character-per-cell preview. Each type id gets a palette
/// color by catalog position; blocked cells are shown in bold.
pub fn render_preview(grid: &TileGrid, catalog: &TileCatalog) -> String {
    let mut out = String::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let Some(cell) = grid.get(x, y) else {
                continue;
            };
            let glyph = cell.type_id.chars().next().unwrap_or('?').to_string();
            let mut styled = match catalog.index_of(&cell.type_id) {
                Some(index) => glyph.color(PALETTE[index % PALETTE.len()]),
                None => glyph.normal(),
            };
            if cell.usage_blocked {
                styled = styled.bold();
            }
            out.push_str(&styled.to_string());
        }
        out.push('\n');
    }
    out
}

/// Legend mapping preview glyphs to type ids.
pub fn render_legend(catalog: &TileCatalog) -> String {
    catalog
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let glyph = rule.type_id.chars().next().unwrap_or('?').to_string();
            format!("{} {}", glyph.color(PALETTE[index % PALETTE.len()]), rule.type_id)
        })
        .collect::<Vec<_>>()
        .join("  ")
}
