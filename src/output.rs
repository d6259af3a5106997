use crate::config::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use wfc_core::{RunSummary, TilePlacement};

/// Marker written for cells that received no tile.
pub const EMPTY_CELL: &str = "-";

/// Everything written to disk for one generation.
#[derive(Debug, Serialize)]
pub struct GenerationReport<'a> {
    pub dimensions: [usize; 3],
    pub cell_size: f32,
    pub rounds: u64,
    pub attempts: u32,
    pub contradictions: u32,
    pub elapsed_ms: f64,
    pub placements: &'a [TilePlacement],
}

impl<'a> GenerationReport<'a> {
    pub fn new(
        dimensions: [usize; 3],
        cell_size: f32,
        summary: &RunSummary,
        placements: &'a [TilePlacement],
    ) -> Self {
        Self {
            dimensions,
            cell_size,
            rounds: summary.rounds,
            attempts: summary.attempts,
            contradictions: summary.contradictions,
            elapsed_ms: summary.elapsed.as_secs_f64() * 1000.0,
            placements,
        }
    }

    /// Tile names of layer `y`, indexed `[z][x]`.
    pub fn layer_names(&self, y: usize) -> Vec<Vec<&'a str>> {
        let [dim_x, _, dim_z] = self.dimensions;
        let mut rows: Vec<Vec<&'a str>> = vec![vec![EMPTY_CELL; dim_x]; dim_z];
        for placement in self.placements {
            let (x, py, z) = placement.coords;
            if py == y && x < dim_x && z < dim_z {
                rows[z][x] = placement.name.as_str();
            }
        }
        rows
    }
}

/// Saves the layout to `output_path` in the requested format.
pub fn save_report(report: &GenerationReport<'_>, format: OutputFormat, output_path: &Path) -> Result<()> {
    log::info!("Saving {:?} output to {:?}...", format, output_path);
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Text => write_text(report, &mut writer)?,
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, report)
            .context("Failed to serialize layout as JSON")?,
        OutputFormat::Csv => write_csv(report, &mut writer)?,
    }
    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved layout to {:?}", output_path);
    Ok(())
}

/// Tile names per cell: one block per Y layer, one line per Z row.
pub fn write_text<W: Write>(report: &GenerationReport<'_>, writer: &mut W) -> io::Result<()> {
    let [dim_x, dim_y, dim_z] = report.dimensions;
    writeln!(writer, "# {}x{}x{}", dim_x, dim_y, dim_z)?;
    for y in 0..dim_y {
        writeln!(writer)?;
        writeln!(writer, "layer {}", y)?;
        for row in report.layer_names(y) {
            writeln!(writer, "{}", row.join(" "))?;
        }
    }
    Ok(())
}

pub fn write_csv<W: Write>(report: &GenerationReport<'_>, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "x", "y", "z", "tile", "type", "rotation", "pos_x", "pos_y", "pos_z", "scale_x", "scale_y",
        "scale_z",
    ])?;
    for p in report.placements {
        let (x, y, z) = p.coords;
        let position = p.world.position;
        let scale = p.world.scale;
        wtr.write_record([
            x.to_string(),
            y.to_string(),
            z.to_string(),
            p.name.clone(),
            p.tile_type.clone(),
            p.rotation.to_string(),
            position.x.to_string(),
            position.y.to_string(),
            position.z.to_string(),
            scale.x.to_string(),
            scale.y.to_string(),
            scale.z.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wfc_core::{CollapseEngine, EngineSettings};
    use wfc_rules::{BorderKind, Socket, Sockets, TileCatalog, TilePrototype};

    fn generate() -> (Vec<TilePlacement>, RunSummary) {
        let plain = Sockets::uniform(Socket::symmetric(BorderKind::Empty));
        let catalog = TileCatalog::new(
            vec![
                TilePrototype::new("floor", plain),
                TilePrototype::new("air", plain),
            ],
            "floor",
            "air",
        );
        let settings = EngineSettings::builder().dimensions(2, 2, 3).seed(1).block(1, 1, 2).build();
        let mut engine = CollapseEngine::new(catalog, settings).unwrap();
        let summary = engine.run(&std::sync::atomic::AtomicBool::new(false)).unwrap();
        (engine.placements().to_vec(), summary)
    }

    #[test]
    fn test_text_layers() {
        let (placements, summary) = generate();
        let report = GenerationReport::new([2, 2, 3], 1.0, &summary, &placements);
        let mut out = Vec::new();
        write_text(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "# 2x2x3\n\nlayer 0\nfloor floor\nfloor floor\nfloor floor\n\nlayer 1\nair air\nair air\nair -\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_csv_rows() {
        let (placements, summary) = generate();
        let report = GenerationReport::new([2, 2, 3], 2.0, &summary, &placements);
        let mut out = Vec::new();
        write_csv(&report, &mut out).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_slice());
        assert_eq!(reader.headers().unwrap().get(3), Some("tile"));
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 11);
        assert_eq!(&rows[0][3], "floor");
    }

    #[test]
    fn test_json_contains_summary() {
        let placements: Vec<TilePlacement> = Vec::new();
        let summary = RunSummary {
            rounds: 4,
            attempts: 2,
            contradictions: 1,
            placed: 0,
            elapsed: Duration::from_millis(5),
        };
        let report = GenerationReport::new([2, 1, 2], 1.0, &summary, &placements);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["attempts"], 2);
        assert_eq!(value["dimensions"][0], 2);
        assert!(value["placements"].as_array().unwrap().is_empty());
    }
}
