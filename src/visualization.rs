use crate::output::{GenerationReport, EMPTY_CELL};
use colored::{Color, Colorize};
use std::collections::HashMap;

/// Trait for types that can present a finished layout to the user.
pub trait Visualizer {
    /// Displays the layout held by `report`.
    fn display_state(&mut self, report: &GenerationReport<'_>) -> Result<(), anyhow::Error>;
}

const PALETTE: [Color; 8] = [
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Red,
    Color::BrightGreen,
    Color::BrightBlue,
];

/// Prints one Y layer as a grid of colored glyphs, one color per tile type.
pub struct TerminalVisualizer {
    layer: usize,
}

impl TerminalVisualizer {
    pub fn new(layer: usize) -> Self {
        Self { layer }
    }

    pub fn set_layer(&mut self, layer: usize) {
        self.layer = layer;
    }

    /// Renders the current layer, or a bounds message when it does not exist.
    pub fn render(&self, report: &GenerationReport<'_>) -> String {
        let [_, dim_y, _] = report.dimensions;
        if self.layer >= dim_y {
            return format!("Layer {} is out of bounds (grid has {} layers)\n", self.layer, dim_y);
        }

        let types: HashMap<&str, &str> = report
            .placements
            .iter()
            .map(|p| (p.name.as_str(), p.tile_type.as_str()))
            .collect();
        let mut colors: HashMap<&str, Color> = HashMap::new();
        let mut legend: Vec<String> = Vec::new();

        let mut out = format!("--- Layer {} ---\n", self.layer);
        for row in report.layer_names(self.layer) {
            for name in row {
                if name == EMPTY_CELL {
                    out.push_str(" .");
                    continue;
                }
                let tile_type = types.get(name).copied().unwrap_or(name);
                let next = colors.len();
                let color = *colors.entry(tile_type).or_insert_with(|| {
                    legend.push(tile_type.to_owned());
                    PALETTE[next % PALETTE.len()]
                });
                let glyph = tile_type.chars().next().unwrap_or('?').to_ascii_uppercase();
                out.push(' ');
                out.push_str(&glyph.to_string().color(color).to_string());
            }
            out.push('\n');
        }
        for tile_type in legend {
            let color = colors.get(tile_type.as_str()).copied().unwrap_or(Color::White);
            out.push_str(&format!("  {} {}\n", "#".color(color), tile_type));
        }
        out
    }
}

impl Visualizer for TerminalVisualizer {
    fn display_state(&mut self, report: &GenerationReport<'_>) -> Result<(), anyhow::Error> {
        print!("{}", self.render(report));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wfc_core::{RunSummary, TilePlacement};
    use wfc_rules::{BorderKind, ExpandedCatalog, RotationRequest, Socket, Sockets, TileCatalog, TilePrototype};

    fn catalog() -> ExpandedCatalog {
        let plain = Sockets::uniform(Socket::symmetric(BorderKind::Grass));
        let path = TilePrototype::new("path", plain)
            .with_mesh("meshes/path.glb")
            .with_rotations(RotationRequest {
                right: true,
                half: false,
                left: false,
            });
        TileCatalog::new(vec![TilePrototype::new("grass", plain), path], "grass", "grass")
            .expand_rotations()
            .unwrap()
    }

    fn placement(catalog: &ExpandedCatalog, coords: (usize, usize, usize), name: &str) -> TilePlacement {
        let tile = catalog.by_name(name).unwrap();
        let tile_type = catalog.type_name(tile.type_id).unwrap();
        TilePlacement::new(coords, tile, tile_type, 1.0)
    }

    fn summary() -> RunSummary {
        RunSummary {
            rounds: 1,
            attempts: 1,
            contradictions: 0,
            placed: 3,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_render_layer_plain() {
        colored::control::set_override(false);
        let catalog = catalog();
        let placements = vec![
            placement(&catalog, (0, 1, 0), "grass"),
            placement(&catalog, (1, 1, 0), "path_RotateRight"),
            placement(&catalog, (0, 1, 1), "grass"),
        ];
        let summary = summary();
        let report = GenerationReport::new([2, 2, 2], 1.0, &summary, &placements);
        let text = TerminalVisualizer::new(1).render(&report);
        assert_eq!(
            text,
            "--- Layer 1 ---\n G P\n G .\n  # grass\n  # path\n"
        );
    }

    #[test]
    fn test_out_of_bounds_layer() {
        let placements: Vec<TilePlacement> = Vec::new();
        let summary = summary();
        let report = GenerationReport::new([2, 2, 2], 1.0, &summary, &placements);
        let mut visualizer = TerminalVisualizer::new(0);
        visualizer.set_layer(5);
        assert!(visualizer.render(&report).contains("out of bounds"));
        assert!(visualizer.display_state(&report).is_ok());
    }
}
