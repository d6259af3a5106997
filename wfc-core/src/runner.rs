use crate::entropy::SelectionStrategy;
use crate::events::{EngineEvents, PlacementCallback, RegenerateCallback, TilePlacement};
use crate::grid::CellGrid;
use crate::propagator::{ConstraintPropagator, PropagationScope, SweepPropagator};
use crate::seeding;
use crate::selection::choose_weighted;
use crate::visitable::{self, FrontierShape};
use crate::{ProgressInfo, WfcError};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use wfc_rules::{
    compile_adjacency, compile_adjacency_into, AdjacencyRules, ExpandedCatalog, TileCatalog,
    TileId,
};

/// Alias for the progress callback function type.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) -> Result<(), WfcError> + Send + Sync>;

/// Grid and mode settings for a [`CollapseEngine`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineSettings {
    pub dim_x: usize,
    pub dim_y: usize,
    pub dim_z: usize,
    /// World-space distance between neighboring cells.
    pub cell_size: f32,
    /// Restrict selection and propagation to the visitable overlay.
    pub use_optimization: bool,
    /// Collapse cells in index order instead of by minimum entropy.
    pub in_order_generation: bool,
    pub frontier: FrontierShape,
    /// Repeat sweeps until nothing changes instead of a single sweep per round.
    pub propagate_to_fixed_point: bool,
    /// Base seed; attempt `n` uses `seed + n`. OS entropy when unset.
    pub seed: Option<u64>,
    /// Total attempts before giving up. Unbounded when unset.
    pub max_attempts: Option<u32>,
    /// Cells that never receive a tile.
    pub blocked: Vec<(usize, usize, usize)>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dim_x: 8,
            dim_y: 4,
            dim_z: 8,
            cell_size: 1.0,
            use_optimization: false,
            in_order_generation: false,
            frontier: FrontierShape::default(),
            propagate_to_fixed_point: false,
            seed: None,
            max_attempts: None,
            blocked: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// Creates a new builder for `EngineSettings`.
    pub fn builder() -> EngineSettingsBuilder {
        EngineSettingsBuilder::default()
    }

    pub fn strategy(&self) -> SelectionStrategy {
        SelectionStrategy::from_in_order(self.in_order_generation)
    }

    pub fn total_cells(&self) -> usize {
        self.dim_x * self.dim_y * self.dim_z
    }

    /// Checks the settings against the catalog they will be used with.
    pub fn validate(&self, catalog: &ExpandedCatalog) -> Result<(), WfcError> {
        for (axis, size, min) in [
            ('x', self.dim_x, 2),
            ('y', self.dim_y, 1),
            ('z', self.dim_z, 2),
        ] {
            if size < min {
                return Err(WfcError::DimensionTooSmall { axis, size, min });
            }
        }
        if catalog.border().is_some() && self.dim_y < 2 {
            return Err(WfcError::BorderNeedsLayers(self.dim_y));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(WfcError::GridError(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if let Some(&(x, y, z)) = self
            .blocked
            .iter()
            .find(|&&(x, y, z)| x >= self.dim_x || y >= self.dim_y || z >= self.dim_z)
        {
            return Err(WfcError::GridError(format!(
                "blocked cell ({x}, {y}, {z}) is outside the {}x{}x{} grid",
                self.dim_x, self.dim_y, self.dim_z
            )));
        }
        Ok(())
    }
}

/// Builder for `EngineSettings`.
#[derive(Debug, Default)]
pub struct EngineSettingsBuilder {
    settings: EngineSettings,
}

impl EngineSettingsBuilder {
    pub fn dimensions(mut self, dim_x: usize, dim_y: usize, dim_z: usize) -> Self {
        self.settings.dim_x = dim_x;
        self.settings.dim_y = dim_y;
        self.settings.dim_z = dim_z;
        self
    }

    pub fn cell_size(mut self, cell_size: f32) -> Self {
        self.settings.cell_size = cell_size;
        self
    }

    pub fn use_optimization(mut self, enabled: bool) -> Self {
        self.settings.use_optimization = enabled;
        self
    }

    pub fn in_order_generation(mut self, enabled: bool) -> Self {
        self.settings.in_order_generation = enabled;
        self
    }

    pub fn frontier(mut self, shape: FrontierShape) -> Self {
        self.settings.frontier = shape;
        self
    }

    pub fn propagate_to_fixed_point(mut self, enabled: bool) -> Self {
        self.settings.propagate_to_fixed_point = enabled;
        self
    }

    /// Sets the base seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.settings.max_attempts = Some(max);
        self
    }

    /// Marks a cell that must never receive a tile.
    pub fn block(mut self, x: usize, y: usize, z: usize) -> Self {
        self.settings.blocked.push((x, y, z));
        self
    }

    pub fn build(self) -> EngineSettings {
        self.settings
    }
}

/// Where the engine is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Seeding,
    Selecting,
    Propagating,
    /// The current grid is dead; the next round starts a fresh attempt.
    Contradiction,
    Done,
}

/// Result of one cooperative round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    /// The attempt failed; the grid was discarded and re-seeded.
    Contradiction,
    Done,
}

/// Statistics of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Propagation rounds of the successful attempt.
    pub rounds: u64,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub contradictions: u32,
    pub placed: usize,
    pub elapsed: Duration,
}

/// Owns the grid and adjacency table of one generation and drives them
/// round by round.
pub struct CollapseEngine {
    /// Authored catalog; every rebuild expands from here.
    source: TileCatalog,
    catalog: ExpandedCatalog,
    rules: AdjacencyRules,
    settings: EngineSettings,
    grid: CellGrid,
    propagator: Box<dyn ConstraintPropagator>,
    rng: StdRng,
    phase: Phase,
    rounds: u64,
    attempt: u32,
    contradictions: u32,
    placements: Vec<TilePlacement>,
    events: EngineEvents,
    progress_callback: Option<ProgressCallback>,
    started: Instant,
}

fn attempt_rng(seed: Option<u64>, attempt: u32) -> StdRng {
    match seed {
        Some(base) => StdRng::seed_from_u64(base.wrapping_add(u64::from(attempt))),
        None => StdRng::from_entropy(),
    }
}

impl CollapseEngine {
    /// Validates the catalog and settings and compiles the adjacency table.
    /// No grid work happens until the first [`advance`](Self::advance).
    pub fn new(source: TileCatalog, settings: EngineSettings) -> Result<Self, WfcError> {
        let catalog = source.expand_rotations()?;
        settings.validate(&catalog)?;
        let rules = compile_adjacency(&catalog);
        info!(
            "Collapse engine ready: {}x{}x{} grid, {} tiles ({} authored)",
            settings.dim_x,
            settings.dim_y,
            settings.dim_z,
            catalog.len(),
            source.tiles.len()
        );
        let propagator = Box::new(SweepPropagator::new(settings.propagate_to_fixed_point));
        let mut engine = Self {
            rng: attempt_rng(settings.seed, 0),
            grid: CellGrid::for_tiles(0, 0, 0, 0),
            source,
            catalog,
            rules,
            settings,
            propagator,
            phase: Phase::Uninitialized,
            rounds: 0,
            attempt: 0,
            contradictions: 0,
            placements: Vec::new(),
            events: EngineEvents::default(),
            progress_callback: None,
            started: Instant::now(),
        };
        engine.grid = engine.fresh_grid();
        Ok(engine)
    }

    /// Replaces the propagation strategy.
    pub fn with_propagator(mut self, propagator: Box<dyn ConstraintPropagator>) -> Self {
        self.propagator = propagator;
        self
    }

    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    /// Subscribes to finalized cells, delivered once when generation is done.
    pub fn on_placed(&mut self, callback: PlacementCallback) {
        self.events.subscribe_placed(callback);
    }

    /// Subscribes to regenerations, fired before the grid is discarded.
    pub fn on_regenerate(&mut self, callback: RegenerateCallback) {
        self.events.subscribe_regenerate(callback);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &ExpandedCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &AdjacencyRules {
        &self.rules
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Propagation rounds completed in the current attempt.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Zero-based index of the current attempt.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn contradictions(&self) -> u32 {
        self.contradictions
    }

    /// Finalized cells in index order. Empty until [`Phase::Done`].
    pub fn placements(&self) -> &[TilePlacement] {
        &self.placements
    }

    pub fn progress(&self) -> ProgressInfo {
        ProgressInfo {
            collapsed_cells: self.grid.count_collapsed(),
            total_cells: self.grid.count_unblocked(),
            elapsed_time: self.started.elapsed(),
            rounds: self.rounds,
            attempt: self.attempt,
        }
    }

    fn fresh_grid(&self) -> CellGrid {
        let s = &self.settings;
        let mut grid = CellGrid::for_tiles(s.dim_x, s.dim_y, s.dim_z, self.catalog.len());
        for &(x, y, z) in &s.blocked {
            if let Some(cell) = grid.get_mut(x, y, z) {
                cell.blocked = true;
            }
        }
        grid
    }

    /// Runs one round: seeding on the first call of an attempt, then one
    /// select, collapse and propagate step per call.
    ///
    /// Contradictions are not returned as errors: the grid is rebuilt and
    /// re-seeded and [`RoundOutcome::Contradiction`] is reported instead.
    pub fn advance(&mut self) -> Result<RoundOutcome, WfcError> {
        let result = match self.phase {
            Phase::Done => return Ok(RoundOutcome::Done),
            Phase::Contradiction => return self.restart_after_contradiction(),
            Phase::Uninitialized | Phase::Seeding => self.seed_round(),
            Phase::Selecting | Phase::Propagating => self.collapse_round(),
        };
        match result {
            Err(err) if err.is_contradiction() => {
                self.record_contradiction(&err);
                self.restart_after_contradiction()
            }
            other => other,
        }
    }

    /// Discards the current attempt at a round boundary and starts over with
    /// a fresh seed on the next [`advance`](Self::advance).
    pub fn regenerate(&mut self) -> Result<(), WfcError> {
        info!("Regeneration requested at attempt {}", self.attempt);
        self.teardown()?;
        self.attempt += 1;
        self.phase = Phase::Uninitialized;
        Ok(())
    }

    /// Drives [`advance`](Self::advance) until done, checking `shutdown`
    /// between rounds.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<RunSummary, WfcError> {
        self.started = Instant::now();
        loop {
            if shutdown.load(Ordering::Relaxed) {
                warn!("Shutdown signal received, stopping generation.");
                return Err(WfcError::Interrupted);
            }
            let outcome = self.advance()?;
            if let Some(callback) = &self.progress_callback {
                callback(self.progress())?;
            }
            if outcome == RoundOutcome::Done {
                return Ok(self.summary());
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rounds: self.rounds,
            attempts: self.attempt + 1,
            contradictions: self.contradictions,
            placed: self.placements.len(),
            elapsed: self.started.elapsed(),
        }
    }

    fn seed_round(&mut self) -> Result<RoundOutcome, WfcError> {
        self.phase = Phase::Seeding;
        self.rounds = 0;
        self.placements.clear();
        self.rng = attempt_rng(self.settings.seed, self.attempt);
        self.grid = self.fresh_grid();

        let seeded = seeding::seed_boundaries(&mut self.grid, &self.catalog);
        let anchors = seeding::place_anchors(&mut self.grid, &self.catalog, &mut self.rng);
        info!(
            "Attempt {}: seeded {} boundary cells and {} anchors",
            self.attempt,
            seeded,
            anchors.len()
        );

        self.phase = Phase::Propagating;
        self.propagate(PropagationScope::All)?;
        Ok(RoundOutcome::Continue)
    }

    fn collapse_round(&mut self) -> Result<RoundOutcome, WfcError> {
        self.phase = Phase::Selecting;
        let strategy = self.settings.strategy();
        let Some(index) =
            strategy.select(&self.grid, self.settings.use_optimization, &mut self.rng)
        else {
            return Ok(self.finish());
        };
        let coords = self.grid.coords(index);
        let (x, y, z) = coords;
        let cell = self
            .grid
            .at(index)
            .ok_or_else(|| WfcError::InternalError(format!("selected cell {index} is out of range")))?;
        let weighted: Vec<(TileId, u32)> = cell
            .options
            .iter_ones()
            .filter_map(|i| self.catalog.get(TileId(i)))
            .map(|tile| (tile.id, tile.probability))
            .collect();
        let tile = choose_weighted(&weighted, &mut self.rng)
            .map_err(|_| WfcError::NoValidOption(x, y, z))?;

        if let Some(cell) = self.grid.at_mut(index) {
            cell.collapse_to(tile);
        }
        debug!(
            "Round {}: collapsed ({}, {}, {}) to '{}' out of {} options",
            self.rounds,
            x,
            y,
            z,
            self.catalog.get(tile).map_or("?", |t| t.name.as_str()),
            weighted.len()
        );

        let scope = if self.settings.use_optimization {
            visitable::mark_frontier(&mut self.grid, coords, self.settings.frontier);
            PropagationScope::VisitableOnly
        } else {
            PropagationScope::All
        };
        self.phase = Phase::Propagating;
        self.propagate(scope)?;
        Ok(RoundOutcome::Continue)
    }

    fn propagate(&mut self, scope: PropagationScope) -> Result<(), WfcError> {
        let stats = self.propagator.propagate(&mut self.grid, &self.rules, scope)?;
        self.rounds += 1;
        debug!(
            "Propagation round {}: {} sweeps, {} cells visited, {} changed",
            self.rounds, stats.sweeps, stats.cells_visited, stats.cells_changed
        );
        self.phase = Phase::Selecting;
        Ok(())
    }

    fn finish(&mut self) -> RoundOutcome {
        self.phase = Phase::Done;
        let cell_size = self.settings.cell_size;
        let mut placements = Vec::with_capacity(self.grid.len());
        for (index, cell) in self.grid.iter().enumerate() {
            if cell.blocked {
                continue;
            }
            let Some(tile) = cell.tile().and_then(|id| self.catalog.get(id)) else {
                continue;
            };
            let tile_type = self.catalog.type_name(tile.type_id).unwrap_or(&tile.name);
            placements.push(TilePlacement::new(
                self.grid.coords(index),
                tile,
                tile_type,
                cell_size,
            ));
        }
        self.placements = placements;
        for placement in &self.placements {
            self.events.emit_placed(placement);
        }
        info!(
            "Generation done: {} tiles placed after {} rounds, {} contradictions",
            self.placements.len(),
            self.rounds,
            self.contradictions
        );
        RoundOutcome::Done
    }

    fn record_contradiction(&mut self, err: &WfcError) {
        warn!("Attempt {} failed: {}; regenerating", self.attempt, err);
        self.contradictions += 1;
        self.phase = Phase::Contradiction;
    }

    fn restart_after_contradiction(&mut self) -> Result<RoundOutcome, WfcError> {
        self.teardown()?;
        self.attempt += 1;
        if let Some(max) = self.settings.max_attempts {
            if self.attempt >= max {
                self.phase = Phase::Contradiction;
                return Err(WfcError::RetriesExhausted(self.attempt));
            }
        }
        match self.seed_round() {
            Ok(_) => {}
            Err(err) if err.is_contradiction() => self.record_contradiction(&err),
            Err(err) => return Err(err),
        }
        Ok(RoundOutcome::Contradiction)
    }

    /// Notifies subscribers, then drops the grid and rebuilds the working
    /// catalog and adjacency table from the authored catalog.
    fn teardown(&mut self) -> Result<(), WfcError> {
        self.events.emit_regenerate();
        self.placements.clear();
        self.rounds = 0;
        self.catalog = self.source.expand_rotations()?;
        compile_adjacency_into(&self.catalog, &mut self.rules);
        self.grid = self.fresh_grid();
        Ok(())
    }
}

impl std::fmt::Debug for CollapseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollapseEngine")
            .field("settings", &self.settings)
            .field("phase", &self.phase)
            .field("rounds", &self.rounds)
            .field("attempt", &self.attempt)
            .field("contradictions", &self.contradictions)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use wfc_rules::{BorderKind, Socket, Sockets, TilePrototype};

    fn ground() -> TilePrototype {
        let mut sockets = Sockets::uniform(Socket::symmetric(BorderKind::Grass));
        sockets.above = Socket::invariant(BorderKind::Empty);
        sockets.below = Socket::invariant(BorderKind::Solid);
        TilePrototype::new("floor", sockets)
    }

    fn air(name: &str) -> TilePrototype {
        let mut sockets = Sockets::uniform(Socket::symmetric(BorderKind::Empty));
        sockets.above = Socket::invariant(BorderKind::Empty);
        sockets.below = Socket::invariant(BorderKind::Empty);
        TilePrototype::new(name, sockets)
    }

    fn open_catalog() -> TileCatalog {
        TileCatalog::new(vec![ground(), air("empty"), air("bush").with_probability(2)], "floor", "empty")
    }

    /// Nothing can sit on top of the floor.
    fn hopeless_catalog() -> TileCatalog {
        let mut floor = ground();
        floor.sockets.above = Socket::invariant(BorderKind::Solid);
        floor.sockets.below = Socket::invariant(BorderKind::Grass);
        TileCatalog::new(vec![floor, air("empty")], "floor", "empty")
    }

    fn settings() -> EngineSettings {
        EngineSettings::builder().dimensions(3, 3, 3).seed(5).build()
    }

    #[test]
    fn test_contradiction_discards_and_reseeds() {
        let mut engine = CollapseEngine::new(open_catalog(), settings()).unwrap();
        let regenerations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&regenerations);
        engine.on_regenerate(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(engine.advance().unwrap(), RoundOutcome::Continue);
        // make one more collapse before breaking a cell
        assert_eq!(engine.advance().unwrap(), RoundOutcome::Continue);
        let broken = (0..engine.grid.len())
            .find(|&i| engine.grid.at(i).unwrap().is_open())
            .unwrap();
        let cell = engine.grid.at_mut(broken).unwrap();
        cell.options.fill(false);
        cell.entropy = 0;

        assert_eq!(engine.advance().unwrap(), RoundOutcome::Contradiction);
        assert_eq!(engine.contradictions(), 1);
        assert_eq!(engine.attempt(), 1);
        assert_eq!(regenerations.load(Ordering::SeqCst), 1);
        assert_eq!(engine.phase(), Phase::Selecting);
        for index in 0..engine.grid.len() {
            let (_, y, _) = engine.grid.coords(index);
            let cell = engine.grid.at(index).unwrap();
            assert_eq!(cell.collapsed, y != 1, "cell {index}");
        }

        let shutdown = AtomicBool::new(false);
        let summary = engine.run(&shutdown).unwrap();
        assert_eq!(summary.attempts, 2);
        assert_eq!(summary.placed, 27);
    }

    #[test]
    fn test_retries_exhausted() {
        let settings = EngineSettings::builder()
            .dimensions(2, 3, 2)
            .seed(1)
            .max_attempts(3)
            .build();
        let mut engine = CollapseEngine::new(hopeless_catalog(), settings).unwrap();
        let shutdown = AtomicBool::new(false);
        assert_eq!(engine.run(&shutdown), Err(WfcError::RetriesExhausted(3)));
        assert_eq!(engine.contradictions(), 3);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn test_shutdown_interrupts() {
        let mut engine = CollapseEngine::new(open_catalog(), settings()).unwrap();
        let shutdown = AtomicBool::new(true);
        assert_eq!(engine.run(&shutdown), Err(WfcError::Interrupted));
        assert_eq!(engine.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_regenerate_resets_attempt() {
        let mut engine = CollapseEngine::new(open_catalog(), settings()).unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        engine.on_regenerate(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        engine.advance().unwrap();
        let rules_before = engine.rules().clone();
        engine.regenerate().unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(engine.phase(), Phase::Uninitialized);
        assert_eq!(engine.grid().count_collapsed(), 0);
        assert_eq!(engine.rules(), &rules_before);
        assert_eq!(engine.attempt(), 1);
        assert_eq!(engine.contradictions(), 0);
    }

    #[test]
    fn test_progress_callback_error_stops_run() {
        let mut engine = CollapseEngine::new(open_catalog(), settings()).unwrap();
        engine.set_progress_callback(Box::new(|info| {
            if info.rounds >= 2 {
                Err(WfcError::InternalError("stop".into()))
            } else {
                Ok(())
            }
        }));
        let shutdown = AtomicBool::new(false);
        assert_eq!(
            engine.run(&shutdown),
            Err(WfcError::InternalError("stop".into()))
        );
        assert_eq!(engine.rounds(), 2);
    }
}
