//! Generational search over control-point perturbations
//!
//! The search is single-threaded and cooperative. `Optimizer::step` runs one
//! generation; `run` loops to completion on the calling thread, and
//! `optimize` awaits a host-supplied yield between generations so an event
//! loop stays responsive. Cancellation is a shared flag checked once per
//! generation.

mod candidate;
mod mutation;
mod seed;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::collision::get_collisions;
use crate::error::PlanResult;
use crate::path::{Line, Point, SequenceItem, Shape};
use crate::profile::compute_timeline;
use crate::settings::{OptimizerSettings, Settings};
use candidate::{Candidate, Problem, evaluate};
use mutation::{crossover, mutate, tournament};
use seed::seed_population;

/// Probability a child is bred from two parents rather than cloned from one
const CROSSOVER_RATE: f64 = 0.5;

/// Cloneable cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to finish after the current generation
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Whether both handles share one flag
    pub fn ptr_eq(&self, other: &StopHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Slot for the most recently started search, for hosts with one global `stop()`
#[derive(Debug, Default)]
pub struct ActiveStop(Option<StopHandle>);

impl ActiveStop {
    pub fn claim(&mut self, handle: StopHandle) {
        self.0 = Some(handle);
    }

    /// Forget `handle` unless a newer search has claimed the slot since
    pub fn release(&mut self, handle: &StopHandle) {
        if self.0.as_ref().is_some_and(|held| held.ptr_eq(handle)) {
            self.0 = None;
        }
    }

    /// Stop the search currently holding the slot, if any
    pub fn stop(&self) {
        if let Some(handle) = &self.0 {
            handle.stop();
        }
    }
}

/// Progress after one generation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// 1-based generation number
    pub generation: usize,
    /// Best fitness so far (time plus penalties)
    pub best_time: f64,
    /// Travel time of the best candidate, without penalties
    pub total_time: f64,
    pub collision_count: usize,
    pub lines: Vec<Line>,
}

/// Final outcome of a search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub lines: Vec<Line>,
    /// Fitness of `lines`; at or above the collision penalty while still colliding
    pub best_time: f64,
    pub total_time: f64,
    pub collision_count: usize,
    pub generations: usize,
    pub stopped: bool,
}

/// Search state for one run; owns its population exclusively
#[derive(Debug)]
pub struct Optimizer {
    problem: Problem,
    rng: Pcg32,
    population: Vec<Candidate>,
    best: Candidate,
    generation: usize,
    stop: StopHandle,
}

impl Optimizer {
    /// Validate inputs, score the original lines and seed the first generation
    ///
    /// Fails when the original lines cannot be profiled at all (bad settings,
    /// unknown line ids, invalid shapes). Colliding originals are fine.
    pub fn new(
        start: Point,
        lines: Vec<Line>,
        sequence: Vec<SequenceItem>,
        shapes: Vec<Shape>,
        settings: Settings,
        config: OptimizerSettings,
    ) -> PlanResult<Self> {
        config.validate()?;
        let prediction = compute_timeline(&start, &lines, &settings, &sequence)?;
        get_collisions(&prediction, &lines, &shapes, &settings)?;

        let mut rng = Pcg32::seed_from_u64(config.seed);
        let problem = Problem {
            start,
            lines,
            sequence,
            shapes,
            settings,
            config,
        };
        let original = evaluate(&problem, problem.lines.clone());
        let population = seed_population(&problem, &original, &mut rng);
        let best = population
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .cloned()
            .unwrap_or(original);

        Ok(Self {
            problem,
            rng,
            population,
            best,
            generation: 0,
            stop: StopHandle::new(),
        })
    }

    /// Share an externally owned cancellation flag
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn best_time(&self) -> f64 {
        self.best.fitness
    }

    pub fn is_finished(&self) -> bool {
        self.generation >= self.problem.config.optimization_iterations
    }

    fn report(&self) -> GenerationReport {
        GenerationReport {
            generation: self.generation,
            best_time: self.best.fitness,
            total_time: self.best.total_time,
            collision_count: self.best.collision_count,
            lines: self.best.lines.clone(),
        }
    }

    /// Run one generation; `None` once the iteration budget is spent
    pub fn step(&mut self) -> Option<GenerationReport> {
        if self.is_finished() {
            return None;
        }

        let config = &self.problem.config;
        let mut next = Vec::with_capacity(config.population_size);
        next.push(self.best.clone());
        while next.len() < config.population_size {
            let parent = tournament(&self.population, &mut self.rng);
            let mut child = if self.rng.random_bool(CROSSOVER_RATE) {
                let other = tournament(&self.population, &mut self.rng);
                crossover(&parent.lines, &other.lines, &mut self.rng)
            } else {
                parent.lines.clone()
            };
            mutate(
                &mut child,
                config.optimization_mutation_rate,
                config.optimization_mutation_strength,
                self.problem.settings.field_size,
                &mut self.rng,
            );
            next.push(evaluate(&self.problem, child));
        }

        if let Some(champion) = next
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .filter(|c| c.fitness < self.best.fitness)
        {
            self.best = champion.clone();
        }
        self.population = next;
        self.generation += 1;

        log::debug!(
            "Generation {}/{}: best {:.3} ({} collisions)",
            self.generation,
            self.problem.config.optimization_iterations,
            self.best.fitness,
            self.best.collision_count
        );
        Some(self.report())
    }

    /// Loop to completion or cancellation on the calling thread
    pub fn run(mut self, mut on_update: impl FnMut(&GenerationReport)) -> OptimizationResult {
        loop {
            if self.is_finished() {
                return self.finish(false);
            }
            if self.stop.is_stopped() {
                return self.finish(true);
            }
            match self.step() {
                Some(report) => on_update(&report),
                None => return self.finish(false),
            }
        }
    }

    /// Consume the search, returning the best candidate seen
    pub fn finish(self, stopped: bool) -> OptimizationResult {
        if stopped {
            log::info!("Optimization stopped after {} generations", self.generation);
        }
        log::info!(
            "Optimization done: best {:.3} s ({:.3} s travel, {} collisions)",
            self.best.fitness,
            self.best.total_time,
            self.best.collision_count
        );
        OptimizationResult {
            lines: self.best.lines,
            best_time: self.best.fitness,
            total_time: self.best.total_time,
            collision_count: self.best.collision_count,
            generations: self.generation,
            stopped,
        }
    }
}

/// Drive `optimizer` to completion, awaiting `yield_now()` after every
/// generation
///
/// `on_update` runs once per generation with the best candidate so far. A
/// stop observed between generations returns the best-so-far result with
/// `stopped == true`.
pub async fn optimize<U, Y, Fut>(
    mut optimizer: Optimizer,
    mut on_update: U,
    mut yield_now: Y,
) -> OptimizationResult
where
    U: FnMut(&GenerationReport),
    Y: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        // A stop raised during the final generation cut nothing short
        if optimizer.is_finished() {
            return optimizer.finish(false);
        }
        if optimizer.stop.is_stopped() {
            return optimizer.finish(true);
        }
        match optimizer.step() {
            Some(report) => on_update(&report),
            None => return optimizer.finish(false),
        }
        yield_now().await;
    }
}
