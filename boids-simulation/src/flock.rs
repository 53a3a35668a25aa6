//! The flock: agent arena, spatial index and the tick driver.

use boids_config::{ConfigError, SimulationConfig};
use boids_core::{AgentId, QuadTree, Rect};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::agent::{Agent, UpdateRules};
use crate::snapshot::{AgentSnapshot, FrameSnapshot};

/// How often (in ticks) index statistics are logged at debug level.
const STATS_INTERVAL: u64 = 100;

/// Owns the agents and the quadtree and advances them one tick at a time.
#[derive(Debug)]
pub struct Flock {
    agents: Vec<Agent>,
    index: QuadTree,
    rules: UpdateRules,
    jitter_degrees: i32,
    parallel: bool,
    rng: StdRng,
    seed: u64,
    tick: u64,

    // Per-tick scratch, kept to avoid reallocating every frame
    previous: Vec<Agent>,
    jitters: Vec<f64>,
    candidates: Vec<AgentId>,
}

impl Flock {
    /// Builds a flock laid out on the configured grid.
    ///
    /// Uses the configured seed, or a random one when none is set.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let seed = config.flock.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Builds a flock laid out on the configured grid, ignoring the configured seed.
    pub fn with_seed(config: &SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let (_, rows) = config.grid_dimensions();
        let flock = &config.flock;
        let agents = (0..flock.agent_count)
            .map(|i| {
                let column = (i / rows) as f64;
                let row = (i % rows) as f64;
                Agent::new(
                    column * flock.grid_spacing,
                    row * flock.grid_spacing,
                    0.0,
                    flock.initial_speed,
                    flock.agent_radius,
                )
            })
            .collect();

        Ok(Self::assemble(config, seed, agents))
    }

    /// Builds a flock from an explicit list of agents; the grid settings are ignored.
    pub fn with_agents(
        config: &SimulationConfig,
        seed: u64,
        agents: Vec<Agent>,
    ) -> Result<Self, ConfigError> {
        config.validate_parameters()?;
        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "A flock needs at least one agent".to_string(),
            ));
        }
        if u32::try_from(agents.len()).is_err() {
            return Err(ConfigError::Validation(format!(
                "A flock holds at most {} agents, got {}",
                u32::MAX,
                agents.len()
            )));
        }
        Ok(Self::assemble(config, seed, agents))
    }

    fn assemble(config: &SimulationConfig, seed: u64, agents: Vec<Agent>) -> Self {
        let bounds = Rect::from_size(config.world.width, config.world.height);
        let index = QuadTree::new(
            bounds,
            config.spatial_index.capacity,
            config.spatial_index.max_depth,
        );
        info!(
            "Flock of {} agents in {}x{} world (seed {}, parallel: {})",
            agents.len(),
            config.world.width,
            config.world.height,
            seed,
            config.flock.parallel
        );

        Self {
            previous: Vec::with_capacity(agents.len()),
            jitters: Vec::with_capacity(agents.len()),
            candidates: Vec::new(),
            agents,
            index,
            rules: UpdateRules::from_config(config),
            jitter_degrees: config.flock.heading_jitter_degrees.min(i32::MAX as u32) as i32,
            parallel: config.flock.parallel,
            rng: StdRng::seed_from_u64(seed),
            seed,
            tick: 0,
        }
    }

    /// Advances the simulation by one step.
    ///
    /// Rebuilds the index from the current positions, then updates every agent
    /// in creation order against the tick-start state of its candidates.
    pub fn tick(&mut self) {
        self.rebuild_index();
        self.previous.clone_from(&self.agents);
        self.draw_jitter();

        if self.parallel {
            self.update_parallel();
        } else {
            self.update_sequential();
        }

        self.tick += 1;
        if self.tick % STATS_INTERVAL == 0 {
            debug!(
                "tick {}: index has {} nodes, depth {}",
                self.tick,
                self.index.node_count(),
                self.index.depth()
            );
        }
    }

    fn rebuild_index(&mut self) {
        self.index.reset();
        for (i, agent) in self.agents.iter().enumerate() {
            self.index.insert(AgentId::from(i), agent.position.x, agent.position.y);
        }
    }

    // Drawn up front and in creation order so the parallel path sees the same noise.
    fn draw_jitter(&mut self) {
        let range = self.jitter_degrees;
        let rng = &mut self.rng;
        self.jitters.clear();
        self.jitters.extend(
            (0..self.agents.len()).map(|_| f64::from(rng.gen_range(-range..=range)).to_radians()),
        );
    }

    fn update_sequential(&mut self) {
        let mut total_candidates = 0;
        for (i, agent) in self.agents.iter_mut().enumerate() {
            self.candidates.clear();
            self.index
                .retrieve(&mut self.candidates, agent.position.x, agent.position.y);
            total_candidates += self.candidates.len();

            let previous = &self.previous;
            let neighbours = self.candidates.iter().map(|&id| (id, &previous[id.index()]));
            agent.update(AgentId::from(i), neighbours, self.jitters[i], &self.rules);
        }
        trace!("tick {}: {} candidates retrieved", self.tick + 1, total_candidates);
    }

    fn update_parallel(&mut self) {
        let index = &self.index;
        let previous = &self.previous;
        let jitters = &self.jitters;
        let rules = &self.rules;

        self.agents
            .par_iter_mut()
            .enumerate()
            .for_each_init(Vec::new, |candidates, (i, agent)| {
                candidates.clear();
                index.retrieve(candidates, agent.position.x, agent.position.y);
                let neighbours = candidates.iter().map(|&id| (id, &previous[id.index()]));
                agent.update(AgentId::from(i), neighbours, jitters[i], rules);
            });
    }

    /// Read-only view of the agents, in creation order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The index as built at the start of the last tick.
    pub fn index(&self) -> &QuadTree {
        &self.index
    }

    pub fn rules(&self) -> &UpdateRules {
        &self.rules
    }

    pub fn bounds(&self) -> Rect {
        self.index.bounds()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Candidate set the next tick will hand to `id`.
    ///
    /// Builds a throwaway index over the current positions, exactly as
    /// [`Flock::tick`] does, and queries it at the agent's position.
    pub fn candidates_of(&self, id: AgentId) -> Vec<AgentId> {
        let mut index = QuadTree::new(
            self.index.bounds(),
            self.index.capacity(),
            self.index.max_depth(),
        );
        for (i, agent) in self.agents.iter().enumerate() {
            index.insert(AgentId::from(i), agent.position.x, agent.position.y);
        }

        let agent = &self.agents[id.index()];
        let mut out = Vec::new();
        index.retrieve(&mut out, agent.position.x, agent.position.y);
        out
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick,
            agents: self
                .agents
                .iter()
                .enumerate()
                .map(|(i, agent)| AgentSnapshot {
                    id: i as u32,
                    x: agent.position.x,
                    y: agent.position.y,
                    heading: agent.heading,
                    radius: agent.radius,
                })
                .collect(),
        }
    }
}
