//! Velocity-integrated force solver.
//!
//! Follows d3-force semantics: every tick `alpha` moves toward
//! `alpha_target` by `alpha_decay`, each force adds to node velocities scaled
//! by the current alpha, and velocities are damped by `velocity_decay` before
//! being integrated. A pinned node is held at its pin and its velocity
//! zeroed, so nothing the solver does can move it.

use log::{debug, trace};
use std::collections::BTreeSet;

use crate::arena::GraphArena;
use crate::config::{EngineConfig, ForceProfile, SimulationConfig};
use crate::model::FamilyId;

/// Which force configuration is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Free-floating graph: weak centring only.
    #[default]
    Free,
    /// Generation bands on Y, families spread on X.
    Tree,
    /// Strong generation bands on Y, weak pull to the horizontal centre.
    Genealogy,
}

impl LayoutMode {
    /// Whether this mode needs a generation map.
    pub fn uses_generations(self) -> bool {
        !matches!(self, LayoutMode::Free)
    }
}

/// How much energy a restart injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reheat {
    /// Structural or mode change: alpha back to 1.
    Full,
    /// Filter or highlight change: alpha raised to the gentle level only.
    Gentle,
}

/// Guard against division by zero for coincident nodes.
const JIGGLE_SCALE: f32 = 1e-6;

/// The force solver for one view.
#[derive(Debug, Clone)]
pub struct Simulation {
    alpha: f32,
    alpha_target: f32,
    config: SimulationConfig,
    mode: LayoutMode,
    profile: ForceProfile,
    center: (f32, f32),
    running: bool,
    seed: u32,
}

impl Simulation {
    /// A stopped simulation in `mode` using the matching profile from `config`.
    pub fn new(config: &EngineConfig, mode: LayoutMode) -> Self {
        Self {
            alpha: 0.0,
            alpha_target: 0.0,
            config: config.simulation.clone(),
            mode,
            profile: profile_for(config, mode).clone(),
            center: (0.0, 0.0),
            running: false,
            seed: 1,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn profile(&self) -> &ForceProfile {
        &self.profile
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    /// Point the centring and axis forces pull toward (usually the viewport centre).
    pub fn set_center(&mut self, x: f32, y: f32) {
        self.center = (x, y);
    }

    /// Switch force configuration. Does not restart; callers reheat.
    pub fn set_mode(&mut self, config: &EngineConfig, mode: LayoutMode) {
        if self.mode != mode {
            debug!("layout mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.profile = profile_for(config, mode).clone();
    }

    /// Restart with the given energy.
    pub fn reheat(&mut self, reheat: Reheat) {
        self.alpha = match reheat {
            Reheat::Full => 1.0,
            Reheat::Gentle => self.alpha.max(self.config.gentle_alpha),
        };
        self.running = true;
        trace!("reheat {:?}, alpha {}", reheat, self.alpha);
    }

    /// Keep the solver warm (during a drag) or let it cool (0.0).
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
        if target > 0.0 {
            self.alpha = self.alpha.max(target);
            self.running = true;
        }
    }

    /// Keep the solver warm while a drag is in progress.
    pub fn begin_drag(&mut self) {
        self.set_alpha_target(self.config.drag_alpha_target);
    }

    pub fn end_drag(&mut self) {
        self.set_alpha_target(0.0);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance one frame. Returns whether the solver is still running.
    pub fn tick(&mut self, arena: &mut GraphArena) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        if !arena.is_empty() {
            self.apply_link(arena);
            self.apply_many_body(arena);
            self.apply_axis(arena);
            self.apply_collide(arena);
            self.apply_center(arena);
            self.integrate(arena);
        }

        if self.alpha < self.config.alpha_min {
            trace!("simulation cooled");
            self.running = false;
        }
        self.running
    }

    /// Run ticks until cooled or `max_ticks` is reached. Returns ticks run.
    pub fn run_until_cool(&mut self, arena: &mut GraphArena, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick(arena) {
            ticks += 1;
        }
        ticks
    }

    fn jiggle(&mut self) -> f32 {
        // Numerical Recipes LCG; deterministic across runs
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.seed as f32 / u32::MAX as f32) - 0.5) * JIGGLE_SCALE
    }

    fn apply_link(&mut self, arena: &mut GraphArena) {
        let strength_scale = self.profile.link_strength;
        if strength_scale == 0.0 || arena.edges().is_empty() {
            return;
        }

        let mut degree = vec![0usize; arena.len()];
        for edge in arena.edges() {
            degree[edge.source_index] += 1;
            degree[edge.target_index] += 1;
        }

        let links: Vec<(usize, usize, f32)> = arena
            .edges()
            .iter()
            .filter(|e| e.source_index != e.target_index)
            .map(|e| (e.source_index, e.target_index, e.strength))
            .collect();

        let distance = self.profile.link_distance;
        let alpha = self.alpha;
        for (s, t, weight) in links {
            let (count_s, count_t) = (degree[s] as f32, degree[t] as f32);
            let strength = strength_scale * weight / count_s.min(count_t);
            let bias = count_s / (count_s + count_t);

            let nodes = arena.nodes();
            let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
            let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
            if x == 0.0 {
                x = self.jiggle();
            }
            if y == 0.0 {
                y = self.jiggle();
            }
            let len = (x * x + y * y).sqrt();
            let l = (len - distance) / len * alpha * strength;
            x *= l;
            y *= l;

            let nodes = arena.nodes_mut();
            nodes[t].vx -= x * bias;
            nodes[t].vy -= y * bias;
            nodes[s].vx += x * (1.0 - bias);
            nodes[s].vy += y * (1.0 - bias);
        }
    }

    fn apply_many_body(&mut self, arena: &mut GraphArena) {
        let strength = self.profile.charge_strength;
        if strength == 0.0 {
            return;
        }
        let min_sq = self.profile.charge_distance_min * self.profile.charge_distance_min;
        let max_sq = self.profile.charge_distance_max * self.profile.charge_distance_max;
        let alpha = self.alpha;

        let n = arena.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (xi, yi) = arena.nodes()[i].position();
                let (xj, yj) = arena.nodes()[j].position();
                let mut x = xj - xi;
                let mut y = yj - yi;
                let mut l = x * x + y * y;
                if l >= max_sq {
                    continue;
                }
                if x == 0.0 {
                    x = self.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.jiggle();
                    l += y * y;
                }
                if l < min_sq {
                    l = (min_sq * l).sqrt();
                }
                let w = strength * alpha / l;

                let nodes = arena.nodes_mut();
                nodes[i].vx += x * w;
                nodes[i].vy += y * w;
                nodes[j].vx -= x * w;
                nodes[j].vy -= y * w;
            }
        }
    }

    fn apply_collide(&mut self, arena: &mut GraphArena) {
        let radius = self.profile.collide_radius;
        let strength = self.profile.collide_strength;
        if radius <= 0.0 || strength == 0.0 {
            return;
        }
        let reach = radius * 2.0;
        let reach_sq = reach * reach;

        let n = arena.len();
        for _ in 0..self.profile.collide_iterations {
            for i in 0..n {
                for j in (i + 1)..n {
                    let nodes = arena.nodes();
                    let (a, b) = (&nodes[i], &nodes[j]);
                    let mut x = (a.x + a.vx) - (b.x + b.vx);
                    let mut y = (a.y + a.vy) - (b.y + b.vy);
                    let mut l = x * x + y * y;
                    if l >= reach_sq {
                        continue;
                    }
                    if x == 0.0 {
                        x = self.jiggle();
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = self.jiggle();
                        l += y * y;
                    }
                    let len = l.sqrt();
                    let push = (reach - len) / len * strength;
                    x *= push;
                    y *= push;

                    // Equal radii split the correction evenly
                    let nodes = arena.nodes_mut();
                    nodes[i].vx += x * 0.5;
                    nodes[i].vy += y * 0.5;
                    nodes[j].vx -= x * 0.5;
                    nodes[j].vy -= y * 0.5;
                }
            }
        }
    }

    fn apply_axis(&mut self, arena: &mut GraphArena) {
        let (sx, sy) = (self.profile.x_strength, self.profile.y_strength);
        if sx == 0.0 && sy == 0.0 {
            return;
        }
        let alpha = self.alpha;
        let targets = self.axis_targets(arena);

        for (node, (tx, ty)) in arena.nodes_mut().iter_mut().zip(targets) {
            node.vx += (tx - node.x) * sx * alpha;
            node.vy += (ty - node.y) * sy * alpha;
        }
    }

    /// Per-node (x, y) targets for the axis forces in the current mode.
    pub fn axis_targets(&self, arena: &GraphArena) -> Vec<(f32, f32)> {
        let (cx, cy) = self.center;
        let generations = arena.generations();
        match self.mode {
            LayoutMode::Free => vec![(cx, cy); arena.len()],
            LayoutMode::Genealogy => {
                let band = self.config.generation_band_height;
                arena
                    .nodes()
                    .iter()
                    .map(|n| (cx, cy + generations.level(n.id) as f32 * band))
                    .collect()
            }
            LayoutMode::Tree => {
                let band = self.config.tree_band_height;
                let families: BTreeSet<FamilyId> = arena.nodes().iter().map(|n| n.family_id).collect();
                let spread = (families.len() as f32 - 1.0) / 2.0;
                arena
                    .nodes()
                    .iter()
                    .map(|n| {
                        let slot = families.range(..n.family_id).count() as f32;
                        let x = cx + (slot - spread) * self.config.family_spacing;
                        (x, cy + generations.level(n.id) as f32 * band)
                    })
                    .collect()
            }
        }
    }

    fn apply_center(&mut self, arena: &mut GraphArena) {
        let strength = self.profile.center_strength;
        if strength == 0.0 {
            return;
        }
        let n = arena.len() as f32;
        let (sum_x, sum_y) = arena
            .nodes()
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = (sum_x / n - self.center.0) * strength;
        let shift_y = (sum_y / n - self.center.1) * strength;

        for node in arena.nodes_mut() {
            node.x -= shift_x;
            node.y -= shift_y;
        }
    }

    fn integrate(&self, arena: &mut GraphArena) {
        let keep = 1.0 - self.config.velocity_decay;
        for node in arena.nodes_mut() {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= keep;
                    node.y += node.vy;
                }
            }
        }
    }
}

fn profile_for(config: &EngineConfig, mode: LayoutMode) -> &ForceProfile {
    match mode {
        LayoutMode::Free => &config.free,
        LayoutMode::Tree => &config.tree,
        LayoutMode::Genealogy => &config.genealogy,
    }
}
