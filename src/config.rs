//! Engine tuning knobs.
//!
//! Every section has sensible defaults, so a host can start from
//! `EngineConfig::default()` and override only what it needs, either in code
//! or from a TOML document:
//!
//! ```
//! use slint_relation_graph::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [camera]
//!     max_zoom = 8.0
//!
//!     [genealogy]
//!     charge_strength = -1200.0
//! "#).unwrap();
//! assert_eq!(config.camera.max_zoom, 8.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Force parameters for one layout mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceProfile {
    /// Rest length of the link spring.
    pub link_distance: f32,
    /// Multiplier on the degree-normalised link strength.
    pub link_strength: f32,
    /// Many-body strength. Negative values repel.
    pub charge_strength: f32,
    /// Distances below this are clamped to avoid blow-ups.
    pub charge_distance_min: f32,
    /// Pairs further apart than this do not interact.
    pub charge_distance_max: f32,
    /// Node circle radius used by the collision force.
    pub collide_radius: f32,
    pub collide_strength: f32,
    pub collide_iterations: usize,
    /// Centring strength toward the viewport centre. Zero disables it.
    pub center_strength: f32,
    /// Pull toward each node's target x.
    pub x_strength: f32,
    /// Pull toward each node's target y.
    pub y_strength: f32,
}

impl ForceProfile {
    /// Free-floating graph view.
    pub fn free() -> Self {
        Self {
            link_distance: 120.0,
            link_strength: 1.0,
            charge_strength: -400.0,
            charge_distance_min: 1.0,
            charge_distance_max: 600.0,
            collide_radius: 40.0,
            collide_strength: 0.7,
            collide_iterations: 2,
            center_strength: 0.05,
            x_strength: 0.0,
            y_strength: 0.0,
        }
    }

    /// Tree view: generation bands on Y, family columns on X.
    pub fn tree() -> Self {
        Self {
            link_distance: 100.0,
            charge_strength: -300.0,
            center_strength: 0.0,
            x_strength: 0.3,
            y_strength: 0.8,
            ..Self::free()
        }
    }

    /// Genealogy mode: strong generation constraint, weak horizontal pull.
    pub fn genealogy() -> Self {
        Self {
            link_distance: 90.0,
            link_strength: 0.5,
            charge_strength: -800.0,
            charge_distance_max: 900.0,
            collide_iterations: 3,
            center_strength: 0.0,
            x_strength: 0.02,
            y_strength: 1.0,
            ..Self::free()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("link_distance", self.link_distance)?;
        positive("collide_radius", self.collide_radius)?;
        positive("charge_distance_max", self.charge_distance_max)?;
        unit("collide_strength", self.collide_strength)?;
        unit("center_strength", self.center_strength)?;
        Ok(())
    }
}

impl Default for ForceProfile {
    fn default() -> Self {
        Self::free()
    }
}

/// Solver cooling and mode geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity removed each tick.
    pub velocity_decay: f32,
    /// Alpha used for a gentle reheat after filter or highlight changes.
    pub gentle_alpha: f32,
    /// Alpha target held while a drag is in progress.
    pub drag_alpha_target: f32,
    /// Vertical distance between generations in genealogy mode.
    pub generation_band_height: f32,
    /// Vertical distance between generations in tree mode.
    pub tree_band_height: f32,
    /// Horizontal distance between family columns in tree mode.
    pub family_spacing: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            // Reaches alpha_min after ~300 ticks.
            alpha_decay: 1.0 - 0.001f32.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            gentle_alpha: 0.3,
            drag_alpha_target: 0.3,
            generation_band_height: 160.0,
            tree_band_height: 140.0,
            family_spacing: 320.0,
        }
    }
}

/// Parallel-edge routing and label decollision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Perpendicular control-point offset per ordinal step.
    pub curve_spacing: f32,
    pub label_fallback_width: f32,
    pub label_fallback_height: f32,
    pub decollide_passes: usize,
    /// Decollision is skipped above this edge count.
    pub decollide_max_edges: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            curve_spacing: 45.0,
            label_fallback_width: 60.0,
            label_fallback_height: 16.0,
            decollide_passes: 2,
            decollide_max_edges: 300,
        }
    }
}

/// Pointer hit-testing and click/drag discrimination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Node hit radius in world units.
    pub node_hit_radius: f32,
    /// Edge hover distance in screen pixels.
    pub edge_hit_distance: f32,
    /// Pointer travel (screen pixels) below which a press counts as a click.
    pub click_tolerance: f32,
    /// Samples used when measuring distance to a curved edge.
    pub hit_samples: usize,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            node_hit_radius: 24.0,
            edge_hit_distance: 6.0,
            click_tolerance: 3.0,
            hit_samples: 20,
        }
    }
}

/// Pan/zoom bounds and focus animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Scale used when focusing a node.
    pub focus_scale: f32,
    /// Focus animation length in seconds.
    pub focus_duration: f32,
    /// Zoom factor per wheel notch.
    pub wheel_step: f32,
    /// Screen padding kept around the graph by `fit_bounds`.
    pub fit_padding: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 4.0,
            focus_scale: 1.5,
            focus_duration: 0.75,
            wheel_step: 1.1,
            fit_padding: 40.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    /// Forces for the free graph view.
    pub free: ForceProfile,
    pub tree: ForceProfile,
    pub genealogy: ForceProfile,
    pub router: RouterConfig,
    pub interaction: InteractionConfig,
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            free: ForceProfile::free(),
            tree: ForceProfile::tree(),
            genealogy: ForceProfile::genealogy(),
            router: RouterConfig::default(),
            interaction: InteractionConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document over the defaults and validate the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that would make the solver or camera misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        positive("min_zoom", camera.min_zoom)?;
        if camera.min_zoom > camera.max_zoom {
            return Err(ConfigError::InvalidZoomRange { min: camera.min_zoom, max: camera.max_zoom });
        }
        positive("focus_duration", camera.focus_duration)?;
        positive("wheel_step", camera.wheel_step)?;

        let sim = &self.simulation;
        positive("generation_band_height", sim.generation_band_height)?;
        positive("tree_band_height", sim.tree_band_height)?;
        positive("family_spacing", sim.family_spacing)?;
        unit("alpha_decay", sim.alpha_decay)?;
        unit("velocity_decay", sim.velocity_decay)?;
        unit("gentle_alpha", sim.gentle_alpha)?;

        positive("curve_spacing", self.router.curve_spacing)?;

        self.free.validate()?;
        self.tree.validate()?;
        self.genealogy.validate()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}
