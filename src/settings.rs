//! Kinematic and optimizer settings
//!
//! Supplied verbatim by the editor's settings persistence as camelCase JSON.
//! Missing keys fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FIELD_SIZE;
use crate::error::{PlanError, PlanResult};

/// Kinematic constants for the robot and field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Translational speed cap (units/s)
    pub max_velocity: f64,
    /// Translational acceleration (units/s²)
    pub max_acceleration: f64,
    /// Translational deceleration (units/s², positive)
    pub max_deceleration: f64,
    /// Max angular velocity (rad/s)
    pub a_velocity: f64,
    /// Max angular acceleration (rad/s²); derived from the robot width when absent
    pub max_angular_acceleration: Option<f64>,
    /// Cornering-limit coefficient
    pub k_friction: f64,
    /// Footprint length along the heading
    pub robot_length: f64,
    /// Footprint width across the heading
    pub robot_width: f64,
    /// Inflation applied to each footprint side for collision checks only
    pub safety_margin: f64,
    /// Square field extent; the field spans [0, field_size]²
    pub field_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_velocity: 30.0,
            max_acceleration: 30.0,
            max_deceleration: 30.0,
            a_velocity: std::f64::consts::PI,
            max_angular_acceleration: None,
            k_friction: 0.1,
            robot_length: 18.0,
            robot_width: 18.0,
            safety_margin: 1.0,
            field_size: DEFAULT_FIELD_SIZE,
        }
    }
}

impl Settings {
    /// Reject settings that would make profiles meaningless
    pub fn validate(&self) -> PlanResult<()> {
        positive("maxVelocity", self.max_velocity)?;
        positive("maxAcceleration", self.max_acceleration)?;
        positive("maxDeceleration", self.max_deceleration)?;
        positive("aVelocity", self.a_velocity)?;
        positive("robotLength", self.robot_length)?;
        positive("robotWidth", self.robot_width)?;
        positive("fieldSize", self.field_size)?;
        non_negative("kFriction", self.k_friction)?;
        non_negative("safetyMargin", self.safety_margin)?;
        if let Some(alpha) = self.max_angular_acceleration {
            positive("maxAngularAcceleration", alpha)?;
        }
        Ok(())
    }

    /// Angular acceleration used for rotations (rad/s²)
    pub fn angular_acceleration(&self) -> f64 {
        self.max_angular_acceleration
            .unwrap_or(self.max_acceleration / (self.robot_width / 2.0))
    }

    /// Footprint dimensions including the safety margin on every side
    pub fn inflated_footprint(&self) -> (f64, f64) {
        (
            self.robot_length + 2.0 * self.safety_margin,
            self.robot_width + 2.0 * self.safety_margin,
        )
    }

    pub fn from_json(json: &str) -> PlanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn positive(name: &'static str, value: f64) -> PlanResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidSettings {
            name,
            value,
            reason: "must be positive",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> PlanResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidSettings {
            name,
            value,
            reason: "must not be negative",
        })
    }
}

/// Search effort presets offered by the optimization dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OptimizationPreset {
    Quick,
    #[default]
    Balanced,
    Thorough,
}

impl OptimizationPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationPreset::Quick => "Quick",
            OptimizationPreset::Balanced => "Balanced",
            OptimizationPreset::Thorough => "Thorough",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quick" | "fast" => Some(OptimizationPreset::Quick),
            "balanced" => Some(OptimizationPreset::Balanced),
            "thorough" => Some(OptimizationPreset::Thorough),
            _ => None,
        }
    }

    /// Generations to run
    pub fn iterations(&self) -> usize {
        match self {
            OptimizationPreset::Quick => 20,
            OptimizationPreset::Balanced => 60,
            OptimizationPreset::Thorough => 200,
        }
    }

    /// Candidates per generation
    pub fn population_size(&self) -> usize {
        match self {
            OptimizationPreset::Quick => 12,
            OptimizationPreset::Balanced => 24,
            OptimizationPreset::Thorough => 48,
        }
    }
}

/// Genetic search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizerSettings {
    /// Generations before termination
    pub optimization_iterations: usize,
    /// Candidates per generation (including the elite)
    pub population_size: usize,
    /// Probability that a control point is nudged
    pub optimization_mutation_rate: f64,
    /// Standard deviation of the nudge (field units)
    pub optimization_mutation_strength: f64,
    /// Fitness penalty per collision marker (seconds)
    pub collision_penalty: f64,
    /// Seed for the search RNG
    pub seed: u64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self::from_preset(OptimizationPreset::default())
    }
}

impl OptimizerSettings {
    /// Create settings from an effort preset
    pub fn from_preset(preset: OptimizationPreset) -> Self {
        Self {
            optimization_iterations: preset.iterations(),
            population_size: preset.population_size(),
            optimization_mutation_rate: 0.3,
            optimization_mutation_strength: 6.0,
            collision_penalty: 10_000.0,
            seed: 0x5eed_cafe,
        }
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.optimization_iterations == 0 {
            return Err(PlanError::InvalidOptimizerSettings(
                "optimizationIterations must be at least 1".to_string(),
            ));
        }
        if self.population_size == 0 {
            return Err(PlanError::InvalidOptimizerSettings(
                "populationSize must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.optimization_mutation_rate) {
            return Err(PlanError::InvalidOptimizerSettings(format!(
                "optimizationMutationRate {} outside [0, 1]",
                self.optimization_mutation_rate
            )));
        }
        if !(self.optimization_mutation_strength >= 0.0
            && self.optimization_mutation_strength.is_finite())
        {
            return Err(PlanError::InvalidOptimizerSettings(format!(
                "optimizationMutationStrength {} must be a non-negative number",
                self.optimization_mutation_strength
            )));
        }
        if !(self.collision_penalty > 0.0 && self.collision_penalty.is_finite()) {
            return Err(PlanError::InvalidOptimizerSettings(format!(
                "collisionPenalty {} must be positive",
                self.collision_penalty
            )));
        }
        Ok(())
    }
}
