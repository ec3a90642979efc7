//! Simulation configuration with documented defaults
//!
//! Every field is optional in a config file; missing fields fall back to the
//! defaults below, which reproduce the classic 30x30 classroom.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ClassroomError, Result};
use crate::core::types::{StrategyKind, Zone};

/// Top-level configuration for a classroom run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,

    /// Safe zone rectangle. Children inside it cannot be captured, captured
    /// children are escorted back to it, and candy never spawns in it.
    pub safe_zone: Zone,

    /// How many children use each strategy
    pub children: ChildCounts,

    pub teachers: TeacherConfig,

    pub timing: TimingConfig,

    pub behavior: BehaviorConfig,

    /// Seed for the world's random number generator
    ///
    /// Two runs with the same seed and config produce identical trajectories.
    pub seed: u64,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            safe_zone: Zone::new(0, 6, 0, 6),
            children: ChildCounts::default(),
            teachers: TeacherConfig::default(),
            timing: TimingConfig::default(),
            behavior: BehaviorConfig::default(),
            seed: 42,
        }
    }
}

/// Number of children per movement strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildCounts {
    pub random_walk: usize,
    pub candy_seeker: usize,
    pub teacher_avoidance: usize,
    pub directional_bias: usize,
    pub strategic_timing: usize,
    pub wall_hugger: usize,
    pub group_seeker: usize,
    pub candy_hoarder: usize,
    pub safe_zone_explorer: usize,
    pub unpredictable: usize,
}

impl Default for ChildCounts {
    fn default() -> Self {
        Self {
            random_walk: 5,
            candy_seeker: 5,
            teacher_avoidance: 5,
            directional_bias: 4,
            strategic_timing: 4,
            wall_hugger: 4,
            group_seeker: 3,
            candy_hoarder: 3,
            safe_zone_explorer: 3,
            unpredictable: 3,
        }
    }
}

impl ChildCounts {
    /// All counts zero
    pub fn none() -> Self {
        Self {
            random_walk: 0,
            candy_seeker: 0,
            teacher_avoidance: 0,
            directional_bias: 0,
            strategic_timing: 0,
            wall_hugger: 0,
            group_seeker: 0,
            candy_hoarder: 0,
            safe_zone_explorer: 0,
            unpredictable: 0,
        }
    }

    pub fn count(&self, kind: StrategyKind) -> usize {
        match kind {
            StrategyKind::RandomWalk => self.random_walk,
            StrategyKind::CandySeeker => self.candy_seeker,
            StrategyKind::TeacherAvoidance => self.teacher_avoidance,
            StrategyKind::DirectionalBias => self.directional_bias,
            StrategyKind::StrategicTiming => self.strategic_timing,
            StrategyKind::WallHugger => self.wall_hugger,
            StrategyKind::GroupSeeker => self.group_seeker,
            StrategyKind::CandyHoarder => self.candy_hoarder,
            StrategyKind::SafeZoneExplorer => self.safe_zone_explorer,
            StrategyKind::Unpredictable => self.unpredictable,
        }
    }

    pub fn total(&self) -> usize {
        StrategyKind::ALL.iter().map(|k| self.count(*k)).sum()
    }
}

/// Teacher population and pursuit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherConfig {
    pub count: usize,

    /// Patrol zone per teacher
    ///
    /// Empty means the grid is split into `count` equal vertical strips.
    /// Otherwise there must be exactly one zone per teacher.
    pub zones: Vec<Zone>,

    /// Strategy kinds in pursuit order, highest priority first
    ///
    /// Kinds missing from the list are pursued after all listed ones.
    pub strategy_priority: Vec<StrategyKind>,
}

impl Default for TeacherConfig {
    fn default() -> Self {
        Self {
            count: 1,
            zones: Vec::new(),
            strategy_priority: default_strategy_priority(),
        }
    }
}

/// Candy-hungry and erratic children first, harmless wanderers last
pub fn default_strategy_priority() -> Vec<StrategyKind> {
    vec![
        StrategyKind::CandyHoarder,
        StrategyKind::CandySeeker,
        StrategyKind::Unpredictable,
        StrategyKind::StrategicTiming,
        StrategyKind::TeacherAvoidance,
        StrategyKind::SafeZoneExplorer,
        StrategyKind::GroupSeeker,
        StrategyKind::WallHugger,
        StrategyKind::DirectionalBias,
        StrategyKind::RandomWalk,
    ]
}

/// Timing constants, all in simulation seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds between candy spawns
    pub candy_spawn_interval: f64,

    /// Spawning pauses while this many candies are on the grid
    pub max_candies: Option<usize>,

    /// Minimum seconds between two moves of an ordinary child
    ///
    /// At 0.0 a child may move on every tick.
    pub child_move_cooldown: f64,

    /// Cooldown applied when a child is captured and again when it is
    /// delivered to the safe zone
    pub recharge_cooldown: f64,

    /// Range the strategic-timing move cooldown is redrawn from after each move
    pub strategic_timing_min: f64,
    pub strategic_timing_max: f64,

    /// Range of the interval after which an unpredictable child switches
    /// sub-strategy
    pub strategy_switch_min: f64,
    pub strategy_switch_max: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            candy_spawn_interval: 3.0,
            max_candies: None,
            child_move_cooldown: 0.0,
            recharge_cooldown: 5.0,
            strategic_timing_min: 0.5,
            strategic_timing_max: 2.0,
            strategy_switch_min: 5.0,
            strategy_switch_max: 10.0,
        }
    }
}

/// Tuning for individual strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Safe-zone explorers head home once farther than this from the safe zone
    pub explorer_threshold: u32,

    /// Chebyshev radius a candy hoarder counts candies in
    pub hoarder_radius: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            explorer_threshold: 5,
            hoarder_radius: 3,
        }
    }
}

impl ClassroomConfig {
    /// Parse a TOML document; absent fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClassroomConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn total_agents(&self) -> usize {
        self.children.total() + self.teachers.count
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }

        if self.safe_zone.is_empty() {
            return Err(invalid("safe zone must contain at least one cell".into()));
        }
        if !self.safe_zone.fits_within(self.width, self.height) {
            return Err(invalid(format!(
                "safe zone {:?} does not fit in a {}x{} grid",
                self.safe_zone, self.width, self.height
            )));
        }
        if self.safe_zone.area() >= self.width * self.height {
            return Err(invalid("safe zone must leave at least one playable cell".into()));
        }

        if self.total_agents() > self.width * self.height {
            return Err(invalid(format!(
                "{} agents do not fit in {} cells",
                self.total_agents(),
                self.width * self.height
            )));
        }

        if !self.teachers.zones.is_empty() && self.teachers.zones.len() != self.teachers.count {
            return Err(invalid(format!(
                "{} teacher zones given for {} teachers",
                self.teachers.zones.len(),
                self.teachers.count
            )));
        }
        if self.teachers.zones.is_empty() && self.teachers.count > self.width {
            return Err(invalid(format!(
                "cannot split a grid {} wide into {} teacher strips",
                self.width, self.teachers.count
            )));
        }
        for zone in &self.teachers.zones {
            if zone.is_empty() || !zone.fits_within(self.width, self.height) {
                return Err(invalid(format!(
                    "teacher zone {:?} must be non-empty and inside the grid",
                    zone
                )));
            }
        }

        let timing = &self.timing;
        check_non_negative("candy_spawn_interval", timing.candy_spawn_interval)?;
        check_non_negative("child_move_cooldown", timing.child_move_cooldown)?;
        check_non_negative("recharge_cooldown", timing.recharge_cooldown)?;
        check_range("strategic_timing", timing.strategic_timing_min, timing.strategic_timing_max)?;
        check_range("strategy_switch", timing.strategy_switch_min, timing.strategy_switch_max)?;

        Ok(())
    }
}

/// Write a config as TOML
pub fn save_config(config: &ClassroomConfig, path: impl AsRef<Path>) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path.as_ref(), content)?;
    Ok(())
}

/// Load a config file, first writing the defaults there if it does not exist
pub fn load_or_create_config(path: impl AsRef<Path>) -> Result<ClassroomConfig> {
    let path = path.as_ref();
    if !path.exists() {
        let config = ClassroomConfig::default();
        save_config(&config, path)?;
        tracing::info!(path = %path.display(), "Wrote default config");
        return Ok(config);
    }
    load_config(path)
}

/// Load and validate a config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ClassroomConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    ClassroomConfig::from_toml_str(&content)
}

fn invalid(message: String) -> ClassroomError {
    ClassroomError::InvalidConfig(message)
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be a non-negative number, got {}", name, value)))
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    check_non_negative(name, min)?;
    check_non_negative(name, max)?;
    if min > max {
        return Err(invalid(format!("{} range is inverted: {} > {}", name, min, max)));
    }
    Ok(())
}
