/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Upper bound on completion-chain iterations the orchestrator drains
    /// within one tick. Guards against a buggy state livelocking the loop.
    pub max_drain_per_tick: u32,
    /// Tiles a projectile covers per simulation tick.
    pub projectile_speed: u32,
    /// Inclusive bounds on the number of snap shots a berserking unit fires.
    pub berserk_shots_min: u32,
    pub berserk_shots_max: u32,
    /// TU charged per 45° facing step.
    pub turn_tu_cost: u16,
    /// TU reserved for one snap shot.
    pub snap_shot_tu_cost: u16,
    /// TU charged for a psionic attack.
    pub psi_tu_cost: u16,
    /// Damage a falling unit takes per level dropped beyond the first.
    pub fall_damage_per_level: u16,
    /// Base damage of a standard shot before variance.
    pub shot_damage: u16,
    /// Grenade/rocket blast damage at the center tile.
    pub blast_power: u16,
    /// Blast radius in tiles (Chebyshev).
    pub blast_radius: u32,
}

impl BattleConfig {
    // ===== compile-time capacity constants =====
    /// Maximum units in one battle (both squads plus neutrals).
    pub const MAX_UNITS: usize = 80;
    /// Largest number of step directions a single tile expansion considers.
    pub const MAX_NEIGHBORS: usize = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_DRAIN_PER_TICK: u32 = 8;
    pub const DEFAULT_PROJECTILE_SPEED: u32 = 4;

    pub fn new() -> Self {
        Self {
            max_drain_per_tick: Self::DEFAULT_MAX_DRAIN_PER_TICK,
            projectile_speed: Self::DEFAULT_PROJECTILE_SPEED,
            berserk_shots_min: 2,
            berserk_shots_max: 5,
            turn_tu_cost: 1,
            snap_shot_tu_cost: 12,
            psi_tu_cost: 25,
            fall_damage_per_level: 8,
            shot_damage: 20,
            blast_power: 40,
            blast_radius: 3,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
