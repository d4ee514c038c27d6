use crate::state::common::{Direction, Position, UnitId};

bitflags::bitflags! {
    /// Movement capabilities that alter cost-model decisions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MoveFlags: u8 {
        /// Moves vertically without stairs or lifts and never falls.
        const FLYING = 1 << 0;
        /// Ignores rough-terrain surcharges on the lateral plane.
        const SLIDING = 1 << 1;
    }
}

/// Which side a unit fights for. Determines hostility for panic fire,
/// psi targeting, and AI evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Player,
    Hostile,
    Neutral,
}

impl Side {
    pub fn is_enemy_of(self, other: Side) -> bool {
        match (self, other) {
            (Side::Player, Side::Hostile) | (Side::Hostile, Side::Player) => true,
            (Side::Hostile, Side::Neutral) | (Side::Neutral, Side::Hostile) => true,
            _ => false,
        }
    }
}

/// Behavioral status of a unit. Anything other than `Standing` removes the
/// unit from normal input control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitStatus {
    #[default]
    Standing,
    Panicking,
    Berserk,
    Unconscious,
    Dead,
}

/// Full per-unit combat state.
///
/// Owned by [`UnitsState`]; everything else refers to units through
/// [`UnitId`] handles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: UnitId,
    pub position: Position,
    pub facing: Direction,
    pub side: Side,
    pub status: UnitStatus,
    pub flags: MoveFlags,
    /// Action-point budget for the current turn.
    pub time_units: u16,
    /// Stamina pool spent alongside TU while walking.
    pub energy: u16,
    pub health: u16,
    /// 0..=100. Hitting 0 triggers panic checks at end of turn.
    pub morale: u16,
    /// Loaded rounds in the unit's weapon.
    pub ammo: u16,
    pub psi_strength: u16,
    pub psi_skill: u16,
}

impl UnitState {
    pub const MAX_TIME_UNITS: u16 = 50;
    pub const MAX_ENERGY: u16 = 50;

    pub fn new(id: UnitId, position: Position, side: Side) -> Self {
        Self {
            id,
            position,
            facing: Direction::North,
            side,
            status: UnitStatus::Standing,
            flags: MoveFlags::empty(),
            time_units: Self::MAX_TIME_UNITS,
            energy: Self::MAX_ENERGY,
            health: 30,
            morale: 100,
            ammo: 10,
            psi_strength: 40,
            psi_skill: 0,
        }
    }

    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_time_units(mut self, tu: u16) -> Self {
        self.time_units = tu;
        self
    }

    pub fn with_psi(mut self, strength: u16, skill: u16) -> Self {
        self.psi_strength = strength;
        self.psi_skill = skill;
        self
    }

    /// True while the unit participates in the battle: alive, conscious,
    /// and occupying a tile.
    pub fn is_active(&self) -> bool {
        !matches!(self.status, UnitStatus::Dead | UnitStatus::Unconscious)
    }

    pub fn is_flying(&self) -> bool {
        self.flags.contains(MoveFlags::FLYING)
    }

    /// Deducts `tu` if the budget covers it. Returns false (and leaves the
    /// budget untouched) otherwise.
    pub fn spend_time_units(&mut self, tu: u16) -> bool {
        if self.time_units < tu {
            return false;
        }
        self.time_units -= tu;
        true
    }

    pub fn spend_energy(&mut self, energy: u16) -> bool {
        if self.energy < energy {
            return false;
        }
        self.energy -= energy;
        true
    }

    /// Applies damage and downgrades status when health runs out.
    pub fn apply_damage(&mut self, amount: u16) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.status = UnitStatus::Dead;
        }
    }

    pub fn change_morale(&mut self, delta: i16) {
        let morale = i32::from(self.morale) + i32::from(delta);
        self.morale = morale.clamp(0, 100) as u16;
    }

    /// Turn-boundary recovery: TU snaps back to full, energy regains half
    /// its pool.
    pub fn refresh(&mut self) {
        self.time_units = Self::MAX_TIME_UNITS;
        self.energy = (self.energy + Self::MAX_ENERGY / 2).min(Self::MAX_ENERGY);
    }
}

/// Id-indexed storage for every unit in the battle.
///
/// Grid occupancy is answered by scanning active units; battles hold a few
/// dozen units at most, so a side table would cost more bookkeeping than it
/// saves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitsState {
    units: Vec<UnitState>,
}

impl UnitsState {
    pub fn insert(&mut self, unit: UnitState) {
        debug_assert!(
            self.unit(unit.id).is_none(),
            "duplicate unit id {}",
            unit.id
        );
        self.units.push(unit);
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// The active unit standing on `position`, if any. Dead and unconscious
    /// bodies do not block tiles.
    pub fn unit_at(&self, position: Position) -> Option<&UnitState> {
        self.units
            .iter()
            .find(|u| u.is_active() && u.position == position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut UnitState> {
        self.units.iter_mut()
    }

    /// Active units hostile to `side`, in id insertion order.
    pub fn enemies_of(&self, side: Side) -> impl Iterator<Item = &UnitState> {
        self.units
            .iter()
            .filter(move |u| u.is_active() && u.side.is_enemy_of(side))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
