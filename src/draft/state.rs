//! The fixed twenty-step ban/pick sequence and its legality rules.

use crate::analysis::positions::can_add_champion;
use crate::error::DraftError;
use crate::model::champion::Catalog;
use crate::model::team::{PerSide, Side, TeamSlate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Ban,
    Pick,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Ban => write!(f, "BAN"),
            ActionKind::Pick => write!(f, "PICK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftTurn {
    pub side: Side,
    pub action: ActionKind,
    pub slot: usize,
}

const fn turn(side: Side, action: ActionKind, slot: usize) -> DraftTurn {
    DraftTurn { side, action, slot }
}

use ActionKind::{Ban, Pick};
use Side::{Blue, Red};

pub const DRAFT_ORDER: [DraftTurn; 20] = [
    turn(Blue, Ban, 0),
    turn(Red, Ban, 0),
    turn(Blue, Ban, 1),
    turn(Red, Ban, 1),
    turn(Blue, Ban, 2),
    turn(Red, Ban, 2),
    turn(Blue, Pick, 0),
    turn(Red, Pick, 0),
    turn(Red, Pick, 1),
    turn(Blue, Pick, 1),
    turn(Blue, Pick, 2),
    turn(Red, Pick, 2),
    turn(Red, Ban, 3),
    turn(Blue, Ban, 3),
    turn(Red, Ban, 4),
    turn(Blue, Ban, 4),
    turn(Red, Pick, 3),
    turn(Blue, Pick, 3),
    turn(Blue, Pick, 4),
    turn(Red, Pick, 4),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DraftPhase {
    FirstBans,
    FirstPicks,
    SecondBans,
    SecondPicks,
    Complete,
}

impl DraftPhase {
    pub fn of_turn(index: usize) -> DraftPhase {
        match index {
            0..=5 => DraftPhase::FirstBans,
            6..=11 => DraftPhase::FirstPicks,
            12..=15 => DraftPhase::SecondBans,
            16..=19 => DraftPhase::SecondPicks,
            _ => DraftPhase::Complete,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DraftPhase::FirstBans => "Ban Phase 1",
            DraftPhase::FirstPicks => "Pick Phase 1",
            DraftPhase::SecondBans => "Ban Phase 2",
            DraftPhase::SecondPicks => "Pick Phase 2",
            DraftPhase::Complete => "Draft Complete",
        }
    }
}

/// One game's draft. Actions produce a new state; a rejected action
/// leaves the original untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftState {
    pub slates: PerSide<TeamSlate>,
    pub turn: usize,
    /// Champions unavailable to both sides for the whole game.
    pub locked: BTreeSet<String>,
    /// Champions each side already played earlier in the series. Pick
    /// candidates skip them while any other legal pick remains.
    pub team_locked: PerSide<BTreeSet<String>>,
}

impl DraftState {
    pub fn new() -> Self {
        DraftState::default()
    }

    pub fn with_locked(locked: BTreeSet<String>) -> Self {
        DraftState {
            locked,
            ..DraftState::default()
        }
    }

    pub fn with_team_locks(team_locked: PerSide<BTreeSet<String>>) -> Self {
        DraftState {
            team_locked,
            ..DraftState::default()
        }
    }

    pub fn current_turn(&self) -> Option<DraftTurn> {
        DRAFT_ORDER.get(self.turn).copied()
    }

    pub fn next_turn(&self) -> Option<DraftTurn> {
        DRAFT_ORDER.get(self.turn + 1).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.turn >= DRAFT_ORDER.len()
    }

    pub fn phase(&self) -> DraftPhase {
        DraftPhase::of_turn(self.turn)
    }

    /// How many more actions the acting side takes before the action kind
    /// changes, the current one included.
    pub fn remaining_actions_in_phase(&self) -> usize {
        let Some(current) = self.current_turn() else {
            return 0;
        };
        DRAFT_ORDER[self.turn..]
            .iter()
            .take_while(|t| t.action == current.action)
            .filter(|t| t.side == current.side)
            .count()
    }

    /// Picked, banned or locked anywhere.
    pub fn is_taken(&self, key: &str) -> bool {
        self.locked.contains(key) || Side::BOTH.iter().any(|side| self.slates[*side].contains(key))
    }

    /// Write `key` into a slot without checking legality or advancing.
    pub(crate) fn with_slot(&self, side: Side, action: ActionKind, slot: usize, key: &str) -> DraftState {
        let mut next = self.clone();
        let slate = &mut next.slates[side];
        let target = match action {
            ActionKind::Ban => &mut slate.bans[slot],
            ActionKind::Pick => &mut slate.picks[slot],
        };
        *target = Some(key.to_string());
        next
    }
}

fn check_action(catalog: &Catalog, state: &DraftState, turn: DraftTurn, key: &str) -> Result<(), DraftError> {
    if !catalog.contains(key) {
        return Err(DraftError::UnknownChampion(key.to_string()));
    }
    if state.locked.contains(key) {
        return Err(DraftError::FearlessLocked(key.to_string()));
    }
    if state.is_taken(key) {
        return Err(DraftError::AlreadyTaken(key.to_string()));
    }
    if turn.action == ActionKind::Pick && !can_add_champion(catalog, &state.slates[turn.side], key) {
        return Err(DraftError::RoleUnsatisfiable(key.to_string()));
    }
    Ok(())
}

/// Validate and apply the current turn's action for `side`.
pub fn apply_draft_action(
    catalog: &Catalog,
    state: &DraftState,
    side: Side,
    key: &str,
) -> Result<DraftState, DraftError> {
    let turn = state.current_turn().ok_or(DraftError::DraftComplete)?;
    if turn.side != side {
        return Err(DraftError::OutOfTurn {
            expected: turn.side,
            actual: side,
        });
    }
    check_action(catalog, state, turn, key)?;

    let mut next = state.with_slot(side, turn.action, turn.slot, key);
    next.turn += 1;
    Ok(next)
}

/// Every key legal for `turn` in lexical order. Picks drop the acting
/// side's own series locks unless nothing else is left.
pub fn legal_candidates(catalog: &Catalog, state: &DraftState, turn: DraftTurn) -> Vec<String> {
    let legal: Vec<String> = catalog
        .keys()
        .filter(|key| check_action(catalog, state, turn, key).is_ok())
        .map(str::to_string)
        .collect();
    let own = &state.team_locked[turn.side];
    if turn.action == ActionKind::Ban || own.is_empty() {
        return legal;
    }
    let fresh: Vec<String> = legal.iter().filter(|key| !own.contains(*key)).cloned().collect();
    if fresh.is_empty() {
        legal
    } else {
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::demo_catalog;

    const SEQUENCE: [&str; 20] = [
        "Sylas", "Viego", "Aatrox", "Ashe", "Akali", "Lux", // bans
        "LeeSin", "Ahri", "Jinx", "Ornn", "Braum", "Sejuani", // picks
        "Kaisa", "Zeri", "Thresh", "Vayne", // bans
        "Nautilus", "Lucian", "Orianna", "Renekton", // picks
    ];

    #[test]
    fn test_order_shape() {
        let bans = DRAFT_ORDER.iter().filter(|t| t.action == ActionKind::Ban).count();
        assert_eq!(bans, 10);
        for side in Side::BOTH {
            for action in [ActionKind::Ban, ActionKind::Pick] {
                let mut slots: Vec<usize> = DRAFT_ORDER
                    .iter()
                    .filter(|t| t.side == side && t.action == action)
                    .map(|t| t.slot)
                    .collect();
                slots.sort_unstable();
                assert_eq!(slots, vec![0, 1, 2, 3, 4]);
            }
        }
    }

    #[test]
    fn test_full_draft_round_trip() {
        let catalog = demo_catalog();
        let mut state = DraftState::new();
        for key in SEQUENCE {
            let side = state.current_turn().unwrap().side;
            state = apply_draft_action(&catalog, &state, side, key).unwrap();
        }
        assert!(state.is_complete());
        assert_eq!(state.phase(), DraftPhase::Complete);

        for (turn, key) in DRAFT_ORDER.iter().zip(SEQUENCE) {
            let slate = &state.slates[turn.side];
            let slot = match turn.action {
                ActionKind::Ban => &slate.bans[turn.slot],
                ActionKind::Pick => &slate.picks[turn.slot],
            };
            assert_eq!(slot.as_deref(), Some(key));
        }
        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Blue, "Darius"),
            Err(DraftError::DraftComplete)
        );
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let catalog = demo_catalog();
        let state = apply_draft_action(&catalog, &DraftState::new(), Side::Blue, "Sylas").unwrap();
        let snapshot = state.clone();

        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Blue, "Viego"),
            Err(DraftError::OutOfTurn {
                expected: Side::Red,
                actual: Side::Blue
            })
        );
        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Red, "Sylas"),
            Err(DraftError::AlreadyTaken("Sylas".to_string()))
        );
        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Red, "Teemo2"),
            Err(DraftError::UnknownChampion("Teemo2".to_string()))
        );
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_pick_must_fit_a_role() {
        let catalog = demo_catalog();
        let mut state = DraftState::new();
        state.turn = 6;
        // Ahri and Syndra only play mid.
        state = state.with_slot(Side::Blue, ActionKind::Pick, 1, "Ahri");
        state = state.with_slot(Side::Blue, ActionKind::Pick, 2, "Jinx");
        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Blue, "Syndra"),
            Err(DraftError::RoleUnsatisfiable("Syndra".to_string()))
        );
        assert!(apply_draft_action(&catalog, &state, Side::Blue, "Braum").is_ok());
    }

    #[test]
    fn test_locked_champions_are_unavailable() {
        let catalog = demo_catalog();
        let state = DraftState::with_locked(BTreeSet::from(["Ahri".to_string()]));
        assert_eq!(
            apply_draft_action(&catalog, &state, Side::Blue, "Ahri"),
            Err(DraftError::FearlessLocked("Ahri".to_string()))
        );
        let candidates = legal_candidates(&catalog, &state, DRAFT_ORDER[0]);
        assert!(!candidates.contains(&"Ahri".to_string()));
        assert_eq!(candidates.len(), catalog.len() - 1);
    }

    #[test]
    fn test_remaining_actions_in_phase() {
        let mut state = DraftState::new();
        assert_eq!(state.remaining_actions_in_phase(), 3);
        state.turn = 6;
        assert_eq!(state.remaining_actions_in_phase(), 3);
        state.turn = 9;
        assert_eq!(state.phase(), DraftPhase::FirstPicks);
        assert_eq!(state.remaining_actions_in_phase(), 2);
        state.turn = 11;
        assert_eq!(state.remaining_actions_in_phase(), 1);
        state.turn = 20;
        assert_eq!(state.remaining_actions_in_phase(), 0);
    }

    #[test]
    fn test_team_locks_only_steer_that_side() {
        let catalog = demo_catalog();
        let mut locks: PerSide<BTreeSet<String>> = PerSide::default();
        locks.blue.insert("Ahri".to_string());
        let mut state = DraftState::with_team_locks(locks);
        state.turn = 6;

        let blue = legal_candidates(&catalog, &state, DRAFT_ORDER[6]);
        assert!(!blue.contains(&"Ahri".to_string()));
        let red = legal_candidates(&catalog, &state, DRAFT_ORDER[7]);
        assert!(red.contains(&"Ahri".to_string()));
        // Bans ignore team locks, and the pick is still accepted if forced.
        assert!(legal_candidates(&catalog, &state, DRAFT_ORDER[0]).contains(&"Ahri".to_string()));
        assert!(apply_draft_action(&catalog, &state, Side::Blue, "Ahri").is_ok());
    }

    #[test]
    fn test_team_locks_fall_back_when_exhausted() {
        let catalog = demo_catalog();
        let mut locks: PerSide<BTreeSet<String>> = PerSide::default();
        locks.blue = catalog.keys().map(str::to_string).collect();
        let mut state = DraftState::with_team_locks(locks);
        state.turn = 6;
        let blue = legal_candidates(&catalog, &state, DRAFT_ORDER[6]);
        assert_eq!(blue.len(), catalog.len());
    }
}
