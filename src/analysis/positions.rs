use crate::model::champion::{Catalog, Position};
use crate::model::team::{TeamSlate, TEAM_SIZE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Role assignment for one side's picks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assignment {
    pub by_key: BTreeMap<String, Position>,
    pub by_role: BTreeMap<Position, String>,
    /// False when no one-to-one assignment exists and every champion fell
    /// back to its first listed role. Roles may collide in that case and
    /// `by_role` keeps the first champion seen per role.
    pub complete: bool,
}

impl Assignment {
    pub fn at(&self, position: Position) -> Option<&str> {
        self.by_role.get(&position).map(String::as_str)
    }

    pub fn role_of(&self, key: &str) -> Option<Position> {
        self.by_key.get(key).copied()
    }
}

/// Depth-first search over roles. Each level receives its own copy of the
/// occupancy table, so abandoning a branch needs no undo.
fn solve(eligible: &[&[Position]], occupied: [bool; TEAM_SIZE]) -> Option<Vec<Position>> {
    let Some((first, rest)) = eligible.split_first() else {
        return Some(Vec::new());
    };
    for &position in first.iter() {
        if occupied[position.index()] {
            continue;
        }
        let mut next = occupied;
        next[position.index()] = true;
        if let Some(mut tail) = solve(rest, next) {
            tail.insert(0, position);
            return Some(tail);
        }
    }
    None
}

fn solve_keys(catalog: &Catalog, keys: &[&str]) -> Option<Vec<Position>> {
    if keys.len() > TEAM_SIZE {
        return None;
    }
    let eligible: Option<Vec<&[Position]>> = keys
        .iter()
        .map(|key| catalog.get(key).map(|c| c.positions.as_slice()))
        .collect();
    solve(&eligible?, [false; TEAM_SIZE])
}

/// Assign each picked champion to a distinct role, in input order. Keys the
/// catalog does not know are skipped.
pub fn assign_positions(catalog: &Catalog, picked: &[&str]) -> Assignment {
    let keys: Vec<&str> = picked
        .iter()
        .copied()
        .filter(|key| catalog.contains(key))
        .collect();

    let mut out = Assignment::default();
    match solve_keys(catalog, &keys) {
        Some(roles) => {
            out.complete = true;
            for (key, role) in keys.iter().zip(roles) {
                out.by_key.insert(key.to_string(), role);
                out.by_role.insert(role, key.to_string());
            }
        }
        None => {
            for key in &keys {
                let role = catalog
                    .get(key)
                    .map(|c| c.primary_position())
                    .unwrap_or(Position::Mid);
                out.by_key.insert(key.to_string(), role);
                out.by_role.entry(role).or_insert_with(|| key.to_string());
            }
        }
    }
    out
}

/// Whether `candidate` can join the side's picks with every role still
/// distinct.
pub fn can_add_champion(catalog: &Catalog, slate: &TeamSlate, candidate: &str) -> bool {
    if !catalog.contains(candidate) || slate.has_picked(candidate) {
        return false;
    }
    let mut keys = slate.picked_keys();
    keys.push(candidate);
    solve_keys(catalog, &keys).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_catalog, slate_with_picks};
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_flex_champion_moves_to_free_role() {
        let catalog = demo_catalog();
        // Malphite lists TOP first but Ornn can only play TOP.
        let a = assign_positions(&catalog, &["Malphite", "Ornn"]);
        assert!(a.complete);
        assert_eq!(a.at(Position::Top), Some("Ornn"));
        assert_eq!(a.at(Position::Support), Some("Malphite"));
    }

    #[test]
    fn test_backtracks_earlier_placement() {
        let catalog = demo_catalog();
        // Lucian takes ADC first, then must yield it to Jinx.
        let a = assign_positions(&catalog, &["Lucian", "Jinx"]);
        assert!(a.complete);
        assert_eq!(a.role_of("Lucian"), Some(Position::Mid));
        assert_eq!(a.role_of("Jinx"), Some(Position::Adc));
    }

    #[test]
    fn test_unsatisfiable_falls_back_to_first_role() {
        let catalog = demo_catalog();
        let a = assign_positions(&catalog, &["Ahri", "Syndra", "Viktor"]);
        assert!(!a.complete);
        assert_eq!(a.role_of("Syndra"), Some(Position::Mid));
        assert_eq!(a.at(Position::Mid), Some("Ahri"));
    }

    #[test]
    fn test_can_add_champion_checks_roles() {
        let catalog = demo_catalog();
        let slate = slate_with_picks(&["Ahri", "Jinx"]);
        assert!(!can_add_champion(&catalog, &slate, "Syndra"));
        assert!(!can_add_champion(&catalog, &slate, "Ahri"));
        assert!(!can_add_champion(&catalog, &slate, "Unknown"));
        // Lucian is ADC/MID and both are taken.
        assert!(!can_add_champion(&catalog, &slate, "Lucian"));
        assert!(can_add_champion(&catalog, &slate, "Braum"));
    }

    #[test]
    fn test_full_team_rejects_sixth() {
        let catalog = demo_catalog();
        let slate = slate_with_picks(&["Ornn", "LeeSin", "Ahri", "Jinx", "Braum"]);
        assert!(assign_positions(&catalog, &slate.picked_keys()).complete);
        assert!(!can_add_champion(&catalog, &slate, "Malphite"));
    }

    proptest! {
        #[test]
        fn prop_complete_assignment_has_distinct_roles(
            picks in proptest::sample::subsequence(
                vec!["Malphite", "Ornn", "Lucian", "Jinx", "Ahri", "Syndra", "Maokai",
                     "Sejuani", "Galio", "Karma", "Yasuo", "Vayne", "Trundle"],
                0..=6,
            ),
        ) {
            let catalog = demo_catalog();
            let a = assign_positions(&catalog, &picks);
            if a.complete {
                let roles: HashSet<_> = a.by_key.values().collect();
                prop_assert_eq!(roles.len(), a.by_key.len());
                for (key, role) in &a.by_key {
                    prop_assert!(catalog.get(key).unwrap().can_play(*role));
                }
            }
            if let Some((last, rest)) = picks.split_last() {
                let slate = slate_with_picks(rest);
                if rest.len() < 5 && can_add_champion(&catalog, &slate, last) {
                    prop_assert!(a.complete);
                }
            }
        }
    }
}
