//! Shared fixtures for unit tests.

use crate::model::champion::Catalog;
use crate::model::team::{load_org_profiles, OrgProfile, PerSide, TeamSlate};

pub fn demo_catalog() -> Catalog {
    Catalog::from_json_str(include_str!("../data/champions.json"))
        .expect("bundled champion data parses")
}

pub fn demo_orgs(catalog: &Catalog) -> Vec<OrgProfile> {
    load_org_profiles(include_str!("../data/teams.json"), catalog)
        .expect("bundled team data parses")
}

/// A slate with the given keys in its first pick slots.
pub fn slate_with_picks(keys: &[&str]) -> TeamSlate {
    let mut slate = TeamSlate::default();
    for (slot, key) in slate.picks.iter_mut().zip(keys) {
        *slot = Some(key.to_string());
    }
    slate
}

pub fn slates(blue: &[&str], red: &[&str]) -> PerSide<TeamSlate> {
    PerSide::new(slate_with_picks(blue), slate_with_picks(red))
}
