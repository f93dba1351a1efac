use crate::model::champion::{Archetype, Catalog, DamageType};
use serde::Serialize;

/// Aggregated composition of one side. Every field is a sum over picked
/// champions, except `ad_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStats {
    pub cc: f64,
    pub damage: f64,
    pub tank: f64,
    pub dive: f64,
    pub poke: f64,
    pub anti: f64,
    pub early: f64,
    pub mid: f64,
    pub late: f64,
    pub ad_count: f64,
    pub ap_count: f64,
    pub hybrid_count: f64,
    pub ad_power: f64,
    pub ap_power: f64,
    pub ad_ratio: f64,
}

impl Default for TeamStats {
    fn default() -> Self {
        TeamStats {
            cc: 0.0,
            damage: 0.0,
            tank: 0.0,
            dive: 0.0,
            poke: 0.0,
            anti: 0.0,
            early: 0.0,
            mid: 0.0,
            late: 0.0,
            ad_count: 0.0,
            ap_count: 0.0,
            hybrid_count: 0.0,
            ad_power: 0.0,
            ap_power: 0.0,
            ad_ratio: 0.5,
        }
    }
}

impl TeamStats {
    pub fn archetype_value(&self, archetype: Archetype) -> f64 {
        match archetype {
            Archetype::Dive => self.dive,
            Archetype::Poke => self.poke,
            Archetype::Anti => self.anti,
        }
    }

    pub fn archetype_value_mut(&mut self, archetype: Archetype) -> &mut f64 {
        match archetype {
            Archetype::Dive => &mut self.dive,
            Archetype::Poke => &mut self.poke,
            Archetype::Anti => &mut self.anti,
        }
    }

    /// Highest archetype sum. Ties keep the first in Dive, Poke, Anti order,
    /// so an empty team reads as Dive with value 0.
    pub fn dominant_archetype(&self) -> (Archetype, f64) {
        let mut best = (Archetype::Dive, self.dive);
        for archetype in [Archetype::Poke, Archetype::Anti] {
            let value = self.archetype_value(archetype);
            if value > best.1 {
                best = (archetype, value);
            }
        }
        best
    }

    pub fn has_archetype_tie(&self) -> bool {
        let values = [self.dive, self.poke, self.anti];
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        values.iter().filter(|v| **v == max).count() >= 2
    }

    pub fn composition_label(&self) -> &'static str {
        match self.dominant_archetype().0 {
            Archetype::Dive => "Dive comp",
            Archetype::Poke => "Poke comp",
            Archetype::Anti => "Counter-engage comp",
        }
    }

    /// Floor every adjustable stat at zero after bonus layers run.
    pub fn clamp_non_negative(&mut self) {
        for value in [
            &mut self.cc,
            &mut self.damage,
            &mut self.tank,
            &mut self.dive,
            &mut self.poke,
            &mut self.anti,
            &mut self.early,
            &mut self.mid,
            &mut self.late,
        ] {
            *value = value.max(0.0);
        }
    }
}

/// Sum a side's picks into team stats. Unknown keys and empty slots are
/// skipped; the result does not depend on pick order.
pub fn compute_team_stats<'a>(
    catalog: &Catalog,
    picks: impl IntoIterator<Item = &'a str>,
) -> TeamStats {
    let mut res = TeamStats::default();
    for key in picks {
        let Some(c) = catalog.get(key) else {
            continue;
        };
        res.cc += c.cc as f64;
        res.damage += c.damage as f64;
        res.tank += c.tank as f64;
        res.early += c.curve.early as f64;
        res.mid += c.curve.mid as f64;
        res.late += c.curve.late as f64;
        *res.archetype_value_mut(c.archetype) += c.intensity as f64;

        let dmg = c.damage as f64;
        match c.damage_type {
            DamageType::Physical => {
                res.ad_count += 1.0;
                res.ad_power += dmg;
            }
            DamageType::Magic => {
                res.ap_count += 1.0;
                res.ap_power += dmg;
            }
            DamageType::Hybrid => {
                res.hybrid_count += 1.0;
                res.ad_count += 0.5;
                res.ap_count += 0.5;
                res.ad_power += dmg * 0.5;
                res.ap_power += dmg * 0.5;
            }
        }
    }
    let total = res.ad_power + res.ap_power;
    res.ad_ratio = if total > 0.0 { res.ad_power / total } else { 0.5 };
    res
}
