//! Blue-side win probability from two sides' final stats.

use crate::analysis::team_stats::TeamStats;
use crate::model::champion::Archetype;
use serde::Serialize;

pub const MIN_WIN: f64 = 3.0;
pub const MAX_WIN: f64 = 97.0;

const POWER_WEIGHT: f64 = 0.56;
const ARCHETYPE_WEIGHT: f64 = 1.22;
const SCALING_WEIGHT: f64 = 0.34;
const VOLATILITY_CAP: f64 = 12.0;
const PHASE_CORE_WEIGHT: f64 = 0.6;
const PHASE_BLEND: f64 = 0.75;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WinBreakdown {
    pub power_edge: f64,
    pub core_penalty_blue: f64,
    pub core_penalty_red: f64,
    pub core_penalty_edge: f64,
    pub damage_balance_edge: f64,
    pub archetype_edge: f64,
    pub scaling_edge: f64,
    pub volatility_edge: f64,
    pub base: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinRate {
    pub blue_win: f64,
    pub breakdown: WinBreakdown,
}

/// Blue win percentage per game phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseProjection {
    pub early: f64,
    pub mid: f64,
    pub late: f64,
}

pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(MIN_WIN, MAX_WIN)
}

/// Tiered penalty for a side missing damage, frontline or crowd control.
pub fn core_penalty(stats: &TeamStats) -> f64 {
    let mut penalty = 0.0;
    if stats.damage < 25.0 {
        penalty -= 16.0 + (25.0 - stats.damage) * 1.5;
    }
    if stats.tank < 20.0 {
        penalty -= 16.0 + (20.0 - stats.tank) * 1.5;
    }
    if stats.cc <= 7.0 {
        penalty -= 14.0 + (7.0 - stats.cc) * 2.5;
    }
    penalty
}

/// Zero or negative. Grows as one damage type takes over the team's power.
pub fn damage_balance(stats: &TeamStats) -> f64 {
    let total = stats.ad_power + stats.ap_power;
    if total <= 0.0 {
        return 0.0;
    }
    let ratio = stats.ad_power.max(stats.ap_power) / total;
    let mut penalty = 0.0;
    if ratio > 0.65 {
        penalty += 8.0;
    }
    if ratio > 0.8 {
        penalty += 15.0;
    }
    if ratio > 0.9 {
        penalty += 25.0;
    }
    -penalty
}

/// Signed counter bonus for blue when one dominant archetype beats the other.
pub fn archetype_edge(blue: (Archetype, f64), red: (Archetype, f64)) -> f64 {
    let impact = |winner: f64, loser: f64| {
        let sum = (winner + loser) * 1.05;
        let diff = (winner - loser) * 2.1;
        (2.0 + sum + diff).clamp(0.0, 30.0)
    };
    if blue.0 == red.0 {
        0.0
    } else if blue.0.beats() == red.0 {
        impact(blue.1, red.1)
    } else if red.0.beats() == blue.0 {
        -impact(red.1, blue.1)
    } else {
        0.0
    }
}

fn curve_score(stats: &TeamStats) -> f64 {
    stats.early * 0.8 + stats.mid * 1.0 + stats.late * 1.2
}

pub fn scaling_edge(blue: &TeamStats, red: &TeamStats) -> f64 {
    (curve_score(blue) - curve_score(red)) * SCALING_WEIGHT
}

/// Extra swing in the direction the three edges point, capped at 12.
/// Edges that cancel out exactly carry no swing.
pub fn volatility_edge(power: f64, archetype: f64, scaling: f64) -> f64 {
    let magnitude = power.abs() * 0.075 + archetype.abs() * 0.32 + scaling.abs() * 0.85;
    let direction = power + archetype + scaling;
    let swing = magnitude.min(VOLATILITY_CAP);
    if direction > 0.0 {
        swing
    } else if direction < 0.0 {
        -swing
    } else {
        0.0
    }
}

fn edges_to_win(power: f64, balance: f64, archetype: f64) -> f64 {
    clamp_percent(50.0 + power * POWER_WEIGHT + balance + archetype * ARCHETYPE_WEIGHT)
}

fn power_score(stats: &TeamStats) -> f64 {
    stats.damage + stats.tank + stats.cc * 3.0
}

pub fn compute_win_rate(blue: &TeamStats, red: &TeamStats) -> WinRate {
    let power_edge = power_score(blue) - power_score(red);
    let core_penalty_blue = core_penalty(blue);
    let core_penalty_red = core_penalty(red);
    let core_penalty_edge = core_penalty_blue - core_penalty_red;
    let damage_balance_edge = damage_balance(blue) - damage_balance(red);
    let archetype_edge = archetype_edge(blue.dominant_archetype(), red.dominant_archetype());
    let scaling_edge = scaling_edge(blue, red);
    let volatility_edge = volatility_edge(power_edge, archetype_edge, scaling_edge);
    let base = edges_to_win(power_edge, damage_balance_edge, archetype_edge);

    WinRate {
        blue_win: clamp_percent(base + core_penalty_edge + scaling_edge + volatility_edge),
        breakdown: WinBreakdown {
            power_edge,
            core_penalty_blue,
            core_penalty_red,
            core_penalty_edge,
            damage_balance_edge,
            archetype_edge,
            scaling_edge,
            volatility_edge,
            base,
        },
    }
}

/// Early, mid and late blue win percentages, each pulled a quarter of the
/// way toward `overall`.
pub fn project_phases(blue: &TeamStats, red: &TeamStats, overall: f64) -> PhaseProjection {
    let balance = damage_balance(blue) - damage_balance(red);
    let archetype = archetype_edge(blue.dominant_archetype(), red.dominant_archetype());
    let core = (core_penalty(blue) - core_penalty(red)) * PHASE_CORE_WEIGHT;

    let phase = |b: f64, r: f64| {
        let power = (b * 2.0 + blue.cc * 3.0) - (r * 2.0 + red.cc * 3.0);
        let raw = edges_to_win(power, balance, archetype) + core;
        clamp_percent(raw * PHASE_BLEND + overall * (1.0 - PHASE_BLEND))
    };

    PhaseProjection {
        early: phase(blue.early, red.early),
        mid: phase(blue.mid, red.mid),
        late: phase(blue.late, red.late),
    }
}
