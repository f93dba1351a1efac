use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

/// Lane role a champion can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "TOP")]
    Top,
    #[serde(rename = "JNG", alias = "JUNGLE")]
    Jungle,
    #[serde(rename = "MID")]
    Mid,
    #[serde(rename = "ADC", alias = "BOT")]
    Adc,
    #[serde(rename = "SPT", alias = "SUPPORT")]
    Support,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Top,
        Position::Jungle,
        Position::Mid,
        Position::Adc,
        Position::Support,
    ];

    pub fn index(self) -> usize {
        match self {
            Position::Top => 0,
            Position::Jungle => 1,
            Position::Mid => 2,
            Position::Adc => 3,
            Position::Support => 4,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "TOP" => Some(Position::Top),
            "JNG" | "JUNGLE" => Some(Position::Jungle),
            "MID" | "MIDDLE" => Some(Position::Mid),
            "ADC" | "BOT" | "BOTTOM" => Some(Position::Adc),
            "SPT" | "SUP" | "SUPPORT" | "UTILITY" => Some(Position::Support),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::Top => "TOP",
            Position::Jungle => "JNG",
            Position::Mid => "MID",
            Position::Adc => "ADC",
            Position::Support => "SPT",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rock-paper-scissors combat style. Dive beats Poke, Poke beats Anti,
/// Anti beats Dive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Dive,
    Poke,
    Anti,
}

impl Archetype {
    /// Enumeration order doubles as the tie-break order for dominance.
    pub const ALL: [Archetype; 3] = [Archetype::Dive, Archetype::Poke, Archetype::Anti];

    pub fn beats(self) -> Archetype {
        match self {
            Archetype::Dive => Archetype::Poke,
            Archetype::Poke => Archetype::Anti,
            Archetype::Anti => Archetype::Dive,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "dive" => Some(Archetype::Dive),
            "poke" => Some(Archetype::Poke),
            "anti" => Some(Archetype::Anti),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Archetype::Dive => "Dive",
            Archetype::Poke => "Poke",
            Archetype::Anti => "Anti",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magic,
    Hybrid,
}

impl DamageType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "AD" | "PHYSICAL" => Some(DamageType::Physical),
            "AP" | "MAGIC" => Some(DamageType::Magic),
            "HYBRID" => Some(DamageType::Hybrid),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DamageType::Physical => "AD",
            DamageType::Magic => "AP",
            DamageType::Hybrid => "Hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Early,
    Mid,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerCurve {
    pub early: u8,
    pub mid: u8,
    pub late: u8,
}

impl PowerCurve {
    pub fn get(&self, phase: Phase) -> u8 {
        match phase {
            Phase::Early => self.early,
            Phase::Mid => self.mid,
            Phase::Late => self.late,
        }
    }

    pub fn peak_value(&self) -> u8 {
        self.early.max(self.mid).max(self.late)
    }

    /// Strongest phase; ties resolve toward the earlier phase.
    pub fn peak_phase(&self) -> Phase {
        if self.early >= self.mid && self.early >= self.late {
            Phase::Early
        } else if self.mid >= self.late {
            Phase::Mid
        } else {
            Phase::Late
        }
    }
}

/// Canonical, validated catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub key: String,
    pub name: String,
    pub positions: Vec<Position>,
    pub cc: u8,
    pub damage: u8,
    pub tank: u8,
    pub archetype: Archetype,
    pub intensity: u8,
    pub damage_type: DamageType,
    pub curve: PowerCurve,
}

impl Champion {
    pub fn can_play(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }

    pub fn primary_position(&self) -> Position {
        self.positions.first().copied().unwrap_or(Position::Mid)
    }

    /// Frontline champions have more tank than damage.
    pub fn is_tanker(&self) -> bool {
        self.damage < self.tank
    }
}

/// A field the normalizer had to repair.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub raw: String,
    pub fallback: String,
}

const DEFAULT_CC: u8 = 1;
const DEFAULT_RATING: u8 = 6;
const DEFAULT_INTENSITY: u8 = 2;

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn describe(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "missing".to_string())
}

fn clamped_int(
    issues: &mut Vec<FieldIssue>,
    field: &'static str,
    value: Option<&Value>,
    min: u8,
    max: u8,
    fallback: u8,
) -> u8 {
    let out = match finite_number(value) {
        Some(v) => v.round().clamp(min as f64, max as f64) as u8,
        None => fallback,
    };
    if finite_number(value) != Some(out as f64) {
        issues.push(FieldIssue {
            field,
            raw: describe(value),
            fallback: out.to_string(),
        });
    }
    out
}

/// Validate a raw record, reporting every field that needed a default or a
/// clamp. Never fails.
pub fn normalize_champion_report(key: &str, raw: &Value) -> (Champion, Vec<FieldIssue>) {
    let mut issues = Vec::new();

    let raw_name = raw.get("name");
    let name = match raw_name.and_then(Value::as_str).map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            issues.push(FieldIssue {
                field: "name",
                raw: describe(raw_name),
                fallback: key.to_string(),
            });
            key.to_string()
        }
    };

    let raw_pos = raw.get("pos").or_else(|| raw.get("positions"));
    let mut positions: Vec<Position> = Vec::new();
    let mut pos_dirty = false;
    match raw_pos.and_then(Value::as_array) {
        Some(entries) => {
            for entry in entries {
                match entry.as_str().and_then(Position::parse) {
                    Some(p) if !positions.contains(&p) => positions.push(p),
                    Some(_) => {}
                    None => pos_dirty = true,
                }
            }
        }
        None => pos_dirty = true,
    }
    if positions.is_empty() {
        positions.push(Position::Mid);
        pos_dirty = true;
    }
    if pos_dirty {
        issues.push(FieldIssue {
            field: "pos",
            raw: describe(raw_pos),
            fallback: positions
                .iter()
                .map(|p| p.code())
                .collect::<Vec<_>>()
                .join(","),
        });
    }

    let cc = clamped_int(&mut issues, "cc", raw.get("cc"), 0, 3, DEFAULT_CC);
    let damage = clamped_int(&mut issues, "dmg", raw.get("dmg"), 1, 10, DEFAULT_RATING);
    let tank = clamped_int(&mut issues, "tank", raw.get("tank"), 1, 10, DEFAULT_RATING);

    let profile = raw.get("profile");
    let raw_type = profile.and_then(|p| p.get("type"));
    let archetype = match raw_type.and_then(Value::as_str).and_then(Archetype::parse) {
        Some(a) => a,
        None => {
            issues.push(FieldIssue {
                field: "profile.type",
                raw: describe(raw_type),
                fallback: Archetype::Dive.label().to_string(),
            });
            Archetype::Dive
        }
    };
    let intensity = clamped_int(
        &mut issues,
        "profile.scale",
        profile.and_then(|p| p.get("scale")),
        1,
        3,
        DEFAULT_INTENSITY,
    );

    let raw_dmg_type = raw.get("dmgType");
    let damage_type = match raw_dmg_type.and_then(Value::as_str).and_then(DamageType::parse) {
        Some(d) => d,
        None => {
            issues.push(FieldIssue {
                field: "dmgType",
                raw: describe(raw_dmg_type),
                fallback: DamageType::Physical.code().to_string(),
            });
            DamageType::Physical
        }
    };

    let phase = raw.get("phase");
    let curve = PowerCurve {
        early: clamped_int(&mut issues, "phase.early", phase.and_then(|p| p.get("early")), 1, 10, DEFAULT_RATING),
        mid: clamped_int(&mut issues, "phase.mid", phase.and_then(|p| p.get("mid")), 1, 10, DEFAULT_RATING),
        late: clamped_int(&mut issues, "phase.late", phase.and_then(|p| p.get("late")), 1, 10, DEFAULT_RATING),
    };

    let champion = Champion {
        key: key.to_string(),
        name,
        positions,
        cc,
        damage,
        tank,
        archetype,
        intensity,
        damage_type,
        curve,
    };
    (champion, issues)
}

/// Normalize a raw record, logging a warning for each repaired field.
pub fn normalize_champion(key: &str, raw: &Value) -> Champion {
    let (champion, issues) = normalize_champion_report(key, raw);
    for issue in &issues {
        warn!(
            champion = key,
            field = issue.field,
            raw = %issue.raw,
            fallback = %issue.fallback,
            "invalid champion field, using default"
        );
    }
    champion
}

/// Lowercase and drop everything but letters and digits, so "Kai'Sa",
/// "kaisa" and "Kai Sa" compare equal.
pub fn name_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Read-only champion catalog, iterated in key order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    champions: BTreeMap<String, Champion>,
    by_token: HashMap<String, String>,
}

impl Catalog {
    pub fn from_champions(champions: impl IntoIterator<Item = Champion>) -> Self {
        let mut catalog = Catalog::default();
        for champion in champions {
            catalog.by_token.insert(name_token(&champion.name), champion.key.clone());
            catalog.champions.insert(champion.key.clone(), champion);
        }
        // Keys win over display names when both tokenize the same.
        for key in catalog.champions.keys() {
            catalog.by_token.insert(name_token(key), key.clone());
        }
        catalog
    }

    /// Build from a JSON object keyed by champion key. Every record goes
    /// through the normalizer.
    pub fn from_value(raw: &Value) -> Result<Self, AppError> {
        let entries = raw.as_object().ok_or_else(|| {
            AppError::DataError("champion catalog must be a JSON object keyed by champion".to_string())
        })?;
        Ok(Self::from_champions(
            entries.iter().map(|(key, record)| normalize_champion(key, record)),
        ))
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| AppError::JsonError(format!("Failed to parse champion catalog: {}", e)))?;
        Self::from_value(&raw)
    }

    pub fn get(&self, key: &str) -> Option<&Champion> {
        self.champions.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.champions.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.champions.keys().map(String::as_str)
    }

    pub fn champions(&self) -> impl Iterator<Item = &Champion> {
        self.champions.values()
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }

    /// Resolve a key or display name to its catalog key.
    pub fn resolve(&self, name_or_key: &str) -> Option<&str> {
        if let Some((key, _)) = self.champions.get_key_value(name_or_key) {
            return Some(key.as_str());
        }
        self.by_token.get(&name_token(name_or_key)).map(String::as_str)
    }

    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(|c| c.name.as_str()).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_keeps_valid_record() {
        let raw = json!({
            "name": "Ahri",
            "pos": ["MID"],
            "cc": 2,
            "dmg": 8,
            "tank": 3,
            "profile": { "type": "Dive", "scale": 2 },
            "dmgType": "AP",
            "phase": { "early": 6, "mid": 8, "late": 7 }
        });
        let (champ, issues) = normalize_champion_report("Ahri", &raw);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert_eq!(champ.positions, vec![Position::Mid]);
        assert_eq!(champ.damage_type, DamageType::Magic);
        assert_eq!(champ.curve, PowerCurve { early: 6, mid: 8, late: 7 });
    }

    #[test]
    fn test_normalize_substitutes_defaults_for_empty_record() {
        let (champ, issues) = normalize_champion_report("Mystery", &json!({}));
        assert_eq!(champ.name, "Mystery");
        assert_eq!(champ.positions, vec![Position::Mid]);
        assert_eq!(champ.cc, 1);
        assert_eq!(champ.damage, 6);
        assert_eq!(champ.tank, 6);
        assert_eq!(champ.archetype, Archetype::Dive);
        assert_eq!(champ.intensity, 2);
        assert_eq!(champ.damage_type, DamageType::Physical);
        assert_eq!(champ.curve, PowerCurve { early: 6, mid: 6, late: 6 });
        // name, pos, cc, dmg, tank, type, scale, dmgType, 3 phases
        assert_eq!(issues.len(), 11);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_values() {
        let raw = json!({
            "name": "  Brute ",
            "pos": ["TOP", "NOWHERE", "TOP", "JUNGLE"],
            "cc": 7,
            "dmg": 14,
            "tank": -2,
            "profile": { "type": "poke", "scale": 2.6 },
            "dmgType": "Hybrid",
            "phase": { "early": 0, "mid": "x", "late": 11 }
        });
        let (champ, issues) = normalize_champion_report("Brute", &raw);
        assert_eq!(champ.name, "Brute");
        assert_eq!(champ.positions, vec![Position::Top, Position::Jungle]);
        assert_eq!(champ.cc, 3);
        assert_eq!(champ.damage, 10);
        assert_eq!(champ.tank, 1);
        assert_eq!(champ.archetype, Archetype::Poke);
        assert_eq!(champ.intensity, 3);
        assert_eq!(champ.curve, PowerCurve { early: 1, mid: 6, late: 10 });
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert!(fields.contains(&"pos"));
        assert!(fields.contains(&"phase.mid"));
        assert!(!fields.contains(&"dmgType"));
    }

    #[test]
    fn test_catalog_resolves_names_and_keys() {
        let catalog = Catalog::from_json_str(
            r#"{ "Kaisa": { "name": "Kai'Sa", "pos": ["ADC"] },
                 "LeeSin": { "name": "Lee Sin", "pos": ["JNG"] } }"#,
        )
        .unwrap();
        assert_eq!(catalog.resolve("Kai'Sa"), Some("Kaisa"));
        assert_eq!(catalog.resolve("lee sin"), Some("LeeSin"));
        assert_eq!(catalog.resolve("LeeSin"), Some("LeeSin"));
        assert_eq!(catalog.resolve("Teemo"), None);
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["Kaisa", "LeeSin"]);
    }

    #[test]
    fn test_catalog_rejects_non_object() {
        assert!(Catalog::from_json_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_archetype_cycle() {
        assert_eq!(Archetype::Dive.beats(), Archetype::Poke);
        assert_eq!(Archetype::Poke.beats(), Archetype::Anti);
        assert_eq!(Archetype::Anti.beats(), Archetype::Dive);
    }
}
