use crate::analysis::strategy::Style;
use crate::error::AppError;
use crate::model::champion::{Catalog, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use tracing::warn;

pub const TEAM_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Blue, Side::Red];

    pub fn opponent(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    /// Convert a blue-side win percentage into this side's perspective.
    pub fn perspective(self, blue_win: f64) -> f64 {
        match self {
            Side::Blue => blue_win,
            Side::Red => 100.0 - blue_win,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "blue" => Some(Side::Blue),
            "red" => Some(Side::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Blue => f.write_str("BLUE"),
            Side::Red => f.write_str("RED"),
        }
    }
}

/// One value per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerSide<T> {
    pub blue: T,
    pub red: T,
}

impl<T> PerSide<T> {
    pub fn new(blue: T, red: T) -> Self {
        PerSide { blue, red }
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        PerSide {
            blue: f(Side::Blue),
            red: f(Side::Red),
        }
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Blue => &mut self.blue,
            Side::Red => &mut self.red,
        }
    }
}

/// Bans and picks of one side in one game. Pick slots follow draft order,
/// not lane role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSlate {
    pub bans: [Option<String>; TEAM_SIZE],
    pub picks: [Option<String>; TEAM_SIZE],
}

impl TeamSlate {
    pub fn picked_keys(&self) -> Vec<&str> {
        self.picks.iter().flatten().map(String::as_str).collect()
    }

    pub fn banned_keys(&self) -> Vec<&str> {
        self.bans.iter().flatten().map(String::as_str).collect()
    }

    pub fn has_picked(&self, key: &str) -> bool {
        self.picks.iter().flatten().any(|k| k == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.has_picked(key) || self.bans.iter().flatten().any(|k| k == key)
    }

    pub fn first_open_pick(&self) -> Option<usize> {
        self.picks.iter().position(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub nick: String,
    /// Catalog keys, resolved when the roster is loaded.
    pub signature: Vec<String>,
}

impl Player {
    pub fn has_signature(&self, key: &str) -> bool {
        self.signature.iter().any(|k| k == key)
    }
}

/// A team's preferred style and its rostered player per role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgProfile {
    pub id: String,
    pub name: String,
    pub style: Style,
    pub roster: BTreeMap<Position, Player>,
}

impl OrgProfile {
    pub fn player_at(&self, position: Position) -> Option<&Player> {
        self.roster.get(&position)
    }
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    nick: String,
    #[serde(default)]
    signature: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawOrgProfile {
    id: String,
    name: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    roster: BTreeMap<String, RawPlayer>,
}

/// Parse a JSON array of org profiles, resolving signature champion names to
/// catalog keys once. Unknown roles and names are dropped with a warning.
pub fn load_org_profiles(content: &str, catalog: &Catalog) -> Result<Vec<OrgProfile>, AppError> {
    let raw: Vec<RawOrgProfile> = serde_json::from_str(content)
        .map_err(|e| AppError::JsonError(format!("Failed to parse team profiles: {}", e)))?;

    let profiles = raw
        .into_iter()
        .map(|team| {
            let style = match team.style.as_deref() {
                None => Style::General,
                Some(s) => Style::parse(s).unwrap_or_else(|| {
                    warn!(team = %team.id, style = s, "unknown team style, using General");
                    Style::General
                }),
            };
            let mut roster = BTreeMap::new();
            for (role, player) in team.roster {
                let Some(position) = Position::parse(&role) else {
                    warn!(team = %team.id, role = %role, "unknown roster role");
                    continue;
                };
                let signature = player
                    .signature
                    .iter()
                    .filter_map(|name| {
                        let key = catalog.resolve(name);
                        if key.is_none() {
                            warn!(team = %team.id, player = %player.nick, champion = %name, "unresolved signature champion");
                        }
                        key.map(str::to_string)
                    })
                    .collect();
                roster.insert(
                    position,
                    Player {
                        nick: player.nick,
                        signature,
                    },
                );
            }
            OrgProfile {
                id: team.id,
                name: team.name,
                style,
                roster,
            }
        })
        .collect();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::demo_catalog;

    #[test]
    fn test_perspective_flips_for_red() {
        assert_eq!(Side::Blue.perspective(62.5), 62.5);
        assert_eq!(Side::Red.perspective(62.5), 37.5);
        assert_eq!(Side::Red.opponent(), Side::Blue);
    }

    #[test]
    fn test_slate_queries() {
        let mut slate = TeamSlate::default();
        slate.picks[0] = Some("Ahri".to_string());
        slate.bans[2] = Some("Zed".to_string());
        assert_eq!(slate.picked_keys(), vec!["Ahri"]);
        assert!(slate.contains("Zed"));
        assert!(!slate.has_picked("Zed"));
        assert_eq!(slate.first_open_pick(), Some(1));
    }

    #[test]
    fn test_load_org_profiles_resolves_signatures() {
        let catalog = demo_catalog();
        let content = r#"[{
            "id": "t1", "name": "Test One", "style": "Late",
            "roster": {
                "JNG": { "nick": "Woods", "signature": ["Lee Sin", "Nobody"] },
                "BENCH": { "nick": "Sub" }
            }
        }]"#;
        let profiles = load_org_profiles(content, &catalog).unwrap();
        assert_eq!(profiles.len(), 1);
        let team = &profiles[0];
        assert_eq!(team.style, Style::Late);
        assert_eq!(team.roster.len(), 1);
        let jungler = team.player_at(Position::Jungle).unwrap();
        assert_eq!(jungler.signature, vec!["LeeSin".to_string()]);
        assert!(jungler.has_signature("LeeSin"));
    }

    #[test]
    fn test_bundled_team_file_loads() {
        let catalog = demo_catalog();
        let profiles = load_org_profiles(include_str!("../../data/teams.json"), &catalog).unwrap();
        assert_eq!(profiles.len(), 8);
        for team in &profiles {
            assert_eq!(team.roster.len(), 5);
            for player in team.roster.values() {
                assert_eq!(player.signature.len(), 2, "{} lost a signature", player.nick);
            }
        }
    }
}
