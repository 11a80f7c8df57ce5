use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A scheduled or finished fixture as reported by the fixtures service.
///
/// The serialized form keeps the service's field names, and any fields this
/// type does not model are carried in `extra` so a stored favorite
/// round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "idEvent")]
    pub id_event: String,
    #[serde(rename = "strEvent", default)]
    pub name: Option<String>,
    #[serde(rename = "idLeague", default)]
    pub league_id: Option<String>,
    #[serde(rename = "strLeague", default)]
    pub league: Option<String>,
    #[serde(rename = "strSeason", default)]
    pub season: Option<String>,
    #[serde(rename = "strHomeTeam", default)]
    pub home_team: Option<String>,
    #[serde(rename = "strAwayTeam", default)]
    pub away_team: Option<String>,
    #[serde(rename = "dateEvent", default)]
    pub date: Option<String>,
    #[serde(rename = "strTime", default)]
    pub time: Option<String>,
    #[serde(rename = "strVenue", default)]
    pub venue: Option<String>,
    #[serde(rename = "strStatus", default)]
    pub status: Option<String>,
    #[serde(rename = "intHomeScore", default, deserialize_with = "string_or_number")]
    pub home_score: Option<String>,
    #[serde(rename = "intAwayScore", default, deserialize_with = "string_or_number")]
    pub away_score: Option<String>,
    #[serde(rename = "strDescriptionEN", default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A match the user has marked as a favorite.
pub type FavoriteMatch = Match;

impl Match {
    /// Minimal fixture with only an identifier and the two teams.
    pub fn new(
        id_event: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        Self {
            id_event: id_event.into(),
            name: None,
            league_id: None,
            league: None,
            season: None,
            home_team: Some(home_team.into()),
            away_team: Some(away_team.into()),
            date: None,
            time: None,
            venue: None,
            status: None,
            home_score: None,
            away_score: None,
            description: None,
            extra: Map::new(),
        }
    }

    /// "Home vs Away", falling back to the event name.
    pub fn title(&self) -> String {
        match (self.home_team.as_deref(), self.away_team.as_deref()) {
            (Some(home), Some(away)) => format!("{home} vs {away}"),
            _ => self
                .name
                .clone()
                .unwrap_or_else(|| format!("Event {}", self.id_event)),
        }
    }

    /// Final or live score, when both sides have one.
    pub fn score(&self) -> Option<(u32, u32)> {
        let home = self.home_score.as_deref()?.trim().parse().ok()?;
        let away = self.away_score.as_deref()?.trim().parse().ok()?;
        Some((home, away))
    }
}

/// Scores arrive as strings, numbers or null depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
