use matchday_core::models::{Match, UserProfile};
use matchday_runtime::Route;

pub fn route(route: Route) -> &'static str {
    match route {
        Route::Loading => "loading",
        Route::Unauthenticated => "signed out",
        Route::Authenticated => "signed in",
    }
}

pub fn profile(user: &UserProfile) -> String {
    let mut out = format!("{} (@{}, id {})", user.display_name(), user.username, user.id);
    if !user.email.is_empty() {
        out.push_str(&format!(" <{}>", user.email));
    }
    out
}

/// One-line summary: id, kickoff, teams and score when known.
pub fn match_line(m: &Match) -> String {
    let when = match (m.date.as_deref(), m.time.as_deref()) {
        (Some(date), Some(time)) => format!("{date} {}", short_time(time)),
        (Some(date), None) => date.to_string(),
        _ => "TBD".to_string(),
    };
    let score = m
        .score()
        .map(|(home, away)| format!("  {home}-{away}"))
        .unwrap_or_default();
    format!("{:>8}  {when:<16}  {}{score}", m.id_event, m.title())
}

pub fn match_details(m: &Match) -> String {
    let mut lines = vec![m.title()];
    let fields = [
        ("League", m.league.as_deref()),
        ("Season", m.season.as_deref()),
        ("Date", m.date.as_deref()),
        ("Time", m.time.as_deref()),
        ("Venue", m.venue.as_deref()),
        ("Status", m.status.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!("  {label:<7} {value}"));
        }
    }
    if let Some((home, away)) = m.score() {
        lines.push(format!("  {:<7} {home}-{away}", "Score"));
    }
    if let Some(desc) = m.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(desc.to_string());
    }
    lines.join("\n")
}

/// "15:00:00" -> "15:00".
fn short_time(time: &str) -> &str {
    match time.char_indices().filter(|(_, c)| *c == ':').nth(1) {
        Some((idx, _)) => &time[..idx],
        None => time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_time() {
        assert_eq!(short_time("15:00:00"), "15:00");
        assert_eq!(short_time("15:00"), "15:00");
        assert_eq!(short_time(""), "");
    }

    #[test]
    fn test_match_line_with_score() {
        let mut m = Match::new("441613", "Arsenal", "Chelsea");
        m.date = Some("2024-10-05".into());
        m.time = Some("14:00:00".into());
        m.home_score = Some("2".into());
        m.away_score = Some("1".into());
        assert_eq!(
            match_line(&m),
            "  441613  2024-10-05 14:00  Arsenal vs Chelsea  2-1"
        );
    }

    #[test]
    fn test_match_line_without_date() {
        let m = Match::new("7", "Arsenal", "Chelsea");
        assert!(match_line(&m).contains("TBD"));
    }
}
