use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fighter from the public fighters directory, keyed by its stable slug.
///
/// `external_id` is the only public cross-reference key; storage internals
/// never leak into the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fighter {
    pub external_id: String,
    pub name: String,
    pub weight_class: String,
    pub country: Option<String>,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    pub nickname: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a fighter; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FighterUpdate {
    pub name: Option<String>,
    pub weight_class: Option<String>,
    pub country: Option<String>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
    pub draws: Option<i32>,
    pub nickname: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for manually creating a fighter. Required fields are checked
/// by the handler so missing ones map to a 400, not a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFighter {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub weight_class: Option<String>,
    pub country: Option<String>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
    pub draws: Option<i32>,
    pub nickname: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

/// The card tier a bout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardSection {
    #[serde(rename = "Main Card")]
    MainCard,
    Prelims,
    #[serde(rename = "Early Prelims")]
    EarlyPrelims,
    Unknown,
}

impl fmt::Display for CardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CardSection::MainCard => "Main Card",
            CardSection::Prelims => "Prelims",
            CardSection::EarlyPrelims => "Early Prelims",
            CardSection::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of a concluded bout as marked up on the event page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WinnerSide {
    Red,
    Blue,
    Draw,
    NoContest,
}

/// One bout on an event's fight card. Lives embedded in [`UfcEvent`]; it has
/// no identity of its own beyond `{ufc_id}-{bout_order}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFight {
    pub id: String,
    /// 1 = main event; dense 1..N in document order.
    pub bout_order: u32,
    pub weight_class: Option<String>,
    /// Never empty in storage; unresolved corners hold "TBD".
    pub red_name: String,
    pub blue_name: String,
    pub red_rank: Option<i32>,
    pub blue_rank: Option<i32>,
    pub red_country: Option<String>,
    pub blue_country: Option<String>,
    pub red_country_code: Option<String>,
    pub blue_country_code: Option<String>,
    pub red_image_url: Option<String>,
    pub blue_image_url: Option<String>,
    pub card_section: CardSection,
    /// True iff no per-fighter markup resolved either corner, regardless of
    /// whether the event-title fallback later supplied names.
    pub is_placeholder: bool,
    pub fight_bonus: Option<String>,
    pub result_round: Option<u32>,
    pub result_method: Option<String>,
    pub result_time: Option<String>,
    pub winner_side: Option<WinnerSide>,
}

/// An event header plus its (possibly not-yet-refreshed) fight card.
///
/// `fights` empty with `last_details_refreshed_at` unset means "never
/// refreshed"; empty with the timestamp set means "refreshed, zero bouts".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UfcEvent {
    pub ufc_id: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    /// Set at scrape time; re-evaluated only by the next list refresh.
    pub is_upcoming: bool,
    pub fights: Vec<EventFight>,
    pub last_details_refreshed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event header record as extracted from the events index page, before any
/// storage timestamps exist.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub ufc_id: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub type_tag: Option<String>,
    pub is_upcoming: bool,
}

/// One entry in a division's ranking table. The champion carries rank 0 and
/// rank text "C".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterRank {
    pub rank: Option<i32>,
    pub rank_text: Option<String>,
    pub is_champion: bool,
    pub name: String,
}

/// A weight-class division with its champion and ordered top-15 list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub division: String,
    pub champion: Option<FighterRank>,
    pub fighters: Vec<FighterRank>,
}

/// The complete rankings as of one scrape; always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsSnapshot {
    pub divisions: Vec<Division>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Counts reported by an event-list refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListRefresh {
    pub upcoming_count: usize,
    pub past_count: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRefreshError {
    pub ufc_id: String,
    pub error: String,
}

/// Summary of a bulk details refresh; the batch itself always completes,
/// per-event failures land in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRefreshReport {
    pub total_events: usize,
    pub updated_count: usize,
    pub failed_count: usize,
    pub errors: Vec<BulkRefreshError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fight_wire_shape() {
        let fight = EventFight {
            id: "ufc-300-1".to_string(),
            bout_order: 1,
            weight_class: Some("Lightweight".to_string()),
            red_name: "Alpha".to_string(),
            blue_name: "Bravo".to_string(),
            red_rank: Some(3),
            blue_rank: None,
            red_country: None,
            blue_country: None,
            red_country_code: None,
            blue_country_code: None,
            red_image_url: None,
            blue_image_url: None,
            card_section: CardSection::MainCard,
            is_placeholder: false,
            fight_bonus: None,
            result_round: None,
            result_method: None,
            result_time: None,
            winner_side: Some(WinnerSide::NoContest),
        };

        let json = serde_json::to_value(&fight).unwrap();
        assert_eq!(json["boutOrder"], 1);
        assert_eq!(json["redName"], "Alpha");
        assert_eq!(json["cardSection"], "Main Card");
        assert_eq!(json["winnerSide"], "no-contest");
        assert_eq!(json["isPlaceholder"], false);
    }

    #[test]
    fn test_event_type_field_renamed() {
        let now = Utc::now();
        let event = UfcEvent {
            ufc_id: "ufc-300".to_string(),
            name: "UFC 300".to_string(),
            subtitle: None,
            date: now,
            location: None,
            type_tag: Some("PPV".to_string()),
            is_upcoming: true,
            fights: vec![],
            last_details_refreshed_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PPV");
        assert_eq!(json["isUpcoming"], true);
        assert!(json["lastDetailsRefreshedAt"].is_null());
    }

    #[test]
    fn test_winner_side_round_trip() {
        for (side, wire) in [
            (WinnerSide::Red, "\"red\""),
            (WinnerSide::Blue, "\"blue\""),
            (WinnerSide::Draw, "\"draw\""),
            (WinnerSide::NoContest, "\"no-contest\""),
        ] {
            assert_eq!(serde_json::to_string(&side).unwrap(), wire);
            assert_eq!(serde_json::from_str::<WinnerSide>(wire).unwrap(), side);
        }
    }
}
