use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html};

use super::{first_attr, first_text, none_if_empty, sel, ScrapeError};
use crate::models::RawEvent;

const HEADLINE_SELECTORS: &str =
    ".c-card-event__headline, .c-card-event--result__headline, .c-card-event__title";

const MONTHS: [(&str, u32); 12] = [
    ("Jan", 1),
    ("Feb", 2),
    ("Mar", 3),
    ("Apr", 4),
    ("May", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Aug", 8),
    ("Sep", 9),
    ("Oct", 10),
    ("Nov", 11),
    ("Dec", 12),
];

/// Extract event header records from the events index page.
///
/// The page carries two independent containers (upcoming and past); cards
/// without a resolvable name or date are dropped silently. `today` is
/// threaded in for year inference so the function stays deterministic in
/// tests.
pub fn extract_event_list(html: &str, today: NaiveDate) -> Result<Vec<RawEvent>, ScrapeError> {
    let document = Html::parse_document(html);

    // Candidate cards are filtered by the presence of a headline element;
    // class names on the cards themselves vary too much to rely on.
    let card_sel = sel(".c-card-event--result, .c-card-event, .c-card")?;
    let headline_sel = sel(HEADLINE_SELECTORS)?;

    let mut events = Vec::new();

    for (container_id, is_upcoming) in [("#events-list-upcoming", true), ("#events-list-past", false)]
    {
        let container_sel = sel(container_id)?;
        let Some(container) = document.select(&container_sel).next() else {
            continue;
        };

        for card in container.select(&card_sel) {
            if card.select(&headline_sel).next().is_none() {
                continue;
            }
            if let Some(event) = parse_event_card(&card, is_upcoming, today) {
                events.push(event);
            }
        }
    }

    Ok(events)
}

fn parse_event_card(card: &ElementRef, is_upcoming: bool, today: NaiveDate) -> Option<RawEvent> {
    let name = first_text(card, HEADLINE_SELECTORS);
    if name.is_empty() {
        return None;
    }

    let subtitle = first_text(
        card,
        ".c-card-event__subtitle, .c-card-event--result__subtitle, .field--name-field-subheadline",
    );
    let location = first_text(
        card,
        ".c-card-event__location, .c-card-event--result__location, .field--name-venue",
    );
    let type_text = first_text(
        card,
        ".c-card-event__title-tag, .c-card-event__title, .c-card-event--result__title",
    );

    let date = resolve_event_date(card, is_upcoming, today)?;

    let href = first_attr(
        card,
        "a.c-card-event--result__link, a.c-card-event--result__headline, a.c-card, a",
        "href",
    )
    .unwrap_or_default();
    let ufc_id = slug_from_href(&href).unwrap_or_else(|| synthesize_slug(&name));

    Some(RawEvent {
        ufc_id,
        name,
        subtitle: none_if_empty(subtitle),
        date,
        location: none_if_empty(location),
        type_tag: Some(normalize_event_type(&type_text)),
        is_upcoming,
    })
}

/// Machine-readable date attribute first, then the human date label.
fn resolve_event_date(
    card: &ElementRef,
    is_upcoming: bool,
    today: NaiveDate,
) -> Option<DateTime<Utc>> {
    let attr = first_attr(card, "[data-main-card-datetime]", "data-main-card-datetime")
        .or_else(|| first_attr(card, "[data-main-card-date]", "data-main-card-date"));

    if let Some(parsed) = attr.as_deref().and_then(parse_machine_date) {
        return Some(parsed);
    }

    let raw_label = first_text(card, ".c-card-event__date, .c-card-event--result__date");
    parse_partial_event_date(&raw_label, is_upcoming, today)
}

fn parse_machine_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Parse a label like `"Sat, Dec 13 / 10:00 PM EST / Main Card"`.
///
/// The label carries no year; it is inferred from `today` using the card's
/// upcoming/past status: an upcoming card whose month is more than one month
/// behind the current one belongs to next year, a past card whose month is
/// more than one month ahead belongs to the previous year. Exactly one month
/// behind/ahead stays in the current year.
pub fn parse_partial_event_date(
    raw: &str,
    is_upcoming: bool,
    today: NaiveDate,
) -> Option<DateTime<Utc>> {
    let first_segment = raw.split('/').next()?;
    let core = match first_segment.find(',') {
        Some(idx) => &first_segment[idx + 1..],
        None => first_segment,
    };

    let mut tokens = core.split_whitespace();
    let month_str = tokens.next()?;
    let day: u32 = tokens.next()?.parse().ok()?;
    if day == 0 || day > 31 {
        return None;
    }

    let month = MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == month_str)
        .map(|(_, n)| *n)?;

    let mut year = today.year();
    let current_month = today.month() as i32;
    let month_i = month as i32;

    if is_upcoming && month_i < current_month - 1 {
        year += 1;
    }
    if !is_upcoming && month_i > current_month + 1 {
        year -= 1;
    }

    // Invalid calendar dates (e.g. Feb 31) drop the card.
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Normalize the raw card tag into `PPV` / `Fight Night` / raw / `Event`.
pub fn normalize_event_type(raw: &str) -> String {
    let t = raw.to_lowercase();
    if t.contains("ppv") {
        "PPV".to_string()
    } else if t.contains("fight night") {
        "Fight Night".to_string()
    } else if !raw.trim().is_empty() {
        raw.trim().to_string()
    } else {
        "Event".to_string()
    }
}

fn slug_from_href(href: &str) -> Option<String> {
    href.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

fn synthesize_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
