use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use super::{element_text, first_attr, first_text, none_if_empty, sel, squash_ws, ScrapeError};
use crate::models::{CardSection, EventFight, WinnerSide};

const UFC_ORIGIN: &str = "https://www.ufc.com";

/// Strings that never stand for a real fighter name.
const BAD_CORNER_PATTERNS: [&str; 5] = [
    "red corner",
    "blue corner",
    "full body silhouette image",
    "silhouette image",
    "corner image",
];

/// Noise phrases stripped from image alt text before treating it as a name.
/// Some corner images only describe the picture, not the athlete.
const ALT_NOISE_PHRASES: [&str; 21] = [
    "facing left",
    "facing right",
    "standing",
    "profile",
    "portrait",
    "head shot",
    "headshot",
    "upper body",
    "full body",
    "silhouette",
    "image",
    "photo",
    "picture",
    "middleweight",
    "lightweight",
    "heavyweight",
    "featherweight",
    "bantamweight",
    "flyweight",
    "welterweight",
    "strawweight",
];

const HEADING_SELECTORS: &str = "h2, h3, \
    .c-card-event--fight-card__headline, \
    .c-card-event--fight-card__subheadline, \
    .c-card-event--fight-card__header, \
    .c-card-event--fight-card__title, \
    .c-card-event--fight-card__subtitle";

const BOUT_SELECTORS: &str = ".c-listing-fight, .c-card-event--fight-card__item";

const BONUS_BANNER_SELECTORS: [&str; 10] = [
    ".c-listing-fight__banner--award .text",
    ".c-listing-fight__banner--award span",
    ".c-listing-fight__banner--award",
    ".c-listing-fight__award-banner",
    ".c-listing-fight__bonus",
    "[class*='banner'][class*='award']",
    "[class*='award']",
    "[class*='bonus']",
    "[class*='fight-of-the-night']",
    "[class*='performance-of-the-night']",
];

/// Extract the ordered bout list from an event detail page.
///
/// Fails only on total structural failure; a page with zero bout-like nodes
/// yields an empty list. `event_name_fallback` feeds the last-resort name
/// inference for the main event on degraded pages.
pub fn extract_fight_card(
    html: &str,
    ufc_id: &str,
    event_name_fallback: Option<&str>,
) -> Result<Vec<EventFight>, ScrapeError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    // Prioritized container fallbacks tolerate markup drift on the site.
    let mut container = None;
    for selectors in [
        ".c-card-event--fight-card",
        ".view-grouping-content",
        ".l-page__content",
    ] {
        let selector = sel(selectors)?;
        if let Some(found) = root.select(&selector).next() {
            container = Some(found);
            break;
        }
    }
    let container = container.unwrap_or(root);

    // The ticker widget lists fighters in reverse bout order; it is only a
    // name fallback because it omits undercard placeholder bouts.
    let ticker_red = collect_ticker_names(
        &root,
        ".c-listing-ticker_fightcard_red_corner_name, .c-listing-ticker-fightcard__red_corner_name",
    )?;
    let ticker_blue = collect_ticker_names(
        &root,
        ".c-listing-ticker_fightcard_blue_corner_name, .c-listing-ticker-fightcard__blue_corner_name",
    )?;

    let heading_sel = sel(HEADING_SELECTORS)?;
    let walk_sel = sel(&format!("{HEADING_SELECTORS}, {BOUT_SELECTORS}"))?;
    let listing_sel = sel(".c-listing-fight")?;

    let mut fights = Vec::new();
    let mut current_section = CardSection::Unknown;
    let mut bout_order: u32 = 0;
    let mut seen = HashSet::new();

    for node in container.select(&walk_sel) {
        if heading_sel.matches(&node) {
            let text = element_text(&node);
            if !text.is_empty() {
                current_section = detect_section_from_heading(&text);
            }
            continue;
        }

        // An item wrapper and the listing node inside it are the same bout.
        let fight_node = if listing_sel.matches(&node) {
            node
        } else {
            node.select(&listing_sel).next().unwrap_or(node)
        };
        if !seen.insert(fight_node.id()) {
            continue;
        }

        bout_order += 1;
        let ticker_index = (bout_order - 1) as usize;
        fights.push(extract_bout(
            &fight_node,
            ufc_id,
            bout_order,
            current_section,
            event_name_fallback,
            ticker_red.get(ticker_index).map(String::as_str),
            ticker_blue.get(ticker_index).map(String::as_str),
        )?);
    }

    Ok(fights)
}

fn collect_ticker_names(root: &ElementRef, selectors: &str) -> Result<Vec<String>, ScrapeError> {
    let selector = sel(selectors)?;
    let mut names: Vec<String> = root
        .select(&selector)
        .filter_map(|el| sanitize_fighter_name(&element_text(&el)))
        .collect();
    names.reverse();
    Ok(names)
}

/// Latching section state machine: headings switch the current section, bout
/// nodes inherit it until the next heading.
pub fn detect_section_from_heading(text: &str) -> CardSection {
    let t = text.to_lowercase();
    if t.contains("main card") {
        CardSection::MainCard
    } else if t.contains("early prelim") {
        CardSection::EarlyPrelims
    } else if t.contains("prelim") {
        CardSection::Prelims
    } else {
        CardSection::Unknown
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_bout(
    fight: &ElementRef,
    ufc_id: &str,
    bout_order: u32,
    card_section: CardSection,
    event_name_fallback: Option<&str>,
    ticker_red: Option<&str>,
    ticker_blue: Option<&str>,
) -> Result<EventFight, ScrapeError> {
    let red_corner_sel = sel(".c-listing-fight__corner--red")?;
    let blue_corner_sel = sel(".c-listing-fight__corner--blue")?;
    let red_corner = fight.select(&red_corner_sel).next();
    let blue_corner = fight.select(&blue_corner_sel).next();

    let mut red_name = resolve_corner_name(red_corner.as_ref(), ticker_red);
    let mut blue_name = resolve_corner_name(blue_corner.as_ref(), ticker_blue);

    // Placeholder status reflects the per-fighter markup only; the title
    // fallback below does not clear it.
    let is_placeholder = red_name.is_none() && blue_name.is_none();

    if is_placeholder && bout_order == 1 {
        if let Some((left, right)) = event_name_fallback.and_then(infer_names_from_event_title) {
            red_name = Some(left);
            blue_name = Some(right);
        }
    }

    let weight_class = none_if_empty(normalize_weight_class(&first_text(
        fight,
        ".c-listing-fight__class, .c-card-event--fight-card__weight-text, .c-listing-fight__title",
    )));

    let (red_rank, blue_rank) = extract_corner_ranks(fight);
    let (red_country, red_country_code) = extract_country_info(fight, "red");
    let (blue_country, blue_country_code) = extract_country_info(fight, "blue");
    let outcome = extract_fight_outcome(fight);

    Ok(EventFight {
        id: format!("{ufc_id}-{bout_order}"),
        bout_order,
        weight_class,
        red_name: red_name.unwrap_or_else(|| "TBD".to_string()),
        blue_name: blue_name.unwrap_or_else(|| "TBD".to_string()),
        red_rank,
        blue_rank,
        red_country,
        blue_country,
        red_country_code,
        blue_country_code,
        red_image_url: red_corner.as_ref().and_then(corner_image_url),
        blue_image_url: blue_corner.as_ref().and_then(corner_image_url),
        card_section,
        is_placeholder,
        fight_bonus: outcome.bonus,
        result_round: outcome.round,
        result_method: outcome.method,
        result_time: outcome.time,
        winner_side: outcome.winner,
    })
}

type NameStrategy = fn(&ElementRef) -> Option<String>;

/// Ordered name-resolution strategies; the first one surviving sanitization
/// wins, and the ticker entry is the final fallback.
const NAME_STRATEGIES: [NameStrategy; 5] = [
    name_from_structured_element,
    name_from_athlete_link_text,
    name_from_image_alt,
    name_from_athlete_link_slug,
    name_from_free_text,
];

fn resolve_corner_name(corner: Option<&ElementRef>, ticker_name: Option<&str>) -> Option<String> {
    if let Some(corner) = corner {
        for strategy in NAME_STRATEGIES {
            if let Some(name) = strategy(corner).and_then(|raw| sanitize_fighter_name(&raw)) {
                return Some(name);
            }
        }
    }
    ticker_name.and_then(sanitize_fighter_name)
}

fn corner_body<'a>(corner: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(
        ".c-listing-fight__corner-body--red, .c-listing-fight__corner-body--blue, .c-listing-fight__corner-body",
    )
    .ok()?;
    corner.select(&selector).next()
}

fn name_from_structured_element(corner: &ElementRef) -> Option<String> {
    let body = corner_body(corner)?;
    let selector = Selector::parse(".c-listing-fight__name, .c-listing-fight__person-name").ok()?;
    let text = element_text(&body.select(&selector).next()?);
    none_if_empty(text)
}

fn name_from_athlete_link_text(corner: &ElementRef) -> Option<String> {
    let body = corner_body(corner)?;
    let selector = Selector::parse("a[href*='/athlete/']").ok()?;
    let text = element_text(&body.select(&selector).next()?);
    none_if_empty(text)
}

fn name_from_image_alt(corner: &ElementRef) -> Option<String> {
    let alt = first_attr(corner, "img[alt]", "alt")?;
    none_if_empty(clean_alt(&alt))
}

fn name_from_athlete_link_slug(corner: &ElementRef) -> Option<String> {
    let href = first_attr(corner, "a[href*='/athlete/']", "href")?;
    let slug = href.split('/').filter(|s| !s.is_empty()).last()?;
    let name = slug
        .split('-')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");
    none_if_empty(name)
}

/// Last structured-markup resort: the corner's full text minus known noise
/// tokens, kept only when at least two plausible tokens remain.
fn name_from_free_text(corner: &ElementRef) -> Option<String> {
    let text = element_text(corner);
    let tokens: Vec<&str> = text.split(' ').filter(|tok| !is_noise_token(tok)).collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(tokens.into_iter().take(3).collect::<Vec<_>>().join(" "))
}

fn is_noise_token(token: &str) -> bool {
    matches!(
        token.to_lowercase().as_str(),
        "red" | "blue" | "corner" | "record" | "rank" | "division"
    )
}

/// Whitespace-normalize a candidate name and reject denylisted non-names.
pub fn sanitize_fighter_name(raw: &str) -> Option<String> {
    let trimmed = squash_ws(raw);
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if BAD_CORNER_PATTERNS.iter().any(|p| lower.contains(p)) {
        return None;
    }
    Some(trimmed)
}

/// Strip descriptive noise from an image alt text, keeping letter runs only.
pub fn clean_alt(raw: &str) -> String {
    let mut alt = squash_ws(raw);
    if alt.is_empty() {
        return alt;
    }
    for phrase in ALT_NOISE_PHRASES {
        alt = remove_ci(&alt, phrase);
    }
    let kept: String = alt
        .chars()
        .map(|c| {
            if c.is_alphabetic() || c == '\'' || c == '\u{2019}' || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    squash_ws(&kept)
}

/// Remove every case-insensitive occurrence of an ASCII needle.
fn remove_ci(haystack: &str, needle: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    loop {
        match rest.to_ascii_lowercase().find(needle) {
            Some(idx) => {
                out.push_str(&rest[..idx]);
                out.push(' ');
                rest = &rest[idx + needle.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split an event title like `"Royval vs Kape"` into corner names, only when
/// it contains exactly one `vs` token.
pub fn infer_names_from_event_title(name: &str) -> Option<(String, String)> {
    let lower = name.to_ascii_lowercase();
    let idx = lower.find("vs")?;
    if lower[idx + 2..].contains("vs") {
        return None;
    }
    let left = squash_ws(&name[..idx]);
    let right = squash_ws(name[idx + 2..].trim_start_matches('.'));
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

/// Strip `#N` rank markers and collapse the doubled-label artifact some
/// pages render (the label concatenated with itself).
pub fn normalize_weight_class(raw: &str) -> String {
    let t = squash_ws(&strip_rank_markers(raw));

    let chars: Vec<char> = t.chars().collect();
    let mid = chars.len() / 2;
    let first: String = chars[..mid].iter().collect::<String>().trim().to_string();
    let second: String = chars[mid..].iter().collect::<String>().trim().to_string();
    if !first.is_empty() && first == second {
        return first;
    }
    t
}

fn strip_rank_markers(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            while chars.peek().is_some_and(|n| n.is_ascii_digit()) {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Corner rank badges appear in document order: first red, then blue.
fn extract_corner_ranks(fight: &ElementRef) -> (Option<i32>, Option<i32>) {
    let Ok(selector) = sel(".c-listing-fight__corner-rank") else {
        return (None, None);
    };
    let mut texts = fight.select(&selector).map(|el| element_text(&el));
    let red = texts.next().and_then(|t| parse_rank_text(&t));
    let blue = texts.next().and_then(|t| parse_rank_text(&t));
    (red, blue)
}

fn parse_rank_text(raw: &str) -> Option<i32> {
    raw.trim().trim_start_matches('#').parse().ok()
}

fn corner_image_url(corner: &ElementRef) -> Option<String> {
    let src = first_attr(
        corner,
        "img.image-style-event-fight-card-upper-body-of-standing-athlete",
        "src",
    )?;
    normalize_image_url(&src)
}

fn normalize_image_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }
    if url.starts_with('/') {
        return Some(format!("{UFC_ORIGIN}{url}"));
    }
    Some(format!("{UFC_ORIGIN}/{url}"))
}

fn extract_country_info(fight: &ElementRef, side: &str) -> (Option<String>, Option<String>) {
    let Ok(container_sel) = sel(&format!(".c-listing-fight__country--{side}")) else {
        return (None, None);
    };
    let Some(container) = fight.select(&container_sel).next() else {
        return (None, None);
    };

    let country = none_if_empty(first_text(&container, ".c-listing-fight__country-text"));
    let code = first_attr(&container, "img[src*='/flags/']", "src")
        .and_then(|src| country_code_from_flag_src(&src));
    (country, code)
}

/// The flag image filename stem is the country code: `/flags/BR.svg` -> `BR`.
pub fn country_code_from_flag_src(src: &str) -> Option<String> {
    let idx = src.find("/flags/")?;
    let stem = &src[idx + "/flags/".len()..];
    let end = stem.find('.')?;
    let code = &stem[..end];
    if code.is_empty() || code.contains('/') {
        return None;
    }
    Some(code.to_uppercase())
}

#[derive(Debug, Default)]
struct FightOutcome {
    bonus: Option<String>,
    round: Option<u32>,
    method: Option<String>,
    time: Option<String>,
    winner: Option<WinnerSide>,
}

/// Attempted unconditionally; upcoming fights simply yield all-empty fields.
fn extract_fight_outcome(fight: &ElementRef) -> FightOutcome {
    let (round, method, time) = extract_result_fields(fight);
    FightOutcome {
        bonus: extract_bonus(fight),
        round,
        method,
        time,
        winner: determine_winner(fight),
    }
}

fn extract_bonus(fight: &ElementRef) -> Option<String> {
    let raw = banner_bonus_text(fight)
        .or_else(|| attribute_bonus_text(fight))
        .or_else(|| parent_banner_bonus_text(fight))
        .or_else(|| raw_text_bonus(fight))?;
    canonical_bonus(&raw)
}

fn banner_bonus_text(node: &ElementRef) -> Option<String> {
    for selectors in BONUS_BANNER_SELECTORS {
        let Ok(selector) = sel(selectors) else {
            continue;
        };
        if let Some(el) = node.select(&selector).next() {
            let text = element_text(&el);
            let lower = text.to_lowercase();
            if !text.is_empty() && (lower.contains("fight") || lower.contains("performance")) {
                return Some(text);
            }
        }
    }
    None
}

fn attribute_bonus_text(fight: &ElementRef) -> Option<String> {
    const ATTRIBUTE_PROBES: [(&str, &str); 5] = [
        ("[data-award]", "data-award"),
        ("[aria-label*='fight']", "aria-label"),
        ("[aria-label*='performance']", "aria-label"),
        ("[title*='fight']", "title"),
        ("[title*='performance']", "title"),
    ];
    for (selectors, attr) in ATTRIBUTE_PROBES {
        if let Some(value) = first_attr(fight, selectors, attr) {
            let lower = value.to_lowercase();
            if !value.is_empty() && (lower.contains("fight") || lower.contains("performance")) {
                return Some(value);
            }
        }
    }
    None
}

fn parent_banner_bonus_text(fight: &ElementRef) -> Option<String> {
    let parent = fight.parent().and_then(ElementRef::wrap)?;
    banner_bonus_text(&parent)
}

/// Last resort: scan the bout's full text for award phrasing.
fn raw_text_bonus(fight: &ElementRef) -> Option<String> {
    let text = element_text(fight).to_lowercase();
    if text.contains("fight of the night") {
        return Some("fight of the night".to_string());
    }
    if text.contains("performance of the night") {
        return Some("performance of the night".to_string());
    }
    if text.contains("performance") {
        for marker in ["performance bonus", "performance award", "potn"] {
            if text.contains(marker) {
                return Some("performance of the night".to_string());
            }
        }
    }
    None
}

/// Collapse raw banner text onto one of the two canonical award strings;
/// anything that maps to neither is discarded rather than stored verbatim.
pub fn canonical_bonus(raw: &str) -> Option<String> {
    let normalized = squash_ws(raw).to_lowercase();
    if normalized.contains("fight of the night") {
        return Some("Fight of the Night".to_string());
    }
    if normalized.contains("performance") {
        return Some("Performance of the Night".to_string());
    }
    None
}

/// Label/value pairs in the results block are matched by label substring;
/// their ordering on the page is not stable.
fn extract_result_fields(fight: &ElementRef) -> (Option<u32>, Option<String>, Option<String>) {
    let mut round = None;
    let mut method = None;
    let mut time = None;

    let results_root = [
        ".c-listing-fight__results.c-listing-fight__results--desktop",
        ".c-listing-fight__results",
        "[class*='results']",
    ]
    .iter()
    .find_map(|selectors| {
        let selector = Selector::parse(selectors).ok()?;
        fight.select(&selector).next()
    });

    let Ok(item_sel) = sel(".c-listing-fight__result") else {
        return (None, None, None);
    };
    let scope = results_root.unwrap_or(*fight);

    for item in scope.select(&item_sel) {
        let label = result_part_text(
            &item,
            &[
                ".c-listing-fight__result-label",
                "[class*='result-label']",
                ".c-listing-fight_result-label",
            ],
        );
        let value = result_part_text(
            &item,
            &[
                ".c-listing-fight__result-text",
                "[class*='result-text']",
                ".c-listing-fight_result-text",
            ],
        );
        let (Some(label), Some(value)) = (label, value) else {
            continue;
        };

        let label = label.to_lowercase();
        if label.contains("round") {
            if let Ok(parsed) = value.trim().parse() {
                round = Some(parsed);
            }
        } else if label.contains("method") {
            method = Some(value);
        } else if label.contains("time") {
            time = Some(value);
        }
    }

    (round, method, time)
}

fn result_part_text(item: &ElementRef, selector_chain: &[&str]) -> Option<String> {
    for selectors in selector_chain {
        let selector = Selector::parse(selectors).ok()?;
        if let Some(el) = item.select(&selector).next() {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Draw and no-contest markers win over per-corner win markers; ambiguous
/// markup (both or neither corner marked) yields no winner rather than a
/// guess.
fn determine_winner(fight: &ElementRef) -> Option<WinnerSide> {
    let has_marker = |selectors: &str| -> bool {
        sel(selectors)
            .map(|selector| fight.select(&selector).next().is_some())
            .unwrap_or(false)
    };

    if has_marker(".c-listing-fight__outcome--draw") {
        return Some(WinnerSide::Draw);
    }
    if has_marker(".c-listing-fight__outcome--nc") {
        return Some(WinnerSide::NoContest);
    }

    let corner_has_win = |side: &str| -> bool {
        let Ok(corner_sel) = sel(&format!(".c-listing-fight__corner--{side}")) else {
            return false;
        };
        let Ok(win_sel) = sel(".c-listing-fight__outcome--win") else {
            return false;
        };
        fight
            .select(&corner_sel)
            .next()
            .map(|corner| corner.select(&win_sel).next().is_some())
            .unwrap_or(false)
    };

    match (corner_has_win("red"), corner_has_win("blue")) {
        (true, false) => Some(WinnerSide::Red),
        (false, true) => Some(WinnerSide::Blue),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bout(red_body: &str, blue_body: &str, extra: &str) -> String {
        format!(
            r#"<div class="c-listing-fight">
                 <div class="c-listing-fight__corner c-listing-fight__corner--red">{red_body}</div>
                 <div class="c-listing-fight__corner c-listing-fight__corner--blue">{blue_body}</div>
                 {extra}
               </div>"#
        )
    }

    fn named_corner(name: &str) -> String {
        format!(
            r#"<div class="c-listing-fight__corner-body">
                 <div class="c-listing-fight__name">{name}</div>
               </div>"#
        )
    }

    fn extract_one(html: &str) -> EventFight {
        let fights = extract_fight_card(html, "test-event", None).unwrap();
        assert_eq!(fights.len(), 1);
        fights.into_iter().next().unwrap()
    }

    #[test]
    fn test_sections_and_bout_order() {
        let html = format!(
            r#"<div class="c-card-event--fight-card">
                 <h2>Main Card</h2>
                 {}
                 {}
                 <h2>Prelims</h2>
                 {}
               </div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), ""),
            bout(&named_corner("Charlie Three"), &named_corner("Delta Four"), ""),
            bout(&named_corner("Echo Five"), &named_corner("Foxtrot Six"), ""),
        );

        let fights = extract_fight_card(&html, "ufc-300", None).unwrap();
        assert_eq!(fights.len(), 3);
        assert_eq!(
            fights.iter().map(|f| f.card_section).collect::<Vec<_>>(),
            vec![
                CardSection::MainCard,
                CardSection::MainCard,
                CardSection::Prelims
            ]
        );
        assert_eq!(
            fights.iter().map(|f| f.bout_order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(fights[0].id, "ufc-300-1");
        assert_eq!(fights[2].id, "ufc-300-3");
        assert_eq!(fights[0].red_name, "Alpha One");
        assert_eq!(fights[2].blue_name, "Foxtrot Six");
    }

    #[test]
    fn test_no_heading_means_unknown_section() {
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), "")
        );
        assert_eq!(extract_one(&html).card_section, CardSection::Unknown);
    }

    #[test]
    fn test_zero_bouts_is_not_an_error() {
        let fights =
            extract_fight_card("<html><body><p>nothing here</p></body></html>", "x", None).unwrap();
        assert!(fights.is_empty());
    }

    #[test]
    fn test_item_wrapper_and_inner_listing_count_once() {
        let html = format!(
            r#"<div class="c-card-event--fight-card">
                 <div class="c-card-event--fight-card__item">{}</div>
               </div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), "")
        );
        let fights = extract_fight_card(&html, "ufc-300", None).unwrap();
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].bout_order, 1);
    }

    #[test]
    fn test_name_from_athlete_link_text() {
        let corner = r#"<div class="c-listing-fight__corner-body">
                          <a href="/athlete/jan-jones">Jan Jones</a>
                        </div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(corner, &named_corner("Bravo Two"), "")
        );
        assert_eq!(extract_one(&html).red_name, "Jan Jones");
    }

    #[test]
    fn test_name_from_alt_with_noise_stripped() {
        let corner = r#"<img alt="Max Holloway facing left full body silhouette" src="/x.png">"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(corner, &named_corner("Bravo Two"), "")
        );
        assert_eq!(extract_one(&html).red_name, "Max Holloway");
    }

    #[test]
    fn test_name_from_link_slug_title_cased() {
        let corner = r#"<a href="/athlete/dustin-poirier"><img src="/x.png"></a>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(corner, &named_corner("Bravo Two"), "")
        );
        assert_eq!(extract_one(&html).red_name, "Dustin Poirier");
    }

    #[test]
    fn test_denylisted_name_falls_through() {
        // The structured element holds a non-name; the link text rescues it.
        let corner = r#"<div class="c-listing-fight__corner-body">
                          <div class="c-listing-fight__name">Red Corner</div>
                          <a href="/athlete/amanda-nunes">Amanda Nunes</a>
                        </div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(corner, &named_corner("Bravo Two"), "")
        );
        assert_eq!(extract_one(&html).red_name, "Amanda Nunes");
    }

    #[test]
    fn test_ticker_fallback_in_forward_order() {
        let ticker = r#"
          <div class="c-listing-ticker_fightcard_red_corner_name">Undercard Red</div>
          <div class="c-listing-ticker_fightcard_red_corner_name">Main Red</div>
          <div class="c-listing-ticker_fightcard_blue_corner_name">Undercard Blue</div>
          <div class="c-listing-ticker_fightcard_blue_corner_name">Main Blue</div>"#;
        let html = format!(
            r#"<html><body>{}
               <div class="c-card-event--fight-card">{}{}</div>
               </body></html>"#,
            ticker,
            bout("", "", ""),
            bout("", "", ""),
        );

        let fights = extract_fight_card(&html, "ufc-300", None).unwrap();
        assert_eq!(fights.len(), 2);
        // Ticker lists bouts in reverse order; bout 1 gets the last entries.
        assert_eq!(fights[0].red_name, "Main Red");
        assert_eq!(fights[0].blue_name, "Main Blue");
        assert_eq!(fights[1].red_name, "Undercard Red");
        assert_eq!(fights[1].blue_name, "Undercard Blue");
        // Ticker names still clear the placeholder flag.
        assert!(!fights[0].is_placeholder);
    }

    #[test]
    fn test_event_title_fallback_keeps_placeholder_flag() {
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout("", "", "")
        );
        let fights = extract_fight_card(&html, "ufc-300", Some("Royval vs Kape")).unwrap();
        assert_eq!(fights[0].red_name, "Royval");
        assert_eq!(fights[0].blue_name, "Kape");
        assert!(fights[0].is_placeholder);
    }

    #[test]
    fn test_title_fallback_only_applies_to_main_event() {
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), ""),
            bout("", "", "")
        );
        let fights = extract_fight_card(&html, "ufc-300", Some("Royval vs Kape")).unwrap();
        assert_eq!(fights[1].red_name, "TBD");
        assert_eq!(fights[1].blue_name, "TBD");
        assert!(fights[1].is_placeholder);
        assert!(!fights[0].is_placeholder);
    }

    #[test]
    fn test_infer_names_from_event_title() {
        assert_eq!(
            infer_names_from_event_title("Royval vs Kape"),
            Some(("Royval".to_string(), "Kape".to_string()))
        );
        assert_eq!(
            infer_names_from_event_title("Jones vs. Miocic"),
            Some(("Jones".to_string(), "Miocic".to_string()))
        );
        // More than one "vs" is ambiguous.
        assert_eq!(infer_names_from_event_title("A vs B vs C"), None);
        assert_eq!(infer_names_from_event_title("UFC 300"), None);
    }

    #[test]
    fn test_normalize_weight_class() {
        assert_eq!(normalize_weight_class("LightweightLightweight"), "Lightweight");
        assert_eq!(normalize_weight_class("Lightweight"), "Lightweight");
        assert_eq!(normalize_weight_class("#3 Lightweight"), "Lightweight");
        assert_eq!(
            normalize_weight_class("Light Heavyweight"),
            "Light Heavyweight"
        );
        assert_eq!(normalize_weight_class(""), "");
    }

    #[test]
    fn test_clean_alt() {
        assert_eq!(
            clean_alt("Max Holloway facing left full body silhouette"),
            "Max Holloway"
        );
        assert_eq!(clean_alt("Lightweight standing image"), "");
        assert_eq!(clean_alt("Charles Oliveira portrait 2024"), "Charles Oliveira");
    }

    #[test]
    fn test_corner_metadata() {
        let red = r#"<img class="image-style-event-fight-card-upper-body-of-standing-athlete"
                          src="/images/red.png" alt="Alpha One">"#;
        let blue = r#"<img class="image-style-event-fight-card-upper-body-of-standing-athlete"
                           src="https://cdn.example.com/blue.png" alt="Bravo Two">"#;
        let extra = r#"
          <div class="c-listing-fight__corner-rank">#3</div>
          <div class="c-listing-fight__corner-rank">C</div>
          <div class="c-listing-fight__country--red">
            <div class="c-listing-fight__country-text">Brazil</div>
            <img src="/themes/custom/flags/BR.svg">
          </div>
          <div class="c-listing-fight__country--blue">
            <div class="c-listing-fight__country-text">United States</div>
            <img src="/themes/custom/flags/us.png">
          </div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(red, blue, extra)
        );

        let fight = extract_one(&html);
        assert_eq!(
            fight.red_image_url.as_deref(),
            Some("https://www.ufc.com/images/red.png")
        );
        assert_eq!(
            fight.blue_image_url.as_deref(),
            Some("https://cdn.example.com/blue.png")
        );
        assert_eq!(fight.red_rank, Some(3));
        assert_eq!(fight.blue_rank, None);
        assert_eq!(fight.red_country.as_deref(), Some("Brazil"));
        assert_eq!(fight.red_country_code.as_deref(), Some("BR"));
        assert_eq!(fight.blue_country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_winner_red_only() {
        let red = r#"<div class="c-listing-fight__outcome--win">Win</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(
                &format!("{}{red}", named_corner("Alpha One")),
                &named_corner("Bravo Two"),
                ""
            )
        );
        assert_eq!(extract_one(&html).winner_side, Some(WinnerSide::Red));
    }

    #[test]
    fn test_winner_both_marked_yields_none() {
        let win = r#"<div class="c-listing-fight__outcome--win">Win</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(
                &format!("{}{win}", named_corner("Alpha One")),
                &format!("{}{win}", named_corner("Bravo Two")),
                ""
            )
        );
        assert_eq!(extract_one(&html).winner_side, None);
    }

    #[test]
    fn test_winner_draw_and_no_contest_markers() {
        let draw = r#"<div class="c-listing-fight__outcome--draw">Draw</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), draw)
        );
        assert_eq!(extract_one(&html).winner_side, Some(WinnerSide::Draw));

        let nc = r#"<div class="c-listing-fight__outcome--nc">NC</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), nc)
        );
        assert_eq!(extract_one(&html).winner_side, Some(WinnerSide::NoContest));
    }

    #[test]
    fn test_result_fields_matched_by_label_not_position() {
        let results = r#"
          <div class="c-listing-fight__results">
            <div class="c-listing-fight__result">
              <div class="c-listing-fight__result-label">Time</div>
              <div class="c-listing-fight__result-text">3:42</div>
            </div>
            <div class="c-listing-fight__result">
              <div class="c-listing-fight__result-label">Round</div>
              <div class="c-listing-fight__result-text">2</div>
            </div>
            <div class="c-listing-fight__result">
              <div class="c-listing-fight__result-label">Method</div>
              <div class="c-listing-fight__result-text">KO/TKO</div>
            </div>
          </div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), results)
        );

        let fight = extract_one(&html);
        assert_eq!(fight.result_round, Some(2));
        assert_eq!(fight.result_method.as_deref(), Some("KO/TKO"));
        assert_eq!(fight.result_time.as_deref(), Some("3:42"));
    }

    #[test]
    fn test_bonus_from_banner() {
        let banner =
            r#"<div class="c-listing-fight__banner--award">Fight of the Night</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), banner)
        );
        assert_eq!(
            extract_one(&html).fight_bonus.as_deref(),
            Some("Fight of the Night")
        );
    }

    #[test]
    fn test_bonus_from_attribute() {
        let marked = r#"<div data-award="Performance of the Night"></div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), marked)
        );
        assert_eq!(
            extract_one(&html).fight_bonus.as_deref(),
            Some("Performance of the Night")
        );
    }

    #[test]
    fn test_bonus_from_raw_text_shorthand() {
        let extra = r#"<div class="notes">POTN award confirmed, performance pay</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), extra)
        );
        assert_eq!(
            extract_one(&html).fight_bonus.as_deref(),
            Some("Performance of the Night")
        );
    }

    #[test]
    fn test_non_canonical_bonus_text_is_discarded() {
        // Contains "fight" so the banner matcher picks it up, but it maps to
        // neither canonical award string.
        let banner = r#"<div class="c-listing-fight__banner--award">Fight Pass replay</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), banner)
        );
        assert_eq!(extract_one(&html).fight_bonus, None);
    }

    #[test]
    fn test_canonical_bonus() {
        assert_eq!(
            canonical_bonus("FIGHT  OF THE NIGHT").as_deref(),
            Some("Fight of the Night")
        );
        assert_eq!(
            canonical_bonus("performance bonus").as_deref(),
            Some("Performance of the Night")
        );
        assert_eq!(canonical_bonus("Fight Pass replay"), None);
    }

    #[test]
    fn test_weight_class_extracted_and_cleaned() {
        let extra = r#"<div class="c-listing-fight__class">#12 WelterweightWelterweight</div>"#;
        let html = format!(
            r#"<div class="c-card-event--fight-card">{}</div>"#,
            bout(&named_corner("Alpha One"), &named_corner("Bravo Two"), extra)
        );
        assert_eq!(extract_one(&html).weight_class.as_deref(), Some("Welterweight"));
    }

    #[test]
    fn test_detect_section_from_heading() {
        assert_eq!(detect_section_from_heading("Main Card"), CardSection::MainCard);
        assert_eq!(detect_section_from_heading("PRELIMS"), CardSection::Prelims);
        assert_eq!(
            detect_section_from_heading("Early Prelims"),
            CardSection::EarlyPrelims
        );
        assert_eq!(
            detect_section_from_heading("early prelim bouts"),
            CardSection::EarlyPrelims
        );
        assert_eq!(detect_section_from_heading("How to watch"), CardSection::Unknown);
    }

    #[test]
    fn test_country_code_from_flag_src() {
        assert_eq!(
            country_code_from_flag_src("/themes/custom/flags/br.svg").as_deref(),
            Some("BR")
        );
        assert_eq!(country_code_from_flag_src("/images/logo.png"), None);
        assert_eq!(country_code_from_flag_src("/flags/nested/x.svg"), None);
    }
}
