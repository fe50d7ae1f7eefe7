use scraper::Html;

use super::{element_text, first_text, sel, ScrapeError};
use crate::models::{Division, FighterRank};

/// Each division lists its champion separately plus at most this many
/// ranked contenders.
const MAX_RANKED_FIGHTERS: usize = 15;

/// Extract every division's rankings from the rankings page.
///
/// Divisions with neither a champion nor any ranked fighters are dropped.
/// An empty result is valid output, not an error; the caller decides whether
/// to keep the previous snapshot.
pub fn extract_rankings(html: &str) -> Result<Vec<Division>, ScrapeError> {
    let document = Html::parse_document(html);

    let grouping_sel = sel(".view-grouping")?;
    let header_sel = sel(".view-grouping-header")?;
    let champion_sel = sel("caption .rankings--athlete--champion")?;
    let champion_link_sel = sel("a")?;
    let row_sel = sel("tbody tr")?;
    let rank_cell_sel = sel("td.views-field-weight-class-rank")?;
    let name_link_sel = sel("td.views-field-title a")?;

    let mut divisions = Vec::new();

    for grouping in document.root_element().select(&grouping_sel) {
        let mut division_name = grouping
            .select(&header_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();
        if division_name.is_empty() {
            division_name = first_text(&grouping, "caption .info h4");
        }
        if division_name.is_empty() {
            continue;
        }

        let champion = grouping
            .select(&champion_sel)
            .next()
            .and_then(|block| block.select(&champion_link_sel).next())
            .map(|link| element_text(&link))
            .filter(|name| !name.is_empty())
            .map(|name| FighterRank {
                rank: Some(0),
                rank_text: Some("C".to_string()),
                is_champion: true,
                name,
            });

        let mut fighters = Vec::new();
        for row in grouping.select(&row_sel) {
            if fighters.len() >= MAX_RANKED_FIGHTERS {
                break;
            }

            let name = row
                .select(&name_link_sel)
                .map(|el| element_text(&el))
                .collect::<Vec<_>>()
                .join(" ");
            let name = super::squash_ws(&name);
            if name.is_empty() {
                continue;
            }

            let rank_text = row
                .select(&rank_cell_sel)
                .next()
                .map(|el| element_text(&el))
                .filter(|t| !t.is_empty());
            let rank = rank_text.as_deref().and_then(parse_leading_int);

            fighters.push(FighterRank {
                rank,
                rank_text,
                is_champion: false,
                name,
            });
        }

        if champion.is_some() || !fighters.is_empty() {
            divisions.push(Division {
                division: division_name,
                champion,
                fighters,
            });
        }
    }

    Ok(divisions)
}

fn parse_leading_int(raw: &str) -> Option<i32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
