use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

/// Media type used when the markup does not carry one.
pub const DEFAULT_KIND: &str = "film";

/// One rated movie or show, as extracted from a vote-list item.
///
/// Every field is best-effort: an empty string means the source markup
/// did not yield a value. Field order matches the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatedTitle {
    pub num: String,
    #[serde(rename = "nameRus")]
    pub name_rus: String,
    #[serde(rename = "nameEng")]
    pub name_eng: String,
    pub rating: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
    pub date_rated: String,
}

impl RatedTitle {
    /// A record is kept only when at least one of the two titles is set.
    pub fn has_name(&self) -> bool {
        !self.name_rus.is_empty() || !self.name_eng.is_empty()
    }
}

/// Collect the rating item containers of a listing page as owned HTML
/// fragments, so each one can be parsed on its own.
pub fn item_fragments(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut fragments = Vec::new();

    if let Ok(selector) = Selector::parse("div.item") {
        for element in document.select(&selector) {
            fragments.push(element.html());
        }
    }

    fragments
}

/// Extract all retained ratings from raw listing-page HTML.
pub fn extract_ratings(html: &str) -> Vec<RatedTitle> {
    item_fragments(html)
        .iter()
        .map(|fragment| parse_vote_item(fragment))
        .filter(|title| title.has_name())
        .collect()
}

/// Parse a single rating item fragment into a [`RatedTitle`].
///
/// Each field is extracted independently; a miss on one field never
/// blocks the others, the field just stays empty (or at its default).
pub fn parse_vote_item(fragment: &str) -> RatedTitle {
    let document = Html::parse_fragment(fragment);

    // Russian name and release year share one link text: "Название (2004)"
    let (name_rus, year) =
        split_title_year(&select_text(&document, "div.nameRus a").unwrap_or_default());

    RatedTitle {
        num: select_text(&document, "div.num").unwrap_or_default(),
        name_rus,
        name_eng: select_text(&document, "div.nameEng").unwrap_or_default(),
        rating: extract_rating(&document).unwrap_or_default(),
        year,
        kind: extract_kind(&document),
        duration: extract_duration(&document).unwrap_or_default(),
        date_rated: extract_rated_date(&document).unwrap_or_default(),
    }
}

/// Text of the first element matching `selector_str`, trimmed.
/// Returns None when the selector misses or the text is blank; note that
/// trimming also collapses the `&nbsp;` placeholder Kinopoisk puts into
/// empty title elements.
pub(crate) fn select_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn select_attr(document: &Html, selector_str: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let element = document.select(&selector).next()?;
    element.value().attr(attr).map(|value| value.trim().to_string())
}

fn split_title_year(text: &str) -> (String, String) {
    if let Some(captures) = Regex::new(r"^(.*?)\s*\((\d{4})\)$")
        .ok()
        .and_then(|re| re.captures(text))
    {
        let name = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let year = captures.get(2).map_or("", |m| m.as_str()).to_string();
        (name, year)
    } else {
        (text.to_string(), String::new())
    }
}

/// The user's own rating, tried against three markup variants in order;
/// the first one that yields a value wins.
fn extract_rating(document: &Html) -> Option<String> {
    rating_from_vote_display(document)
        .or_else(|| rating_from_script(document))
        .or_else(|| rating_from_vote_attr(document))
}

fn rating_from_vote_display(document: &Html) -> Option<String> {
    select_text(
        document,
        r#"div.vote_widget div[class*="myVote"][class*="show_vote_"]"#,
    )
}

fn rating_from_script(document: &Html) -> Option<String> {
    // ur_data.push({film: 935940, rating: '7', ...
    let selector = Selector::parse("script").ok()?;
    let re = Regex::new(r"rating:\s*'(\d+)'").ok()?;

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if let Some(captures) = re.captures(&text) {
            return captures.get(1).map(|m| m.as_str().to_string());
        }
    }

    None
}

fn rating_from_vote_attr(document: &Html) -> Option<String> {
    select_attr(document, "div.rateNow[vote]", "vote")
}

fn extract_duration(document: &Html) -> Option<String> {
    let selector = Selector::parse("div.rating span.text-grey").ok()?;
    let re = Regex::new(r"(\d+)\s*мин").ok()?;

    for span in document.select(&selector) {
        let text: String = span.text().collect();
        if let Some(captures) = re.captures(&text) {
            return captures.get(1).map(|m| m.as_str().to_string());
        }
    }

    None
}

fn extract_kind(document: &Html) -> String {
    select_attr(document, r#"div[class*="MyKP_Folder_Select_"][type]"#, "type")
        .unwrap_or_else(|| DEFAULT_KIND.to_string())
}

/// Date the rating was assigned, normalized from "15.03.2021, 14:30" to
/// "2021-03-15". Anything that does not parse is passed through verbatim.
fn extract_rated_date(document: &Html) -> Option<String> {
    let raw = select_text(document, "div.date")?;
    match NaiveDateTime::parse_from_str(&raw, "%d.%m.%Y, %H:%M") {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => Some(raw),
    }
}
