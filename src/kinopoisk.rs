use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use scraper::Html;

use crate::export;
use crate::extract::{self, RatedTitle};
use crate::session::{ACCEPT_LANGUAGE, Session, USER_AGENT};

/// Kinopoisk lists 50 ratings per votes page.
pub const PAGE_SIZE: u32 = 50;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_DELAY: Duration = Duration::from_millis(1500);

/// Scrapes a user's movie and show ratings from their Kinopoisk profile.
///
/// Owns everything a run needs (HTTP client, session, target host), so
/// separate runs never share state.
pub struct KinopoiskScraper {
    client: reqwest::blocking::Client,
    session: Session,
    base_url: String,
}

impl KinopoiskScraper {
    pub fn new(session: Session, base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn votes_page_url(&self, page: u32) -> String {
        format!(
            "{}/user/{}/votes/list/vs/vote/page/{}/",
            self.base_url,
            self.session.user_id(),
            page
        )
    }

    /// Number of votes pages for this user.
    ///
    /// Returns 0 when the first listing page cannot be fetched at all;
    /// the caller must abort on 0. When the page loads but carries no
    /// recognizable total, assumes a single page and proceeds.
    pub fn total_pages(&self) -> u32 {
        let url = self.votes_page_url(1);
        log::info!("Fetching total pages info from: {}", url);

        match self.fetch_page(&url) {
            Ok(html) => count_pages(&html),
            Err(e) => {
                log::error!("Error fetching total pages: {:#}", e);
                0
            }
        }
    }

    /// Fetch one votes page and return its rating item fragments.
    ///
    /// A failed fetch is soft: it is logged and yields no fragments, and
    /// the run moves on to the next page.
    pub fn fetch_votes_page(&self, page: u32) -> Vec<String> {
        let url = self.votes_page_url(page);
        log::info!("Fetching page {}: {}", page, url);

        match self.fetch_page(&url) {
            Ok(html) => extract::item_fragments(&html),
            Err(e) => {
                log::warn!("Error fetching page {}: {:#}", page, e);
                Vec::new()
            }
        }
    }

    /// Walk every votes page and accumulate the retained ratings.
    pub fn collect_ratings(&self) -> Result<Vec<RatedTitle>> {
        let total_pages = self.total_pages();
        if total_pages == 0 {
            anyhow::bail!("could not determine the number of votes pages");
        }
        log::info!("Found {} pages of ratings to process", total_pages);

        let mut all_ratings = Vec::new();

        for page in 1..=total_pages {
            let fragments = self.fetch_votes_page(page);
            if fragments.is_empty() {
                log::warn!("No items found on page {}", page);
            } else {
                log::info!("Processing {} items from page {}...", fragments.len(), page);
            }

            for fragment in &fragments {
                let title = extract::parse_vote_item(fragment);
                if title.has_name() {
                    log::debug!(
                        "Item #{}: {} - Rating: {}",
                        title.num,
                        title.name_rus,
                        title.rating
                    );
                    all_ratings.push(title);
                }
            }

            // Pause between pages to respect the site's informal limits.
            if page < total_pages {
                log::debug!("Waiting before fetching next page...");
                thread::sleep(PAGE_DELAY);
            }
        }

        Ok(all_ratings)
    }

    /// Run the full export: count pages, scrape them all, write the CSV.
    pub fn export_to_csv(&self, path: &Path) -> Result<()> {
        let ratings = self.collect_ratings()?;
        export::write_csv(path, &ratings)?;
        log::info!("Exported {} ratings to {}", ratings.len(), path.display());
        Ok(())
    }

    fn fetch_page(&self, url: &str) -> Result<String> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Referer", self.session.referer(&self.base_url));

        let cookie_header = self.session.cookie_header();
        if !cookie_header.is_empty() {
            request = request.header("Cookie", cookie_header);
        }

        let response = request.send().context("Failed to fetch page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response.text().context("Failed to read response body")
    }
}

/// Page count parsed out of the first listing page, 1 when nothing
/// recognizable is present.
fn count_pages(html: &str) -> u32 {
    match total_ratings(html) {
        Some(total) => {
            log::info!("Found total ratings: {}", total);
            total.div_ceil(PAGE_SIZE).max(1)
        }
        None => {
            log::warn!("Could not determine total pages. Assuming 1 page.");
            1
        }
    }
}

/// Total rating count from one of the two known indicators, in priority
/// order: the "1–50 из 458" pagination summary, then the standalone
/// profile total.
fn total_ratings(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);

    if let Some(text) = extract::select_text(&document, "div.pagesFromTo") {
        if let Some(total) = capture_u32(&text, r"из\s*(\d+)") {
            return Some(total);
        }
    }

    if let Some(text) = extract::select_text(&document, "span.profile_V2_votes_total") {
        if let Some(total) = capture_u32(&text, r"(\d+)") {
            return Some(total);
        }
    }

    None
}

fn capture_u32(text: &str, pattern: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
