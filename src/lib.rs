// Kinopoisk Ratings Exporter
//
// Scrapes the movie and show ratings from a Kinopoisk user profile and
// writes them to CSV, using the viewer's own session cookies.

pub mod config;
pub mod export;
pub mod extract;
pub mod kinopoisk;
pub mod session;

// Re-export main types for convenience
pub use config::Config;
pub use export::{write_csv, write_ratings};
pub use extract::{RatedTitle, extract_ratings, parse_vote_item};
pub use kinopoisk::{KinopoiskScraper, PAGE_SIZE};
pub use session::Session;
