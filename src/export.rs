use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::extract::RatedTitle;

/// Column order matches the profile listing itself, so the file reads
/// like the page it came from.
const CSV_HEADER: [&str; 8] = [
    "num",
    "nameRus",
    "nameEng",
    "rating",
    "year",
    "type",
    "duration",
    "date_rated",
];

/// Write the ratings as CSV to a file, creating or truncating it.
pub fn write_csv(path: &Path, ratings: &[RatedTitle]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_ratings(file, ratings)
}

/// Write the ratings as CSV to any writer. The header row is always
/// emitted, even for an empty run.
pub fn write_ratings<W: Write>(writer: W, ratings: &[RatedTitle]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    wtr.write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for title in ratings {
        wtr.serialize(title)
            .context("Failed to write CSV record")?;
    }

    wtr.flush().context("Failed to flush CSV output")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_title() -> RatedTitle {
        RatedTitle {
            num: "1".to_string(),
            name_rus: "Матрица".to_string(),
            name_eng: "The Matrix".to_string(),
            rating: "10".to_string(),
            year: "1999".to_string(),
            kind: "film".to_string(),
            duration: "136".to_string(),
            date_rated: "2021-03-15".to_string(),
        }
    }

    fn render(ratings: &[RatedTitle]) -> String {
        let mut buffer = Vec::new();
        write_ratings(&mut buffer, ratings).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_and_row_layout() {
        let output = render(&[sample_title()]);
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("num,nameRus,nameEng,rating,year,type,duration,date_rated")
        );
        assert_eq!(
            lines.next(),
            Some("1,Матрица,The Matrix,10,1999,film,136,2021-03-15")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_run_still_writes_header() {
        let output = render(&[]);
        assert_eq!(
            output.trim_end(),
            "num,nameRus,nameEng,rating,year,type,duration,date_rated"
        );
    }

    #[test]
    fn test_title_with_comma_is_quoted() {
        let mut title = sample_title();
        title.name_rus = "Я, робот".to_string();

        let output = render(&[title]);
        assert!(output.contains("\"Я, робот\""));
    }

    #[test]
    fn test_write_csv_creates_file() {
        let path = std::env::temp_dir().join(format!("ratings_test_{}.csv", std::process::id()));

        write_csv(&path, &[sample_title()]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(contents.starts_with("num,nameRus"));
        assert!(contents.contains("The Matrix"));
    }
}
