/// Client identity sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Language preference list; Kinopoisk serves the votes list to both.
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,ru;q=0.8";

/// Identity and credentials for one export run: the target user plus the
/// cookies of a logged-in browser session. Built once at startup and
/// never mutated.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: String,
    cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new(user_id: &str, raw_cookies: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            cookies: parse_cookie_blob(raw_cookies),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The normalized credential pairs joined back into a Cookie header
    /// value. Empty when no usable pair survived normalization.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Referer for outbound requests, templated on the target user.
    pub fn referer(&self, base_url: &str) -> String {
        format!("{}/user/{}/votes/", base_url.trim_end_matches('/'), self.user_id)
    }
}

/// Parse a raw browser cookie blob ("name=value; name2=value2") into
/// ordered pairs. Malformed segments are dropped, not reported: a run
/// never fails over credentials it can partially use.
fn parse_cookie_blob(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_blob_normalization() {
        let session = Session::new("123456", " uid=abc123; session_id=xyz ;theme=dark");
        assert_eq!(session.cookie_header(), "uid=abc123; session_id=xyz; theme=dark");
    }

    #[test]
    fn test_malformed_cookie_segments_are_dropped() {
        let session = Session::new("123456", "uid=1; garbage; =orphan; token=a=b;");
        assert_eq!(session.cookie_header(), "uid=1; token=a=b");
    }

    #[test]
    fn test_empty_blob_yields_empty_header() {
        let session = Session::new("123456", "");
        assert_eq!(session.cookie_header(), "");
    }

    #[test]
    fn test_referer_is_templated_on_user() {
        let session = Session::new("987654", "uid=1");
        assert_eq!(
            session.referer("https://www.kinopoisk.ru"),
            "https://www.kinopoisk.ru/user/987654/votes/"
        );
        assert_eq!(
            session.referer("https://www.kinopoisk.ru/"),
            "https://www.kinopoisk.ru/user/987654/votes/"
        );
    }
}
