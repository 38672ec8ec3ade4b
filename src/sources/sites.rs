//! Target directory sites and their profile-URL qualification rules.
//!
//! Each site is one entry in `TARGET_SITES`: a search-phrase suffix plus a
//! predicate that decides whether a result link is an individual school
//! profile. Adding a third site is a data change, not a control-flow change.

use super::SearchHit;

pub struct SiteTarget {
    /// Stable key used in `_sources` annotations.
    pub key: &'static str,
    /// Human label used for the scraped-text block headers.
    pub label: &'static str,
    /// Appended to the user query when searching for this site.
    pub query_suffix: &'static str,
    /// Link qualification predicate; receives the lowercased link.
    pub qualifies: fn(&str) -> bool,
}

pub static TARGET_SITES: [SiteTarget; 2] = [
    SiteTarget {
        key: "yellowslate",
        label: "YellowSlate",
        query_suffix: "yellowslate",
        qualifies: yellowslate_profile,
    },
    SiteTarget {
        key: "edustoke",
        label: "EduStoke",
        query_suffix: "edustoke",
        qualifies: edustoke_profile,
    },
];

/// Path markers of editorial/listing pages rather than a single school's
/// profile.
const EDITORIAL_MARKERS: [&str; 7] = [
    "/blog/", "/news/", "/article/", "/best-", "/top-", "/ranking", "/rankings",
];

fn yellowslate_profile(link: &str) -> bool {
    if !link.contains("yellowslate.com/school/") {
        return false;
    }
    if EDITORIAL_MARKERS.iter().any(|m| link.contains(m)) {
        return false;
    }
    // Profile pages sit deeper than /school/<category> listing pages.
    link.matches('/').count() >= 5
}

fn edustoke_profile(link: &str) -> bool {
    link.contains("edustoke.com") && !link.contains("/blog/") && !link.contains("/article/")
}

/// Scan organic results in rank order; the first qualifying link wins and is
/// returned lowercased. No qualifying result is a valid, non-error outcome.
pub fn resolve_profile_url(site: &SiteTarget, hits: &[SearchHit]) -> Option<String> {
    hits.iter()
        .map(|hit| hit.link.to_lowercase())
        .find(|link| (site.qualifies)(link))
}
