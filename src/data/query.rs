//! Conversion of Trove web search URLs.
//!
//! Series files carry two forms of the same search: the URL a person ran on
//! the Trove website, and the parameter string the article endpoint accepts.
//! This module derives the second form (and a default series name) from the
//! first.

use url::form_urlencoded;

/// Fallback series name when the URL has no keyword parameter.
pub const DEFAULT_SERIES_NAME: &str = "Trove series";

/// Trove category facet label -> article endpoint `article_type` value.
const ARTICLE_TYPES: [(&str, &str); 5] = [
    ("Advertising", "advertising"),
    ("Article", "news"),
    ("Detailed lists, results, guides", "lists"),
    ("Family Notices", "family"),
    ("Literature", "literature"),
];

/// Build the article endpoint query string from a Trove search URL.
///
/// Parameters are emitted in a fixed order: `all`, `any`, `exact`, `exclude`,
/// then every `article_type`, then every `title`. Blank parameters are left
/// out. Values are kept decoded; encoding happens when the request URL is built.
pub fn api_query_from_trove_url(trove_url: &str) -> String {
    let pairs = query_pairs(trove_url);
    let first = |name: &str| {
        pairs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    };

    let mut params = Vec::new();
    for (web_name, api_name) in [
        ("q", "all"),
        ("anyWords", "any"),
        ("exactPhrase", "exact"),
        ("notWords", "exclude"),
    ] {
        if let Some(value) = first(web_name) {
            params.push(format!("{api_name}={value}"));
        }
    }

    for (_, category) in pairs.iter().filter(|(k, v)| k == "l-category" && !v.is_empty()) {
        match article_type(category) {
            Some(kind) => params.push(format!("article_type={kind}")),
            None => tracing::warn!(category = %category, "skipping unknown Trove category"),
        }
    }

    for (_, title) in pairs.iter().filter(|(k, v)| k == "l-title" && !v.is_empty()) {
        match trailing_digits(title) {
            Some(id) => params.push(format!("title={id}")),
            None => tracing::warn!(title = %title, "skipping Trove title without an id"),
        }
    }

    params.join("&")
}

/// Derive a series name from the keyword parameters of a Trove search URL.
pub fn series_name_from_trove_url(trove_url: &str) -> String {
    let pairs = query_pairs(trove_url);
    let first = |name: &str| {
        pairs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.clone())
    };

    if let Some(q) = first("q") {
        return q.replace('"', "").replace('+', " ");
    }
    if let Some(v) = first("exactPhrase").or_else(|| first("anyWords")) {
        return v.replace('+', " ");
    }
    DEFAULT_SERIES_NAME.to_string()
}

/// Decoded key/value pairs of the query part of `input`.
///
/// `input` may be a full URL or a bare query string.
fn query_pairs(input: &str) -> Vec<(String, String)> {
    let query = match input.split_once('?') {
        Some((_, q)) => q,
        None => input,
    };
    let query = query.split('#').next().unwrap_or("");
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Map an `l-category` facet value (`Label|category:Label`) to its article type.
fn article_type(facet: &str) -> Option<&'static str> {
    let label = facet.split('|').next().unwrap_or(facet).replace('+', " ");
    ARTICLE_TYPES
        .iter()
        .find(|(name, _)| *name == label.trim())
        .map(|(_, kind)| *kind)
}

fn trailing_digits(value: &str) -> Option<&str> {
    let trimmed = value.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    Some(&trimmed[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = "http://trove.nla.gov.au/newspaper/result?q=%22white+australia%22\
        &exactPhrase=&anyWords=&notWords=chinese\
        &l-category=Article%7Ccategory%3AArticle\
        &l-category=Family+Notices%7Ccategory%3AFamily+Notices\
        &l-title=The+Argus+%28Melbourne%2C+Vic.+%3A+1848+-+1957%29%7Ctitle%3A13";

    #[test]
    fn converts_search_url_to_api_query() {
        assert_eq!(
            api_query_from_trove_url(SEARCH),
            "all=\"white australia\"&exclude=chinese&article_type=news&article_type=family&title=13"
        );
    }

    #[test]
    fn derives_series_name_from_keywords() {
        assert_eq!(series_name_from_trove_url(SEARCH), "white australia");
        assert_eq!(
            series_name_from_trove_url("http://trove.nla.gov.au/newspaper/result?exactPhrase=gold+rush"),
            "gold rush"
        );
        assert_eq!(
            series_name_from_trove_url("http://trove.nla.gov.au/newspaper/result?l-decade=190"),
            DEFAULT_SERIES_NAME
        );
    }

    #[test]
    fn accepts_bare_query_strings() {
        assert_eq!(api_query_from_trove_url("q=drought&notWords=rain"), "all=drought&exclude=rain");
    }

    #[test]
    fn skips_unknown_categories_and_titles_without_ids() {
        assert_eq!(
            api_query_from_trove_url("?q=x&l-category=Poetry%7Ccategory%3APoetry&l-title=Unknown"),
            "all=x"
        );
    }
}
