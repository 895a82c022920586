//! HTML parsing for the index page and book subpages
//!
//! This module handles:
//! - Harvesting every `<a href>` value from the index page
//! - Reading the download button's `onclick` attribute on a subpage
//! - Turning that attribute into a file path

use crate::ExtractionError;
use scraper::{Html, Selector};

/// Literal that precedes the quoted path in the download button handler
pub const ONCLICK_PREFIX: &str = "location.href=";

/// Extracts every hyperlink target from an HTML document
///
/// Returns the `href` value of every `<a>` element in document order.
/// Duplicates, empty values and fragment-only links are kept; links that are
/// not real subpages are weeded out later when they fail to resolve. A
/// malformed or empty document simply yields no links.
///
/// # Example
///
/// ```
/// use book_harvest::crawler::extract_links;
///
/// let html = r##"<a href="a/">A</a><a href="#top">Top</a><a href="a/">A again</a>"##;
/// assert_eq!(extract_links(html), vec!["a/", "#top", "a/"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Reads the `onclick` attribute of the first element matching `selector`
///
/// # Returns
///
/// * `Ok(String)` - The raw attribute value
/// * `Err(ExtractionError::MissingAttribute)` - No element or no attribute
pub fn extract_download_attribute(
    html: &str,
    selector: &Selector,
    selector_text: &str,
) -> Result<String, ExtractionError> {
    let document = Html::parse_document(html);

    document
        .select(selector)
        .find_map(|element| element.value().attr("onclick"))
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::MissingAttribute {
            selector: selector_text.to_string(),
        })
}

/// Parses the download path out of a button click handler
///
/// # Input Format
///
/// `location.href='<path>'`, optionally surrounded by whitespace. The
/// `location.href=` literal is required; every single quote is dropped from
/// the remainder.
///
/// # Returns
///
/// * `Ok(String)` - The file path fragment, e.g. `foo/Book.pdf`
/// * `Err(ExtractionError::MissingPrefix)` - The literal prefix is absent
/// * `Err(ExtractionError::EmptyPath)` - Nothing is left after stripping
///
/// # Example
///
/// ```
/// use book_harvest::crawler::parse_download_path;
///
/// let path = parse_download_path("location.href='foo/Book.pdf'").unwrap();
/// assert_eq!(path, "foo/Book.pdf");
/// ```
pub fn parse_download_path(onclick: &str) -> Result<String, ExtractionError> {
    let value = onclick.trim();

    let rest = value
        .strip_prefix(ONCLICK_PREFIX)
        .ok_or_else(|| ExtractionError::MissingPrefix {
            value: value.to_string(),
        })?;

    let path: String = rest.chars().filter(|c| *c != '\'').collect();
    let path = path.trim();

    if path.is_empty() {
        return Err(ExtractionError::EmptyPath);
    }

    Ok(path.to_string())
}
