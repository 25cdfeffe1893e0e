//! services/api/src/extract.rs
//!
//! Turns raw Wikipedia HTML into a [`PageDigest`] using CSS-selector
//! extraction. This is pure logic: no network, no state.

use indexmap::IndexMap;
use scraper::{Html, Selector};

use wikiquiz_core::domain::PageDigest;

/// Upper bound on extracted section headings.
const MAX_SECTIONS: usize = 5;
/// Upper bound on extracted introduction paragraphs.
const MAX_INTRO_PARAGRAPHS: usize = 5;

/// Errors produced while digesting a page.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The page has no `#firstHeading` element. Pages without one are not
    /// article pages, so this is fatal rather than masked.
    #[error("page has no title heading element")]
    MissingTitle,
}

/// Extracts the digest of one article page.
///
/// A missing infobox yields an empty mapping, and fewer than the maximum
/// number of sections or paragraphs is fine; only a missing title is an
/// error.
pub fn extract_digest(html: &str) -> Result<PageDigest, ExtractError> {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("#firstHeading").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .ok_or(ExtractError::MissingTitle)?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    let section_selector = Selector::parse(".mw-heading2 h2").unwrap();
    let sections: Vec<String> = document
        .select(&section_selector)
        .take(MAX_SECTIONS)
        .map(|heading| heading.text().collect::<String>().trim().to_string())
        .collect();

    let infobox_selector = Selector::parse("table.infobox").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let label_selector = Selector::parse("th.infobox-label").unwrap();
    let data_selector = Selector::parse("td.infobox-data").unwrap();

    let mut infobox = IndexMap::new();
    if let Some(table) = document.select(&infobox_selector).next() {
        for row in table.select(&row_selector) {
            let label = row.select(&label_selector).next();
            let data = row.select(&data_selector).next();
            // Rows missing either cell are headers or images; skip them.
            if let (Some(label), Some(data)) = (label, data) {
                let key = label.text().collect::<String>().trim().to_string();
                let value = data
                    .text()
                    .collect::<String>()
                    .trim()
                    .replace('\n', " ");
                infobox.insert(key, value);
            }
        }
    }

    let paragraph_selector = Selector::parse(".mw-content-ltr p").unwrap();
    let introduction: Vec<String> = document
        .select(&paragraph_selector)
        .take(MAX_INTRO_PARAGRAPHS)
        .map(|paragraph| paragraph.text().collect::<String>().trim().to_string())
        .collect();

    Ok(PageDigest {
        title,
        infobox,
        sections,
        introduction,
    })
}
