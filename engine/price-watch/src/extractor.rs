//! Price extraction from the course page markup
//!
//! The page publishes a machine-readable price in
//! `<meta property="udemy_com:price" content="...">`. The content is read
//! with a narrow heuristic: keep the first [`PRICE_PREFIX_LEN`] characters,
//! turn a decimal comma into a period and parse the rest as a float. Amounts
//! with thousands separators or more than two decimals are not supported.

use scraper::{Html, Selector};
use tracing::debug;

use crate::error::ExtractionError;
use crate::{PRICE_META_PROPERTY, PRICE_PREFIX_LEN};

/// Locate the price metadata tag in `html` and parse its content
pub fn extract_price(html: &str) -> Result<f64, ExtractionError> {
    let document = Html::parse_document(html);

    let selector = Selector::parse(&format!("meta[property=\"{}\"]", PRICE_META_PROPERTY))
        .map_err(|e| ExtractionError::Selector(e.to_string()))?;

    let meta = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractionError::missing_tag(PRICE_META_PROPERTY))?;

    let content = meta.value().attr("content").ok_or(ExtractionError::MissingContent)?;
    debug!("Found price metadata content: {:?}", content);

    parse_price_content(content)
}

/// Parse the `content` attribute of the price tag into a number
pub fn parse_price_content(raw: &str) -> Result<f64, ExtractionError> {
    let prefix: String = raw.chars().take(PRICE_PREFIX_LEN).collect();
    let normalized = prefix.replace(',', ".");

    let price: f64 =
        normalized.trim().parse().map_err(|_| ExtractionError::invalid_price(raw))?;

    if !price.is_finite() {
        return Err(ExtractionError::invalid_price(raw));
    }
    if price < 0.0 {
        return Err(ExtractionError::NegativePrice { price });
    }

    Ok(price)
}
