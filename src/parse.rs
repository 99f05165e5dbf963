use std::sync::Arc;

use scraper::{Html, Selector};
use tokio::task::spawn_blocking;

use crate::{Error, Failure, Result};

/// Knows where on a book page the answer lives.
#[derive(Debug)]
pub(crate) struct Extractor {
    not_found: Selector,
    value: Selector,
}

impl Extractor {
    pub(crate) fn new(not_found: &str, value: &str) -> Result<Self> {
        Ok(Self {
            not_found: create_selector(not_found)?,
            value: create_selector(value)?,
        })
    }

    /// Parses the page on the blocking pool, keeping the runtime threads free for I/O.
    pub(crate) async fn extract(
        self: Arc<Self>,
        html: String,
    ) -> core::result::Result<String, Failure> {
        spawn_blocking(move || self.extract_sync(&html))
            .await
            .map_err(|e| Failure::Document(e.to_string()))?
    }

    /// Returns the book name, or [`Failure::NoPage`] if the page carries the not-found marker.
    /// A page without a name element yields an empty name.
    pub(crate) fn extract_sync(&self, html: &str) -> core::result::Result<String, Failure> {
        let doc = Html::parse_document(html);

        if doc.select(&self.not_found).next().is_some() {
            return Err(Failure::NoPage);
        }

        let name = doc
            .select(&self.value)
            .flat_map(|el| el.text())
            .collect::<String>();
        Ok(name.trim().to_string())
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}
