//! Rendered thread pages.
//!
//! Extraction code only sees a [`ThreadPage`]: the title text and the raw
//! `href` targets of the page's anchors. [`HtmlPage`] provides both from a
//! rendered DOM using the `scraper` crate.

use scraper::{Html, Selector};

/// The two things the extractors need from a rendered page.
pub trait ThreadPage {
    /// Text of the `<title>` element, if the page has one.
    fn title_text(&self) -> Option<String>;
    /// `href` values of every anchor that has one, in document order.
    fn link_targets(&self) -> Vec<String>;
}

/// A parsed page snapshot.
///
/// Parsing happens once in [`HtmlPage::parse`]; the result owns plain strings so it
/// can be moved across tasks (`scraper::Html` itself is not `Send`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPage {
    title: Option<String>,
    hrefs: Vec<String>,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| document.select(&sel).next())
            .map(|el| el.text().collect::<String>());

        let hrefs = match Selector::parse("a[href]") {
            Ok(sel) => document
                .select(&sel)
                .filter_map(|el| el.value().attr("href"))
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        };

        Self { title, hrefs }
    }
}

impl ThreadPage for HtmlPage {
    fn title_text(&self) -> Option<String> {
        self.title.clone()
    }

    fn link_targets(&self) -> Vec<String> {
        self.hrefs.clone()
    }
}
