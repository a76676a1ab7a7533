//! Tolerant HTML parsing.
//!
//! [`Dom::parse`] never fails: malformed markup (unclosed tags, stray
//! entities) still yields a best-effort document, possibly empty. Parser
//! complaints are counted and logged, never returned.

use scraper::{ElementRef, Html, Selector};

pub struct Dom {
    html: Html,
}

impl Dom {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        if !html.errors.is_empty() {
            tracing::debug!("Suppressed {} HTML parse errors", html.errors.len());
        }
        Self { html }
    }

    /// Number of parse errors the tree builder recovered from.
    pub fn parse_error_count(&self) -> usize {
        self.html.errors.len()
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    pub fn first<'a>(&'a self, selector: &'a Selector) -> Option<ElementRef<'a>> {
        self.html.select(selector).next()
    }

    /// Trimmed text of the first match.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.first(selector).map(text_of)
    }
}

/// Full text content of an element, trimmed.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First descendant of `element` matching `selector`.
pub fn first_within<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Attribute value, treating an empty string as absent.
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}
