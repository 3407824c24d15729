// Read-only queries over a rendered page snapshot.
//
// The browser does navigation and waiting; extraction runs here against the
// DOM it returned. `TextQuery` stands in for the XPath lookups the platforms
// need: the same query renders to XPath for the in-browser wait and is
// evaluated natively for extraction.

use scraper::{ElementRef, Html, Selector};

/// Elements whose text never shows up in rendered page text.
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template"];

/// `//tag[contains(text(), n1) or contains(text(), n2) ...]` followed by
/// `ascend` parent steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextQuery {
    pub tag: &'static str,
    pub needles: &'static [&'static str],
    pub ascend: usize,
}

impl TextQuery {
    pub fn to_xpath(&self) -> String {
        let predicate = self
            .needles
            .iter()
            .map(|n| format!("contains(text(), '{n}')"))
            .collect::<Vec<_>>()
            .join(" or ");
        let mut xpath = format!("//{}[{}]", self.tag, predicate);
        for _ in 0..self.ascend {
            xpath.push_str("/..");
        }
        xpath
    }

    /// First match in document order. Like XPath 1.0, `contains(text(), ..)`
    /// only looks at the element's first direct text node.
    pub fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse(self.tag).ok()?;
        let hit = document.select(&selector).find(|el| {
            first_own_text(*el).is_some_and(|text| self.needles.iter().any(|n| text.contains(n)))
        })?;

        let mut current = hit;
        for _ in 0..self.ascend {
            current = current.parent().and_then(ElementRef::wrap)?;
        }
        Some(current)
    }
}

fn first_own_text(el: ElementRef<'_>) -> Option<&str> {
    el.children()
        .find_map(|child| child.value().as_text().map(|t| &*t.text))
}

pub struct PageSnapshot {
    document: Html,
    url: String,
}

impl PageSnapshot {
    pub fn parse(html: &str, url: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.document.select(&selector).next()
    }

    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Trimmed text of the first match, `None` when absent or blank.
    pub fn text_of(&self, css: &str) -> Option<String> {
        self.select_first(css)
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    pub fn find(&self, query: &TextQuery) -> Option<ElementRef<'_>> {
        query.find(&self.document)
    }

    pub fn meta_content(&self, name: &str) -> Option<String> {
        let el = self.select_first(&format!(r#"meta[name="{name}"]"#))?;
        el.value().attr("content").map(str::to_string)
    }

    /// Visible body text with whitespace collapsed, skipping script and
    /// style contents.
    pub fn body_text(&self) -> String {
        let mut out = String::new();
        if let Some(body) = self.select_first("body") {
            collect_rendered_text(body, &mut out);
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Descendants of `el` matching `css`.
pub fn select_within<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => el.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Text content of an element, whitespace collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_rendered_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !NON_RENDERED.contains(&child_el.value().name()) {
                collect_rendered_text(child_el, out);
            }
        }
    }
}
