//! HTML to normalized content.

use docmill_core::normalize::{rectangularize, resolve_url};
use docmill_core::{DocumentContent, ImageDescriptor, Link, RemoteImage};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use url::Url;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static TEXT_BLOCKS: Lazy<Selector> = Lazy::new(|| selector("p, h1, h2, h3, h4, h5, h6"));
static TABLES: Lazy<Selector> = Lazy::new(|| selector("table"));
static ROWS: Lazy<Selector> = Lazy::new(|| selector("tr"));
static CELLS: Lazy<Selector> = Lazy::new(|| selector("td, th"));
static IMAGES: Lazy<Selector> = Lazy::new(|| selector("img[src]"));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static KEYWORDS: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="keywords"]"#));

/// Parsed page: content plus page-level metadata.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub content: DocumentContent,
    pub metadata: Map<String, Value>,
}

/// Parse an HTML document fetched from `base`.
///
/// Text comes from paragraphs and headings in document order. Image and link
/// references are resolved against `base`. The raw markup is kept on the
/// content for storage.
pub fn parse_page(html: &str, base: &Url) -> ParsedPage {
    let doc = Html::parse_document(html);

    let text = doc
        .select(&TEXT_BLOCKS)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    let tables = doc
        .select(&TABLES)
        .filter_map(|table| {
            let rows = table
                .select(&ROWS)
                .map(|row| row.select(&CELLS).map(element_text).collect())
                .collect();
            rectangularize(rows)
        })
        .collect();

    let images = doc
        .select(&IMAGES)
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            (!src.is_empty()).then(|| {
                ImageDescriptor::Remote(RemoteImage {
                    url: resolve_url(base, src),
                    alt: img.value().attr("alt").unwrap_or_default().to_string(),
                    title: img.value().attr("title").unwrap_or_default().to_string(),
                })
            })
        })
        .collect();

    let links = doc
        .select(&LINKS)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            (!href.is_empty()).then(|| Link {
                url: resolve_url(base, href),
                text: element_text(a),
            })
        })
        .collect();

    let title = doc
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let mut metadata = Map::new();
    metadata.insert(
        "title".to_string(),
        title.clone().unwrap_or_default().into(),
    );
    metadata.insert("url".to_string(), base.as_str().into());
    metadata.insert("description".to_string(), meta_content(&doc, &DESCRIPTION).into());
    metadata.insert("keywords".to_string(), meta_content(&doc, &KEYWORDS).into());

    ParsedPage {
        content: DocumentContent {
            text,
            tables,
            images,
            links,
            title,
            html: Some(html.to_string()),
            ..Default::default()
        },
        metadata,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn meta_content(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or_default()
        .trim()
        .to_string()
}
