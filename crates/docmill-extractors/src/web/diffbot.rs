//! Cloud web engine backed by the Diffbot Article API.

use async_trait::async_trait;
use docmill_core::normalize::split_segments;
use docmill_core::{
    DiffbotConfig, DocumentContent, Domain, EngineChoice, ExtractError, ExtractResult, Extraction,
    ExtractionEngine, ExtractionRequest, ImageDescriptor, Link, RemoteImage,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Diffbot article engine.
pub struct DiffbotEngine {
    client: Client,
    token: SecretString,
    api_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleResponse {
    #[serde(default)]
    objects: Vec<Article>,
    error: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    text: String,
    title: Option<String>,
    #[serde(default)]
    images: Vec<ArticleImage>,
    #[serde(default)]
    links: Vec<ArticleLink>,
    html: Option<String>,
    author: Option<String>,
    date: Option<String>,
    site_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleImage {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArticleLink {
    Url(String),
    Detailed {
        #[serde(alias = "href")]
        url: String,
        #[serde(default)]
        text: Option<String>,
    },
}

impl DiffbotEngine {
    /// Create a new engine. Fails when no token is configured.
    pub fn new(config: &DiffbotConfig) -> ExtractResult<Self> {
        let token = config.token.clone().ok_or_else(|| {
            ExtractError::Configuration(
                "Diffbot token required. Set DIFFBOT_TOKEN.".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                ExtractError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            token,
            api_url: config.api_url.clone(),
        })
    }
}

fn into_extraction(url: &str, article: Article) -> Extraction {
    let images = article
        .images
        .into_iter()
        .filter(|image| !image.url.trim().is_empty())
        .map(|image| {
            ImageDescriptor::Remote(RemoteImage {
                url: image.url,
                alt: image.alt.unwrap_or_default(),
                title: image.title.unwrap_or_default(),
            })
        })
        .collect();

    let links = article
        .links
        .into_iter()
        .map(|link| match link {
            ArticleLink::Url(url) => Link {
                url,
                text: String::new(),
            },
            ArticleLink::Detailed { url, text } => Link {
                url,
                text: text.unwrap_or_default(),
            },
        })
        .collect();

    let title = article.title.filter(|t| !t.trim().is_empty());
    let content = DocumentContent {
        text: split_segments(&article.text),
        images,
        links,
        title: title.clone(),
        html: article.html,
        ..Default::default()
    };

    Extraction::new(content)
        .with_metadata("url", url)
        .with_metadata("title", title.unwrap_or_default())
        .with_metadata("author", article.author.unwrap_or_default())
        .with_metadata("date", article.date.unwrap_or_default())
        .with_metadata("site_name", article.site_name.unwrap_or_default())
}

#[async_trait]
impl ExtractionEngine for DiffbotEngine {
    #[instrument(skip_all, fields(engine = "diffbot"))]
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<Extraction> {
        let url = request.as_url()?;

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("token", self.token.expose_secret().as_str()),
                ("url", url),
                ("discussion", "false"),
            ])
            .send()
            .await
            .map_err(ExtractError::network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::from_http_status(status.as_u16(), &body));
        }

        let parsed: ArticleResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Parse(format!("Failed to parse Diffbot response: {}", e)))?;

        // Diffbot reports some failures in the body of a 200 response.
        if let Some(error) = parsed.error {
            return Err(ExtractError::from_http_status(
                parsed.error_code.unwrap_or(502),
                &error,
            ));
        }

        let Some(article) = parsed.objects.into_iter().next() else {
            return Err(ExtractError::EmptyResult(
                "Diffbot returned no objects".to_string(),
            ));
        };
        debug!(url, "Diffbot article received");

        let extraction = into_extraction(url, article);
        if extraction.content.is_empty() {
            return Err(ExtractError::EmptyResult(
                "Diffbot article has no content".to_string(),
            ));
        }
        Ok(extraction)
    }

    fn domain(&self) -> Domain {
        Domain::Web
    }

    fn choice(&self) -> EngineChoice {
        EngineChoice::Cloud
    }

    fn name(&self) -> &str {
        "diffbot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_rejected() {
        assert!(matches!(
            DiffbotEngine::new(&DiffbotConfig::default()),
            Err(ExtractError::Configuration(_))
        ));
    }

    #[test]
    fn test_links_accept_strings_and_objects() {
        let article: Article = serde_json::from_value(serde_json::json!({
            "text": "One\n\nTwo",
            "links": ["https://a.example", {"href": "https://b.example", "text": "B"}]
        }))
        .unwrap();

        let extraction = into_extraction("https://example.com", article);
        assert_eq!(extraction.content.text, vec!["One", "Two"]);
        assert_eq!(extraction.content.links[0].url, "https://a.example");
        assert_eq!(extraction.content.links[1].text, "B");
        assert!(extraction.content.key_value_pairs.is_empty());
    }
}
