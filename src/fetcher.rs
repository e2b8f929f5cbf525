use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::models::FeedItemsPage;

/// Source of feed pages for a search text
///
/// `Ok(None)` means the source had nothing to offer; callers treat it as a no-op.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self, search_text: &str) -> Result<Option<FeedItemsPage>, FetchError>;
}

/// Client for Flickr's public photo feed
pub struct FlickrClient {
    client: Client,
    endpoint: String,
}

impl FlickrClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl FeedSource for FlickrClient {
    async fn fetch_items(&self, search_text: &str) -> Result<Option<FeedItemsPage>, FetchError> {
        let mut params = vec![("format", "json".to_string()), ("nojsoncallback", "1".to_string())];
        let tags = tags_param(search_text);
        if !tags.is_empty() {
            params.push(("tags", tags));
        }

        debug!(endpoint = %self.endpoint, query = search_text, "requesting feed");
        let response = self.client.get(&self.endpoint).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        decode_page(&body)
    }
}

/// Turns free search text into Flickr's comma-separated tag list
pub fn tags_param(search_text: &str) -> String {
    search_text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes a feed body, plain JSON or wrapped in `jsonFlickrFeed(...)`
///
/// Empty bodies and pages without items decode to `None`.
pub fn decode_page(body: &str) -> Result<Option<FeedItemsPage>, FetchError> {
    let json = strip_jsonp(body.trim());
    if json.is_empty() {
        return Ok(None);
    }

    let page: FeedItemsPage = serde_json::from_str(&unescape_single_quotes(json))?;
    if page.items.is_empty() {
        return Ok(None);
    }
    Ok(Some(page))
}

fn strip_jsonp(body: &str) -> &str {
    if body.starts_with('{') {
        return body;
    }
    match (body.find('('), body.rfind(')')) {
        (Some(open), Some(close)) if open < close => body[open + 1..close].trim(),
        _ => body,
    }
}

// The feed escapes apostrophes as \' which is not valid JSON
fn unescape_single_quotes(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "title": "Recent Uploads tagged porcupine",
        "link": "https://www.flickr.com/photos/tags/porcupine/",
        "modified": "2024-11-18T02:53:13Z",
        "items": [
            {
                "title": "North American Porcupine",
                "link": "https://www.flickr.com/photos/schenfeld/54146489112/",
                "media": {"m": "https://live.staticflickr.com/65535/54146489112_a9c92903c8_m.jpg"},
                "date_taken": "2023-06-07T15:37:45-08:00",
                "description": "<p>Cadillac Mountain</p>",
                "published": "2024-11-18T02:53:13Z",
                "author": "nobody@flickr.com (\"David Schenfeld\")",
                "author_id": "17528760@N00",
                "tags": "acadia maine porcupine"
            },
            {
                "title": "Second",
                "link": "https://www.flickr.com/photos/x/2/",
                "media": {"m": "https://live.staticflickr.com/2_m.jpg"},
                "date_taken": "2023-06-08T10:00:00-08:00",
                "description": "",
                "published": "2024-11-18T03:00:00Z",
                "author": "nobody@flickr.com (\"Someone\")",
                "author_id": "1@N00",
                "tags": ""
            }
        ]
    }"#;

    #[test]
    fn test_decode_plain_json_keeps_order() {
        let page = decode_page(PAGE).unwrap().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "North American Porcupine");
        assert_eq!(page.items[1].title, "Second");
        assert_eq!(
            page.items[0].media_url(),
            "https://live.staticflickr.com/65535/54146489112_a9c92903c8_m.jpg"
        );
        assert_eq!(page.items[0].author_id, "17528760@N00");
    }

    #[test]
    fn test_decode_jsonp_wrapper() {
        let body = format!("jsonFlickrFeed({})", PAGE);
        let page = decode_page(&body).unwrap().unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_decode_escaped_apostrophe() {
        let body = r#"{"items": [{"title": "Porcupine\'s den", "description": "a \\ b"}]}"#;
        let page = decode_page(body).unwrap().unwrap();
        assert_eq!(page.items[0].title, "Porcupine's den");
        assert_eq!(page.items[0].description, "a \\ b");
    }

    #[test]
    fn test_decode_empty_is_none() {
        assert!(decode_page("").unwrap().is_none());
        assert!(decode_page("   \n").unwrap().is_none());
        assert!(decode_page(r#"{"items": []}"#).unwrap().is_none());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = decode_page("<html>nope</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_tags_param() {
        assert_eq!(tags_param("red  car"), "red,car");
        assert_eq!(tags_param(" porcupine, maine "), "porcupine,maine");
        assert_eq!(tags_param("   "), "");
    }
}
