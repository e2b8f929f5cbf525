use serde::{Deserialize, Serialize};

use crate::formatter;

/// Image link nested under `media.m` in the feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub m: String,
}

/// One photo entry of the public feed, field names as sent on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedRecord {
    pub title: String,
    pub link: String,
    pub media: Media,
    pub date_taken: String,
    pub description: String,
    pub published: String,
    pub author: String,
    pub author_id: String,
    pub tags: String,
}

impl FeedRecord {
    pub fn media_url(&self) -> &str {
        &self.media.m
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItemsPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub items: Vec<FeedRecord>,
}

/// Display-ready fields for the detail view of a single photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItemDetail {
    pub title: String,
    pub image_url: String,
    pub link: String,
    pub description: String,
    pub author_name: String,
    pub author_id: String,
    pub published: Option<String>,
    pub date_taken: Option<String>,
    pub tags: Vec<String>,
}

impl FeedItemDetail {
    pub fn from_record(record: &FeedRecord) -> Self {
        Self {
            title: record.title.clone(),
            image_url: record.media_url().to_string(),
            link: record.link.clone(),
            description: formatter::clean_description(&record.description),
            author_name: formatter::extract_author_name(&record.author),
            author_id: record.author_id.clone(),
            published: formatter::formatted_date(&record.published),
            date_taken: formatter::formatted_date_taken(&record.date_taken),
            tags: formatter::split_tags(&record.tags),
        }
    }
}
