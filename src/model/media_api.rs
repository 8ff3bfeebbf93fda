//! Track search and trending client
//!
//! Thin wrapper over the video platform's data API. Failures never reach
//! the playback core; the controller converts them to an empty result plus
//! a transient notice.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::types::Track;

const MUSIC_CATEGORY_ID: &str = "10";
const PAGE_SIZE: u32 = 24;

#[derive(Clone)]
pub struct MediaApi {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

// Wire shapes for the platform's search and video-list endpoints.

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        self.medium
            .as_ref()
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

impl MediaApi {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("media API key not configured"))
    }

    /// Full-text search over the music category.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let key = self.key()?;
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", page_size.as_str()),
                ("q", query),
                ("key", key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("search failed: HTTP {}", status));
        }

        let body = response.json::<SearchResponse>().await?;
        let tracks = body
            .items
            .into_iter()
            .filter_map(|item| {
                let media_id = item.id.video_id?;
                Some(Track {
                    id: media_id.clone(),
                    title: item.snippet.title,
                    artist: item.snippet.channel_title,
                    thumbnail: item.snippet.thumbnails.best_url(),
                    media_id,
                })
            })
            .collect();
        Ok(tracks)
    }

    /// Most-popular music tracks for a region.
    pub async fn trending_tracks(&self, region_code: &str) -> Result<Vec<Track>> {
        let key = self.key()?;
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .http_client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("chart", "mostPopular"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", page_size.as_str()),
                ("regionCode", region_code),
                ("key", key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("trending lookup failed: HTTP {}", status));
        }

        let body = response.json::<VideoListResponse>().await?;
        let tracks = body
            .items
            .into_iter()
            .map(|item| Track {
                id: item.id.clone(),
                title: item.snippet.title,
                artist: item.snippet.channel_title,
                thumbnail: item.snippet.thumbnails.best_url(),
                media_id: item.id,
            })
            .collect();
        Ok(tracks)
    }
}

/// Map the stored country to the region code the trending endpoint expects.
/// Unknown countries fall back to a worldwide-ish default.
pub fn region_code_for(country: &str) -> &'static str {
    match country.trim().to_ascii_lowercase().as_str() {
        "united states" | "usa" | "us" => "US",
        "united kingdom" | "uk" | "gb" => "GB",
        "germany" | "de" => "DE",
        "france" | "fr" => "FR",
        "spain" | "es" => "ES",
        "italy" | "it" => "IT",
        "bulgaria" | "bg" => "BG",
        "india" | "in" => "IN",
        "japan" | "jp" => "JP",
        "south korea" | "korea" | "kr" => "KR",
        "brazil" | "br" => "BR",
        "mexico" | "mx" => "MX",
        "canada" | "ca" => "CA",
        "australia" | "au" => "AU",
        "netherlands" | "nl" => "NL",
        "poland" | "pl" => "PL",
        "sweden" | "se" => "SE",
        "norway" | "no" => "NO",
        "turkey" | "tr" => "TR",
        _ => "US",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_mapping_is_case_insensitive() {
        assert_eq!(region_code_for("Bulgaria"), "BG");
        assert_eq!(region_code_for("bulgaria"), "BG");
        assert_eq!(region_code_for(" de "), "DE");
    }

    #[test]
    fn unknown_country_falls_back() {
        assert_eq!(region_code_for("Atlantis"), "US");
    }

    #[test]
    fn search_response_skips_items_without_video_id() {
        let raw = r#"{
            "items": [
                {"id": {"videoId": "abc"}, "snippet": {"title": "Song", "channelTitle": "Artist",
                 "thumbnails": {"medium": {"url": "http://img/1"}}}},
                {"id": {}, "snippet": {"title": "Channel result", "channelTitle": "X"}}
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(raw).unwrap();
        let tracks: Vec<Track> = body
            .items
            .into_iter()
            .filter_map(|item| {
                let media_id = item.id.video_id?;
                Some(Track {
                    id: media_id.clone(),
                    title: item.snippet.title,
                    artist: item.snippet.channel_title,
                    thumbnail: item.snippet.thumbnails.best_url(),
                    media_id,
                })
            })
            .collect();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].media_id, "abc");
        assert_eq!(tracks[0].thumbnail, "http://img/1");
    }
}
