//! Recommendation client
//!
//! Calls a generative-text service for genre recommendations and mood
//! playlists. The model is a black box; prompts go in, free text comes out.
//! Failures degrade to an apology string at the call site, never a crash.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;

pub const APOLOGY: &str = "Sorry, I couldn't get recommendations at this time.";

const MODEL: &str = "gemini-2.0-flash";

#[derive(Clone)]
pub struct Recommender {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl Recommender {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("recommender API key not configured"))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, MODEL, key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self.http_client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("text generation failed: HTTP {}", status));
        }

        let body = response.json::<GenerateResponse>().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(anyhow!("text generation returned an empty candidate"));
        }
        Ok(text)
    }

    /// Free-text recommendations from listening history and favorite
    /// artists.
    pub async fn genre_recommendations(
        &self,
        listening_history: &str,
        favorite_artists: &[String],
    ) -> Result<String> {
        let mut prompt = String::from(
            "You are a music expert. Analyze the user's listening history and \
             their list of favorite artists to provide music recommendations.\n\n",
        );
        if !favorite_artists.is_empty() {
            prompt.push_str("The user's favorite artists are:\n");
            for artist in favorite_artists {
                prompt.push_str("- ");
                prompt.push_str(artist);
                prompt.push('\n');
            }
            prompt.push_str("Base your recommendations heavily on these artists and similar ones.\n\n");
        }
        prompt.push_str("User Listening History: ");
        prompt.push_str(listening_history);
        prompt.push_str("\n\nRecommendations:");

        self.generate(prompt).await
    }

    /// Song titles matching a mood, one per line.
    pub async fn mood_playlist(&self, mood: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "You are a playlist generation expert. A user is feeling a specific \
             mood and wants songs to match that mood. Create a playlist of songs \
             that is most appropriate for the mood. Answer with one song title \
             per line and nothing else.\n\nMood: {}\n\nSongs:",
            mood
        );

        let text = self.generate(prompt).await?;
        let songs = parse_song_lines(&text);
        if songs.is_empty() {
            return Err(anyhow!("mood playlist came back empty"));
        }
        Ok(songs)
    }
}

/// Strip list markers and blank lines from the model's reply.
fn parse_song_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_lines_drop_markers_and_blanks() {
        let text = "1. First Song\n- Second Song\n\n  * Third Song  \n";
        assert_eq!(
            parse_song_lines(text),
            vec!["First Song", "Second Song", "Third Song"]
        );
    }

    #[test]
    fn generate_response_parses_candidates() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#;
        let body: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.candidates[0].content.parts[0].text, "hello");
    }
}
