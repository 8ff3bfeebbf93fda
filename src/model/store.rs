//! User persistence client
//!
//! Opaque CRUD against a document store exposing a users collection over
//! HTTP. The playback core never talks to this directly; it reads
//! `default_playlist_id` and writes playlists through the controller.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::types::User;

#[derive(Clone)]
pub struct UserStore {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    users: Vec<User>,
}

impl UserStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn user_url(&self, email: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencode(email))
    }

    /// Create or overwrite the document keyed by the user's email.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        let response = self
            .http_client
            .put(self.user_url(&user.email))
            .json(user)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("user store rejected save: HTTP {}", status));
        }
        tracing::debug!(email = %user.email, "User saved");
        Ok(())
    }

    /// Fetch a user document; absent documents are `None`, not errors.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>> {
        let response = self
            .http_client
            .get(self.user_url(email))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("user store lookup failed: HTTP {}", status));
        }
        Ok(Some(response.json::<User>().await?))
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        let response = self
            .http_client
            .get(format!("{}/users", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("user store listing failed: HTTP {}", status));
        }
        Ok(response.json::<UserListResponse>().await?.users)
    }

    pub async fn delete_user(&self, email: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.user_url(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(anyhow!("user store delete failed: HTTP {}", status));
        }
        tracing::info!(email, "User deleted");
        Ok(())
    }
}

/// Percent-encode the handful of characters that can appear in an email
/// address but not in a path segment.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' | '@' | '+' => out.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_passes_through_unescaped() {
        assert_eq!(urlencode("user@example.com"), "user@example.com");
    }

    #[test]
    fn path_separators_are_escaped() {
        assert_eq!(urlencode("a/b"), "a%2Fb");
    }
}
