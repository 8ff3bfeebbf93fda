//! Sign-in flows
//!
//! Runs before the TUI takes over the terminal: restore a cached session,
//! or walk the user through password / emailed-code sign-in against the
//! user store. Credential handling is deliberately simple; designing an
//! auth protocol is out of scope.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::model::{LocalCache, StoredSession, User, UserStore};

const OTP_TTL_MINUTES: i64 = 10;
const MAX_ATTEMPTS: usize = 3;

/// Transactional-mail client used for OTP delivery
#[derive(Clone)]
pub struct Mailer {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Mailer {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub async fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("mailer API key not configured"))?;

        let body = json!({
            "to": to,
            "subject": "Your Tunedeck sign-in code",
            "text": format!(
                "Your sign-in code is {}. It expires in {} minutes.",
                code, OTP_TTL_MINUTES
            ),
        });

        let response = self
            .http_client
            .post(format!("{}/tx/send", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("mail delivery failed: HTTP {}", status));
        }
        tracing::info!(to, "Sign-in code emailed");
        Ok(())
    }
}

/// Restore the cached session or run the interactive sign-in flow.
pub async fn sign_in(store: &UserStore, mailer: &Mailer, cache: &LocalCache) -> Result<StoredSession> {
    if let Some(session) = cache.load_session().unwrap_or_default() {
        tracing::info!(email = %session.user.email, "Restored cached session");
        return Ok(session);
    }

    println!("Sign in to Tunedeck");
    let email = prompt("Email: ")?;
    if !email.contains('@') {
        return Err(anyhow!("'{}' does not look like an email address", email));
    }

    let existing = store
        .get_user(&email)
        .await
        .context("user store unreachable")?;

    let user = match existing {
        Some(user) => {
            if user.password.is_some() {
                let method = prompt("Sign in with [p]assword or emailed [c]ode? ")?;
                if method.to_lowercase().starts_with('p') {
                    password_flow(user)?
                } else {
                    otp_flow(store, mailer, user).await?
                }
            } else {
                otp_flow(store, mailer, user).await?
            }
        }
        None => {
            println!("No account found for {}; creating one.", email);
            let password = prompt("Choose a password (empty for code-only sign-in): ")?;
            let mut user = User::new(email);
            if !password.is_empty() {
                user.password = Some(password);
            }
            store.save_user(&user).await.context("could not create the account")?;
            tracing::info!(email = %user.email, "Account created");
            user
        }
    };

    let session = StoredSession {
        token: issue_token(&user.email),
        user,
    };
    cache.save_session(&session)?;
    tracing::info!(email = %session.user.email, "Signed in");
    Ok(session)
}

fn password_flow(user: User) -> Result<User> {
    for _ in 0..MAX_ATTEMPTS {
        let entered = prompt("Password: ")?;
        if user.password.as_deref() == Some(entered.as_str()) {
            return Ok(user);
        }
        println!("Wrong password, try again.");
    }
    Err(anyhow!("too many failed password attempts"))
}

async fn otp_flow(store: &UserStore, mailer: &Mailer, mut user: User) -> Result<User> {
    let code = generate_otp();
    user.otp = Some(code.clone());
    user.otp_expires = Some(Utc::now() + Duration::minutes(OTP_TTL_MINUTES));
    store
        .save_user(&user)
        .await
        .context("could not store the sign-in code")?;

    match mailer.send_otp(&user.email, &code).await {
        Ok(()) => println!("A sign-in code was emailed to {}.", user.email),
        Err(e) => {
            // Mail misconfiguration must not lock the user out of the demo
            tracing::warn!(error = %e, "Mail delivery unavailable, showing code locally");
            println!("(Mail delivery unavailable; your code is {})", code);
        }
    }

    for _ in 0..MAX_ATTEMPTS {
        let entered = prompt("Code: ")?;
        let expired = user
            .otp_expires
            .map(|at| Utc::now() > at)
            .unwrap_or(true);
        if expired {
            return Err(anyhow!("the sign-in code expired"));
        }
        if user.otp.as_deref() == Some(entered.as_str()) {
            user.otp = None;
            user.otp_expires = None;
            store.save_user(&user).await?;
            return Ok(user);
        }
        println!("That code did not match, try again.");
    }
    Err(anyhow!("too many failed code attempts"))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Six digits derived from the clock. Good enough for a demo credential
/// with a ten-minute lifetime.
fn generate_otp() -> String {
    let now = Utc::now();
    let mut hasher = DefaultHasher::new();
    now.timestamp_nanos_opt().unwrap_or_default().hash(&mut hasher);
    format!("{:06}", hasher.finish() % 1_000_000)
}

/// Opaque session token, persisted alongside the user record.
fn issue_token(email: &str) -> String {
    let mut hasher = DefaultHasher::new();
    email.hash(&mut hasher);
    Utc::now().timestamp_nanos_opt().unwrap_or_default().hash(&mut hasher);
    format!("tk_{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        let code = generate_otp();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn tokens_are_prefixed_and_unique_per_user() {
        let a = issue_token("a@example.com");
        let b = issue_token("b@example.com");
        assert!(a.starts_with("tk_"));
        assert_ne!(a, b);
    }
}
