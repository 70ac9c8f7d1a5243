use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use wellness_types::api::{
    ChallengeActionRequest, CompleteChallengeResponse, ErrorBody, LoginRequest, LoginResponse,
    MessageResponse, ProgressResponse, RegisterRequest, RegisterResponse, SaveMoodRequest,
};
use wellness_types::models::{MoodEntry, UserProfile};

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Every call the views make against the API.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError>;
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;
    async fn me(&self, token: &str) -> Result<UserProfile, ClientError>;
    async fn save_mood(&self, token: &str, req: &SaveMoodRequest) -> Result<(), ClientError>;
    async fn mood_history(&self, token: &str) -> Result<Vec<MoodEntry>, ClientError>;
    async fn progress(&self, token: &str) -> Result<ProgressResponse, ClientError>;
    async fn start_challenge(&self, token: &str, challenge_id: u32) -> Result<(), ClientError>;
    async fn complete_challenge(
        &self,
        token: &str,
        challenge_id: u32,
    ) -> Result<CompleteChallengeResponse, ClientError>;
}

/// HTTP implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL from `WELLNESS_API_URL`, falling back to localhost.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("WELLNESS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

impl Backend for ApiClient {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        self.send(self.http.post(self.url("/api/auth/register")).json(req))
            .await
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.send(self.http.post(self.url("/api/auth/login")).json(req))
            .await
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
        self.send(self.http.get(self.url("/api/auth/me")).bearer_auth(token))
            .await
    }

    async fn save_mood(&self, token: &str, req: &SaveMoodRequest) -> Result<(), ClientError> {
        let _: MessageResponse = self
            .send(
                self.http
                    .post(self.url("/api/mood/save"))
                    .bearer_auth(token)
                    .json(req),
            )
            .await?;
        Ok(())
    }

    async fn mood_history(&self, token: &str) -> Result<Vec<MoodEntry>, ClientError> {
        self.send(self.http.get(self.url("/api/mood/history")).bearer_auth(token))
            .await
    }

    async fn progress(&self, token: &str) -> Result<ProgressResponse, ClientError> {
        self.send(self.http.get(self.url("/api/progress")).bearer_auth(token))
            .await
    }

    async fn start_challenge(&self, token: &str, challenge_id: u32) -> Result<(), ClientError> {
        let _: MessageResponse = self
            .send(
                self.http
                    .post(self.url("/api/challenge/start"))
                    .bearer_auth(token)
                    .json(&ChallengeActionRequest { challenge_id }),
            )
            .await?;
        Ok(())
    }

    async fn complete_challenge(
        &self,
        token: &str,
        challenge_id: u32,
    ) -> Result<CompleteChallengeResponse, ClientError> {
        self.send(
            self.http
                .post(self.url("/api/challenge/complete"))
                .bearer_auth(token)
                .json(&ChallengeActionRequest { challenge_id }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://example.test:8001/");
        assert_eq!(client.base_url(), "http://example.test:8001");
        assert_eq!(client.url("/api/progress"), "http://example.test:8001/api/progress");
    }
}
