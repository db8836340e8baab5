use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use shared::models::matchmaking::requests::{
    CompleteMatchRequest, JoinQueueRequest, RoundAdvanceRequest, ScoreUpdateRequest,
};
use shared::models::matchmaking::responses::{ErrorResponse, FindMatchResponse, JoinQueueResponse};
use shared::models::online_match::OnlineMatch;
use shared::models::profile::PlayerProfile;

use crate::backend::MatchmakingBackend;
use crate::error::BackendError;

/// REST implementation of [`MatchmakingBackend`] carrying a bearer token.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        HttpBackend {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check(&self, response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Response, BackendError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        self.check(response).await
    }

    async fn send_json<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, BackendError> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        self.check(response).await
    }
}

#[async_trait]
impl MatchmakingBackend for HttpBackend {
    async fn join_queue(&self, trophies: i32) -> Result<DateTime<Utc>, BackendError> {
        let response = self
            .send_json(
                reqwest::Method::POST,
                "/matchmaking/join",
                Some(&JoinQueueRequest { trophies }),
            )
            .await?;
        let body: JoinQueueResponse = self.decode(response).await?;
        Ok(body.joined_at)
    }

    async fn leave_queue(&self) -> Result<(), BackendError> {
        self.send_json::<()>(reqwest::Method::POST, "/matchmaking/leave", None)
            .await?;
        Ok(())
    }

    async fn find_match(&self) -> Result<FindMatchResponse, BackendError> {
        let response = self
            .send_json::<()>(reqwest::Method::POST, "/matchmaking/find", None)
            .await?;
        self.decode(response).await
    }

    async fn get_match(&self, match_id: &str) -> Result<OnlineMatch, BackendError> {
        let response = self.get(&format!("/matches/{}", match_id)).await?;
        self.decode(response).await
    }

    async fn submit_score(&self, match_id: &str, score: i32) -> Result<(), BackendError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/matches/{}/score", match_id),
            Some(&ScoreUpdateRequest { score }),
        )
        .await?;
        Ok(())
    }

    async fn advance_round(&self, match_id: &str, round: i32) -> Result<(), BackendError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/matches/{}/round", match_id),
            Some(&RoundAdvanceRequest { round }),
        )
        .await?;
        Ok(())
    }

    async fn complete_match(
        &self,
        match_id: &str,
        winner_id: Option<&str>,
    ) -> Result<(), BackendError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/matches/{}/complete", match_id),
            Some(&CompleteMatchRequest {
                winner_id: winner_id.map(str::to_string),
            }),
        )
        .await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<PlayerProfile, BackendError> {
        let response = self.get(&format!("/profiles/{}", user_id)).await?;
        self.decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = HttpBackend::new("https://api.example.com/", "token");
        assert_eq!(
            backend.url("/matchmaking/join"),
            "https://api.example.com/matchmaking/join"
        );

        let bare = HttpBackend::new("https://api.example.com", "token");
        assert_eq!(bare.url("/health"), "https://api.example.com/health");
    }
}
