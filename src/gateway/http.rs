//! HTTP implementation of the content gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::ContentGateway;
use crate::config::ApiConfig;
use crate::content::{BookContent, BookSummary, BookType, ChapterContent};
use crate::error::{ReaderError, ReaderResult};
use crate::practice::PracticeResult;
use crate::vocabulary::{SaveWordRequest, SavedWord};

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translate: (String, TranslatedText),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveWordBody<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    request: &'a SaveWordRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressBody<'a> {
    user_id: &'a str,
    book_id: &'a str,
    position: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PracticeBody<'a> {
    user_id: &'a str,
    game_type: &'a str,
    results: &'a [PracticeResult],
}

pub struct HttpGateway {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn transport errors and non-2xx statuses into a
    /// message, preferring the server's `{"error": ...}` body.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, String> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let response = req
            .send()
            .await
            .map_err(|e| format!("No response from server: {}", e))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or(body);
        Err(format!("{} ({})", message, status))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, String> {
        self.send(req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }
}

#[async_trait]
impl ContentGateway for HttpGateway {
    async fn fetch_content(
        &self,
        book_id: &str,
        book_type: BookType,
        title: Option<&str>,
    ) -> ReaderResult<BookContent> {
        debug!("Fetching {} book {} from gateway", book_type, book_id);

        let mut query = vec![("bookId", book_id), ("type", book_type.as_str())];
        if let Some(title) = title {
            query.push(("title", title));
        }

        let req = self.client.get(self.url("/api/retrieve")).query(&query);
        self.get_json(req).await.map_err(ReaderError::ContentUnavailable)
    }

    async fn fetch_chapter(&self, book_id: &str, chapter_id: &str) -> ReaderResult<ChapterContent> {
        debug!("Fetching chapter {} of {}", chapter_id, book_id);

        let req = self
            .client
            .get(self.url("/api/books/chapter"))
            .query(&[("bookId", book_id), ("chapterId", chapter_id)]);
        self.get_json(req).await.map_err(ReaderError::ContentUnavailable)
    }

    async fn translate(
        &self,
        word: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> ReaderResult<String> {
        let mut query = vec![("word", word), ("target", target_lang)];
        if let Some(source) = source_lang {
            query.push(("source", source));
        }

        let req = self.client.get(self.url("/api/translate")).query(&query);
        let response: TranslateResponse =
            self.get_json(req).await.map_err(ReaderError::TranslationFailed)?;

        Ok(response.translate.1.translated_text)
    }

    async fn save_word(&self, user_id: &str, request: &SaveWordRequest) -> ReaderResult<SavedWord> {
        let body = SaveWordBody { user_id, request };
        let req = self.client.post(self.url("/api/save-word")).json(&body);
        self.get_json(req).await.map_err(ReaderError::SaveFailed)
    }

    async fn update_progress(
        &self,
        user_id: &str,
        book_id: &str,
        position: f64,
    ) -> ReaderResult<()> {
        let body = ProgressBody {
            user_id,
            book_id,
            position,
        };
        let req = self.client.post(self.url("/api/books/progress")).json(&body);
        self.send(req)
            .await
            .map(|_| ())
            .map_err(ReaderError::PersistenceFailed)
    }

    async fn user_words(&self, user_id: &str) -> ReaderResult<Vec<SavedWord>> {
        let req = self.client.get(self.url(&format!("/api/words/{}", user_id)));
        self.get_json(req).await.map_err(ReaderError::Gateway)
    }

    async fn delete_word(&self, user_id: &str, word_id: &str) -> ReaderResult<()> {
        let req = self
            .client
            .delete(self.url(&format!("/api/words/{}/words/{}", user_id, word_id)));
        self.send(req).await.map(|_| ()).map_err(ReaderError::Gateway)
    }

    async fn featured_books(&self) -> ReaderResult<Vec<BookSummary>> {
        let req = self.client.get(self.url("/api/books/featured"));
        self.get_json(req).await.map_err(ReaderError::Gateway)
    }

    async fn user_books(&self, user_id: &str) -> ReaderResult<Vec<BookSummary>> {
        let req = self
            .client
            .get(self.url(&format!("/api/books/user/{}", user_id)));
        self.get_json(req).await.map_err(ReaderError::Gateway)
    }

    async fn submit_practice(
        &self,
        user_id: &str,
        results: &[PracticeResult],
        game_type: &str,
    ) -> ReaderResult<()> {
        let body = PracticeBody {
            user_id,
            game_type,
            results,
        };
        let req = self.client.post(self.url("/api/practice-result")).json(&body);
        self.send(req).await.map(|_| ()).map_err(ReaderError::Gateway)
    }
}
