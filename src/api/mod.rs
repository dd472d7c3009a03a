//! REST client for the booking backend: session snapshots plus the three
//! seat commit actions (lock, unlock, book). The streaming channel is the
//! source of truth for state; these calls only initiate transitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::SyncError;
use crate::models::{BookingReceipt, ShowSession};

/// Uniform response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    fn failure_reason(self) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| "request failed".to_string())
    }

    fn into_data(self) -> Result<T, SyncError> {
        if !self.success {
            return Err(SyncError::Backend(self.failure_reason()));
        }
        match self.data {
            Some(data) => Ok(data),
            None => Err(SyncError::Backend("response carried no data".to_string())),
        }
    }

    fn ensure_success(self) -> Result<(), SyncError> {
        if self.success {
            Ok(())
        } else {
            Err(SyncError::Backend(self.failure_reason()))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatActionRequest<'a> {
    session_id: &'a str,
    seat_ids: &'a [String],
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingRequest<'a> {
    session_id: &'a str,
    seat_ids: &'a [String],
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_email: Option<&'a str>,
}

pub struct BookingApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl BookingApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full session snapshot, seats included. Loading it replaces whatever
    /// the store currently holds.
    pub async fn get_session(&self, session_id: &str) -> Result<ShowSession, SyncError> {
        let url = format!("{}/api/sessions/{}", self.base_url, session_id);
        debug!(%url, "fetching session snapshot");
        let envelope: ApiEnvelope<ShowSession> =
            self.http.get(&url).send().await?.json().await?;
        envelope.into_data()
    }

    /// Ask the backend to lock seats for this user. Confirmation arrives as
    /// a seat update on the streaming channel, not in this response.
    pub async fn lock_seats(
        &self,
        session_id: &str,
        seat_ids: &[String],
        user_id: &str,
    ) -> Result<(), SyncError> {
        self.seat_action("lock", session_id, seat_ids, user_id).await
    }

    /// Release previously locked seats.
    pub async fn unlock_seats(
        &self,
        session_id: &str,
        seat_ids: &[String],
        user_id: &str,
    ) -> Result<(), SyncError> {
        self.seat_action("unlock", session_id, seat_ids, user_id)
            .await
    }

    async fn seat_action(
        &self,
        action: &str,
        session_id: &str,
        seat_ids: &[String],
        user_id: &str,
    ) -> Result<(), SyncError> {
        let url = format!("{}/api/seats/{}", self.base_url, action);
        debug!(%url, seats = seat_ids.len(), "seat action");
        let envelope: ApiEnvelope<serde_json::Value> = self
            .http
            .post(&url)
            .json(&SeatActionRequest {
                session_id,
                seat_ids,
                user_id,
            })
            .send()
            .await?
            .json()
            .await?;
        envelope.ensure_success()
    }

    /// Commit the locked seats into a booking.
    pub async fn create_booking(
        &self,
        session_id: &str,
        seat_ids: &[String],
        user_id: &str,
        user_email: Option<&str>,
    ) -> Result<BookingReceipt, SyncError> {
        let url = format!("{}/api/bookings", self.base_url);
        debug!(%url, seats = seat_ids.len(), "creating booking");
        let envelope: ApiEnvelope<BookingReceipt> = self
            .http
            .post(&url)
            .json(&BookingRequest {
                session_id,
                seat_ids,
                user_id,
                user_email,
            })
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BookingApiClient {
        BookingApiClient::new(&ApiConfig {
            base_url: server.uri(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_a_session_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "s1",
                    "movieTitle": "Interstellar",
                    "moviePoster": "",
                    "theater": "Hall 3",
                    "startTime": "2026-08-23T18:00:00Z",
                    "endTime": "2026-08-23T21:00:00Z",
                    "totalSeats": 1,
                    "seats": [{
                        "id": "A1",
                        "row": "A",
                        "number": 1,
                        "status": "AVAILABLE",
                        "price": 12.5
                    }]
                }
            })))
            .mount(&server)
            .await;

        let session = client(&server).get_session("s1").await.unwrap();

        assert_eq!(session.movie_title, "Interstellar");
        assert_eq!(session.seats.len(), 1);
        assert_eq!(session.seats[0].status, SeatStatus::Available);
    }

    #[tokio::test]
    async fn lock_request_carries_session_seats_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/seats/lock"))
            .and(body_partial_json(json!({
                "sessionId": "s1",
                "seatIds": ["A1", "A2"],
                "userId": "user_7"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let seats = vec!["A1".to_string(), "A2".to_string()];
        client(&server)
            .lock_seats("s1", &seats, "user_7")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn backend_refusal_surfaces_its_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/seats/lock"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "seat already locked"
            })))
            .mount(&server)
            .await;

        let seats = vec!["A1".to_string()];
        let err = client(&server)
            .lock_seats("s1", &seats, "user_7")
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Backend(ref reason) if reason == "seat already locked"));
    }

    #[tokio::test]
    async fn creates_a_booking_and_returns_the_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bookings"))
            .and(body_partial_json(json!({ "userEmail": "a@b.c" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "b1",
                    "sessionId": "s1",
                    "userId": "user_7",
                    "seats": ["A1"],
                    "totalAmount": 12.5,
                    "status": "CONFIRMED",
                    "createdAt": "2026-08-23T18:05:00Z"
                }
            })))
            .mount(&server)
            .await;

        let seats = vec!["A1".to_string()];
        let receipt = client(&server)
            .create_booking("s1", &seats, "user_7", Some("a@b.c"))
            .await
            .unwrap();

        assert_eq!(receipt.id, "b1");
        assert_eq!(receipt.total_amount, 12.5);
        assert_eq!(receipt.status, "CONFIRMED");
    }

    #[tokio::test]
    async fn successful_response_without_data_is_a_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions/s1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
            )
            .mount(&server)
            .await;

        let err = client(&server).get_session("s1").await.unwrap_err();
        assert!(matches!(err, SyncError::Backend(_)));
    }
}
