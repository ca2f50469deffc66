use async_trait::async_trait;
use carty_core::search::TripPayload;
use carty_core::{CoreError, CoreResult, Credentials, QueryParams, RentalBackend};
use carty_shared::models::{
    Booking, BookingConfirmed, Car, ConfirmBookingRequest, CreateBookingRequest, Faq, ListPayload,
    Location, LoginResponse, Notification, Offer, Package, Payment, PaymentRequest,
    RegisterRequest, RegisterResponse, TempBooking, TempBookingCreated, TempBookingId, TokenPair,
};
use reqwest::{header, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::app_config::ApiConfig;

/// `RentalBackend` over HTTP.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Pulls the human-readable message out of an error body
/// (`{"detail": ...}`, `{"error": ...}`, `{"message": ...}` or field errors).
pub fn error_detail(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let Some(serde_json::Value::Object(map)) = parsed else {
        return body.trim().to_string();
    };
    for key in ["detail", "error", "message"] {
        match map.get(key) {
            Some(serde_json::Value::String(text)) => return text.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    body.trim().to_string()
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::TransportError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
        match credentials {
            Some(credentials) => request.header(header::AUTHORIZATION, credentials.header_value()),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        credentials: Option<&Credentials>,
    ) -> CoreResult<T> {
        debug!(path, params = query.len(), "GET");
        let request = Self::authorize(self.client.get(self.url(path)).query(query), credentials);
        let response = request.send().await.map_err(transport)?;
        Self::read(path, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credentials: Option<&Credentials>,
    ) -> CoreResult<T> {
        debug!(path, "POST");
        let request = Self::authorize(self.client.post(self.url(path)).json(body), credentials);
        let response = request.send().await.map_err(transport)?;
        Self::read(path, response).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        credentials: Option<&Credentials>,
    ) -> CoreResult<Vec<T>> {
        let payload: ListPayload<T> = self.get(path, query, credentials).await?;
        Ok(payload.into_vec())
    }

    async fn read<T: DeserializeOwned>(path: &str, response: Response) -> CoreResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            let detail = error_detail(&body);
            warn!(path, status = status.as_u16(), %detail, "backend rejected request");
            return Err(CoreError::backend(status.as_u16(), detail));
        }
        serde_json::from_str(&body).map_err(|e| {
            CoreError::InvalidResponse(format!("{} returned unexpected JSON: {}", path, e))
        })
    }
}

fn transport(e: reqwest::Error) -> CoreError {
    CoreError::TransportError(e.to_string())
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[async_trait]
impl RentalBackend for ApiClient {
    async fn obtain_token(&self, username: &str, password: &str) -> CoreResult<TokenPair> {
        self.post("/api/token/", &LoginBody { username, password }, None).await
    }

    async fn login(&self, username: &str, password: &str) -> CoreResult<LoginResponse> {
        self.post("/api/login/", &LoginBody { username, password }, None).await
    }

    async fn register(&self, request: &RegisterRequest) -> CoreResult<RegisterResponse> {
        self.post("/api/register/", request, None).await
    }

    async fn list_cars(&self) -> CoreResult<Vec<Car>> {
        self.get_list("/api/cars/", &[], None).await
    }

    async fn available_cars(&self, query: &QueryParams) -> CoreResult<Vec<Car>> {
        self.get_list("/api/cars/available/", query, None).await
    }

    async fn search_locations(&self, query: &str) -> CoreResult<Vec<Location>> {
        let params = [("search".to_string(), query.to_string())];
        self.get_list("/api/locations/", &params, None).await
    }

    async fn list_packages(&self) -> CoreResult<Vec<Package>> {
        self.get_list("/api/packages/", &[], None).await
    }

    async fn list_offers(&self) -> CoreResult<Vec<Offer>> {
        self.get_list("/api/offers/", &[], None).await
    }

    async fn list_faqs(&self) -> CoreResult<Vec<Faq>> {
        self.get_list("/api/faqs/", &[], None).await
    }

    async fn get_car(&self, credentials: &Credentials, id: i64) -> CoreResult<Car> {
        self.get(&format!("/api/cars/{}/", id), &[], Some(credentials)).await
    }

    async fn create_temp_booking(
        &self,
        credentials: &Credentials,
        trip: &TripPayload,
    ) -> CoreResult<TempBookingCreated> {
        self.post("/api/booking-temp/", trip, Some(credentials)).await
    }

    async fn get_temp_booking(
        &self,
        credentials: &Credentials,
        id: &TempBookingId,
    ) -> CoreResult<TempBooking> {
        self.get(&format!("/api/booking-temp/{}/", id), &[], Some(credentials))
            .await
    }

    async fn confirm_booking(
        &self,
        credentials: &Credentials,
        request: &ConfirmBookingRequest,
    ) -> CoreResult<BookingConfirmed> {
        self.post("/api/confirm-booking/", request, Some(credentials))
            .await
    }

    async fn list_bookings(&self, credentials: &Credentials) -> CoreResult<Vec<Booking>> {
        self.get_list("/api/bookings/", &[], Some(credentials)).await
    }

    async fn get_booking(&self, credentials: &Credentials, id: i64) -> CoreResult<Booking> {
        self.get(&format!("/api/bookings/{}/", id), &[], Some(credentials))
            .await
    }

    async fn create_booking(
        &self,
        credentials: &Credentials,
        request: &CreateBookingRequest,
    ) -> CoreResult<Booking> {
        self.post("/api/bookings/", request, Some(credentials)).await
    }

    async fn create_payment(
        &self,
        credentials: &Credentials,
        request: &PaymentRequest,
    ) -> CoreResult<Payment> {
        self.post("/api/payments/", request, Some(credentials)).await
    }

    async fn list_notifications(
        &self,
        credentials: &Credentials,
    ) -> CoreResult<Vec<Notification>> {
        self.get_list("/api/notifications/", &[], Some(credentials))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(error_detail(r#"{"detail": "Not found."}"#), "Not found.");
        assert_eq!(error_detail(r#"{"error": "Car unavailable"}"#), "Car unavailable");
        assert_eq!(
            error_detail(r#"{"username": ["A user with that username already exists."]}"#),
            r#"{"username": ["A user with that username already exists."]}"#
        );
        assert_eq!(error_detail("<html>502</html>"), "<html>502</html>");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(client.url("/api/cars/"), "http://localhost:8000/api/cars/");
    }
}
