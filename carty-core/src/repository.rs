use async_trait::async_trait;
use carty_shared::models::{
    Booking, BookingConfirmed, Car, ConfirmBookingRequest, CreateBookingRequest, Faq, Location,
    LoginResponse, Notification, Offer, Package, Payment, PaymentRequest, RegisterRequest,
    RegisterResponse, TempBooking, TempBookingCreated, TempBookingId, TokenPair,
};

use crate::credentials::Credentials;
use crate::search::TripPayload;
use crate::CoreResult;

/// Ordered query string pairs; empty values are expected to be filtered out already.
pub type QueryParams = Vec<(String, String)>;

/// Access to the rental backend's JSON API.
///
/// Endpoints that need a signed-in customer take `&Credentials`; there is no
/// way to call them without first obtaining credentials from the session.
#[async_trait]
pub trait RentalBackend: Send + Sync {
    // Auth

    /// `POST /api/token/`
    async fn obtain_token(&self, username: &str, password: &str) -> CoreResult<TokenPair>;

    /// `POST /api/login/`
    async fn login(&self, username: &str, password: &str) -> CoreResult<LoginResponse>;

    /// `POST /api/register/`
    async fn register(&self, request: &RegisterRequest) -> CoreResult<RegisterResponse>;

    // Public catalog

    /// `GET /api/cars/`
    async fn list_cars(&self) -> CoreResult<Vec<Car>>;

    /// `GET /api/cars/available/`
    async fn available_cars(&self, query: &QueryParams) -> CoreResult<Vec<Car>>;

    /// `GET /api/locations/?search=<q>`
    async fn search_locations(&self, query: &str) -> CoreResult<Vec<Location>>;

    /// `GET /api/packages/`
    async fn list_packages(&self) -> CoreResult<Vec<Package>>;

    /// `GET /api/offers/`
    async fn list_offers(&self) -> CoreResult<Vec<Offer>>;

    /// `GET /api/faqs/`
    async fn list_faqs(&self) -> CoreResult<Vec<Faq>>;

    // Protected

    /// `GET /api/cars/{id}/`
    async fn get_car(&self, credentials: &Credentials, id: i64) -> CoreResult<Car>;

    /// `POST /api/booking-temp/`
    async fn create_temp_booking(
        &self,
        credentials: &Credentials,
        trip: &TripPayload,
    ) -> CoreResult<TempBookingCreated>;

    /// `GET /api/booking-temp/{id}/`
    async fn get_temp_booking(
        &self,
        credentials: &Credentials,
        id: &TempBookingId,
    ) -> CoreResult<TempBooking>;

    /// `POST /api/confirm-booking/`
    async fn confirm_booking(
        &self,
        credentials: &Credentials,
        request: &ConfirmBookingRequest,
    ) -> CoreResult<BookingConfirmed>;

    /// `GET /api/bookings/`
    async fn list_bookings(&self, credentials: &Credentials) -> CoreResult<Vec<Booking>>;

    /// `GET /api/bookings/{id}/`
    async fn get_booking(&self, credentials: &Credentials, id: i64) -> CoreResult<Booking>;

    /// `POST /api/bookings/`
    async fn create_booking(
        &self,
        credentials: &Credentials,
        request: &CreateBookingRequest,
    ) -> CoreResult<Booking>;

    /// `POST /api/payments/`
    async fn create_payment(
        &self,
        credentials: &Credentials,
        request: &PaymentRequest,
    ) -> CoreResult<Payment>;

    /// `GET /api/notifications/`
    async fn list_notifications(&self, credentials: &Credentials)
        -> CoreResult<Vec<Notification>>;
}
