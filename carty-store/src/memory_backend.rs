use async_trait::async_trait;
use carty_core::search::TripPayload;
use carty_core::{CoreError, CoreResult, Credentials, QueryParams, RentalBackend};
use carty_shared::models::{
    Booking, BookingConfirmed, BookingStatus, Car, CarLocation, ConfirmBookingRequest,
    CreateBookingRequest, Faq, Location, LoginResponse, Notification, Offer, Package, Payment,
    PaymentRequest, Related, RegisterRequest, RegisterResponse, TempBooking, TempBookingCreated,
    TempBookingId, TokenPair,
};
use carty_shared::{Masked, Money};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub const LOGIN: &str = "POST /api/login/";
pub const TOKEN: &str = "POST /api/token/";
pub const REGISTER: &str = "POST /api/register/";
pub const CARS: &str = "GET /api/cars/";
pub const CAR_DETAIL: &str = "GET /api/cars/{id}/";
pub const AVAILABLE_CARS: &str = "GET /api/cars/available/";
pub const LOCATIONS: &str = "GET /api/locations/";
pub const PACKAGES: &str = "GET /api/packages/";
pub const OFFERS: &str = "GET /api/offers/";
pub const FAQS: &str = "GET /api/faqs/";
pub const CREATE_TEMP_BOOKING: &str = "POST /api/booking-temp/";
pub const TEMP_BOOKING: &str = "GET /api/booking-temp/{id}/";
pub const CONFIRM_BOOKING: &str = "POST /api/confirm-booking/";
pub const BOOKINGS: &str = "GET /api/bookings/";
pub const BOOKING_DETAIL: &str = "GET /api/bookings/{id}/";
pub const CREATE_BOOKING: &str = "POST /api/bookings/";
pub const PAYMENTS: &str = "POST /api/payments/";
pub const NOTIFICATIONS: &str = "GET /api/notifications/";

const JWT_SECRET: &[u8] = b"carty-in-memory-backend";
const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// One call as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub query: QueryParams,
    pub authorization: Option<String>,
}

struct Account {
    id: i64,
    password: String,
}

#[derive(Default)]
struct Data {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, i64>,
    cars: Vec<Car>,
    locations: Vec<Location>,
    packages: Vec<Package>,
    offers: Vec<Offer>,
    faqs: Vec<Faq>,
    temp_bookings: HashMap<TempBookingId, TempBooking>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    notifications: HashMap<i64, Vec<Notification>>,
    next_id: i64,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Serialize)]
struct AccessClaims {
    token_type: &'static str,
    user_id: i64,
    exp: i64,
}

/// A self-contained backend with seeded catalog data.
///
/// Records every request, and lets callers inject per-call latency and
/// failures to drive the client's race and error paths.
pub struct InMemoryBackend {
    data: Mutex<Data>,
    requests: Mutex<Vec<RecordedRequest>>,
    delays: Mutex<HashMap<&'static str, VecDeque<Duration>>>,
    failing: Mutex<HashSet<&'static str>>,
    omit_temp_id: Mutex<bool>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn car(id: i64, name: &str, brand: &str, car_type: &str, seats: u8, fare: i64) -> Car {
    Car {
        id,
        name: name.to_string(),
        brand: Some(brand.to_string()),
        model: Some(name.to_string()),
        model_year: Some(2023),
        car_type: Some(car_type.to_string()),
        fuel: None,
        seats: Some(seats),
        base_fare: Money::from_rupees(fare),
        images: Vec::new(),
        image_url: None,
        features: Vec::new(),
        location: Some(Related::Nested(CarLocation {
            id: 1,
            name: "Chennai Airport".to_string(),
            address: Some("GST Road, Meenambakkam".to_string()),
            map_url: None,
        })),
        description: None,
        star_rating: Some(4),
    }
}

fn location(id: i64, name: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
        address: None,
        map_url: None,
    }
}

fn package(id: i64, hours: u32, kms: u32) -> Package {
    Package {
        id,
        label: format!("{} hr / {} km", hours, kms),
        hours,
        kms,
    }
}

fn unauthorized(detail: &str) -> CoreError {
    CoreError::backend(401, detail)
}

fn not_found() -> CoreError {
    CoreError::backend(404, "Not found.")
}

fn query_value<'a>(query: &'a QueryParams, key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let mut data = Data {
            next_id: 100,
            ..Data::default()
        };
        data.accounts.insert(
            "asha".to_string(),
            Account {
                id: 1,
                password: "secret123".to_string(),
            },
        );
        data.cars = vec![
            car(1, "Swift", "Maruti Suzuki", "Hatchback", 5, 1000),
            car(2, "Innova Crysta", "Toyota", "SUV", 7, 2200),
            car(3, "City", "Honda", "Sedan", 5, 1500),
        ];
        data.locations = vec![
            location(1, "Chennai Airport"),
            location(2, "Chennai Central"),
            location(3, "Coimbatore"),
            location(4, "Madurai"),
        ];
        data.packages = vec![package(1, 4, 40), package(2, 8, 80), package(3, 12, 120)];
        data.offers = vec![
            Offer {
                id: Some(1),
                code: "CASH5".to_string(),
                desc: "5% cashback on all trips".to_string(),
                discount: None,
                percent: Some(5.0),
                is_active: true,
            },
            Offer {
                id: Some(2),
                code: "FLAT200".to_string(),
                desc: "₹200 OFF on first ride".to_string(),
                discount: Some(Money::from_rupees(200)),
                percent: None,
                is_active: true,
            },
        ];
        data.faqs = vec![Faq {
            id: 1,
            question: "Can I cancel my booking?".to_string(),
            answer: "Yes, free cancellation up to 24 hours before pickup.".to_string(),
        }];
        data.bookings = vec![Booking {
            id: 7,
            customer: Some(Related::Id(2)),
            car: Some(Related::Id(2)),
            driver: None,
            start_date: Some("2025-07-01T09:00:00Z".to_string()),
            end_date: Some("2025-07-02T09:00:00Z".to_string()),
            status: BookingStatus::Confirmed,
            total_cost: Some(Money::from_rupees(2750)),
        }];

        Self {
            data: Mutex::new(data),
            requests: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            omit_temp_id: Mutex::new(false),
        }
    }

    pub async fn add_car(&self, car: Car) {
        self.data.lock().await.cars.push(car);
    }

    pub async fn add_notification(&self, user_id: i64, message: &str) {
        let mut data = self.data.lock().await;
        let id = data.next_id();
        data.notifications.entry(user_id).or_default().push(Notification {
            id,
            message: message.to_string(),
            sent_at: Some(Utc::now().to_rfc3339()),
            is_read: false,
        });
    }

    /// Issues a valid key for `user_id` without going through login.
    pub async fn issue_token(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.data.lock().await.tokens.insert(token.clone(), user_id);
        token
    }

    /// Delays the next call to `endpoint` by `delay`; queued delays apply in order.
    pub async fn delay_next(&self, endpoint: &'static str, delay: Duration) {
        self.delays
            .lock()
            .await
            .entry(endpoint)
            .or_default()
            .push_back(delay);
    }

    pub async fn fail(&self, endpoint: &'static str) {
        self.failing.lock().await.insert(endpoint);
    }

    pub async fn recover(&self, endpoint: &'static str) {
        self.failing.lock().await.remove(endpoint);
    }

    /// Makes `POST /api/booking-temp/` answer without a `temp_id`.
    pub async fn omit_temp_id(&self, omit: bool) {
        *self.omit_temp_id.lock().await = omit;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn requests_to(&self, endpoint: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.data.lock().await.bookings.clone()
    }

    pub async fn temp_booking(&self, id: &TempBookingId) -> Option<TempBooking> {
        self.data.lock().await.temp_bookings.get(id).cloned()
    }

    /// Records the call, applies injected latency and failure, and resolves
    /// the caller for protected endpoints.
    async fn enter(
        &self,
        endpoint: &'static str,
        query: QueryParams,
        credentials: Option<&Credentials>,
    ) -> CoreResult<Option<i64>> {
        debug!(endpoint, "in-memory backend call");
        self.requests.lock().await.push(RecordedRequest {
            endpoint,
            query,
            authorization: credentials.map(Credentials::header_value),
        });

        let delay = self
            .delays
            .lock()
            .await
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().await.contains(endpoint) {
            return Err(CoreError::backend(500, "Internal server error"));
        }

        match credentials {
            None => Ok(None),
            Some(credentials) => {
                let data = self.data.lock().await;
                data.tokens
                    .get(credentials.token())
                    .copied()
                    .map(Some)
                    .ok_or_else(|| unauthorized("Invalid token."))
            }
        }
    }

    async fn caller(
        &self,
        endpoint: &'static str,
        query: QueryParams,
        credentials: &Credentials,
    ) -> CoreResult<i64> {
        self.enter(endpoint, query, Some(credentials))
            .await?
            .ok_or_else(|| unauthorized("Authentication credentials were not provided."))
    }

    async fn check_password(&self, username: &str, password: &str) -> CoreResult<i64> {
        let data = self.data.lock().await;
        match data.accounts.get(username) {
            Some(account) if account.password == password => Ok(account.id),
            _ => Err(unauthorized("No active account found with the given credentials")),
        }
    }
}

#[async_trait]
impl RentalBackend for InMemoryBackend {
    async fn obtain_token(&self, username: &str, password: &str) -> CoreResult<TokenPair> {
        self.enter(TOKEN, Vec::new(), None).await?;
        let user_id = self.check_password(username, password).await?;
        let claims = AccessClaims {
            token_type: "access",
            user_id,
            exp: Utc::now().timestamp() + TOKEN_LIFETIME_SECS,
        };
        let access = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET))
            .map_err(|e| CoreError::backend(500, e.to_string()))?;
        self.data.lock().await.tokens.insert(access.clone(), user_id);
        Ok(TokenPair {
            access: Some(Masked::new(access)),
            refresh: None,
        })
    }

    async fn login(&self, username: &str, password: &str) -> CoreResult<LoginResponse> {
        self.enter(LOGIN, Vec::new(), None).await?;
        let user_id = self.check_password(username, password).await?;
        let token = self.issue_token(user_id).await;
        Ok(LoginResponse {
            message: Some("Login successful".to_string()),
            token: Some(Masked::new(token)),
            username: Some(username.to_string()),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> CoreResult<RegisterResponse> {
        self.enter(REGISTER, Vec::new(), None).await?;
        let mut data = self.data.lock().await;
        if data.accounts.contains_key(&request.username) {
            return Err(CoreError::backend(
                400,
                r#"{"username":["A user with that username already exists."]}"#,
            ));
        }
        let id = data.next_id();
        data.accounts.insert(
            request.username.clone(),
            Account {
                id,
                password: request.password.expose().clone(),
            },
        );
        Ok(RegisterResponse {
            message: Some("User registered successfully".to_string()),
        })
    }

    async fn list_cars(&self) -> CoreResult<Vec<Car>> {
        self.enter(CARS, Vec::new(), None).await?;
        Ok(self.data.lock().await.cars.clone())
    }

    async fn available_cars(&self, query: &QueryParams) -> CoreResult<Vec<Car>> {
        self.enter(AVAILABLE_CARS, query.clone(), None).await?;
        let price_min = query_value(query, "price_min").and_then(Money::parse);
        let price_max = query_value(query, "price_max").and_then(Money::parse);
        let seats_min: Option<u8> = query_value(query, "seats_min").and_then(|v| v.parse().ok());
        let car_type = query_value(query, "car_type");

        let mut cars: Vec<Car> = self
            .data
            .lock()
            .await
            .cars
            .iter()
            .filter(|c| price_min.map_or(true, |min| c.base_fare >= min))
            .filter(|c| price_max.map_or(true, |max| c.base_fare <= max))
            .filter(|c| seats_min.map_or(true, |min| c.seats.unwrap_or(0) >= min))
            .filter(|c| {
                car_type.map_or(true, |t| {
                    c.car_type.as_deref().is_some_and(|ct| ct.eq_ignore_ascii_case(t))
                })
            })
            .cloned()
            .collect();
        match query_value(query, "ordering") {
            Some("base_fare") => cars.sort_by_key(|c| c.base_fare),
            Some("-base_fare") => cars.sort_by_key(|c| std::cmp::Reverse(c.base_fare)),
            _ => {}
        }
        Ok(cars)
    }

    async fn search_locations(&self, query: &str) -> CoreResult<Vec<Location>> {
        self.enter(LOCATIONS, vec![("search".to_string(), query.to_string())], None)
            .await?;
        let needle = query.trim().to_lowercase();
        Ok(self
            .data
            .lock()
            .await
            .locations
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_packages(&self) -> CoreResult<Vec<Package>> {
        self.enter(PACKAGES, Vec::new(), None).await?;
        Ok(self.data.lock().await.packages.clone())
    }

    async fn list_offers(&self) -> CoreResult<Vec<Offer>> {
        self.enter(OFFERS, Vec::new(), None).await?;
        Ok(self.data.lock().await.offers.clone())
    }

    async fn list_faqs(&self) -> CoreResult<Vec<Faq>> {
        self.enter(FAQS, Vec::new(), None).await?;
        Ok(self.data.lock().await.faqs.clone())
    }

    async fn get_car(&self, credentials: &Credentials, id: i64) -> CoreResult<Car> {
        self.caller(CAR_DETAIL, Vec::new(), credentials).await?;
        self.data
            .lock()
            .await
            .cars
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_temp_booking(
        &self,
        credentials: &Credentials,
        trip: &TripPayload,
    ) -> CoreResult<TempBookingCreated> {
        self.caller(CREATE_TEMP_BOOKING, Vec::new(), credentials).await?;
        let id = TempBookingId::new(Uuid::new_v4().to_string());
        let temp = TempBooking {
            id: id.clone(),
            trip_type: Some(trip.trip_type.clone()),
            pickup_location: trip.pickup_location.clone(),
            destination_location: trip.destination_location.clone(),
            drop_location: trip.drop_location.clone(),
            start_datetime: trip.start_datetime.clone(),
            end_datetime: trip.end_datetime.clone(),
            package: trip.package.clone(),
            driver_required: trip.driver_required,
            num_days: trip.num_days,
        };
        self.data.lock().await.temp_bookings.insert(id.clone(), temp);
        if *self.omit_temp_id.lock().await {
            return Ok(TempBookingCreated { temp_id: None });
        }
        Ok(TempBookingCreated { temp_id: Some(id) })
    }

    async fn get_temp_booking(
        &self,
        credentials: &Credentials,
        id: &TempBookingId,
    ) -> CoreResult<TempBooking> {
        self.caller(TEMP_BOOKING, Vec::new(), credentials).await?;
        self.data
            .lock()
            .await
            .temp_bookings
            .get(id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn confirm_booking(
        &self,
        credentials: &Credentials,
        request: &ConfirmBookingRequest,
    ) -> CoreResult<BookingConfirmed> {
        let user_id = self.caller(CONFIRM_BOOKING, Vec::new(), credentials).await?;
        let mut data = self.data.lock().await;
        let temp = match &request.temp_id {
            Some(id) => Some(
                data.temp_bookings
                    .remove(id)
                    .ok_or_else(|| CoreError::backend(400, "Temporary booking expired"))?,
            ),
            None => None,
        };
        let car = data
            .cars
            .iter()
            .find(|c| c.id == request.car_id)
            .cloned()
            .ok_or_else(|| CoreError::backend(400, "Invalid car"))?;
        let id = data.next_id();
        data.bookings.push(Booking {
            id,
            customer: Some(Related::Id(user_id)),
            car: Some(Related::Nested(car)),
            driver: None,
            start_date: temp.as_ref().and_then(|t| t.start_datetime.clone()),
            end_date: temp.as_ref().and_then(|t| t.end_datetime.clone()),
            status: BookingStatus::Confirmed,
            total_cost: None,
        });
        Ok(BookingConfirmed {
            message: Some("Booking confirmed".to_string()),
            booking_id: Some(id),
        })
    }

    async fn list_bookings(&self, credentials: &Credentials) -> CoreResult<Vec<Booking>> {
        self.caller(BOOKINGS, Vec::new(), credentials).await?;
        Ok(self.data.lock().await.bookings.clone())
    }

    async fn get_booking(&self, credentials: &Credentials, id: i64) -> CoreResult<Booking> {
        self.caller(BOOKING_DETAIL, Vec::new(), credentials).await?;
        self.data
            .lock()
            .await
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_booking(
        &self,
        credentials: &Credentials,
        request: &CreateBookingRequest,
    ) -> CoreResult<Booking> {
        let user_id = self.caller(CREATE_BOOKING, Vec::new(), credentials).await?;
        let mut data = self.data.lock().await;
        let car = data
            .cars
            .iter()
            .find(|c| c.id == request.car_id)
            .cloned()
            .ok_or_else(|| CoreError::backend(400, "Invalid car"))?;
        let days = match (
            carty_shared::models::booking::parse_timestamp(&request.start_date),
            carty_shared::models::booking::parse_timestamp(&request.end_date),
        ) {
            (Some(start), Some(end)) => (end - start).num_days().max(1),
            _ => 1,
        };
        let id = data.next_id();
        let booking = Booking {
            id,
            customer: Some(Related::Id(request.customer_id.unwrap_or(user_id))),
            car: Some(Related::Nested(car.clone())),
            driver: request.driver_id.map(Related::Id),
            start_date: Some(request.start_date.clone()),
            end_date: Some(request.end_date.clone()),
            status: BookingStatus::Pending,
            total_cost: Some(Money::from_paise(car.base_fare.paise() * days)),
        };
        data.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn create_payment(
        &self,
        credentials: &Credentials,
        request: &PaymentRequest,
    ) -> CoreResult<Payment> {
        self.caller(PAYMENTS, Vec::new(), credentials).await?;
        let mut data = self.data.lock().await;
        if !data.bookings.iter().any(|b| b.id == request.booking_id) {
            return Err(CoreError::backend(400, "Invalid booking"));
        }
        let id = data.next_id();
        let payment = Payment {
            id: Some(id),
            amount: request.amount,
            status: Some("completed".to_string()),
            payment_method: Some(request.payment_method.clone()),
            payment_date: Some(Utc::now().to_rfc3339()),
        };
        data.payments.push(payment.clone());
        Ok(payment)
    }

    async fn list_notifications(
        &self,
        credentials: &Credentials,
    ) -> CoreResult<Vec<Notification>> {
        let user_id = self.caller(NOTIFICATIONS, Vec::new(), credentials).await?;
        Ok(self
            .data
            .lock()
            .await
            .notifications
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carty_shared::models::AuthScheme;

    #[tokio::test]
    async fn test_protected_call_rejects_unknown_token() {
        let backend = InMemoryBackend::new();
        let bogus = Credentials::new(AuthScheme::Token, "nope");
        let err = backend.list_bookings(&bogus).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        let token = backend.issue_token(1).await;
        let ok = Credentials::new(AuthScheme::Token, token);
        assert!(backend.list_bookings(&ok).await.is_ok());
    }

    #[tokio::test]
    async fn test_available_cars_honours_filters() {
        let backend = InMemoryBackend::new();
        let query = vec![
            ("price_max".to_string(), "2000".to_string()),
            ("ordering".to_string(), "-base_fare".to_string()),
        ];
        let cars = backend.available_cars(&query).await.unwrap();
        let names: Vec<&str> = cars.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["City", "Swift"]);

        let requests = backend.requests_to(AVAILABLE_CARS).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, query);
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let backend = InMemoryBackend::new();
        backend.fail(PACKAGES).await;
        assert_eq!(backend.list_packages().await.unwrap_err().status(), Some(500));
        backend.recover(PACKAGES).await;
        assert_eq!(backend.list_packages().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_jwt_login_carries_user_id() {
        let backend = InMemoryBackend::new();
        let pair = backend.obtain_token("asha", "secret123").await.unwrap();
        let access = pair.access.unwrap().into_inner();
        let claims = crate::token::read_claims(&access).unwrap();
        assert_eq!(claims.user_id, Some(1));
        assert!(backend.obtain_token("asha", "wrong").await.is_err());
    }
}
