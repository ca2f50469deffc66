use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Car, Identified, Related};
use crate::{lenient, Money};

/// Server-issued reference of a temporary booking (a UUID on the backend).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempBookingId(pub String);

impl TempBookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempBookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses the timestamps the backend and the search form produce:
/// RFC 3339 (`2025-08-11T10:00:00Z`) or a naive `2025-08-11T10:00[:00]`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// `11 Aug 2025, 10:00 AM`; unparseable input is shown as received.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%d %b %Y, %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// A reservation the search form creates before a car is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempBooking {
    #[serde(alias = "temp_id")]
    pub id: TempBookingId,
    #[serde(default)]
    pub trip_type: Option<String>,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub destination_location: Option<String>,
    #[serde(default)]
    pub drop_location: Option<String>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub package: Option<String>,
    #[serde(default = "default_driver_required")]
    pub driver_required: bool,
    #[serde(default)]
    pub num_days: Option<u32>,
}

fn default_driver_required() -> bool {
    true
}

impl TempBooking {
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start_datetime.as_deref().and_then(parse_timestamp)
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end_datetime.as_deref().and_then(parse_timestamp)
    }
}

/// Response of `POST /api/booking-temp/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TempBookingCreated {
    #[serde(default)]
    pub temp_id: Option<TempBookingId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identified for UserSummary {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub id: i64,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Identified for DriverSummary {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub customer: Option<Related<UserSummary>>,
    #[serde(default)]
    pub car: Option<Related<Car>>,
    #[serde(default)]
    pub driver: Option<Related<DriverSummary>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_status")]
    pub status: BookingStatus,
    #[serde(default)]
    pub total_cost: Option<Money>,
}

fn default_status() -> BookingStatus {
    BookingStatus::Pending
}

impl Booking {
    pub fn customer_id(&self) -> Option<i64> {
        self.customer.as_ref().map(|c| c.id())
    }

    pub fn car_label(&self) -> String {
        match &self.car {
            Some(Related::Nested(car)) => car.display_name(),
            Some(Related::Id(id)) => format!("Car #{}", id),
            None => "-".to_string(),
        }
    }

    pub fn driver_label(&self) -> String {
        match &self.driver {
            Some(Related::Nested(driver)) => driver
                .user
                .as_ref()
                .map(|u| u.username.clone())
                .unwrap_or_else(|| format!("Driver #{}", driver.id)),
            Some(Related::Id(id)) => format!("Driver #{}", id),
            None => "None".to_string(),
        }
    }
}

/// Body of `POST /api/bookings/`, matching the serializer's write-only id fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Option<i64>,
    pub car_id: i64,
    pub driver_id: Option<i64>,
    pub start_date: String,
    pub end_date: String,
}

/// Body of `POST /api/confirm-booking/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmBookingRequest {
    pub temp_id: Option<TempBookingId>,
    pub payment_method: String,
    pub car_id: i64,
    pub plan: String,
}

/// Response of `POST /api/confirm-booking/`; every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookingConfirmed {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "id", deserialize_with = "lenient::opt_i64")]
    pub booking_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub amount: Money,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// Body of `POST /api/payments/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: i64,
    pub amount: Money,
    pub payment_method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_booking_payload() {
        let json = r#"{
            "id": "5f0c7a9e-4c1e-4e57-9a0b-61f1e3a4d0aa",
            "pickup_location": "Chennai Airport",
            "start_datetime": "2025-08-11T10:00:00Z",
            "package": 3,
            "driver_required": false,
            "num_days": 1
        }"#;
        let temp: TempBooking = serde_json::from_str(json).unwrap();
        assert_eq!(temp.package.as_deref(), Some("3"));
        assert!(!temp.driver_required);
        assert_eq!(
            temp.start().map(|dt| dt.format("%H:%M").to_string()).as_deref(),
            Some("10:00")
        );
        assert!(temp.end().is_none());
    }

    #[test]
    fn test_format_timestamp_falls_back_to_raw() {
        assert_eq!(format_timestamp("2025-08-11T10:00"), "11 Aug 2025, 10:00 AM");
        assert_eq!(format_timestamp("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_booking_with_nested_serializer_fields() {
        let json = r#"{
            "id": 12,
            "customer": {"id": 4, "username": "asha"},
            "car": {"id": 5, "name": "Swift", "base_fare": "1000.00"},
            "driver": null,
            "start_date": "2025-08-11T10:00:00Z",
            "end_date": "2025-08-12T10:00:00Z",
            "status": "confirmed",
            "total_cost": "1395.00"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.customer_id(), Some(4));
        assert_eq!(booking.car_label(), "Swift");
        assert_eq!(booking.driver_label(), "None");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_cost, Some(Money::from_rupees(1395)));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let booking: Booking = serde_json::from_str(r#"{"id": 1, "status": "on_hold"}"#).unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
    }
}
