pub mod auth;
pub mod booking;
pub mod car;
pub mod content;

pub use auth::{AuthScheme, LoginResponse, RegisterRequest, RegisterResponse, TokenPair, User};
pub use booking::{
    Booking, BookingConfirmed, BookingStatus, ConfirmBookingRequest, CreateBookingRequest,
    DriverSummary, Payment, PaymentRequest, TempBooking, TempBookingCreated, TempBookingId,
    UserSummary,
};
pub use car::{Car, CarImage, CarLocation, Feature, Fuel};
pub use content::{Faq, Location, Notification, Offer, Package};

use serde::{Deserialize, Serialize};

/// List endpoints answer with a bare array or a paginated `{ "results": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Plain(items) => items,
            ListPayload::Paged { results } => results,
        }
    }
}

/// Records exposing their primary key.
pub trait Identified {
    fn id(&self) -> i64;
}

/// A related record the backend may send nested or as a bare primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Nested(T),
    Id(i64),
}

impl<T> Related<T> {
    pub fn nested(&self) -> Option<&T> {
        match self {
            Related::Nested(inner) => Some(inner),
            Related::Id(_) => None,
        }
    }
}

impl<T: Identified> Related<T> {
    pub fn id(&self) -> i64 {
        match self {
            Related::Nested(inner) => inner.id(),
            Related::Id(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_payload_shapes() {
        let plain: ListPayload<Package> =
            serde_json::from_str(r#"[{"id":1,"label":"4 hr / 40 km","hours":4,"kms":40}]"#).unwrap();
        assert_eq!(plain.into_vec().len(), 1);

        let paged: ListPayload<Package> = serde_json::from_str(
            r#"{"count":1,"results":[{"id":2,"label":"8 hr / 80 km","hours":8,"kms":80}]}"#,
        )
        .unwrap();
        assert_eq!(paged.into_vec()[0].hours, 8);
    }

    #[test]
    fn test_related_id_or_nested() {
        let by_id: Related<UserSummary> = serde_json::from_str("7").unwrap();
        assert_eq!(by_id.id(), 7);

        let nested: Related<UserSummary> =
            serde_json::from_str(r#"{"id":9,"username":"asha"}"#).unwrap();
        assert_eq!(nested.id(), 9);
        assert_eq!(nested.nested().map(|u| u.username.as_str()), Some("asha"));
    }
}
