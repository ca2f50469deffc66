use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    #[default]
    Hourly,
    Outstation,
    OneWay,
    RoundTrip,
}

impl TripType {
    pub const ALL: [TripType; 4] = [
        TripType::Hourly,
        TripType::Outstation,
        TripType::OneWay,
        TripType::RoundTrip,
    ];

    /// Form key: `hourly`, `outstation`, `one_way`, `round_trip`.
    pub fn key(self) -> &'static str {
        match self {
            TripType::Hourly => "hourly",
            TripType::Outstation => "outstation",
            TripType::OneWay => "one_way",
            TripType::RoundTrip => "round_trip",
        }
    }

    /// Value stored on the temp booking.
    pub fn payload_label(self) -> &'static str {
        match self {
            TripType::Hourly => "Hourly Rental",
            TripType::Outstation => "Outstation Rental",
            TripType::OneWay => "One Way",
            TripType::RoundTrip => "Round Trip",
        }
    }

    /// Value the car list filter sends as `trip_type`.
    pub fn filter_label(self) -> &'static str {
        match self {
            TripType::Hourly => "Hourly",
            TripType::Outstation => "Outstation",
            TripType::OneWay => "One Way",
            TripType::RoundTrip => "Round Trip",
        }
    }

    /// Accepts any of the key, payload and filter spellings.
    pub fn from_label(raw: &str) -> Option<TripType> {
        let raw = raw.trim();
        TripType::ALL.into_iter().find(|t| {
            t.key().eq_ignore_ascii_case(raw)
                || t.payload_label().eq_ignore_ascii_case(raw)
                || t.filter_label().eq_ignore_ascii_case(raw)
        })
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_label())
    }
}

impl FromStr for TripType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripType::from_label(s)
            .ok_or_else(|| CoreError::ValidationError(format!("unknown trip type '{}'", s)))
    }
}

/// The trip search form on the landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub trip_type: TripType,
    pub pickup: String,
    pub destination: String,
    pub drop: String,
    pub start_date: String,
    pub start_time: String,
    pub return_date: String,
    pub return_time: String,
    /// Package id, as picked from `/api/packages/`.
    pub package: String,
    pub days: u32,
    pub driver_required: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            trip_type: TripType::Hourly,
            pickup: String::new(),
            destination: String::new(),
            drop: String::new(),
            start_date: String::new(),
            start_time: String::new(),
            return_date: String::new(),
            return_time: String::new(),
            package: String::new(),
            days: 1,
            driver_required: true,
        }
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn join_datetime(date: &str, time: &str) -> String {
    format!("{}T{}", date.trim(), time.trim())
}

impl SearchForm {
    pub fn new(trip_type: TripType) -> Self {
        Self {
            trip_type,
            ..Self::default()
        }
    }

    /// Whether every field the current trip type needs is filled in.
    pub fn is_ready(&self) -> bool {
        match self.trip_type {
            TripType::Hourly => {
                filled(&self.pickup)
                    && filled(&self.start_date)
                    && filled(&self.start_time)
                    && filled(&self.package)
            }
            TripType::Outstation => self.has_round_leg(),
            TripType::OneWay => filled(&self.pickup) && filled(&self.drop),
            TripType::RoundTrip => self.has_round_leg() && self.days > 0,
        }
    }

    fn has_round_leg(&self) -> bool {
        filled(&self.pickup)
            && filled(&self.destination)
            && filled(&self.start_date)
            && filled(&self.start_time)
            && filled(&self.return_date)
            && filled(&self.return_time)
    }

    /// Body of `POST /api/booking-temp/` for the current trip type.
    pub fn payload(&self) -> TripPayload {
        let trip_type = self.trip_type;
        let mut payload = TripPayload {
            trip_type: trip_type.payload_label().to_string(),
            pickup_location: self.pickup.trim().to_string(),
            destination_location: None,
            drop_location: None,
            start_datetime: None,
            end_datetime: None,
            package: None,
            num_days: None,
            driver_required: self.driver_required,
        };
        match trip_type {
            TripType::Hourly => {
                payload.start_datetime = Some(join_datetime(&self.start_date, &self.start_time));
                payload.package = Some(self.package.trim().to_string());
            }
            TripType::Outstation => {
                payload.destination_location = Some(self.destination.trim().to_string());
                payload.start_datetime = Some(join_datetime(&self.start_date, &self.start_time));
                payload.end_datetime = Some(join_datetime(&self.return_date, &self.return_time));
            }
            TripType::OneWay => {
                payload.drop_location = Some(self.drop.trim().to_string());
            }
            TripType::RoundTrip => {
                payload.destination_location = Some(self.destination.trim().to_string());
                payload.start_datetime = Some(join_datetime(&self.start_date, &self.start_time));
                payload.end_datetime = Some(join_datetime(&self.return_date, &self.return_time));
                payload.num_days = Some(self.days);
            }
        }
        payload
    }
}

/// Trip details sent to the backend; fields irrelevant to the trip type are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPayload {
    pub trip_type: String,
    pub pickup_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_days: Option<u32>,
    pub driver_required: bool,
}

impl TripPayload {
    pub fn trip_type(&self) -> Option<TripType> {
        TripType::from_label(&self.trip_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly() -> SearchForm {
        SearchForm {
            pickup: "Chennai Airport".to_string(),
            start_date: "2025-08-11".to_string(),
            start_time: "10:00".to_string(),
            package: "3".to_string(),
            ..SearchForm::new(TripType::Hourly)
        }
    }

    #[test]
    fn test_hourly_ready_needs_package() {
        let mut form = hourly();
        assert!(form.is_ready());
        form.package = "   ".to_string();
        assert!(!form.is_ready());
    }

    #[test]
    fn test_one_way_needs_only_pickup_and_drop() {
        let mut form = SearchForm::new(TripType::OneWay);
        form.pickup = "Chennai".to_string();
        assert!(!form.is_ready());
        form.drop = "Pondicherry".to_string();
        assert!(form.is_ready());
    }

    #[test]
    fn test_round_trip_needs_positive_days() {
        let mut form = SearchForm {
            pickup: "Chennai".to_string(),
            destination: "Ooty".to_string(),
            start_date: "2025-08-11".to_string(),
            start_time: "06:00".to_string(),
            return_date: "2025-08-13".to_string(),
            ..SearchForm::new(TripType::RoundTrip)
        };
        assert!(!form.is_ready());
        form.return_time = "20:00".to_string();
        assert!(form.is_ready());
        form.days = 0;
        assert!(!form.is_ready());
    }

    #[test]
    fn test_hourly_payload_shape() {
        let json = serde_json::to_value(hourly().payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trip_type": "Hourly Rental",
                "pickup_location": "Chennai Airport",
                "start_datetime": "2025-08-11T10:00",
                "package": "3",
                "driver_required": true
            })
        );
    }

    #[test]
    fn test_one_way_payload_omits_dates() {
        let form = SearchForm {
            pickup: "Chennai".to_string(),
            drop: "Pondicherry".to_string(),
            driver_required: false,
            ..SearchForm::new(TripType::OneWay)
        };
        let json = serde_json::to_value(form.payload()).unwrap();
        assert_eq!(json["trip_type"], "One Way");
        assert_eq!(json["drop_location"], "Pondicherry");
        assert!(json.get("start_datetime").is_none());
        assert!(json.get("num_days").is_none());
    }

    #[test]
    fn test_trip_type_labels_parse() {
        assert_eq!("round_trip".parse::<TripType>().unwrap(), TripType::RoundTrip);
        assert_eq!("Hourly Rental".parse::<TripType>().unwrap(), TripType::Hourly);
        assert_eq!("Outstation".parse::<TripType>().unwrap(), TripType::Outstation);
        assert!("monthly".parse::<TripType>().is_err());
    }
}
