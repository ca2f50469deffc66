use carty_core::search::{TripPayload, TripType};
use carty_core::QueryParams;
use carty_shared::models::booking::parse_timestamp;
use carty_shared::models::TempBooking;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{CatalogError, CatalogResult};

pub const CAR_TYPES: [&str; 5] = ["SUV", "Sedan", "Hatchback", "Convertible", "Van"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Value of the `ordering` query parameter.
    pub fn ordering(self) -> Option<&'static str> {
        match self {
            SortOrder::None => None,
            SortOrder::PriceAsc => Some("base_fare"),
            SortOrder::PriceDesc => Some("-base_fare"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::None => "None",
            SortOrder::PriceAsc => "Price: Low to High",
            SortOrder::PriceDesc => "Price: High to Low",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortOrder::None),
            "price_asc" => Ok(SortOrder::PriceAsc),
            "price_desc" => Ok(SortOrder::PriceDesc),
            other => Err(CatalogError::InvalidFilter {
                field: "sort".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Filters of the car list page, seeded from the trip the customer searched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFilter {
    pub trip_type: Option<TripType>,
    pub pickup_location: String,
    pub destination_location: String,
    pub drop_location: String,
    pub start_date: String,
    pub start_time: String,
    pub return_date: String,
    pub return_time: String,
    pub num_days: u32,
    pub package: String,
    pub driver_required: bool,
    pub car_type: String,
    /// Rupees.
    pub price_min: i64,
    /// Rupees.
    pub price_max: i64,
    pub seats_min: u8,
    pub sort: SortOrder,
}

impl Default for CarFilter {
    fn default() -> Self {
        Self {
            trip_type: Some(TripType::Hourly),
            pickup_location: String::new(),
            destination_location: String::new(),
            drop_location: String::new(),
            start_date: String::new(),
            start_time: String::new(),
            return_date: String::new(),
            return_time: String::new(),
            num_days: 1,
            package: String::new(),
            driver_required: true,
            car_type: String::new(),
            price_min: 0,
            price_max: 10_000,
            seats_min: 1,
            sort: SortOrder::None,
        }
    }
}

fn split_datetime(raw: Option<&str>) -> (String, String) {
    match raw.and_then(parse_timestamp) {
        Some(dt) => (
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%H:%M").to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

fn push_non_empty(query: &mut QueryParams, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        query.push((key.to_string(), value.to_string()));
    }
}

impl CarFilter {
    pub fn from_trip(trip: &TripPayload) -> Self {
        let (start_date, start_time) = split_datetime(trip.start_datetime.as_deref());
        let (return_date, return_time) = split_datetime(trip.end_datetime.as_deref());
        Self {
            trip_type: trip.trip_type(),
            pickup_location: trip.pickup_location.clone(),
            destination_location: trip.destination_location.clone().unwrap_or_default(),
            drop_location: trip.drop_location.clone().unwrap_or_default(),
            start_date,
            start_time,
            return_date,
            return_time,
            num_days: trip.num_days.unwrap_or(1),
            package: trip.package.clone().unwrap_or_default(),
            driver_required: trip.driver_required,
            ..Self::default()
        }
    }

    /// Seeds trip fields from a stored temp booking, keeping the list filters.
    pub fn apply_temp_booking(&mut self, temp: &TempBooking) {
        let (start_date, start_time) = split_datetime(temp.start_datetime.as_deref());
        let (return_date, return_time) = split_datetime(temp.end_datetime.as_deref());
        if let Some(trip_type) = temp.trip_type.as_deref().and_then(TripType::from_label) {
            self.trip_type = Some(trip_type);
        }
        self.pickup_location = temp.pickup_location.clone();
        self.destination_location = temp.destination_location.clone().unwrap_or_default();
        self.drop_location = temp.drop_location.clone().unwrap_or_default();
        self.start_date = start_date;
        self.start_time = start_time;
        self.return_date = return_date;
        self.return_time = return_time;
        self.num_days = temp.num_days.unwrap_or(1);
        self.package = temp.package.clone().unwrap_or_default();
        self.driver_required = temp.driver_required;
    }

    /// Parameters for `GET /api/cars/available/`, or `None` when no trip type is set.
    pub fn to_query(&self) -> Option<QueryParams> {
        let trip_type = self.trip_type?;
        let mut query = QueryParams::new();
        query.push(("trip_type".to_string(), trip_type.filter_label().to_string()));
        push_non_empty(&mut query, "pickup_location", &self.pickup_location);
        push_non_empty(&mut query, "destination_location", &self.destination_location);
        push_non_empty(&mut query, "drop_location", &self.drop_location);
        if !self.start_date.trim().is_empty() && !self.start_time.trim().is_empty() {
            let start = format!("{}T{}", self.start_date.trim(), self.start_time.trim());
            query.push(("start_datetime".to_string(), start));
        }
        if !self.return_date.trim().is_empty() && !self.return_time.trim().is_empty() {
            let end = format!("{}T{}", self.return_date.trim(), self.return_time.trim());
            query.push(("end_datetime".to_string(), end));
        }
        if trip_type == TripType::RoundTrip {
            query.push(("num_days".to_string(), self.num_days.to_string()));
        }
        if trip_type == TripType::Hourly {
            push_non_empty(&mut query, "package", &self.package);
        }
        query.push(("driver_required".to_string(), self.driver_required.to_string()));
        push_non_empty(&mut query, "car_type", &self.car_type);
        query.push(("price_min".to_string(), self.price_min.to_string()));
        query.push(("price_max".to_string(), self.price_max.to_string()));
        query.push(("seats_min".to_string(), self.seats_min.to_string()));
        if let Some(ordering) = self.sort.ordering() {
            query.push(("ordering".to_string(), ordering.to_string()));
        }
        Some(query)
    }

    /// Updates one filter by its query name. Price bounds are kept ordered.
    pub fn set(&mut self, field: &str, value: &str) -> CatalogResult<()> {
        let invalid = || CatalogError::InvalidFilter {
            field: field.to_string(),
            value: value.to_string(),
        };
        match field {
            "trip_type" => {
                self.trip_type = if value.trim().is_empty() {
                    None
                } else {
                    Some(TripType::from_label(value).ok_or_else(invalid)?)
                }
            }
            "pickup_location" => self.pickup_location = value.to_string(),
            "destination_location" => self.destination_location = value.to_string(),
            "drop_location" => self.drop_location = value.to_string(),
            "start_date" => self.start_date = value.to_string(),
            "start_time" => self.start_time = value.to_string(),
            "return_date" => self.return_date = value.to_string(),
            "return_time" => self.return_time = value.to_string(),
            "num_days" => self.num_days = value.trim().parse().map_err(|_| invalid())?,
            "package" => self.package = value.to_string(),
            "driver_required" => {
                self.driver_required = value.trim().parse().map_err(|_| invalid())?
            }
            "car_type" => self.car_type = value.to_string(),
            "price_min" => {
                let min: i64 = value.trim().parse().map_err(|_| invalid())?;
                self.price_min = min.min(self.price_max);
            }
            "price_max" => {
                let max: i64 = value.trim().parse().map_err(|_| invalid())?;
                self.price_max = max.max(self.price_min);
            }
            "seats_min" => self.seats_min = value.trim().parse().map_err(|_| invalid())?,
            "sort" | "sort_price" | "ordering" => self.sort = value.parse()?,
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(query: &'a QueryParams, key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query() {
        let query = CarFilter::default().to_query().unwrap();
        assert_eq!(get(&query, "trip_type"), Some("Hourly"));
        assert_eq!(get(&query, "price_min"), Some("0"));
        assert_eq!(get(&query, "price_max"), Some("10000"));
        assert_eq!(get(&query, "seats_min"), Some("1"));
        assert_eq!(get(&query, "driver_required"), Some("true"));
        assert_eq!(get(&query, "pickup_location"), None);
        assert_eq!(get(&query, "start_datetime"), None);
        assert_eq!(get(&query, "ordering"), None);
    }

    #[test]
    fn test_trip_specific_params() {
        let mut filter = CarFilter {
            package: "3".to_string(),
            num_days: 4,
            ..CarFilter::default()
        };
        let query = filter.to_query().unwrap();
        assert_eq!(get(&query, "package"), Some("3"));
        assert_eq!(get(&query, "num_days"), None);

        filter.set("trip_type", "Round Trip").unwrap();
        filter.set("sort", "price_desc").unwrap();
        let query = filter.to_query().unwrap();
        assert_eq!(get(&query, "package"), None);
        assert_eq!(get(&query, "num_days"), Some("4"));
        assert_eq!(get(&query, "ordering"), Some("-base_fare"));
    }

    #[test]
    fn test_datetime_needs_date_and_time() {
        let mut filter = CarFilter::default();
        filter.start_date = "2025-08-11".to_string();
        assert_eq!(get(&filter.to_query().unwrap(), "start_datetime"), None);
        filter.start_time = "10:00".to_string();
        assert_eq!(
            get(&filter.to_query().unwrap(), "start_datetime"),
            Some("2025-08-11T10:00")
        );
    }

    #[test]
    fn test_empty_trip_type_means_no_request() {
        let mut filter = CarFilter::default();
        filter.set("trip_type", "").unwrap();
        assert!(filter.to_query().is_none());
    }

    #[test]
    fn test_seeded_from_temp_booking() {
        let temp: TempBooking = serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "trip_type": "Hourly Rental",
            "pickup_location": "Chennai Airport",
            "start_datetime": "2025-08-11T10:00:00Z",
            "package": 3,
            "driver_required": false
        }))
        .unwrap();
        let mut filter = CarFilter {
            seats_min: 5,
            ..CarFilter::default()
        };
        filter.apply_temp_booking(&temp);
        assert_eq!(filter.trip_type, Some(TripType::Hourly));
        assert_eq!(filter.start_date, "2025-08-11");
        assert_eq!(filter.start_time, "10:00");
        assert_eq!(filter.package, "3");
        assert!(!filter.driver_required);
        assert_eq!(filter.seats_min, 5);
    }

    #[test]
    fn test_price_bounds_stay_ordered() {
        let mut filter = CarFilter::default();
        filter.set("price_max", "2000").unwrap();
        filter.set("price_min", "5000").unwrap();
        assert_eq!(filter.price_min, 2000);
        assert!(filter.set("seats_min", "many").is_err());
        assert!(filter.set("colour", "red").is_err());
    }
}
