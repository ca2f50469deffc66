use serde::{Deserialize, Serialize};

use super::{Identified, Related};
use crate::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuel {
    pub id: i64,
    pub name: String,
}

impl Identified for Fuel {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Identified for Feature {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarImage {
    #[serde(default)]
    pub id: Option<i64>,
    pub image: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarLocation {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub map_url: Option<String>,
}

impl Identified for CarLocation {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A rentable car as served by `/api/cars/`. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_year: Option<u16>,
    #[serde(default)]
    pub car_type: Option<String>,
    #[serde(default)]
    pub fuel: Option<Related<Fuel>>,
    #[serde(default)]
    pub seats: Option<u8>,
    #[serde(default)]
    pub base_fare: Money,
    #[serde(default)]
    pub images: Vec<CarImage>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<Related<Feature>>,
    #[serde(default)]
    pub location: Option<Related<CarLocation>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub star_rating: Option<u8>,
}

impl Car {
    pub fn display_name(&self) -> String {
        match (&self.brand, &self.model) {
            (Some(brand), Some(model)) => format!("{} {}", brand, model),
            _ => self.name.clone(),
        }
    }

    /// Cards show four stars when the backend has no rating yet.
    pub fn rating(&self) -> u8 {
        self.star_rating.unwrap_or(4).min(5)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(|img| img.image.as_str())
            .or(self.image_url.as_deref())
    }

    pub fn fuel_name(&self) -> Option<&str> {
        self.fuel.as_ref().and_then(|f| f.nested()).map(|f| f.name.as_str())
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.nested()).map(|l| l.name.as_str())
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter_map(|f| f.nested())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// `2024 • Petrol • 5 seats`
    pub fn meta_line(&self) -> String {
        let year = self.model_year.map(|y| y.to_string()).unwrap_or_default();
        let fuel = self.fuel_name().unwrap_or("");
        let seats = self.seats.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        format!("{} • {} • {} seats", year, fuel, seats)
    }
}

impl Identified for Car {
    fn id(&self) -> i64 {
        self.id
    }
}
