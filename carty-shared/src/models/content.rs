use serde::{Deserialize, Serialize};

use crate::{lenient, Money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub map_url: Option<String>,
}

/// Hourly rental package, e.g. `4 hr / 40 km`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    pub hours: u32,
    pub kms: u32,
}

impl Package {
    pub fn summary(&self) -> String {
        format!("{} hr / {} km", self.hours, self.kms)
    }
}

/// Promotional offer from `/api/offers/`: a flat rupee discount, a percent, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub id: Option<i64>,
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub discount: Option<Money>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub percent: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}
