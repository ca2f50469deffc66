use carty_shared::models::{Car, Faq, Offer, Package};
use tracing::warn;

use crate::state::AppState;

/// A short-term rental card built from a package.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalCard {
    pub package_id: i64,
    pub title: String,
    pub description: String,
}

impl RentalCard {
    pub fn from_package(package: &Package) -> Self {
        Self {
            package_id: package.id,
            title: package.label.clone(),
            description: format!(
                "Package with {} hours and {} kms.",
                package.hours, package.kms
            ),
        }
    }
}

pub const RENTAL_RULES: [&str; 4] = [
    "Driver must be present during rental",
    "Fuel not included",
    "Vehicle must be returned on time",
    "Security deposit applicable",
];

const FALLBACK_FAQS: [(&str, &str); 8] = [
    (
        "What documents are required to rent a car?",
        "You need a valid driver's license, ID proof, and a credit/debit card for security deposit.",
    ),
    (
        "Can I cancel my booking?",
        "Yes, cancellation policies may vary, but free cancellation is possible up to 24 hours before pickup.",
    ),
    (
        "Is there a mileage limit?",
        "Most rentals include unlimited mileage. Please confirm your package details before booking.",
    ),
    (
        "Can I add an additional driver?",
        "Yes, additional drivers can be added for a small fee and they must meet driver requirements.",
    ),
    (
        "What if the car breaks down?",
        "Roadside assistance is included in most plans. Contact support immediately for help.",
    ),
    (
        "Are pets allowed in the car?",
        "Pets are allowed only in select cars. Please check availability beforehand.",
    ),
    (
        "Can I extend my rental duration?",
        "Extensions are possible subject to availability and additional charges.",
    ),
    (
        "What payments are accepted?",
        "We accept all major credit/debit cards, UPI, and net banking.",
    ),
];

pub fn fallback_faqs() -> Vec<Faq> {
    FALLBACK_FAQS
        .iter()
        .zip(1..)
        .map(|((question, answer), id)| Faq {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomePage {
    pub top_cars: Vec<Car>,
    pub offers: Vec<Offer>,
    pub rentals: Vec<RentalCard>,
    pub faqs: Vec<Faq>,
}

/// Loads the landing page sections concurrently; each section fails on its own.
pub async fn load(state: &AppState) -> HomePage {
    let backend = &state.backend;
    let (cars, offers, packages, faqs) = tokio::join!(
        backend.list_cars(),
        backend.list_offers(),
        backend.list_packages(),
        backend.list_faqs(),
    );

    let top_cars = cars.unwrap_or_else(|e| {
        warn!(error = %e, "Failed fetching cars");
        Vec::new()
    });
    let offers = offers.unwrap_or_else(|e| {
        warn!(error = %e, "Failed fetching offers");
        Vec::new()
    });
    let rentals = match packages {
        Ok(packages) => packages.iter().take(3).map(RentalCard::from_package).collect(),
        Err(e) => {
            warn!(error = %e, "Failed fetching packages");
            Vec::new()
        }
    };
    let faqs = faqs.unwrap_or_else(|e| {
        warn!(error = %e, "Failed fetching FAQs, using built-in list");
        fallback_faqs()
    });

    HomePage {
        top_cars,
        offers,
        rentals,
        faqs,
    }
}
