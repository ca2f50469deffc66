pub mod models;
pub mod price_lock;
pub mod checkout;
pub mod bookings;

pub use bookings::{BookCarForm, PaymentForm};
pub use checkout::{CheckoutError, CheckoutOrchestrator};
pub use models::{CheckoutDraft, TripSummary};
pub use price_lock::{format_clock, PriceLock};
