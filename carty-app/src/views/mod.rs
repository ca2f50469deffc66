pub mod home;
pub mod auth;
pub mod lookup;
pub mod search;
pub mod listing;
pub mod detail;
pub mod confirmation;
pub mod bookings;
pub mod notifications;

pub use confirmation::ConfirmationView;
pub use detail::DetailView;
pub use listing::ListingView;
pub use lookup::LocationLookup;
pub use search::SearchView;
