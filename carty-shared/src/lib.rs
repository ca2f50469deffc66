pub mod models;
pub mod money;
pub mod pii;
pub mod lenient;

pub use money::Money;
pub use pii::Masked;
