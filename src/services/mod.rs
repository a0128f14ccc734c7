// Service exports
pub mod restaurants;
pub mod store;

pub use restaurants::{load_restaurants, normalize_restaurant, parse_restaurants, DataError};
pub use store::{generate_session_code, SessionStore, StoreError};
