pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpListingsClient;
pub use traits::ListingsApi;
pub use types::{FavoriteSet, SavedSearch, SearchHistoryEntry};
