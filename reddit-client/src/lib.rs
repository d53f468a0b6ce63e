pub mod api;
pub mod auth;

pub use api::{RedditApiClient, RedditUserData};
pub use auth::AuthToken;
