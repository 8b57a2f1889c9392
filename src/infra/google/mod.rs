pub mod google_auth;
pub mod slides_client;

pub use google_auth::{AccessTokenProvider, AuthorizedUserAuth, ServiceAccountAuth};
pub use slides_client::GoogleDeckClient;
