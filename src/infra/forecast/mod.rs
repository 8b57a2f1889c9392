pub mod mediaplan_api_client;

pub use mediaplan_api_client::MediaplanApiClient;
