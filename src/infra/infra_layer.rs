// The infra module contains implementations of core traits.
// Each external system gets its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "forecast/mod.rs"]
pub mod forecast;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "mediaplan/mod.rs"]
pub mod mediaplan;
