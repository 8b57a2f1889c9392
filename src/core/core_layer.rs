// The core module contains all business logic.
// Each feature gets its own submodule; external systems are reached through
// the traits declared here and implemented in infra.

#[path = "slides/mod.rs"]
pub mod slides;

#[path = "forecast/mod.rs"]
pub mod forecast;

#[path = "content/mod.rs"]
pub mod content;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "mediaplan/mod.rs"]
pub mod mediaplan;

#[path = "schedule/mod.rs"]
pub mod schedule;
