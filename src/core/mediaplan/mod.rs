pub mod mediaplan_models;
pub mod mediaplan_service;
pub mod mediaplan_store;
pub mod task_registry;

pub use mediaplan_models::{
    GenerateAllSummary, GenerateRequest, GeneratedDeck, MediaplanRecord, RefreshSummary,
    TaskInfo, TaskStatus,
};
pub use mediaplan_service::{MediaplanConfig, MediaplanError, MediaplanService};
pub use mediaplan_store::{MediaplanStore, StoreError};
pub use task_registry::TaskRegistry;
