pub mod currents;
pub mod logging;
pub mod reconciler;
pub mod scheduler;

pub use currents::{CurrentsClient, DEFAULT_ENDPOINT};
pub use logging::init_logging;
pub use reconciler::{reconcile, CycleReport};
pub use scheduler::{Ingestor, SchedulerHandle, DEFAULT_REFRESH_INTERVAL};
