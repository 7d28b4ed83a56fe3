pub mod clock;
pub mod context;
pub mod engine;
pub mod services;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::SessionContext;
pub use engine::{MaterializationEngine, ProcessReport, SkippedTemplate};
