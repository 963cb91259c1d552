pub mod errors;
pub mod models;
pub mod pipeline;
pub mod settings;

pub use errors::MarcFillError;
pub use models::{ Insertion, Marker, ProcessingStats, Record, RepairReport, SkippedGap };
pub use settings::{ IntakeLimits, RepairProfile, Settings };
