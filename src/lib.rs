pub mod core;
pub mod intake;
pub mod marc;
pub mod persistence;
pub mod runner;

pub use crate::core::{
    pipeline::{
        process,
        process_with,
        repair,
        stats,
    },
    MarcFillError,
    ProcessingStats,
    RepairProfile,
    RepairReport,
    Settings,
};
