//! Data models for the league-leader pipeline.

mod observation;
mod stat;

pub use observation::{
    CleanObservation, DefectReason, DefectiveLink, LoadFailureKind, RawObservation, YearEntry,
};
pub use stat::{Category, Stat};
