//! `unitstore` - Unit ownership and parking assignments for real-estate projects
//!
//! Each development project keeps two maps: unit to owner record, and unit to
//! the parking spots it holds. [`UnitAssignmentStore`] scopes both to a project
//! key and persists them as JSON documents in a [`KeyValueStorage`] backend.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{OwnerData, OwnerMap, OwnerRecord, OwnerType, ParkingAssignment, ParkingMap};
pub use storage::{
    open_or_memory, ActiveBackend, KeyValueStorage, MemoryStorage, SlotStats, SqliteStorage,
};
pub use store::{list_projects, AssignmentState, AssignmentStats, UnitAssignmentStore};
