//! Automatic playback control.
//!
//! - [`evaluate`]: pure admission decision for one automatic playback
//! - [`CooldownLedger`]: last-play timestamps and the AutoDJ switch
//! - [`SoundCatalog`]: validated sound files per mood
//! - [`route`]: maps a recognizer result to stop, admit or ignore

mod admission;
mod catalog;
mod error;
mod ledger;
mod router;

pub use admission::{evaluate, AdmissionConfig, AdmissionInput, Decision, DenyReason};
pub use catalog::{safe_sound_path, SoundCatalog};
pub use error::CatalogError;
pub use ledger::CooldownLedger;
pub use router::{route, Route, RouterConfig};
