pub mod commands;
pub mod controller;
pub mod duration;
pub mod ledger;
pub mod phase;
pub mod state;

pub use controller::RecorderController;
pub use state::{RecorderSnapshot, RecorderState};
