//! The sequence view controller and its input stream.

pub mod controller;
pub mod inputs;

pub use controller::SequenceView;
pub use inputs::{ViewInput, ViewInputs};
