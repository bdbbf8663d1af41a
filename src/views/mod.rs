pub mod evaluation;
pub mod homepage;
pub mod layout;
pub mod quiz;

// Re-export commonly used functions from layout
pub use layout::{page, render, titled};
