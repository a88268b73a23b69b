pub mod csv_loader;

// Re-export the loader entry points (e.g. `use crate::market_data::load_series`).
pub use csv_loader::{load_series, StockSource};
