//! Synthetic market series, indicators and DCA simulation for the
//! cryptoquant dashboard.

pub mod catalog;
pub mod config;
pub mod dca;
pub mod error;
pub mod indicators;
pub mod insights;
pub mod logging;
pub mod series;
pub mod settings;
