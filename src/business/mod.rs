//! Business logic layer for MonkeLogger
//!
//! This module provides the high-level Tracker API for managing
//! themes, data types, data points and their derived views.

pub mod tracker;
pub mod themes;
pub mod data_types;
pub mod data_points;
pub mod views;
pub mod export;

pub use tracker::Tracker;
