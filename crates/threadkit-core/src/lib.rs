//! # ThreadKit Core
//!
//! Core types and utilities shared by the ThreadKit crates.
//! Provides the nail, pixel and edge data model used by the thread art
//! engine, and the pixel-to-millimetre conversions that keep thread length
//! accounting and G-code output consistent.

pub mod data;
pub mod units;

pub use data::{circular_distance, Edge, Nail, Pixel};
pub use units::{format_length, mm_to_whole_meters, MeasurementSystem, PixelScale};
