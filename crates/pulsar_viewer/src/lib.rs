//! Interactive 3D explorer for pulsar catalogs.
//!
//! Pulsars are placed from their galactic coordinates, animated by their
//! rotation periods and can be selected to fly the camera to them while a
//! tone pulses at their rhythm.

pub mod app;
pub mod audio;
pub mod camera;
pub mod config;
pub mod data;
pub mod loader;
pub mod pick;
pub mod pulse;
pub mod renderer;
pub mod ui;
pub mod view;
