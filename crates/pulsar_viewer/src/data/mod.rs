//! Scene data for the pulsar viewer.
//!
//! - Building the pulsar field and the background starfield on the CPU.
//! - Sprite textures and colour helpers.
//! - The structures uploaded to GPU buffers.

pub mod color;
pub mod galaxy;
pub mod sprite;
pub mod starfield;
pub mod types;

pub use self::galaxy::{PeriodClass, PulsarField, PulsarFieldBuilder, PulsarVisual};
pub use self::types::{CloudUniformStd140, PointCloudGpu, PointInstance};
