//! Rendering side of the chart contract: consumes tool-result events and
//! drives a chart surface. Nothing here fetches data or calls tools.

pub mod bridge;
pub mod layout;
pub mod markup;
pub mod resource;
pub mod slot;

pub use bridge::{IgnoreReason, RenderOutcome, RenderingBridge};
pub use layout::{ChartConfig, ChartLayout};
pub use slot::{ChartSlot, Destroy};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface is not connected")]
    NotConnected,
    #[error("surface rejected the chart: {0}")]
    Rejected(String),
}

/// Widget backend the bridge draws on.
pub trait ChartSurface {
    type Instance: Destroy;

    /// Lays out title, KPI cards and insights around an empty chart area.
    fn mount(&mut self, layout: &ChartLayout) -> Result<(), SurfaceError>;

    /// Creates a live chart in the mounted area.
    fn create(&mut self, config: &ChartConfig) -> Result<Self::Instance, SurfaceError>;
}
