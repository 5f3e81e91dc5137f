//! Headless UI components for the HOOPS UI services.
//!
//! Components hold no drawing code. Each one looks its service up in a
//! [`ServiceRegistry`](hoops_ui_core::ServiceRegistry), listens to the events
//! that concern it and raises an [`UpdateRequest`] so the host knows to
//! re-render it from a fresh view snapshot:
//!
//! - **Panels**: cutting section, explode, floorplan, measurement, redline
//! - **Toolbar**: toggle buttons for explode, floorplan, cutting sections,
//!   camera projection and draw modes

pub mod panels;
pub mod toolbar;
pub mod update;

pub use panels::{
    CuttingSectionPanel, CuttingSectionView, ExplodePanel, ExplodeView, FloorplanPanel,
    FloorplanView, MeasurementPanel, MeasurementView, RedlinePanel, RedlinePanelView,
};
pub use toolbar::{ToolbarAction, ToolbarButton};
pub use update::UpdateRequest;
