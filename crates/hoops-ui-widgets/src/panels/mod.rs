//! Feature panels.

mod cutting_section;
mod explode;
mod floorplan;
mod measurement;
mod redline;

pub use cutting_section::{CuttingSectionPanel, CuttingSectionView};
pub use explode::{ExplodePanel, ExplodeView};
pub use floorplan::{FloorplanPanel, FloorplanView};
pub use measurement::{MeasurementPanel, MeasurementView};
pub use redline::{RedlinePanel, RedlinePanelView};
