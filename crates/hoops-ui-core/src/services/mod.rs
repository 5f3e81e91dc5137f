//! The built-in viewer services, one module per viewer feature.

pub mod camera;
pub mod cutting;
pub mod explode;
pub mod floorplan;
pub mod measurement;
pub mod pmi;
pub mod redline;
pub mod render_options;
pub mod selection;
pub mod sheet;
pub mod space_mouse;

pub use camera::{
    CameraConfiguration, CameraEvent, CameraManager, CameraService, OrbitFallback, Projection,
};
pub use cutting::{
    CuttingConfiguration, CuttingEvent, CuttingManager, CuttingPlane, CuttingService,
};
pub use explode::{ExplodeConfiguration, ExplodeEvent, ExplodeManager, ExplodeService};
pub use floorplan::{
    FloorplanAutoActivation, FloorplanConfiguration, FloorplanEvent, FloorplanManager,
    FloorplanOrientation, FloorplanService,
};
pub use measurement::{
    Measurement, MeasurementEvent, MeasurementKind, MeasurementManager, MeasurementService,
};
pub use pmi::{PmiConfiguration, PmiEvent, PmiManager, PmiService};
pub use redline::{RedlineConfiguration, RedlineEvent, RedlineManager, RedlineService, RedlineView};
pub use render_options::{
    DrawMode, RenderOptionsConfiguration, RenderOptionsEvent, RenderOptionsManager,
    RenderOptionsService,
};
pub use selection::{
    NodeId, SelectionConfiguration, SelectionEvent, SelectionManager, SelectionService,
};
pub use sheet::{SheetConfiguration, SheetEvent, SheetId, SheetManager, SheetService};
pub use space_mouse::{
    SpaceMouseConfiguration, SpaceMouseEvent, SpaceMouseManager, SpaceMouseService,
};
