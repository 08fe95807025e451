pub mod canvas;
pub mod layers;
pub mod scheduler;
pub mod style;
pub mod timeline;

pub use canvas::{Canvas, DrawCmd, FixedWidthMeasure, Point, Rect, Rgba, Surface, TextMeasure};
pub use layers::{LayerCompositor, LayerKind, LayerStamp};
pub use scheduler::{Debouncer, RenderRequest, RenderScheduler};
pub use timeline::{TimelineGeometry, TimelineRenderer};
