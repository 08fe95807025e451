pub mod date_range;
pub mod recommend;
pub mod task;
pub mod task_list;
pub mod timeline;

pub use date_range::{DateInput, DateRange, RangeFormat};
pub use recommend::{Priority, RecommendFilter, RecommendStats, TimeRange};
pub use task::{Task, TaskRecord};
pub use task_list::TaskList;
pub use timeline::{ChartMetrics, ViewMode, ViewState};
