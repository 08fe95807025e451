pub mod binding;
pub mod dialogs;
pub mod gantt_chart;
pub mod painter;
pub mod recommend;
pub mod task_table;
pub mod theme;
pub mod toolbar;
