//! A week/month Gantt timeline: task model, layered chart rendering, local
//! persistence and JSON import/export, hosted in an egui desktop app.

pub mod app;
pub mod binding;
pub mod config;
pub mod controller;
pub mod error;
pub mod io;
pub mod model;
pub mod render;
pub mod ui;

pub use controller::GanttController;
pub use error::{GanttError, Result};
