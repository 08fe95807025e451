pub mod exchange;
pub mod import;
pub mod store;

pub use exchange::{export_file_name, ExportDocument, ImportDocument};
pub use import::{ImportMerger, ImportMode, ImportPreview, ImportState, MAX_IMPORT_TASKS};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
