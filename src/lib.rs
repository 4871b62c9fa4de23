pub mod app;
pub mod error;
pub mod form;
pub mod render;
pub mod storage;
pub mod task;
pub mod task_store;
pub mod ui;
