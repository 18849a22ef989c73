#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_library;
pub mod draw_service;
pub mod error;
pub mod progress_store;

pub use app_services::AppServices;
pub use content_library::ContentLibrary;
pub use draw_service::{CategoryProgress, Draw, DrawService};
pub use error::{AppServicesError, ContentLibraryError, DrawError};
pub use progress_store::{PROGRESS_KEY_PREFIX, ProgressStore, progress_key};
