pub mod config;
pub mod container;
pub mod document_converters;
pub mod external_services;
pub mod file_system;

// Re-export commonly used items
pub use config::AppConfig;
pub use container::AppContainer;
