pub mod dto;
pub mod editor;
pub mod handlers;
pub mod models;
pub mod rules;
pub mod service;

// Re-export commonly used types
pub use service::ApplicationService;
