pub mod application;
pub mod health;
pub mod source;
pub mod state;
pub mod validation;
