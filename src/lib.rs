pub mod player;
pub mod speech;
pub mod story;

// Re-export the controller for convenient access
pub use player::controller::Controller;
