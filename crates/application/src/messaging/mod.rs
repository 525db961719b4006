pub mod event_bridge;

pub use event_bridge::EventBridge;
