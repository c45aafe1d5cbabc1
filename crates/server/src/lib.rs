pub mod api;
pub mod dispatcher;
pub mod metrics;
pub mod state;
pub mod telegram;
