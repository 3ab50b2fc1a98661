pub mod admin;
pub mod fallback;
pub mod health;
pub mod info;
pub mod metrics;
