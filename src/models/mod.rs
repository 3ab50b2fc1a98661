pub mod admin;
pub mod info_hash;
pub mod snapshot;
