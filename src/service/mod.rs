pub mod context;
pub mod info_query;
