pub mod range_query;
pub mod source_cache;
