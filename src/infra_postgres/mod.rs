mod user_store_pg;

pub use user_store_pg::*;
