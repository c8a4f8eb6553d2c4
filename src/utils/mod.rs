pub mod db_utils;
pub mod rfid_filter;
pub mod schedule_cache;
