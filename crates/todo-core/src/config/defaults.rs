//! Default value functions used by serde for config deserialization.

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    7540
}

pub fn default_web_dir() -> String {
    "./web".to_string()
}

pub fn default_db_path() -> String {
    "storage/scheduler.db".to_string()
}

pub fn default_max_connections() -> u32 {
    4
}

pub fn default_list_limit() -> u32 {
    10
}
