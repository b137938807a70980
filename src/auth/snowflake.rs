use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use snowflake::SnowflakeIdBucket;

static SNOWFLAKE_GENERATOR: OnceCell<Mutex<SnowflakeIdBucket>> = OnceCell::new();

/// Pins the worker and data center ids. Only the first call wins; ids
/// generated before it use worker 1 in data center 1.
pub fn init_generator(worker_id: i32, data_center_id: i32) {
    if SNOWFLAKE_GENERATOR
        .set(Mutex::new(SnowflakeIdBucket::new(worker_id, data_center_id)))
        .is_err()
    {
        tracing::warn!("Snowflake generator was already initialized");
    }
}

pub fn generate_id() -> i64 {
    SNOWFLAKE_GENERATOR
        .get_or_init(|| Mutex::new(SnowflakeIdBucket::new(1, 1)))
        .lock()
        .get_id()
}
