pub mod app_config;
pub mod database;
pub mod order_repo;
pub mod redis_repo;

pub use database::DbClient;
pub use order_repo::PgOrderRepository;
pub use redis_repo::RedisClient;
