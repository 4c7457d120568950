pub mod memory_user_repository;
pub mod user_repository;

pub use memory_user_repository::InMemoryUserRepository;
pub use user_repository::PgUserRepository;
