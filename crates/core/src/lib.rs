pub mod blocks;
pub mod error;
pub mod hashing;
pub mod input;
pub mod progress;
pub mod roles;
pub mod session;
pub mod storage;
pub mod types;
