pub mod config;
pub mod score;
pub mod time;
