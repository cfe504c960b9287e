pub mod status;
pub mod transcript;
pub mod user;
