pub mod accounts;
pub mod packages;
pub mod profiles;
pub mod videos;
