pub mod cookies;
pub mod error;
pub mod ledger;
pub mod password;
pub mod payment;
pub mod production;
pub mod realtime;
pub mod tokens;
