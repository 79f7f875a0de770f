pub mod account;
pub mod credential;
pub mod login;
