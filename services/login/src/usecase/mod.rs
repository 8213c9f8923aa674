pub mod login;
pub mod passcode;
