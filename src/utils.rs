pub mod password;
pub mod redirect;
pub mod token;
