pub mod entries;
pub mod sign_in;
pub mod status;
pub mod watch;
