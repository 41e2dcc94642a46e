pub mod archive;
pub mod controller;
pub mod session;
pub mod types;
