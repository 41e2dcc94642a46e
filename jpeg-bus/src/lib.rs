#![allow(dead_code)]

pub mod bus;
pub mod frame;
pub mod jpeg;
pub mod sink;
