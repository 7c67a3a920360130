#![allow(dead_code)]

pub mod mock_driver;
pub mod utils;
