#![allow(dead_code)]

pub mod car_server;
pub mod json_server;
