#![cfg(test)]

pub mod common;
pub mod streaming_tests;
