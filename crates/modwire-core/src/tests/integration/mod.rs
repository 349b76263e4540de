#![cfg(test)]

pub mod common;
pub mod lifecycle_tests;
pub mod persistence_tests;
