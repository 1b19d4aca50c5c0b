//! Helpers shared by the workspace integration tests
#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
