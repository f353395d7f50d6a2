//! Test doubles for code written against [`Transport`](crate::transport::Transport)

pub mod mocks;

pub use mocks::*;
