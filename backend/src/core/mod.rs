//! Core primitives shared by every module

pub mod time;
