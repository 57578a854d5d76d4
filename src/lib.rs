//! Single-user daily check-in tracker. Records at most one check-in per local day, derives current
//! and best streaks from the stored history, serves them over a small json api and sends a
//! reminder when the day passes its alert time without a check-in.
//!

pub mod app;
pub mod cli;
pub mod config;
pub mod fs;
pub mod reminder;
pub mod server;
pub mod tracker;
pub mod utils;
