//! Bus route travel time server.
//!
//! Answers "how long does this route take, by day of week and hour of
//! departure?" from a published route database and a corpus of
//! historical stop-to-stop timings.

pub mod cli;
pub mod dashboard;
pub mod domain;
pub mod estimate;
pub mod resolve;
pub mod routedb;
pub mod web;
