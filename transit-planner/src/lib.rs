//! Multi-criteria transit journey query engine.
//!
//! Answers: "starting here at this time, what are the non-dominated ways to
//! reach there?" over a time-expanded transit-plus-walking network. Because
//! arrival time, transfer count and departure time pull in different
//! directions, the engine returns the Pareto frontier of itineraries rather
//! than a single best path.

pub mod domain;
pub mod network;
pub mod planner;
