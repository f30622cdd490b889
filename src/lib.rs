//! Range-based satellite pass prediction and ground-track ephemeris for a
//! single ground station, with an HTTP API on top.

pub mod predict;
pub mod web;
