//! Route Handlers

pub mod biometrics;
pub mod mood;
pub mod stress;
