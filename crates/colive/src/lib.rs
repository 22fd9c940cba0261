//! Chapter booking, tiered pricing, application intake, and onboarding workflows for a
//! coliving network.

pub mod config;
pub mod error;
pub mod ids;
pub mod pricing;
pub mod storage;
pub mod telemetry;
pub mod workflows;
