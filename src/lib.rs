//! Client core for the Seedream v4 / v4.5 image-editing endpoints.
//!
//! [`SeedreamClient`] bundles the form state, the request orchestrator and
//! the lens settings a front end needs. The pure pieces
//! ([`extract_image_urls`], [`planner`], [`magnifier`]) can be used on their
//! own.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod images;
pub mod logger;
pub mod magnifier;
pub mod models;
pub mod planner;

pub use client::{
    build_request, BusyFlag, GenerationOrchestrator, HttpTransport, SeedreamClient, Transport,
};
pub use config::{ApiKeyProfiles, EndpointConfig, LensConfig, SeedreamConfig};
pub use error::{Result, SeedreamError, ValidationError};
pub use extract::extract_image_urls;
pub use form::FormState;
pub use magnifier::compute_lens;
pub use models::*;
pub use planner::{compute_size, validate_min_pixels};
