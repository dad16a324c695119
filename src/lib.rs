//! Medicine authenticity verification registry.
//!
//! Customers verify a medicine (by name, batch number, or symptom)
//! against a manufacturer-supplied registry and flag suspicious
//! entries; manufacturers manage their entries and resolve flags.
//! The heart of the crate is the cascading [`lookup::LookupPipeline`]
//! and the dedup-guaranteed [`flags`] workflow.

pub mod api;
pub mod config;
pub mod db;
pub mod flags;
pub mod lookup;
pub mod matching;
pub mod models;
pub mod registry;
