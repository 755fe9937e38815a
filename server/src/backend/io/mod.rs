//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services: routing,
//! JSON (de)serialization through the `shared` DTOs, caller identification
//! and translation of domain errors into status codes.

pub mod rest;
