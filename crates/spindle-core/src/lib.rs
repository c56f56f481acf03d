//! spindle-core
//!
//! Core building blocks for distributing optimization proposals to workers:
//!
//! - **domain**: proposal records, lifecycle states, strategy config,
//!   row-oriented candidate/experiment payloads
//! - **store**: `ProposalStore` port + in-memory implementation with an
//!   atomic claim operation
//! - **service**: `ProposalService` state machine
//!   (create/list/get/claim/mark_processed/mark_failed)
//! - **transport**: `TransportClient` port + in-process implementation
//! - **generator**: `CandidateGenerator` port
//! - **worker**: the execution engine (claim, fault-isolated generation,
//!   bounded-wait polling, terminal resolution)
//! - **config**: environment configuration for workers
//! - **observability**: counts by state

pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod observability;
pub mod service;
pub mod store;
pub mod transport;
pub mod worker;
