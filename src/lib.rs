// src/lib.rs

//! promptcrawl Library
//!
//! Turns a set of topical search queries into a deduplicated,
//! crash-resilient CSV of extracted prompts.

pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
