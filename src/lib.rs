// src/lib.rs
pub mod config;
pub mod domain;
pub mod marketplace;
pub mod money;
pub mod payment;
pub mod persistence;
pub mod scheduler;
pub mod stats;
pub mod web;

pub use domain::*;
pub use money::*;
