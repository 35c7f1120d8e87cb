//! Infrastructure layer: platform boundaries and the quotation workflow service.

pub mod cart;
pub mod config;
pub mod quotation_store;
pub mod service;
pub mod session;

mod integration_tests;
