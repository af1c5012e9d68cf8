//! Fair meeting point server.
//!
//! A web application that answers: "Two of us are travelling by different
//! means; where should we meet so that neither waits long for the other?"

pub mod cache;
pub mod domain;
pub mod engine;
pub mod oracle;
pub mod queue;
pub mod web;
