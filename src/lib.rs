//! Conference Sessions - proposal, review and registration backend
//!
//! Speakers propose sessions, coordinators accept or reject them, and
//! attendees register, unregister and review. The crate follows a
//! ports-and-adapters layout: `domain` holds the rules, `application` the
//! per-operation handlers, `ports` the traits they depend on and
//! `adapters` the postgres, in-memory, JWT and HTTP implementations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
