//! Folio - a server-rendered publishing platform
//!
//! This library provides the read side of the platform: publications with their
//! authors, tags and series, visibility rules, Atom feeds, sitemap and search.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod theme;
