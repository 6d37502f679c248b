#![allow(clippy::multiple_crate_versions)]

pub mod compiler;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod i18n;
pub mod ingest;
pub mod lang;
pub mod models;
pub mod web;
