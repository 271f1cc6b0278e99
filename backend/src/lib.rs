//! Cinecatalog - movie catalog REST service
//!
//! A generic entity access layer ([`orm`]) over SQLite drives CRUD,
//! filtering, sorting and pagination for every catalog entity, exposed as
//! JSON over HTTP under `/api`.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod geo;
pub mod orm;

pub use app::{AppState, build_app};
