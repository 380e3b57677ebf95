//! The Movie Database adapter.

mod client;
mod dto;

pub use client::{DEFAULT_TIMEOUT, TMDB_API_BASE, TmdbClient, error_from_status};
