//! Client core for the recipe service.
//!
//! # Overview
//! Keeps a local list of recipes in step with a remote `/recipes` API:
//! loads the list, creates, edits and deletes recipes, applies edits
//! optimistically, and tracks records the server has not assigned an id to.
//!
//! # Design
//! - `RecipeClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It never performs I/O.
//! - A `Transport` executes requests; `ReqwestTransport` is the native one.
//! - `RecipeHandlers` are the use cases: input validation, existence
//!   checks, error translation.
//! - `RecipeViewModel` owns the in-memory list and pushes snapshots to
//!   `SyncObserver`s. It is single-threaded by construction.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::RecipeClient;
pub use config::{ClientConfig, ConfigError};
pub use controller::{Callbacks, RecipeViewModel, SyncObserver};
pub use error::{ApiError, TransportError};
pub use handlers::RecipeHandlers;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{LocalRecipe, Recipe, RecipeDraft, RecipeList, RecordKey, WriteResponse};
