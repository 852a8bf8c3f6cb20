//! Stash GraphQL client.
//!
//! This crate is the fetch side of the exporter: it posts the two library
//! queries to a Stash server and decodes the answers into `stash-metrics`
//! records. [`StashClient`] implements [`stash_metrics::StashSource`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use stash_client::StashClient;
//!
//! # async fn example() -> stash_client::Result<()> {
//! let client = StashClient::new("http://stash:9999/graphql", None, Duration::from_secs(10))?;
//! let stats = client.fetch_library_stats().await?;
//! println!("{} scenes", stats.scene_count);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod queries;

pub use client::{StashClient, DEFAULT_GRAPHQL_URL, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use queries::{LIBRARY_STATS_QUERY, SCENE_PLAY_HISTORY_QUERY};
