//! store-intel: a store intelligence assistant.
//!
//! Retail questions are answered by a chat model that can call three lookup
//! tools: two Genie spaces (store performance, product inventory) reached
//! through [`genie::GenieClient`], and a business-conduct policy search.
//!
//! # Asking a Genie space directly
//!
//! ```no_run
//! use store_intel::config::StoreIntelConfig;
//! use store_intel::genie::GenieClient;
//!
//! # async fn example() -> store_intel::error::Result<()> {
//! let config = StoreIntelConfig::from_env()?;
//! let genie = GenieClient::from_config(&config)?;
//! let answer = genie
//!     .fetch_answer("01f023ae84651418a1203b194dff21a9", "total sales for store 110 last year")
//!     .await?;
//! println!("{:?}", answer.statement());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod genie;
pub mod policy;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
