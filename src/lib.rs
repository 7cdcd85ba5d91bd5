//! Rust client for the TofuPilot test management API.
//!
//! ```no_run
//! use tofupilot::{ClientOptions, TofuPilotClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> tofupilot::Result<()> {
//! let client = TofuPilotClient::new(ClientOptions::new().with_api_key("tp_..."))?;
//! let cancel = CancellationToken::new();
//! let run = client.runs().get("run-id", &cancel).await?;
//! client.attachments().upload(&run.id, &["report.pdf"], &cancel).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod resources;
pub mod runtime;
pub mod upload;

pub use client::{TofuPilotClient, TransportOwnership};
pub use config::ClientOptions;
pub use error::{ApiError, Result, TofuPilotError, ValidationError};
pub use http::RetryPolicy;
pub use resources::collect_all;
pub use upload::AttachmentLimits;
