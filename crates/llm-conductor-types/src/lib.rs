// llm-conductor-types: Layer 1 — message model, provider contract, errors, profiles
#![allow(clippy::result_large_err)]

pub mod config;
pub mod content;
pub mod error;
pub mod message;
pub mod provider;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;
pub mod usage;

pub use config::*;
pub use content::*;
pub use error::*;
pub use message::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use stream::*;
pub use tool::*;
pub use usage::*;
