//! Error type shared by the maps and the demonstration harness.
//!
//! Lookups never produce errors: an absent key is `None`. The variants here
//! cover the conditions that are decided once (building an ordered map) or
//! that come from outside the containers (demo selection, output sink).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    /// An ordered map was requested without a comparator and without the
    /// key type's intrinsic order.
    #[error("no ordering configured for ordered map over `{key_type}`")]
    MissingOrdering { key_type: &'static str },

    /// The harness was asked for a demo that is not in its dispatch table.
    #[error("unknown demo `{0}`")]
    UnknownDemo(String),

    /// Writing demo output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
