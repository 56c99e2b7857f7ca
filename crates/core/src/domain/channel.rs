// Output channels of an executing job

use serde::{Deserialize, Serialize};

/// Standard stream a [`Collector`](crate::sync::Collector) can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

impl std::fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputChannel::Stdout => write!(f, "STDOUT"),
            OutputChannel::Stderr => write!(f, "STDERR"),
        }
    }
}
