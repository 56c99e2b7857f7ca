// Shell privilege status

use serde::{Deserialize, Serialize};

/// Privilege level of a ready shell session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShellStatus {
    Unknown,
    NonRoot,
    Root,
}

impl ShellStatus {
    pub fn is_root(self) -> bool {
        self == ShellStatus::Root
    }
}

impl std::fmt::Display for ShellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellStatus::Unknown => write!(f, "UNKNOWN"),
            ShellStatus::NonRoot => write!(f, "NON_ROOT"),
            ShellStatus::Root => write!(f, "ROOT"),
        }
    }
}
