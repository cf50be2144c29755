use serde::Serialize;

use crate::Folder;

/// Represents the result of a longest-prefix folder lookup: the
/// deepest existing folder of the path and the part of the path that
/// did not match any folder.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FolderResolution {
    pub folder: Folder,
    pub remaining_path: Option<String>,
}

impl FolderResolution {
    pub fn full(folder: Folder) -> Self {
        Self {
            folder,
            remaining_path: None,
        }
    }

    pub fn partial<P: ToString>(folder: Folder, remaining_path: P) -> Self {
        let remaining_path = remaining_path.to_string();
        Self {
            folder,
            remaining_path: if remaining_path.is_empty() {
                None
            } else {
                Some(remaining_path)
            },
        }
    }

    /// Returns the unmatched part of the path, if any.
    pub fn remaining_path(&self) -> Option<&str> {
        self.remaining_path
            .as_deref()
            .filter(|path| !path.is_empty())
    }

    pub fn is_partial(&self) -> bool {
        self.remaining_path().is_some()
    }
}
