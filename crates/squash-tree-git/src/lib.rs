pub mod archive;
pub mod hooks;
pub mod notes;
pub mod repo;
pub mod settings;

pub use notes::{write_metadata, GitNotes};
pub use settings::GitSettings;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;
