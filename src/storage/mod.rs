pub mod local;

pub use local::{DirectoryStatus, LocalStorage, DOCX_CONTENT_TYPE};
