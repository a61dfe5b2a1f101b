//! Google Drive API service implementations.

mod about;
mod files;
mod permissions;

pub use about::*;
pub use files::*;
pub use permissions::*;
