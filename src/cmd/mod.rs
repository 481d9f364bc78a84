/// Per-document summary command.
pub mod info;
/// Indented value rendering with truncation limits.
pub mod print;
/// Value dump command.
pub mod show;
/// Shared file and output helpers.
pub mod util;
