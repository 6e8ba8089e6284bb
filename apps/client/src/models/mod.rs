pub mod file;
pub mod report;

pub use file::SelectedFile;
pub use report::Report;
