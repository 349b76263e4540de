//! Small filesystem helpers used by module discovery.
pub mod fs;

pub use fs::find_files;

#[cfg(test)]
mod tests;
