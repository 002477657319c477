
/// Hex program files.
pub mod loader;
