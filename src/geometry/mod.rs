pub mod anisotropy;
