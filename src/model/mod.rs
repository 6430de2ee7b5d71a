pub mod entry;
pub mod rename;
pub mod settings;
