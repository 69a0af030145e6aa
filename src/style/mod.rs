/// Named style presets and the immutable registry that resolves them.
pub mod registry;
