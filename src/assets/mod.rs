/// Font lookup over system and configured font directories.
pub mod font;
/// Base frame pixels and the frame provider seam.
pub mod frame;
