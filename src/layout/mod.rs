/// Caption fitting: font size search and line breaking.
pub mod fitter;
/// Text width measurement backends.
pub mod measure;
/// Placement of a fitted caption on a canvas.
pub mod plan;
