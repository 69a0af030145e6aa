pub mod image_out;
