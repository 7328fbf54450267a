pub mod html;
pub mod portal;
pub mod slots;
