pub mod api;
pub mod voice;
