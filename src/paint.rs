pub mod bridge;
pub mod preview;
pub mod texture;
