pub mod editor;
pub mod history;
pub mod model;
pub mod template;
