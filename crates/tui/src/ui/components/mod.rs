pub mod hints;
pub mod overlay;
pub mod tabs;
