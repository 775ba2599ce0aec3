// Host-side preferences

pub mod layout;

pub use layout::{LayoutStore, DEFAULT_COLUMN_WIDTH};
