pub mod filler;
pub mod placeholders;

pub use filler::{fill_template, FillSummary, ITEMS_HEADING, ITEM_PREFIX};
pub use placeholders::{PlaceholderMap, CONTENT_CHAR_LIMIT};
