//! Utility modules for procsnap.

mod page;

pub use page::page_size;
