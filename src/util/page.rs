//! System page size.

use std::sync::LazyLock;

/// Fallback when `sysconf` cannot report a page size.
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Cached result of the page size query.
static PAGE_SIZE: LazyLock<u64> = LazyLock::new(query_page_size);

/// Returns the size of a memory page in bytes.
///
/// The result is cached after the first call.
pub fn page_size() -> u64 {
    *PAGE_SIZE
}

fn query_page_size() -> u64 {
    // SAFETY: sysconf has no preconditions for _SC_PAGESIZE
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        tracing::warn!("sysconf(_SC_PAGESIZE) failed, assuming {}", DEFAULT_PAGE_SIZE);
        DEFAULT_PAGE_SIZE
    }
}
