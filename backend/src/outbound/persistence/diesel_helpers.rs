//! Small conversions shared by the Diesel repositories.

use pagination::PageRequest;

/// `LIMIT` and `OFFSET` values for a page request.
pub fn page_window(page: &PageRequest) -> (i64, i64) {
    let limit = i64::from(page.limit());
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

/// Row counts are never negative; clamp defensively at zero.
pub fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Quantities are bounded well inside `i32` by the domain types.
pub fn quantity_for_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}
