//! Filter-then-slice paging shared by the in-process backends

use quotes_core::{Page, PageRequest, Quote, SearchCondition};

/// Sort newest first
pub fn sort_newest_first(quotes: &mut [Quote]) {
    quotes.sort_unstable_by(|a, b| b.id.cmp(&a.id));
}

/// Filter `quotes` (already newest first) with `condition`, then cut out the
/// requested page. `total_count` counts every quote that survived filtering.
pub fn paginate<I>(quotes: I, condition: &SearchCondition, request: PageRequest) -> Page<Quote>
where
    I: IntoIterator<Item = Quote>,
{
    let filtered: Vec<Quote> = quotes
        .into_iter()
        .filter(|q| condition.matches(q))
        .collect();
    let total_count = filtered.len();

    let from = request.offset().min(total_count);
    let to = from.saturating_add(request.page_size()).min(total_count);

    let content = filtered.into_iter().skip(from).take(to - from).collect();
    Page::new(content, request, total_count)
}
