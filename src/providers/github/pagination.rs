use std::collections::VecDeque;

use futures::stream::{self, Stream};
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::Page;

struct Cursor<T> {
    next: Option<Url>,
    buffered: VecDeque<T>,
}

/// Lazily stream every item of a paginated list endpoint.
///
/// The next page is requested only once the items of the current one have been
/// consumed. The stream ends when a response carries no `rel="next"` link, and
/// yields an error (then ends) if a page request fails.
pub fn paginate<'a, P>(
    client: &'a GitHubClient,
    first_page: Url,
) -> impl Stream<Item = Result<P::Item>> + 'a
where
    P: Page + DeserializeOwned + 'a,
    P::Item: 'a,
{
    let cursor = Cursor {
        next: Some(first_page),
        buffered: VecDeque::new(),
    };

    stream::try_unfold(cursor, move |cursor| advance::<P>(client, cursor))
}

async fn advance<P>(
    client: &GitHubClient,
    mut cursor: Cursor<P::Item>,
) -> Result<Option<(P::Item, Cursor<P::Item>)>>
where
    P: Page + DeserializeOwned,
{
    loop {
        if let Some(item) = cursor.buffered.pop_front() {
            return Ok(Some((item, cursor)));
        }

        let Some(url) = cursor.next.take() else {
            return Ok(None);
        };

        let (page, next) = client.get_page::<P>(&url).await?;
        cursor.buffered.extend(page.into_items());
        cursor.next = next;
    }
}

/// The `rel="next"` target of a response's `Link` header.
pub(super) fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_next_link)
}

fn parse_next_link(header: &str) -> Option<Url> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if is_next {
            Url::parse(target).ok()
        } else {
            None
        }
    })
}
