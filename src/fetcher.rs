use log::{debug, info};

use crate::{FetchLimit, RawItem, RemoteApi, Result, Session};

/// Largest page the listing endpoint serves per request.
pub const PAGE_SIZE: u32 = 100;

/// Reads up to `limit` saved items through `session`, in listing order.
///
/// Pages are followed until the limit is reached or the listing runs out.
/// A failing page fails the whole fetch; no partial result is returned.
pub async fn fetch(
    api: &dyn RemoteApi,
    session: &Session,
    limit: FetchLimit,
) -> Result<Vec<RawItem>> {
    let wanted = limit.get() as usize;
    let mut items: Vec<RawItem> = Vec::with_capacity(wanted);
    let mut after: Option<String> = None;

    while items.len() < wanted {
        let page_size = (wanted - items.len()).min(PAGE_SIZE as usize) as u32;
        debug!(
            "Requesting {} saved items after {:?}",
            page_size,
            after.as_deref()
        );

        let page = api.saved_page(session, page_size, after.as_deref()).await?;
        let received = page.items.len();
        items.extend(page.items);

        match page.after {
            Some(cursor) if received > 0 => after = Some(cursor),
            _ => break,
        }
    }

    items.truncate(wanted);
    info!(
        "Fetched {} saved items for {} (limit {})",
        items.len(),
        session.username(),
        limit
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::{AuthError, Credentials, SavedError, SavedPage};

    /// Serves `total` numbered items in pages, recording every request.
    struct PagedListing {
        total: usize,
        fail_on_page: Option<usize>,
        requests: Mutex<Vec<(u32, Option<String>)>>,
    }

    impl PagedListing {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail_on_page: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteApi for PagedListing {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
        ) -> std::result::Result<Session, AuthError> {
            Ok(session())
        }

        async fn saved_page(
            &self,
            _session: &Session,
            limit: u32,
            after: Option<&str>,
        ) -> Result<SavedPage> {
            let mut requests = self.requests.lock().unwrap();
            requests.push((limit, after.map(str::to_string)));
            if self.fail_on_page == Some(requests.len()) {
                return Err(SavedError::FetchFailed {
                    message: "HTTP 503".to_string(),
                });
            }

            let start = after.map_or(0, |a| a.parse::<usize>().unwrap());
            let end = (start + limit as usize).min(self.total);
            let items = (start..end)
                .map(|i| RawItem::new(format!("post {i}"), format!("/r/s/comments/{i}/"), "https://x"))
                .collect();
            let after = (end < self.total).then(|| end.to_string());
            Ok(SavedPage { items, after })
        }
    }

    fn session() -> Session {
        Session::new("tok", "me", "ua")
    }

    #[tokio::test]
    async fn follows_pages_until_limit() {
        let api = PagedListing::new(1000);
        let (limit, _) = FetchLimit::clamped(250);

        let items = fetch(&api, &session(), limit).await.unwrap();

        assert_eq!(items.len(), 250);
        assert_eq!(items[0].title, "post 0");
        assert_eq!(items[249].title, "post 249");
        let requests = api.requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![
                (100, None),
                (100, Some("100".to_string())),
                (50, Some("200".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn stops_when_listing_runs_out() {
        let api = PagedListing::new(30);
        let (limit, _) = FetchLimit::clamped(100);

        let items = fetch(&api, &session(), limit).await.unwrap();

        assert_eq!(items.len(), 30);
        assert_eq!(api.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failing_page_fails_whole_fetch() {
        let mut api = PagedListing::new(500);
        api.fail_on_page = Some(2);
        let (limit, _) = FetchLimit::clamped(300);

        let err = fetch(&api, &session(), limit).await.unwrap_err();
        assert!(matches!(err, SavedError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn clamped_limit_caps_the_fetch() {
        let api = PagedListing::new(5000);
        let (limit, clamped) = FetchLimit::clamped(5000);
        assert!(clamped);

        let items = fetch(&api, &session(), limit).await.unwrap();

        assert_eq!(items.len(), 1000);
        assert_eq!(api.requests.lock().unwrap().len(), 10);
    }
}
