// Search-as-you-type over blog posts: keystrokes are debounced, and only the
// fetch for the latest settled query publishes results.

use std::{sync::Arc, time::Duration};
use tokio::sync::watch;

use crate::{debounce::Debouncer, listing_api::ListingApi, models::BlogPost};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogResults {
    pub query: String,
    pub posts: Vec<BlogPost>,
    pub error: Option<String>,
}

pub struct BlogSearch {
    api: ListingApi,
    debouncer: Debouncer,
    results: Arc<watch::Sender<BlogResults>>,
}

impl BlogSearch {
    pub fn new(api: ListingApi, delay: Duration) -> Self {
        let (sender, _) = watch::channel(BlogResults::default());
        BlogSearch { api, debouncer: Debouncer::new(delay), results: Arc::new(sender) }
    }

    pub fn subscribe(&self) -> watch::Receiver<BlogResults> {
        self.results.subscribe()
    }

    /// Records a new input value; the fetch happens once typing pauses.
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        let api = self.api.clone();
        let results = self.results.clone();

        self.debouncer.call(async move {
            let update = match api.blogs(&query).await {
                Ok(posts) => BlogResults { query, posts, error: None },
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Blog search failed");
                    BlogResults { error: Some(e.user_message()), query, posts: Vec::new() }
                }
            };
            results.send_replace(update);
        });
    }
}
