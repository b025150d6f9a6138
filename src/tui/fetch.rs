//! Background article fetches for the TUI.
//!
//! Each request runs on its own worker thread and reports back over a channel.
//! Requests are numbered; only the response to the most recent one is handed
//! to the UI, so the last selection wins no matter which request finishes first.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::data::ArticleClient;
use crate::domain::{ArticleOutcome, ArticleRequest};
use crate::error::AppError;

/// Anything that can answer an article request (the HTTP client in practice).
pub trait FetchArticles: Clone + Send + 'static {
    fn fetch_articles(&self, request: &ArticleRequest) -> Result<ArticleOutcome, AppError>;
}

impl FetchArticles for ArticleClient {
    fn fetch_articles(&self, request: &ArticleRequest) -> Result<ArticleOutcome, AppError> {
        self.fetch(request)
    }
}

#[derive(Debug)]
pub struct FetchResponse {
    pub token: u64,
    pub request: ArticleRequest,
    pub result: Result<ArticleOutcome, AppError>,
}

pub struct ArticleFetcher<F> {
    client: F,
    tx: Sender<FetchResponse>,
    rx: Receiver<FetchResponse>,
    latest: u64,
}

impl<F: FetchArticles> ArticleFetcher<F> {
    pub fn new(client: F) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            tx,
            rx,
            latest: 0,
        }
    }

    /// Start fetching; returns the token that identifies this request.
    pub fn request(&mut self, request: ArticleRequest) -> u64 {
        self.latest += 1;
        let token = self.latest;
        let client = self.client.clone();
        let tx = self.tx.clone();

        tracing::debug!(token, query_date = %request.query_date, "article fetch started");
        thread::spawn(move || {
            let result = client.fetch_articles(&request);
            // The receiver is gone once the UI has exited.
            let _ = tx.send(FetchResponse { token, request, result });
        });
        token
    }

    /// Token of the most recent request, `0` before the first one.
    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// Drain finished requests; returns the response to the latest request if
    /// it has arrived. Stale responses are dropped.
    pub fn poll(&mut self) -> Option<FetchResponse> {
        let mut current = None;
        while let Ok(resp) = self.rx.try_recv() {
            if resp.token == self.latest {
                current = Some(resp);
            } else {
                tracing::debug!(token = resp.token, latest = self.latest, "dropping stale article response");
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueryDate;
    use std::time::{Duration, Instant};

    /// Answers after a delay taken from the requested year (ms = year - 1900).
    #[derive(Clone)]
    struct SlowClient;

    impl FetchArticles for SlowClient {
        fn fetch_articles(&self, request: &ArticleRequest) -> Result<ArticleOutcome, AppError> {
            let delay = (request.query_date.year() - 1900).max(0) as u64;
            thread::sleep(Duration::from_millis(delay));
            Ok(ArticleOutcome::NoResults {
                more_url: None,
                upstream_error: None,
            })
        }
    }

    fn request(year: i32) -> ArticleRequest {
        ArticleRequest {
            label: "s".to_string(),
            query_date: QueryDate::Year(year),
            api_query: String::new(),
        }
    }

    fn wait_for<F: FetchArticles>(fetcher: &mut ArticleFetcher<F>) -> Option<FetchResponse> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(resp) = fetcher.poll() {
                return Some(resp);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn latest_request_wins_over_slower_earlier_one() {
        let mut fetcher = ArticleFetcher::new(SlowClient);
        let first = fetcher.request(request(2200));
        let second = fetcher.request(request(1900));
        assert!(second > first);

        let resp = wait_for(&mut fetcher).unwrap();
        assert_eq!(resp.token, second);
        assert_eq!(resp.request.query_date, QueryDate::Year(1900));

        // The slow first response arrives later and is discarded.
        thread::sleep(Duration::from_millis(400));
        assert!(fetcher.poll().is_none());
    }

    #[test]
    fn stale_response_is_dropped_even_when_it_finishes_last() {
        let mut fetcher = ArticleFetcher::new(SlowClient);
        fetcher.request(request(1900));
        thread::sleep(Duration::from_millis(50));
        let newest = fetcher.request(request(1950));

        let resp = wait_for(&mut fetcher).unwrap();
        assert_eq!(resp.token, newest);
        assert_eq!(fetcher.latest(), newest);
    }
}
