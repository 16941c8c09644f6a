//! Site adapters: per-platform strategies for turning an author page into a
//! complete, ordered list of article links.
//!
//! Every adapter implements [`SiteAdapter`], which splits a platform's
//! pagination into two pure steps:
//!
//! 1. [`SiteAdapter::first_page`]: build the first listing request for an author
//! 2. [`SiteAdapter::parse_page`]: extract a page's links and decide whether,
//!    and where, another page exists
//!
//! The [`Paginator`] drives those steps one page at a time over HTTP. It never
//! recurses, so very prolific authors do not grow the stack, and any page's
//! `next` request can seed a new walk to resume from that page.
//!
//! # Supported Sources
//!
//! | Source | Module | Continuation |
//! |--------|--------|--------------|
//! | Gothamist network | [`gothamist`] | page-size heuristic (1000) |
//! | DNAinfo | [`dnainfo`] | page-size heuristic (8) |
//! | LA Weekly | [`laweekly`] | empty `data` payload |
//! | The Toast | [`toast`] | empty response body |
//! | Newsweek | [`newsweek`] | load-more control (offset or token) |
//! | The Awl | [`awl`] | "next" link chain |
//! | Grantland, The Undefeated | [`numbered`] | page with zero links |

use crate::config::GrabberConfig;
use crate::error::{GrabError, Result};
use crate::models::{AuthorRef, LinkList};
use crate::utils::absolutize;
use futures::TryStreamExt;
use futures::stream::{self, Stream};
use reqwest::Client;
use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fmt;
use std::pin::pin;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub mod awl;
pub mod dnainfo;
pub mod gothamist;
pub mod laweekly;
pub mod newsweek;
pub mod numbered;
pub mod toast;

/// One listing page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Base listing URL that page URLs are derived from.
    pub listing: Url,
    /// URL actually fetched for this page.
    pub url: Url,
    /// Page index; origin (0 or 1) is platform-specific.
    pub index: u32,
}

impl PageRequest {
    pub fn new(listing: Url, url: Url, index: u32) -> Self {
        Self {
            listing,
            url,
            index,
        }
    }

    /// The request for a page reached through a link rather than an index.
    pub fn follow(&self, url: Url) -> Self {
        Self {
            listing: self.listing.clone(),
            url,
            index: self.index + 1,
        }
    }
}

/// Links extracted from one listing page plus the continuation, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub links: Vec<String>,
    pub next: Option<PageRequest>,
}

impl Page {
    /// A page that ends pagination.
    pub fn last(links: Vec<String>) -> Self {
        Self { links, next: None }
    }
}

/// A platform-specific pagination and extraction strategy.
pub trait SiteAdapter: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Build the first listing request for `author`.
    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest>;

    /// Extra headers the platform requires on listing requests.
    fn request_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    /// Extract the page's links and its continuation.
    ///
    /// Returned links must be absolute http(s) URLs.
    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page>;
}

/// HTTP client for listing pages.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher with the configured user agent and timeout.
    pub fn new(config: &GrabberConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.fetch_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GrabError::fetch("<client>", e))?;
        Ok(Self { client })
    }

    /// Fetch a listing page's body. Non-2xx statuses are errors.
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    pub async fn fetch(&self, request: &PageRequest, headers: HeaderMap) -> Result<String> {
        let response = self
            .client
            .get(request.url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| GrabError::fetch(request.url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GrabError::fetch(request.url.as_str(), format!("HTTP {status}")));
        }
        let body = response
            .text()
            .await
            .map_err(|e| GrabError::fetch(request.url.as_str(), e))?;
        debug!(bytes = body.len(), %status, "Fetched listing page");
        Ok(body)
    }
}

/// Lazy, resumable walk over an author's listing pages.
pub struct Paginator<'a> {
    adapter: &'a dyn SiteAdapter,
    fetcher: &'a PageFetcher,
    cursor: Option<PageRequest>,
    visited: HashSet<Url>,
}

impl<'a> Paginator<'a> {
    /// Start (or resume) a walk at `start`.
    pub fn new(adapter: &'a dyn SiteAdapter, fetcher: &'a PageFetcher, start: PageRequest) -> Self {
        Self {
            adapter,
            fetcher,
            cursor: Some(start),
            visited: HashSet::new(),
        }
    }

    /// Fetch and parse the next page.
    ///
    /// Returns `None` once the adapter reports no continuation. On error the
    /// cursor stays on the failed page, so calling again retries it.
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        let request = self.cursor.clone()?;
        let result = self.fetch_and_parse(&request).await;
        match &result {
            Ok(page) => {
                self.visited.insert(request.url.clone());
                self.cursor = match &page.next {
                    Some(next) if self.visited.contains(&next.url) => {
                        warn!(
                            adapter = self.adapter.name(),
                            url = %next.url,
                            "Next page already visited; stopping"
                        );
                        None
                    }
                    next => next.clone(),
                };
            }
            Err(e) => {
                warn!(adapter = self.adapter.name(), url = %request.url, error = %e, "Listing page failed");
            }
        }
        Some(result)
    }

    async fn fetch_and_parse(&self, request: &PageRequest) -> Result<Page> {
        let body = self
            .fetcher
            .fetch(request, self.adapter.request_headers())
            .await?;
        self.adapter.parse_page(request, &body)
    }

    /// Turn the walk into a stream that ends after the last page or the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> + 'a {
        stream::try_unfold(self, |mut paginator| async move {
            match paginator.next_page().await {
                Some(Ok(page)) => Ok(Some((page, paginator))),
                Some(Err(e)) => Err(e),
                None => Ok(None),
            }
        })
    }
}

/// Collect every link an author has on `adapter`'s platform.
///
/// Pages are walked in order through a [`Paginator`] and their links
/// concatenated as they arrive.
///
/// # Arguments
///
/// * `adapter` - The platform's pagination strategy
/// * `fetcher` - HTTP client for listing pages
/// * `author` - The resolved author page
///
/// # Returns
///
/// Every link across all pages, in page order.
///
/// # Errors
///
/// Any page failure ([`GrabError::Fetch`] or [`GrabError::Parse`]) aborts
/// the whole collection; no partial list is returned.
#[instrument(level = "info", skip_all, fields(adapter = adapter.name(), author = %author.page_url))]
pub async fn collect_links(
    adapter: &dyn SiteAdapter,
    fetcher: &PageFetcher,
    author: &AuthorRef,
) -> Result<LinkList> {
    let start = adapter.first_page(author)?;
    let mut pages = pin!(Paginator::new(adapter, fetcher, start).into_stream());
    let mut links = LinkList::new();

    while let Some(page) = pages.try_next().await? {
        info!(
            added = page.links.len(),
            total = links.len() + page.links.len(),
            "Adding {} links to be scraped",
            page.links.len()
        );
        links.extend(page.links);
    }

    info!(count = links.len(), "Collected author links");
    Ok(links)
}

/// `base` with `suffix` appended as further path segments; query and
/// fragment are dropped.
pub(crate) fn join_path(base: &Url, suffix: &str) -> Url {
    let mut url = base.clone();
    let path = format!("{}/{}", base.path().trim_end_matches('/'), suffix);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Absolute hrefs of every element matched by `selector`, in document order.
pub(crate) fn select_hrefs(document: &Html, selector: &Selector, base: &Url) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| href_of(element, base))
        .collect()
}

/// Absolute href of the first element matched by `selector`.
pub(crate) fn first_href(document: &Html, selector: &Selector, base: &Url) -> Option<Url> {
    document
        .select(selector)
        .find_map(|element| href_of(element, base))
        .and_then(|href| Url::parse(&href).ok())
}

fn href_of(element: ElementRef<'_>, base: &Url) -> Option<String> {
    element
        .value()
        .attr("href")
        .and_then(|href| absolutize(base, href))
}

/// Parse a selector known at compile time.
pub(crate) fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e}"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::AuthorIdentity;

    pub fn author(page_url: &str, slug: &str, names: &[&str], id: Option<&str>) -> AuthorRef {
        AuthorRef {
            page_url: Url::parse(page_url).unwrap(),
            slug: slug.to_string(),
            identity: AuthorIdentity {
                names: names.iter().map(|n| n.to_string()).collect(),
                author_id: id.map(str::to_string),
            },
        }
    }

    pub fn fetcher() -> PageFetcher {
        PageFetcher::new(&GrabberConfig::default()).unwrap()
    }

    pub fn anchors(selector_html: impl Fn(usize) -> String, count: usize) -> String {
        let body: String = (0..count).map(selector_html).collect();
        format!("<html><body>{body}</body></html>")
    }
}
