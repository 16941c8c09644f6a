//! The Toast author archives.
//!
//! Archive pages at `{author_url}/page/{n}/` list each post as an `<article>`
//! with the permalink on its heading. Pagination keeps going until the site
//! answers with an empty body.

use super::{Page, PageRequest, SiteAdapter, css, join_path, select_hrefs};
use crate::error::Result;
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static HEADING_LINK: Lazy<Selector> =
    Lazy::new(|| css("article h1 a[href], article h2 a[href]"));

#[derive(Debug, Default)]
pub struct ToastAdapter;

impl ToastAdapter {
    fn page(listing: &Url, index: u32) -> PageRequest {
        PageRequest::new(
            listing.clone(),
            join_path(listing, &format!("page/{index}/")),
            index,
        )
    }
}

impl SiteAdapter for ToastAdapter {
    fn name(&self) -> &'static str {
        "thetoast"
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        Ok(Self::page(&author.page_url, 1))
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        if body.trim().is_empty() {
            return Ok(Page::last(Vec::new()));
        }
        let document = Html::parse_document(body);
        let links = select_hrefs(&document, &HEADING_LINK, &request.url);
        Ok(Page {
            links,
            next: Some(Self::page(&request.listing, request.index + 1)),
        })
    }
}
