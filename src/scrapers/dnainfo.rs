//! DNAinfo author pages.
//!
//! Listings live at `{author_url}/page/{n}` from 1, eight headlines per page.
//! Headline anchors carry protocol-relative hrefs (`//www.dnainfo.com/...`),
//! resolved here to https. The site refuses requests that do not look like
//! they come from a browser, hence [`DnaInfoAdapter::request_headers`].

use super::{Page, PageRequest, SiteAdapter, css, join_path, select_hrefs};
use crate::error::Result;
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use url::Url;

/// Headlines per full listing page.
pub const PAGE_SIZE: usize = 8;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:56.0) Gecko/20100101 Firefox/56.0";

static HEADLINE: Lazy<Selector> = Lazy::new(|| css("a.headline[href]"));

#[derive(Debug, Default)]
pub struct DnaInfoAdapter;

impl DnaInfoAdapter {
    fn page(listing: &Url, index: u32) -> PageRequest {
        PageRequest::new(
            listing.clone(),
            join_path(listing, &format!("page/{index}")),
            index,
        )
    }
}

impl SiteAdapter for DnaInfoAdapter {
    fn name(&self) -> &'static str {
        "dnainfo"
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        Ok(Self::page(&author.page_url, 1))
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let document = Html::parse_document(body);
        let mut base = request.url.clone();
        // protocol-relative hrefs are served over https regardless of the listing scheme
        let _ = base.set_scheme("https");
        let links = select_hrefs(&document, &HEADLINE, &base);
        let matched = document.select(&HEADLINE).count();
        let next = (matched == PAGE_SIZE).then(|| Self::page(&request.listing, request.index + 1));
        Ok(Page { links, next })
    }
}
