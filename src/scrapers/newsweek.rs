//! Newsweek author pages.
//!
//! Newsweek has served author listings behind two different "load more"
//! schemes, and neither can be detected reliably from the first page, so the
//! scheme is chosen up front through [`LoadMoreStrategy`]:
//!
//! - **Offset**: `{author_url}?page=N` from 0, continuing while the page
//!   still renders a load-more control.
//! - **Token**: fetch the author page, then keep following the href of the
//!   load-more control, which carries an opaque continuation token.

use super::{Page, PageRequest, SiteAdapter, css, first_href, select_hrefs};
use crate::config::LoadMoreStrategy;
use crate::error::Result;
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static HEADLINE_LINK: Lazy<Selector> =
    Lazy::new(|| css("article h2 a[href], article h3 a[href]"));
static LOAD_MORE: Lazy<Selector> = Lazy::new(|| css(".pager-next a, a[rel=next], .load-more"));
static LOAD_MORE_HREF: Lazy<Selector> =
    Lazy::new(|| css(".pager-next a[href], .load-more a[href], a.load-more[href]"));

#[derive(Debug, Default)]
pub struct NewsweekAdapter {
    strategy: LoadMoreStrategy,
}

impl NewsweekAdapter {
    pub fn new(strategy: LoadMoreStrategy) -> Self {
        Self { strategy }
    }

    fn offset_page(listing: &Url, index: u32) -> PageRequest {
        let mut url = listing.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair("page", &index.to_string());
        PageRequest::new(listing.clone(), url, index)
    }
}

impl SiteAdapter for NewsweekAdapter {
    fn name(&self) -> &'static str {
        match self.strategy {
            LoadMoreStrategy::Offset => "newsweek-offset",
            LoadMoreStrategy::Token => "newsweek-token",
        }
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        let listing = author.page_url.clone();
        Ok(match self.strategy {
            LoadMoreStrategy::Offset => Self::offset_page(&listing, 0),
            LoadMoreStrategy::Token => PageRequest::new(listing.clone(), listing, 0),
        })
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let document = Html::parse_document(body);
        let links = select_hrefs(&document, &HEADLINE_LINK, &request.url);
        let next = match self.strategy {
            LoadMoreStrategy::Offset => document
                .select(&LOAD_MORE)
                .next()
                .map(|_| Self::offset_page(&request.listing, request.index + 1)),
            LoadMoreStrategy::Token => {
                first_href(&document, &LOAD_MORE_HREF, &request.url).map(|url| request.follow(url))
            }
        };
        Ok(Page { links, next })
    }
}
