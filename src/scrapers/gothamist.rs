//! Gothamist network author pages (gothamist.com, dcist.com, laist.com, ...).
//!
//! Listings live at `{author_url}/{n}` starting at 1 and link each article
//! with `rel="bookmark"`. A page is assumed to be followed by another when it
//! holds exactly [`PAGE_SIZE`] bookmark anchors, counted before unusable
//! hrefs are dropped. An author whose article count is an
//! exact multiple of the page size costs one extra (empty) fetch.

use super::{Page, PageRequest, SiteAdapter, css, join_path, select_hrefs};
use crate::error::Result;
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Links per full listing page.
pub const PAGE_SIZE: usize = 1000;

static BOOKMARK: Lazy<Selector> = Lazy::new(|| css("a[rel=bookmark][href]"));

#[derive(Debug, Default)]
pub struct GothamistAdapter;

impl GothamistAdapter {
    fn page(listing: &url::Url, index: u32) -> PageRequest {
        PageRequest::new(
            listing.clone(),
            join_path(listing, &index.to_string()),
            index,
        )
    }
}

impl SiteAdapter for GothamistAdapter {
    fn name(&self) -> &'static str {
        "gothamist"
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        Ok(Self::page(&author.page_url, 1))
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let document = Html::parse_document(body);
        let links = select_hrefs(&document, &BOOKMARK, &request.url);
        let matched = document.select(&BOOKMARK).count();
        let next = (matched == PAGE_SIZE).then(|| Self::page(&request.listing, request.index + 1));
        Ok(Page { links, next })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{anchors, author, fetcher};
    use super::super::collect_links;
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bookmarks(count: usize) -> String {
        anchors(
            |i| format!(r#"<h2><a rel="bookmark" href="http://gothamist.com/2017/01/{i}/story.php">s</a></h2>"#),
            count,
        )
    }

    fn request() -> PageRequest {
        let author = author("http://gothamist.com/author/Jen%20Chung", "Jen Chung", &["jen", "chung"], None);
        GothamistAdapter.first_page(&author).unwrap()
    }

    #[test]
    fn test_first_page_is_index_one() {
        let request = request();
        assert_eq!(request.index, 1);
        assert_eq!(request.url.as_str(), "http://gothamist.com/author/Jen%20Chung/1");
    }

    #[test]
    fn test_full_page_triggers_next() {
        let page = GothamistAdapter.parse_page(&request(), &bookmarks(PAGE_SIZE)).unwrap();
        assert_eq!(page.links.len(), PAGE_SIZE);
        let next = page.next.unwrap();
        assert_eq!(next.index, 2);
        assert_eq!(next.url.as_str(), "http://gothamist.com/author/Jen%20Chung/2");
    }

    #[test]
    fn test_short_page_terminates() {
        let page = GothamistAdapter
            .parse_page(&request(), &bookmarks(PAGE_SIZE - 1))
            .unwrap();
        assert_eq!(page.links.len(), PAGE_SIZE - 1);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_full_page_with_unusable_href_still_continues() {
        let html = anchors(
            |i| match i {
                0 => r#"<a rel="bookmark" href="mailto:tips@gothamist.com">tips</a>"#.to_string(),
                _ => format!(r#"<a rel="bookmark" href="/2017/01/{i}/story.php">s</a>"#),
            },
            PAGE_SIZE,
        );
        let page = GothamistAdapter.parse_page(&request(), &html).unwrap();
        assert_eq!(page.links.len(), PAGE_SIZE - 1);
        assert_eq!(page.next.map(|n| n.index), Some(2));
    }

    #[test]
    fn test_ignores_anchors_without_bookmark_rel() {
        let html = r#"<a href="/about">About</a><a rel="bookmark" href="/2016/05/05/x.php">x</a>"#;
        let page = GothamistAdapter.parse_page(&request(), html).unwrap();
        assert_eq!(page.links, vec!["http://gothamist.com/2016/05/05/x.php".to_string()]);
    }

    #[tokio::test]
    async fn test_full_page_costs_exactly_one_more_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/author/jchung/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(bookmarks(PAGE_SIZE)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/author/jchung/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(bookmarks(3)))
            .expect(1)
            .mount(&server)
            .await;

        let author = author(
            &format!("{}/author/jchung", server.uri()),
            "jchung",
            &["jen", "chung"],
            None,
        );
        let links = collect_links(&GothamistAdapter, &fetcher(), &author)
            .await
            .unwrap();
        assert_eq!(links.len(), PAGE_SIZE + 3);
    }
}
