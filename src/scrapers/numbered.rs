//! Contributor archives with numbered path pages.
//!
//! Used for Grantland and The Undefeated, which share a layout:
//! `{origin}/contributors/{slug}/page/{n}/` from 1, stopping at the first
//! page that yields no article links.

use super::{Page, PageRequest, SiteAdapter, css, join_path, select_hrefs};
use crate::error::{GrabError, Result};
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static ARTICLE_LINK: Lazy<Selector> =
    Lazy::new(|| css("article h2 a[href], article h3 a[href]"));

#[derive(Debug)]
pub struct NumberedPathAdapter {
    name: &'static str,
}

impl NumberedPathAdapter {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn page(listing: &Url, index: u32) -> PageRequest {
        PageRequest::new(
            listing.clone(),
            join_path(listing, &format!("page/{index}/")),
            index,
        )
    }
}

impl SiteAdapter for NumberedPathAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        let mut origin = author.page_url.clone();
        origin.set_path("/");
        let segment = author
            .page_url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| {
                GrabError::invalid_author_url(author.page_url.as_str(), "no contributor slug")
            })?;
        let listing = join_path(&origin, &format!("contributors/{segment}"));
        Ok(Self::page(&listing, 1))
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let document = Html::parse_document(body);
        let links = select_hrefs(&document, &ARTICLE_LINK, &request.url);
        if links.is_empty() {
            return Ok(Page::last(links));
        }
        Ok(Page {
            links,
            next: Some(Self::page(&request.listing, request.index + 1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{author, fetcher};
    use super::super::collect_links;
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_html(slugs: &[&str]) -> String {
        let articles: String = slugs
            .iter()
            .map(|s| format!(r#"<article><h2><a href="/features/{s}/">{s}</a></h2></article>"#))
            .collect();
        format!("<html><body>{articles}</body></html>")
    }

    #[test]
    fn test_fixed_contributor_path() {
        let author = author(
            "http://grantland.com/contributors/bill-simmons/",
            "bill-simmons",
            &["bill", "simmons"],
            None,
        );
        let request = NumberedPathAdapter::new("grantland").first_page(&author).unwrap();
        assert_eq!(
            request.url.as_str(),
            "http://grantland.com/contributors/bill-simmons/page/1/"
        );
    }

    #[test]
    fn test_zero_links_terminates() {
        let author = author("http://grantland.com/contributors/x/", "x", &["x"], None);
        let adapter = NumberedPathAdapter::new("grantland");
        let request = adapter.first_page(&author).unwrap();
        let page = adapter.parse_page(&request, &page_html(&[])).unwrap();
        assert!(page.next.is_none());

        let page = adapter.parse_page(&request, &page_html(&["a"])).unwrap();
        assert_eq!(page.links, vec!["http://grantland.com/features/a/".to_string()]);
        assert_eq!(page.next.map(|n| n.index), Some(2));
    }

    #[tokio::test]
    async fn test_walk_stops_on_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contributors/jane-doe/page/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_html(&["a", "b"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contributors/jane-doe/page/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_html(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let author = author(
            &format!("{}/contributors/jane-doe", server.uri()),
            "jane-doe",
            &["jane", "doe"],
            None,
        );
        let links = collect_links(&NumberedPathAdapter::new("theundefeated"), &fetcher(), &author)
            .await
            .unwrap();
        assert_eq!(links.len(), 2);
    }
}
