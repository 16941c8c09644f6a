//! LA Weekly author pages.
//!
//! The public author page only renders the first handful of stories; the
//! rest come from an AJAX endpoint keyed by the numeric author id that ends
//! the author slug (`/authors/jane-doe-1234567`):
//!
//! ```text
//! GET {api_base}/authors/authorAjax/{id}?page={n}    n = 1, 2, ...
//! {"data": "<div class=\"headline\"><a href=\"/news/...\">...</a></div>..."}
//! ```
//!
//! Pagination ends on the first response whose `data` is empty, `null` or
//! missing. Headline hrefs are root-relative and resolved against
//! `http://laweekly.com`.

use super::{Page, PageRequest, SiteAdapter, css, join_path, select_hrefs};
use crate::error::{GrabError, Result};
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://www.laweekly.com";
pub const DEFAULT_LINK_BASE: &str = "http://laweekly.com";

static HEADLINE_LINK: Lazy<Selector> = Lazy::new(|| css("div.headline a[href]"));

#[derive(Debug, Deserialize)]
struct AjaxPage {
    #[serde(default)]
    data: Value,
}

#[derive(Debug)]
pub struct LaWeeklyAdapter {
    api_base: Url,
    link_base: Url,
}

impl LaWeeklyAdapter {
    /// Adapter pointed at custom hosts, e.g. an archive mirror.
    pub fn new(api_base: Url, link_base: Url) -> Self {
        Self {
            api_base,
            link_base,
        }
    }

    fn page(listing: &Url, index: u32) -> PageRequest {
        let mut url = listing.clone();
        url.query_pairs_mut()
            .append_pair("page", &index.to_string());
        PageRequest::new(listing.clone(), url, index)
    }
}

impl Default for LaWeeklyAdapter {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).unwrap_or_else(|e| panic!("invalid api base: {e}")),
            link_base: Url::parse(DEFAULT_LINK_BASE).unwrap_or_else(|e| panic!("invalid link base: {e}")),
        }
    }
}

impl SiteAdapter for LaWeeklyAdapter {
    fn name(&self) -> &'static str {
        "laweekly"
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        let id = author.identity.author_id.as_deref().ok_or_else(|| {
            GrabError::invalid_author_url(
                author.page_url.as_str(),
                "LA Weekly author urls must end in a numeric author id",
            )
        })?;
        let listing = join_path(&self.api_base, &format!("authors/authorAjax/{id}"));
        Ok(Self::page(&listing, 1))
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let payload: AjaxPage =
            serde_json::from_str(body).map_err(|e| GrabError::parse(request.url.as_str(), e))?;

        let fragment = match payload.data {
            Value::Null | Value::Bool(false) => return Ok(Page::last(Vec::new())),
            Value::String(html) if html.trim().is_empty() => return Ok(Page::last(Vec::new())),
            Value::Array(items) if items.is_empty() => return Ok(Page::last(Vec::new())),
            Value::String(html) => html,
            other => {
                return Err(GrabError::parse(
                    request.url.as_str(),
                    format!("expected an HTML string in `data`, got {other}"),
                ));
            }
        };

        let document = Html::parse_fragment(&fragment);
        let links = select_hrefs(&document, &HEADLINE_LINK, &self.link_base);
        let listing = &request.listing;
        Ok(Page {
            links,
            next: Some(Self::page(listing, request.index + 1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{author, fetcher};
    use super::super::collect_links;
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload(hrefs: &[&str]) -> String {
        let html: String = hrefs
            .iter()
            .map(|h| format!(r#"<div class="headline"><a href="{h}">story</a></div>"#))
            .collect();
        serde_json::json!({ "data": html }).to_string()
    }

    fn laweekly_author() -> AuthorRef {
        author(
            "http://www.laweekly.com/authors/jane-doe-5059123",
            "jane-doe-5059123",
            &["jane", "doe"],
            Some("5059123"),
        )
    }

    #[test]
    fn test_first_page_targets_ajax_endpoint() {
        let request = LaWeeklyAdapter::default().first_page(&laweekly_author()).unwrap();
        assert_eq!(
            request.url.as_str(),
            "http://www.laweekly.com/authors/authorAjax/5059123?page=1"
        );
    }

    #[test]
    fn test_missing_author_id_is_rejected() {
        let author = author("http://www.laweekly.com/authors/jane", "jane", &["jane"], None);
        let err = LaWeeklyAdapter::default().first_page(&author).unwrap_err();
        assert!(matches!(err, GrabError::InvalidAuthorUrl { .. }));
    }

    #[test]
    fn test_links_prefixed_with_site_root() {
        let adapter = LaWeeklyAdapter::default();
        let request = adapter.first_page(&laweekly_author()).unwrap();
        let page = adapter
            .parse_page(&request, &payload(&["/news/a-story-8675309"]))
            .unwrap();
        assert_eq!(page.links, vec!["http://laweekly.com/news/a-story-8675309".to_string()]);
        let next = page.next.unwrap();
        assert_eq!(
            next.url.as_str(),
            "http://www.laweekly.com/authors/authorAjax/5059123?page=2"
        );
    }

    #[test]
    fn test_empty_data_terminates() {
        let adapter = LaWeeklyAdapter::default();
        let request = adapter.first_page(&laweekly_author()).unwrap();
        for body in [r#"{"data": ""}"#, r#"{"data": null}"#, r#"{"data": false}"#, "{}"] {
            let page = adapter.parse_page(&request, body).unwrap();
            assert!(page.links.is_empty(), "{body}");
            assert!(page.next.is_none(), "{body}");
        }
    }

    #[test]
    fn test_non_json_is_parse_error() {
        let adapter = LaWeeklyAdapter::default();
        let request = adapter.first_page(&laweekly_author()).unwrap();
        let err = adapter.parse_page(&request, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, GrabError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_walks_until_empty_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/authorAjax/5059123"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(payload(&["/news/a", "/news/b"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/authors/authorAjax/5059123"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(payload(&["/news/c"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/authors/authorAjax/5059123"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": ""}"#))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = LaWeeklyAdapter::new(
            Url::parse(&server.uri()).unwrap(),
            Url::parse(DEFAULT_LINK_BASE).unwrap(),
        );
        let links = collect_links(&adapter, &fetcher(), &laweekly_author())
            .await
            .unwrap();
        assert_eq!(
            links.iter().collect::<Vec<_>>(),
            vec![
                "http://laweekly.com/news/a",
                "http://laweekly.com/news/b",
                "http://laweekly.com/news/c"
            ]
        );
    }
}
