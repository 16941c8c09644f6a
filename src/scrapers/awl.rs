//! The Awl author archives.
//!
//! Each archive page lists posts newest-last, so links are taken in reverse
//! document order per page. Pages are chained through the "next" navigation
//! link; the walk ends on a page without one.

use super::{Page, PageRequest, SiteAdapter, css, first_href, select_hrefs};
use crate::error::Result;
use crate::models::AuthorRef;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ENTRY_LINK: Lazy<Selector> = Lazy::new(|| css("h2.entry-title a[href]"));
static NEXT_LINK: Lazy<Selector> =
    Lazy::new(|| css("a[rel=next][href], .nav-previous a[href], a.next[href]"));

#[derive(Debug, Default)]
pub struct AwlAdapter;

impl SiteAdapter for AwlAdapter {
    fn name(&self) -> &'static str {
        "theawl"
    }

    fn first_page(&self, author: &AuthorRef) -> Result<PageRequest> {
        Ok(PageRequest::new(
            author.page_url.clone(),
            author.page_url.clone(),
            1,
        ))
    }

    fn parse_page(&self, request: &PageRequest, body: &str) -> Result<Page> {
        let document = Html::parse_document(body);
        let mut links = select_hrefs(&document, &ENTRY_LINK, &request.url);
        links.reverse();
        let next = first_href(&document, &NEXT_LINK, &request.url).map(|url| request.follow(url));
        Ok(Page { links, next })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{author, fetcher};
    use super::super::collect_links;
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn archive(slugs: &[&str], next: Option<&str>) -> String {
        let entries: String = slugs
            .iter()
            .map(|s| format!(r#"<h2 class="entry-title"><a href="/{s}/">{s}</a></h2>"#))
            .collect();
        let nav = next
            .map(|href| format!(r#"<nav><a class="next" href="{href}">Older</a></nav>"#))
            .unwrap_or_default();
        format!("<html><body>{entries}{nav}</body></html>")
    }

    fn request() -> PageRequest {
        let author = author("https://www.theawl.com/author/jsmith/", "jsmith", &["jsmith"], None);
        AwlAdapter.first_page(&author).unwrap()
    }

    #[test]
    fn test_links_reversed_per_page() {
        let page = AwlAdapter
            .parse_page(&request(), &archive(&["one", "two", "three"], None))
            .unwrap();
        assert_eq!(
            page.links,
            vec![
                "https://www.theawl.com/three/".to_string(),
                "https://www.theawl.com/two/".to_string(),
                "https://www.theawl.com/one/".to_string(),
            ]
        );
        assert!(page.next.is_none());
    }

    #[test]
    fn test_next_href_becomes_target() {
        let page = AwlAdapter
            .parse_page(&request(), &archive(&["one"], Some("/author/jsmith/page/2/")))
            .unwrap();
        let next = page.next.unwrap();
        assert_eq!(next.url.as_str(), "https://www.theawl.com/author/jsmith/page/2/");
        assert_eq!(next.index, 2);
    }

    #[tokio::test]
    async fn test_chain_walk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/author/js/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(archive(&["a", "b"], Some("/author/js/page/2/"))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/author/js/page/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(archive(&["c"], None)))
            .expect(1)
            .mount(&server)
            .await;

        let author = author(&format!("{}/author/js/", server.uri()), "js", &["js"], None);
        let links = collect_links(&AwlAdapter, &fetcher(), &author)
            .await
            .unwrap();
        let base = server.uri();
        assert_eq!(
            links.iter().collect::<Vec<_>>(),
            vec![format!("{base}/b/"), format!("{base}/a/"), format!("{base}/c/")]
        );
    }
}
