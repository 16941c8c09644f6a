//! Source resolution: from an author page URL to a platform and an author.
//!
//! The [`PlatformRegistry`] is an ordered table of domain fragments. A URL's
//! host is matched by substring against each fragment in registration order
//! and the first hit wins. Resolution is a pure parse: no request is made
//! until the selected adapter starts paginating.

use crate::config::GrabberConfig;
use crate::error::{GrabError, Result};
use crate::models::{AuthorIdentity, AuthorRef, AuthorSource};
use crate::scrapers::SiteAdapter;
use crate::scrapers::awl::AwlAdapter;
use crate::scrapers::dnainfo::DnaInfoAdapter;
use crate::scrapers::gothamist::GothamistAdapter;
use crate::scrapers::laweekly::LaWeeklyAdapter;
use crate::scrapers::newsweek::NewsweekAdapter;
use crate::scrapers::numbered::NumberedPathAdapter;
use crate::scrapers::toast::ToastAdapter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, info, instrument};
use url::Url;

static NUMERIC_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").unwrap_or_else(|e| panic!("invalid id pattern: {e}")));

/// Name token standing in for authors known only by a numeric id.
pub const ANONYMOUS_MARKER: &str = "author";

/// How a platform's author slug splits into name tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScheme {
    /// `Jen Chung` -> `[jen, chung]`
    Whitespace,
    /// `jane-doe` -> `[jane, doe]`
    Hyphen,
    /// `Jane-Doe-5059123` -> `[Jane, Doe]`, id `5059123`; case is kept
    HyphenWithTrailingId,
    /// `1234` -> `[author, 1234]`, id `1234`; non-numeric slugs fall back to [`NameScheme::Hyphen`]
    OpaqueId,
}

impl NameScheme {
    /// Derive the author identity from a decoded slug. `None` if no name
    /// tokens can be recovered.
    pub fn identity(self, slug: &str) -> Option<AuthorIdentity> {
        let slug = slug.trim();
        let identity = match self {
            Self::Whitespace => AuthorIdentity {
                names: slug.to_lowercase().split_whitespace().map(str::to_string).collect(),
                author_id: None,
            },
            Self::Hyphen => AuthorIdentity {
                names: hyphen_tokens(slug),
                author_id: None,
            },
            Self::HyphenWithTrailingId => {
                let mut names = split_hyphens(slug);
                let id = names.pop().filter(|id| NUMERIC_ID.is_match(id))?;
                AuthorIdentity {
                    names,
                    author_id: Some(id),
                }
            }
            Self::OpaqueId if NUMERIC_ID.is_match(slug) => AuthorIdentity {
                names: vec![ANONYMOUS_MARKER.to_string(), slug.to_string()],
                author_id: Some(slug.to_string()),
            },
            Self::OpaqueId => return Self::Hyphen.identity(slug),
        };
        (!identity.names.is_empty()).then_some(identity)
    }
}

fn hyphen_tokens(slug: &str) -> Vec<String> {
    split_hyphens(&slug.to_lowercase())
}

fn split_hyphens(slug: &str) -> Vec<String> {
    slug.split('-')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// A supported site.
pub struct Platform {
    /// Registry key; also the output subdirectory name.
    pub key: &'static str,
    /// Human-readable name shown in the unsupported-site message.
    pub label: &'static str,
    /// Substring matched against the URL host.
    pub fragment: &'static str,
    pub name_scheme: NameScheme,
    /// Extra converter mode flag for sites that render differently.
    pub converter_mode: Option<&'static str>,
    pub adapter: Box<dyn SiteAdapter>,
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("key", &self.key)
            .field("fragment", &self.fragment)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

/// Ordered table of supported platforms.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every supported site, in match order.
    pub fn with_defaults(config: &GrabberConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Platform {
            key: "gothamist",
            label: "Gothamist network",
            fragment: "ist.com",
            name_scheme: NameScheme::Whitespace,
            converter_mode: None,
            adapter: Box::new(GothamistAdapter),
        });
        registry.register(Platform {
            key: "dnainfo",
            label: "DNAinfo",
            fragment: "dnainfo.com",
            name_scheme: NameScheme::Hyphen,
            converter_mode: Some("dnainfo"),
            adapter: Box::new(DnaInfoAdapter),
        });
        registry.register(Platform {
            key: "laweekly",
            label: "LA Weekly",
            fragment: "laweekly.com",
            name_scheme: NameScheme::HyphenWithTrailingId,
            converter_mode: Some("laweekly"),
            adapter: Box::new(LaWeeklyAdapter::default()),
        });
        registry.register(Platform {
            key: "thetoast",
            label: "The Toast",
            fragment: "the-toast.net",
            name_scheme: NameScheme::Hyphen,
            converter_mode: Some("thetoast"),
            adapter: Box::new(ToastAdapter),
        });
        registry.register(Platform {
            key: "newsweek",
            label: "Newsweek",
            fragment: "newsweek.com",
            name_scheme: NameScheme::OpaqueId,
            converter_mode: Some("newsweek"),
            adapter: Box::new(NewsweekAdapter::new(config.newsweek_strategy)),
        });
        registry.register(Platform {
            key: "theawl",
            label: "The Awl",
            fragment: "theawl.com",
            name_scheme: NameScheme::Hyphen,
            converter_mode: None,
            adapter: Box::new(AwlAdapter),
        });
        registry.register(Platform {
            key: "grantland",
            label: "Grantland",
            fragment: "grantland.com",
            name_scheme: NameScheme::Hyphen,
            converter_mode: None,
            adapter: Box::new(NumberedPathAdapter::new("grantland")),
        });
        registry.register(Platform {
            key: "theundefeated",
            label: "The Undefeated",
            fragment: "theundefeated.com",
            name_scheme: NameScheme::Hyphen,
            converter_mode: None,
            adapter: Box::new(NumberedPathAdapter::new("theundefeated")),
        });
        registry
    }

    /// Append a platform; it is matched after every earlier registration.
    pub fn register(&mut self, platform: Platform) {
        debug!(key = platform.key, fragment = platform.fragment, "Registering platform");
        self.platforms.push(platform);
    }

    pub fn get(&self, key: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.key == key)
    }

    /// First platform whose fragment occurs in `host`.
    pub fn match_host(&self, host: &str) -> Option<&Platform> {
        let host = host.to_ascii_lowercase();
        self.platforms.iter().find(|p| host.contains(p.fragment))
    }

    /// Labels of every platform, in match order.
    pub fn supported_labels(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.label.to_string()).collect()
    }

    /// Resolve an author page URL to its platform and author identity.
    #[instrument(level = "info", skip(self))]
    pub fn resolve(&self, input: &str) -> Result<AuthorSource> {
        let page_url = Url::parse(input.trim())
            .map_err(|e| GrabError::invalid_author_url(input, e.to_string()))?;
        let host = page_url
            .host_str()
            .ok_or_else(|| GrabError::invalid_author_url(input, "url has no host"))?;

        let platform = self
            .match_host(host)
            .ok_or_else(|| GrabError::UnsupportedPlatform {
                host: host.to_string(),
                supported: self.supported_labels(),
            })?;

        let raw_slug = page_url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| GrabError::invalid_author_url(input, "url has no author segment"))?;
        let slug = urlencoding::decode(raw_slug)
            .map_err(|e| GrabError::invalid_author_url(input, e.to_string()))?
            .into_owned();

        let identity = platform.name_scheme.identity(&slug).ok_or_else(|| {
            GrabError::invalid_author_url(
                input,
                format!("cannot derive an author name from '{slug}' for {}", platform.label),
            )
        })?;

        info!(
            platform = platform.key,
            names = ?identity.names,
            author_id = ?identity.author_id,
            "Resolved author page"
        );
        Ok(AuthorSource::AuthorPage {
            platform: platform.key,
            author: AuthorRef {
                page_url,
                slug,
                identity,
            },
        })
    }
}
