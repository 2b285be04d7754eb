use std::sync::LazyLock;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::profile::{non_empty, RawFieldBundle};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static LOGO_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"header .logo, .navbar .logo, [class*="logo"]"#));
static META_DESC_SEL: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"meta[name="description"], meta[property="og:description"]"#)
});
static TAGLINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector("header p, .tagline, .subtitle"));
static MISSION_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="mission"], [id*="mission"]"#));
static VISION_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="vision"], [id*="vision"]"#));
static VALUES_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="value"], [id*="value"]"#));
static ABOUT_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="about"], [id*="about"]"#));
static HERO_SEL: LazyLock<Selector> =
    LazyLock::new(|| selector(".hero p, section:first-of-type p"));

/// Fetches a page and pulls the raw field bundle out of its DOM.
pub struct Harvester {
    client: Client,
    backoff_base: Duration,
}

impl Harvester {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            backoff_base: Duration::from_millis(BASE_BACKOFF_MS),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Fetch `url` and harvest it. Errors carry the underlying cause.
    pub async fn harvest(&self, url: &str) -> Result<RawFieldBundle> {
        let start = Instant::now();
        let html = self
            .fetch_with_retry(url)
            .await
            .with_context(|| format!("failed to extract content from {}", url))?;
        let bundle = harvest_html(&html);
        info!(
            "Harvested {} ({} bytes) in {}ms",
            url,
            html.len(),
            start.elapsed().as_millis()
        );
        Ok(bundle)
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        for attempt in 0..MAX_RETRIES {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if !should_retry(status) {
                return read_body(response).await;
            }

            let backoff = self.backoff_base * 2u32.pow(attempt);
            warn!(
                "HTTP {} on {} (attempt {}/{}), backing off {:.1}s",
                status.as_u16(),
                url,
                attempt + 1,
                MAX_RETRIES,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
        }

        let response = self.client.get(url).send().await?;
        read_body(response).await
    }
}

fn should_retry(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP error {}", status);
    }
    Ok(response.text().await?)
}

/// Raw field bundle from an HTML document.
///
/// Each field is the trimmed text of the first element matching its
/// selector list (the description comes from a meta `content` attribute).
pub fn harvest_html(html: &str) -> RawFieldBundle {
    let doc = Html::parse_document(html);

    let title = first_text(&doc, &TITLE_SEL).map(|t| collapse_whitespace(&t));
    let description = doc
        .select(&META_DESC_SEL)
        .next()
        .and_then(|el| el.value().attr("content"))
        .and_then(non_empty);

    let bundle = RawFieldBundle {
        title: title.as_deref().and_then(non_empty),
        h1_text: first_text(&doc, &H1_SEL),
        logo_text: first_text(&doc, &LOGO_SEL),
        description,
        tagline: first_text(&doc, &TAGLINE_SEL),
        mission: first_text(&doc, &MISSION_SEL),
        vision: first_text(&doc, &VISION_SEL),
        values: first_text(&doc, &VALUES_SEL),
        about: first_text(&doc, &ABOUT_SEL),
        hero_paragraph: first_text(&doc, &HERO_SEL),
    };
    debug!("Raw bundle: {:?}", bundle);
    bundle
}

/// Only the first match counts, even if its text is empty.
fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    let el = doc.select(sel).next()?;
    non_empty(&el.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Local HTTP server answering `/` with the given statuses in order, then 200.
#[cfg(test)]
pub(crate) async fn serve_statuses(
    statuses: Vec<u16>,
) -> (String, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let statuses = Arc::new(statuses);
    let app = axum::Router::new().route(
        "/",
        axum::routing::get(move || {
            let counter = counter.clone();
            let statuses = statuses.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let code = statuses.get(n).copied().unwrap_or(200);
                (
                    StatusCode::from_u16(code).unwrap(),
                    "<html><head><title>Delta Labs</title></head><body></body></html>",
                )
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{}/", addr), hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn quick() -> Harvester {
        Harvester::new(Duration::from_secs(5))
            .unwrap()
            .with_backoff_base(Duration::from_millis(1))
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn acme_fixture() {
        let b = harvest_html(&fixture("acme"));
        assert_eq!(b.title.as_deref(), Some("Acme Corp - Solutions | Home"));
        assert_eq!(b.logo_text.as_deref(), Some("Acme Corp - Solutions"));
        assert_eq!(b.h1_text.as_deref(), Some("Tools that last"));
        assert_eq!(
            b.description.as_deref(),
            Some("Acme builds durable tools for small workshops.")
        );
        assert_eq!(b.tagline.as_deref(), Some("Built to outlast you."));
        assert!(b.mission.as_deref().unwrap().starts_with("Our mission"));
        assert!(b.vision.as_deref().unwrap().starts_with("We picture"));
        assert_eq!(b.values.as_deref(), Some("Craft, honesty, repairability"));
        assert!(b.about.as_deref().unwrap().contains("Unlike disposable brands"));
        assert_eq!(
            b.hero_paragraph.as_deref(),
            Some("Hand-finished hardware, guaranteed for thirty years.")
        );
    }

    #[test]
    fn acme_fixture_profile() {
        let p = crate::parser::extract(&harvest_html(&fixture("acme")));
        assert_eq!(p.brand_name.as_deref(), Some("Acme Corp"));
        assert!(p.mission.as_deref().unwrap().starts_with("Our mission"));
        assert_eq!(
            p.unique_value.as_deref(),
            Some("Unlike disposable brands, every Acme tool can be repaired")
        );
        assert_eq!(
            p.target_audience.as_deref(),
            Some("We help small businesses and people who fix things")
        );
        assert_eq!(
            p.problem_solving.as_deref(),
            Some("We started in 2001 to solve the problem of tools that break after a year")
        );
    }

    #[test]
    fn bare_fixture() {
        let b = harvest_html(&fixture("bare"));
        assert_eq!(b.title.as_deref(), Some("Beta Inc."));
        assert_eq!(b.h1_text, None);
        assert_eq!(b.logo_text, None);
        assert_eq!(b.description, None);
        assert_eq!(b.about, None);
        let p = crate::parser::extract(&b);
        assert_eq!(p.brand_name.as_deref(), Some("Beta"));
        assert_eq!(p.mission, None);
    }

    #[test]
    fn og_description_used_when_name_missing() {
        let html = r#"<html><head><meta property="og:description" content="  From OG  "></head><body></body></html>"#;
        assert_eq!(harvest_html(html).description.as_deref(), Some("From OG"));
    }

    #[test]
    fn whitespace_only_element_is_absent() {
        let html = r#"<html><body><h1>   </h1><h1>Second</h1></body></html>"#;
        assert_eq!(harvest_html(html).h1_text, None);
    }

    #[test]
    fn title_whitespace_collapsed() {
        let html = "<html><head><title>\n  Gamma\n   Labs  </title></head></html>";
        assert_eq!(harvest_html(html).title.as_deref(), Some("Gamma Labs"));
    }

    #[test]
    fn retry_statuses() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
        assert!(!should_retry(StatusCode::NOT_FOUND));
        assert!(!should_retry(StatusCode::OK));
    }

    #[tokio::test]
    async fn not_found_fails_without_retry() {
        let (url, hits) = serve_statuses(vec![404]).await;
        let err = quick().harvest(&url).await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("HTTP error 404"), "{}", msg);
        assert!(msg.starts_with("failed to extract content from"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let (url, hits) = serve_statuses(vec![429, 429]).await;
        let bundle = quick().harvest(&url).await.unwrap();
        assert_eq!(bundle.title.as_deref(), Some("Delta Labs"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_server_error_gives_up() {
        let (url, hits) = serve_statuses(vec![503; 10]).await;
        let err = quick().harvest(&url).await.unwrap_err();
        assert!(format!("{:#}", err).contains("HTTP error 503"));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize + 1);
    }
}
