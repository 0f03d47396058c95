//! Career mentor chat.
//!
//! Short greetings get a canned reply. Everything else goes to a [`ChatResponder`]; the
//! bundled one scrapes DuckDuckGo's HTML results page. The chat never fails outward: any
//! responder error becomes a friendly fallback reply.

use crate::config::ChatConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, warn};

pub const GREETING_REPLY: &str = "Hello! I am your AI Career Mentor. I can help you with roadmaps, skills, and career doubts. specific questions work best!";
pub const OFFLINE_REPLY: &str =
    "I'm having trouble connecting to the internet right now. Please try again later.";
pub const MISSING_MESSAGE_REPLY: &str = "Please provide a message.";

const REDIRECT_PREFIX: &str = "//duckduckgo.com/l/?uddg=";

#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn query(&self, message: &str) -> Result<String>;
}

/// Greetings of at most two words, matched on the lowercased message prefix
pub fn is_greeting(message: &str) -> bool {
    let lower = message.to_lowercase();
    let opener = ["hi", "hello", "hey", "greetings"]
        .iter()
        .any(|g| lower.starts_with(g));
    opener && lower.split(' ').count() < 3
}

/// Reply to one chat message. Never errors.
pub async fn reply_to(responder: &dyn ChatResponder, message: &str) -> String {
    if is_greeting(message) {
        return GREETING_REPLY.to_string();
    }
    match responder.query(message).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Chat search failed: {:#}", e);
            OFFLINE_REPLY.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Web search over a results page fetched with reqwest and scraped with regexes
pub struct WebSearchResponder {
    client: reqwest::Client,
    search_url: String,
    max_results: usize,
    result_re: Regex,
    tag_re: Regex,
}

impl WebSearchResponder {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build search client")?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            max_results: config.max_results,
            result_re: Regex::new(
                r#"(?s)<div class="result__body">.*?<a class="result__a" href="([^"]+)">(.*?)</a>.*?<a class="result__snippet" href="[^"]+">(.*?)</a>"#,
            )?,
            tag_re: Regex::new(r"<[^>]+>")?,
        })
    }

    pub fn search_url_for(&self, message: &str) -> Result<Url> {
        Url::parse_with_params(&self.search_url, &[("q", message)])
            .with_context(|| format!("Invalid search url {}", self.search_url))
    }

    pub fn parse_results(&self, html: &str) -> Vec<SearchHit> {
        self.result_re
            .captures_iter(html)
            .take(self.max_results)
            .map(|caps| SearchHit {
                link: decode_redirect(&caps[1]),
                title: self.tag_re.replace_all(&caps[2], "").trim().to_string(),
                snippet: self.tag_re.replace_all(&caps[3], "").trim().to_string(),
            })
            .collect()
    }
}

/// Unwrap DuckDuckGo's `//duckduckgo.com/l/?uddg=<target>` redirect links
fn decode_redirect(link: &str) -> String {
    if !link.starts_with(REDIRECT_PREFIX) {
        return link.to_string();
    }
    Url::parse(&format!("https:{}", link))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| link.to_string())
}

pub fn format_hits(message: &str, hits: &[SearchHit]) -> String {
    let mut reply = format!("Here is what I found for \"{}\":\n", message);
    for hit in hits {
        reply.push_str(&format!(
            "\n**{}**\n{}\n[Read more]({})\n",
            hit.title, hit.snippet, hit.link
        ));
    }
    reply
}

#[async_trait]
impl ChatResponder for WebSearchResponder {
    async fn query(&self, message: &str) -> Result<String> {
        let url = self.search_url_for(message)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to reach search")?;

        if !response.status().is_success() {
            anyhow::bail!("Search failed with status {}", response.status());
        }
        let html = response.text().await.context("Failed to read search page")?;

        let hits = self.parse_results(&html);
        if hits.is_empty() {
            debug!("No search results parsed (html length {})", html.len());
            return Ok(format!(
                "I found some information on DuckDuckGo but couldn't parse the specific details. You can check the results here: [Search Results]({})",
                url
            ));
        }
        Ok(format_hits(message, &hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ChatResponder for Counting {
        async fn query(&self, message: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("offline");
            }
            Ok(format!("echo {}", message))
        }
    }

    fn counting(fail: bool) -> Counting {
        Counting {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    const PAGE: &str = r#"
<div class="result results_links">
  <div class="result__body">
    <h2 class="result__title">
      <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fdata%3Fa%3D1&amp;rut=abc">How to become a <b>Data Scientist</b></a>
    </h2>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Learn <b>statistics</b> and Python.</a>
  </div>
</div>
<div class="result results_links">
  <div class="result__body">
    <a class="result__a" href="https://direct.example.org/">Second</a>
    <a class="result__snippet" href="https://direct.example.org/">Snippet two</a>
  </div>
</div>
"#;

    #[test]
    fn test_greeting_detection() {
        assert!(is_greeting("hello"));
        assert!(is_greeting("Hey there"));
        assert!(!is_greeting("hello how are you"));
        assert!(!is_greeting("what is a roadmap"));
    }

    #[tokio::test]
    async fn test_greeting_skips_responder() {
        let responder = counting(false);
        let reply = reply_to(&responder, "hello").await;
        assert_eq!(reply, GREETING_REPLY);
        assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_responder_failure_falls_back() {
        let responder = counting(true);
        let reply = reply_to(&responder, "best colleges for design").await;
        assert_eq!(reply, OFFLINE_REPLY);
        assert_eq!(responder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_results_strips_tags_and_decodes_links() {
        let responder = WebSearchResponder::new(&ChatConfig::default()).unwrap();
        let hits = responder.parse_results(PAGE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "How to become a Data Scientist");
        assert_eq!(hits[0].snippet, "Learn statistics and Python.");
        assert_eq!(hits[0].link, "https://example.com/data?a=1");
        assert_eq!(hits[1].link, "https://direct.example.org/");
    }

    #[test]
    fn test_parse_results_respects_max() {
        let config = ChatConfig {
            max_results: 1,
            ..ChatConfig::default()
        };
        let responder = WebSearchResponder::new(&config).unwrap();
        assert_eq!(responder.parse_results(PAGE).len(), 1);
        assert!(responder.parse_results("<html></html>").is_empty());
    }

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit {
            title: "T".into(),
            snippet: "S".into(),
            link: "https://l".into(),
        }];
        assert_eq!(
            format_hits("q", &hits),
            "Here is what I found for \"q\":\n\n**T**\nS\n[Read more](https://l)\n"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let responder = WebSearchResponder::new(&ChatConfig::default()).unwrap();
        let url = responder.search_url_for("data science & AI").unwrap();
        assert_eq!(url.query_pairs().next().unwrap().1, "data science & AI");
    }
}
