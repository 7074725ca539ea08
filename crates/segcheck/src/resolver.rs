// Two-level traversal: master playlist -> variant playlists -> segment URLs.

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::{CheckError, fetcher::ResourceFetcher};

/// How a URI reference is combined with the URL of the playlist listing it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum UrlResolution {
    /// Replace the last `/`-separated component of the parent URL with the
    /// reference. Absolute references, `..` and queries are not special.
    #[default]
    Naive,
    /// RFC 3986 reference resolution
    Rfc3986,
}

/// Resolve `uri` against the URL of the playlist it was read from
pub fn resolve_uri(parent: &str, uri: &str, mode: UrlResolution) -> Result<String, CheckError> {
    match mode {
        UrlResolution::Naive => Ok(join_naive(parent, uri)),
        UrlResolution::Rfc3986 => {
            let base = Url::parse(parent).map_err(|e| CheckError::InvalidUrl {
                url: parent.to_string(),
                reason: e.to_string(),
            })?;
            base.join(uri)
                .map(String::from)
                .map_err(|e| CheckError::InvalidUrl {
                    url: uri.to_string(),
                    reason: e.to_string(),
                })
        }
    }
}

fn join_naive(parent: &str, uri: &str) -> String {
    match parent.rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/{uri}"),
        None => format!("/{uri}"),
    }
}

/// One segment to check; the segment URL is its identity in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCase {
    /// Position in discovery order
    pub index: usize,
    pub url: String,
    /// Variant playlist that listed the segment
    pub variant_url: String,
}

/// Walks a master playlist down to its segments
pub struct SegmentResolver<'a, F: ?Sized> {
    fetcher: &'a F,
    resolution: UrlResolution,
}

impl<'a, F> SegmentResolver<'a, F>
where
    F: ResourceFetcher + ?Sized,
{
    pub fn new(fetcher: &'a F, resolution: UrlResolution) -> Self {
        Self {
            fetcher,
            resolution,
        }
    }

    /// Absolute segment URLs in variant order, then segment order.
    ///
    /// Any fetch failure aborts the traversal; no partial list is returned.
    pub async fn resolve(&self, master_url: &str) -> Result<Vec<String>, CheckError> {
        Ok(self
            .resolve_cases(master_url)
            .await?
            .into_iter()
            .map(|case| case.url)
            .collect())
    }

    /// Same traversal as [`resolve`](Self::resolve), keeping the variant of each segment
    pub async fn resolve_cases(&self, master_url: &str) -> Result<Vec<SegmentCase>, CheckError> {
        let master = self.fetcher.fetch_playlist(master_url).await?;
        let variant_uris = master.uris();
        info!(
            master_url,
            variants = variant_uris.len(),
            "Loaded master playlist"
        );

        let mut cases = Vec::new();
        for variant_uri in &variant_uris {
            let variant_url = resolve_uri(&master.url, variant_uri, self.resolution)?;
            let variant = self.fetcher.fetch_playlist(&variant_url).await?;
            let segment_uris = variant.uris();
            debug!(
                variant_url = %variant.url,
                segments = segment_uris.len(),
                "Loaded variant playlist"
            );

            for segment_uri in &segment_uris {
                cases.push(SegmentCase {
                    index: cases.len(),
                    url: resolve_uri(&variant.url, segment_uri, self.resolution)?,
                    variant_url: variant.url.clone(),
                });
            }
        }

        info!(segments = cases.len(), "Resolved segment URLs");
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;

    use super::*;

    /// Serves fixed bodies and records the order of requests
    #[derive(Default)]
    struct FakeFetcher {
        bodies: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, CheckError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| CheckError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                })
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CheckError> {
            self.fetch(url).await.map(Bytes::from)
        }
    }

    #[test]
    fn test_naive_replaces_last_component() {
        assert_eq!(
            resolve_uri(
                "http://host/path/master.m3u8",
                "variant.m3u8",
                UrlResolution::Naive
            )
            .unwrap(),
            "http://host/path/variant.m3u8"
        );
    }

    #[test]
    fn test_naive_keeps_nested_references_verbatim() {
        let parent = "https://cdn.example.com/a/b/master.m3u8?token=1";
        assert_eq!(
            join_naive(parent, "../c/v.m3u8"),
            "https://cdn.example.com/a/b/../c/v.m3u8"
        );
        assert_eq!(
            join_naive(parent, "http://other/x.ts"),
            "https://cdn.example.com/a/b/http://other/x.ts"
        );
        assert_eq!(join_naive("master.m3u8", "v.m3u8"), "/v.m3u8");
    }

    #[test]
    fn test_rfc3986_resolution() {
        let parent = "https://cdn.example.com/a/b/master.m3u8?token=1";
        let resolve = |uri| resolve_uri(parent, uri, UrlResolution::Rfc3986).unwrap();
        assert_eq!(resolve("v.m3u8"), "https://cdn.example.com/a/b/v.m3u8");
        assert_eq!(resolve("../c/v.m3u8"), "https://cdn.example.com/a/c/v.m3u8");
        assert_eq!(resolve("http://other/x.ts"), "http://other/x.ts");
        assert_eq!(resolve("/root.ts"), "https://cdn.example.com/root.ts");
    }

    #[test]
    fn test_rfc3986_rejects_unparsable_parent() {
        let err = resolve_uri("not a url", "v.m3u8", UrlResolution::Rfc3986).unwrap_err();
        assert!(matches!(err, CheckError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_single_variant_two_segments() {
        let fetcher = FakeFetcher::default()
            .with("http://host/path/master.m3u8", "#EXTM3U\nv1.m3u8\n")
            .with(
                "http://host/path/v1.m3u8",
                "#EXTM3U\n#EXTINF:4,\nseg0.ts\n#EXTINF:4,\nseg1.ts\n#EXT-X-ENDLIST\n",
            );
        let resolver = SegmentResolver::new(&fetcher, UrlResolution::Naive);

        let urls = resolver.resolve("http://host/path/master.m3u8").await.unwrap();
        assert_eq!(
            urls,
            vec!["http://host/path/seg0.ts", "http://host/path/seg1.ts"]
        );
    }

    #[tokio::test]
    async fn test_variant_order_then_segment_order() {
        let fetcher = FakeFetcher::default()
            .with("http://h/m.m3u8", "#EXTM3U\nlow/i.m3u8\nhigh/i.m3u8\n")
            .with("http://h/low/i.m3u8", "a.ts\nb.ts\n")
            .with("http://h/high/i.m3u8", "c.ts\n");
        let resolver = SegmentResolver::new(&fetcher, UrlResolution::Naive);

        let cases = resolver.resolve_cases("http://h/m.m3u8").await.unwrap();
        let urls: Vec<_> = cases.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://h/low/a.ts", "http://h/low/b.ts", "http://h/high/c.ts"]
        );
        assert_eq!(cases[2].index, 2);
        assert_eq!(cases[2].variant_url, "http://h/high/i.m3u8");
        assert_eq!(
            fetcher.requests(),
            vec!["http://h/m.m3u8", "http://h/low/i.m3u8", "http://h/high/i.m3u8"]
        );
    }

    #[tokio::test]
    async fn test_empty_master_yields_no_urls() {
        let fetcher = FakeFetcher::default().with("http://h/m.m3u8", "#EXTM3U\n");
        let resolver = SegmentResolver::new(&fetcher, UrlResolution::Naive);
        assert!(resolver.resolve("http://h/m.m3u8").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_variant_contributes_nothing() {
        let fetcher = FakeFetcher::default()
            .with("http://h/m.m3u8", "a.m3u8\nb.m3u8\n")
            .with("http://h/a.m3u8", "#EXTM3U\n#EXT-X-ENDLIST\n")
            .with("http://h/b.m3u8", "s.ts\n");
        let resolver = SegmentResolver::new(&fetcher, UrlResolution::Naive);
        assert_eq!(
            resolver.resolve("http://h/m.m3u8").await.unwrap(),
            vec!["http://h/s.ts"]
        );
    }

    #[tokio::test]
    async fn test_missing_variant_aborts_resolution() {
        let fetcher = FakeFetcher::default()
            .with("http://h/m.m3u8", "a.m3u8\nmissing.m3u8\nc.m3u8\n")
            .with("http://h/a.m3u8", "s.ts\n")
            .with("http://h/c.m3u8", "t.ts\n");
        let resolver = SegmentResolver::new(&fetcher, UrlResolution::Naive);

        let err = resolver.resolve("http://h/m.m3u8").await.unwrap_err();
        assert!(err.is_status());
        assert_eq!(err.url(), Some("http://h/missing.m3u8"));
        // Traversal stops at the failure
        assert_eq!(fetcher.requests().len(), 3);
    }
}
