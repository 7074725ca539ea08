//! Line-level m3u8 reading: every non-blank line that is not a `#` directive
//! is a URI reference. Tag semantics are not interpreted.

/// Playlist text together with the URL it was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub url: String,
    pub text: String,
}

impl Playlist {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }

    /// URI references in playlist order
    pub fn uris(&self) -> Vec<String> {
        parse(&self.text)
    }
}

/// Iterate the URI lines of a playlist without allocating
pub fn uri_lines(text: &str) -> impl Iterator<Item = &str> {
    text.trim()
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Extract the URI references of a playlist, preserving order
pub fn parse(text: &str) -> Vec<String> {
    uri_lines(text).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-STREAM-INF:BANDWIDTH=1280000,RESOLUTION=640x360
low/index.m3u8

#EXT-X-STREAM-INF:BANDWIDTH=2560000,RESOLUTION=1280x720
high/index.m3u8
";

    #[test]
    fn test_extracts_uris_in_order() {
        assert_eq!(parse(MASTER), vec!["low/index.m3u8", "high/index.m3u8"]);
    }

    #[test]
    fn test_comments_and_blank_lines_never_appear() {
        let text = "\n\n#EXTM3U\n   \n#EXTINF:4.0,\nseg0.ts\n\t\n# comment\nseg1.ts\n\n";
        let uris = parse(text);
        assert!(uris.iter().all(|u| !u.starts_with('#') && !u.trim().is_empty()));
        assert_eq!(uris, vec!["seg0.ts", "seg1.ts"]);
    }

    #[test]
    fn test_count_matches_uri_lines() {
        let uris: Vec<String> = (0..25).map(|i| format!("segment_{i}.ts")).collect();
        let mut text = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:6\n");
        for uri in &uris {
            text.push_str("#EXTINF:6.0,\n");
            text.push_str(uri);
            text.push('\n');
        }
        text.push_str("#EXT-X-ENDLIST\n");
        assert_eq!(parse(&text), uris);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(MASTER), parse(MASTER));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "#EXTM3U\r\n#EXTINF:4.0,\r\nseg0.ts\r\nseg1.ts\r\n";
        assert_eq!(parse(text), vec!["seg0.ts", "seg1.ts"]);
    }

    #[test]
    fn test_empty_and_comment_only_playlists() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n").is_empty());
        assert!(parse("#EXTM3U\n#EXT-X-ENDLIST").is_empty());
    }

    #[test]
    fn test_playlist_keeps_source_url() {
        let playlist = Playlist::new("http://host/path/v1.m3u8", "#EXTM3U\nseg0.ts\n");
        assert_eq!(playlist.url, "http://host/path/v1.m3u8");
        assert_eq!(playlist.uris(), vec!["seg0.ts"]);
    }
}
