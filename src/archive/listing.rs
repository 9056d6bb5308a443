use serde::{Deserialize, Serialize};

/// One link of an archive directory index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Link text without a trailing `/`.
    pub name: String,
    /// Link target, usually relative to the listed directory.
    pub href: String,
    pub is_dir: bool,
}

/// Extracts the entries of an Apache-style `Index of` page.
///
/// Parent links and column-sorting links are skipped.
pub fn parse_directory_listing(html: &str) -> Vec<DirectoryEntry> {
    const ANCHOR: &str = "<a href=\"";
    let mut entries = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find(ANCHOR) {
        rest = &rest[start + ANCHOR.len()..];
        let Some(href_end) = rest.find('"') else {
            break;
        };
        let href = &rest[..href_end];
        rest = &rest[href_end + 1..];
        let Some(tag_end) = rest.find('>') else {
            break;
        };
        rest = &rest[tag_end + 1..];
        let Some(text_end) = rest.find("</a>") else {
            break;
        };
        let name = rest[..text_end].trim();
        rest = &rest[text_end + "</a>".len()..];

        if is_navigation_link(href, name) {
            continue;
        }
        entries.push(DirectoryEntry {
            name: name.trim_end_matches('/').to_string(),
            href: href.to_string(),
            is_dir: href.ends_with('/'),
        });
    }
    entries
}

fn is_navigation_link(href: &str, name: &str) -> bool {
    matches!(name, ".." | "../" | "Parent Directory")
        || href.starts_with('?')
        || href.starts_with('/')
        || href.starts_with("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><head><title>Index of /data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/klimat</title></head>
<body><h1>Index of /data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/klimat</h1>
<pre><img src="/icons/blank.gif" alt="Icon "> <a href="?C=N;O=D">Name</a>   <a href="?C=M;O=A">Last modified</a>
<hr><img src="/icons/back.gif" alt="[PARENTDIR]"> <a href="/data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/">Parent Directory</a>
<img src="/icons/folder.gif" alt="[DIR]"> <a href="2022/">2022/</a>                   2023-02-01 10:00    -
<img src="/icons/folder.gif" alt="[DIR]"> <a href="2023/">2023/</a>                   2024-02-01 10:00    -
<img src="/icons/text.gif" alt="[TXT]"> <a href="k_d_format.txt">k_d_format.txt</a>          2021-06-10 12:00  2.1K
</pre></body></html>"#;

    #[test]
    fn test_parse_apache_index() {
        let entries = parse_directory_listing(INDEX);
        assert_eq!(
            entries,
            vec![
                DirectoryEntry {
                    name: "2022".into(),
                    href: "2022/".into(),
                    is_dir: true
                },
                DirectoryEntry {
                    name: "2023".into(),
                    href: "2023/".into(),
                    is_dir: true
                },
                DirectoryEntry {
                    name: "k_d_format.txt".into(),
                    href: "k_d_format.txt".into(),
                    is_dir: false
                },
            ]
        );
    }

    #[test]
    fn test_parent_links_are_skipped() {
        let entries = parse_directory_listing(r#"<a href="../">../</a><a href="x.zip">x.zip</a>"#);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "x.zip");
    }
}
