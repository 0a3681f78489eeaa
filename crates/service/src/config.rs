use serde::Deserialize;

/// Limits and defaults applied by the asset service.
///
/// # Example
///
/// ```toml
/// [assets]
/// max_upload_bytes = 7340032
/// allowed_mime_types = ["image/*"]
/// default_page_size = 20
/// max_page_size = 100
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Accepted content types. Entries are exact types (`image/png`),
    /// `type/*` wildcards, or `*/*`. An empty list accepts everything.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Page size used when a listing does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Upper bound on the page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            allowed_mime_types: default_allowed_mime_types(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    7 * 1024 * 1024
}

fn default_allowed_mime_types() -> Vec<String> {
    vec!["image/*".to_owned()]
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

impl ServiceConfig {
    /// Whether `mime` matches one of the allowed patterns.
    ///
    /// Parameters such as `; charset=...` are ignored and matching is
    /// case-insensitive.
    pub fn mime_allowed(&self, mime: &str) -> bool {
        if self.allowed_mime_types.is_empty() {
            return true;
        }
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let Some((top, _)) = essence.split_once('/') else {
            return false;
        };

        self.allowed_mime_types.iter().any(|pattern| {
            let pattern = pattern.trim().to_ascii_lowercase();
            if pattern == "*/*" {
                true
            } else if let Some(prefix) = pattern.strip_suffix("/*") {
                prefix == top
            } else {
                pattern == essence
            }
        })
    }

    /// Resolve a requested page size against the default and maximum.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.max_upload_bytes, 7_340_032);
        assert_eq!(cfg.allowed_mime_types, vec!["image/*"]);
        assert_eq!(cfg.default_page_size, 20);
        assert_eq!(cfg.max_page_size, 100);
    }

    #[test]
    fn wildcard_matches_top_level_type() {
        let cfg = ServiceConfig::default();
        assert!(cfg.mime_allowed("image/jpeg"));
        assert!(cfg.mime_allowed("IMAGE/PNG"));
        assert!(cfg.mime_allowed("image/webp; q=0.9"));
        assert!(!cfg.mime_allowed("text/plain"));
        assert!(!cfg.mime_allowed("imagejpeg"));
        assert!(!cfg.mime_allowed(""));
    }

    #[test]
    fn exact_and_any_patterns() {
        let cfg = ServiceConfig {
            allowed_mime_types: vec!["application/pdf".into()],
            ..ServiceConfig::default()
        };
        assert!(cfg.mime_allowed("application/pdf"));
        assert!(!cfg.mime_allowed("application/json"));

        let any = ServiceConfig {
            allowed_mime_types: vec!["*/*".into()],
            ..ServiceConfig::default()
        };
        assert!(any.mime_allowed("text/plain"));

        let open = ServiceConfig {
            allowed_mime_types: Vec::new(),
            ..ServiceConfig::default()
        };
        assert!(open.mime_allowed("anything"));
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.page_size(None), 20);
        assert_eq!(cfg.page_size(Some(50)), 50);
        assert_eq!(cfg.page_size(Some(10_000)), 100);
        assert_eq!(cfg.page_size(Some(0)), 0);
    }
}
