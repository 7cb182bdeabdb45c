//! Media-attribution tree returned by `PresentationEngine::copyrights`.

use serde_json::Value;

/// Attribution for a single piece of media.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyrightInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub source: Option<String>,
}

impl CopyrightInfo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.license.is_none()
            && self.source.is_none()
    }
}

/// One node in the label → attribution hierarchy: one per slide plus one per
/// attributable element.
#[derive(Debug, Clone, Default)]
pub struct CopyrightNode {
    pub label: String,
    pub media: Option<CopyrightInfo>,
    pub children: Vec<CopyrightNode>,
}

/// Generic fallback extractor for elements whose instance exposes no
/// copyright accessor: look for a conventional `copyright` object inside the
/// descriptor params.
pub fn extract_from_params(params: &Value) -> Option<CopyrightInfo> {
    let copyright = params.get("copyright")?;
    let field = |name: &str| {
        copyright
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let info = CopyrightInfo {
        title: field("title"),
        author: field("author"),
        license: field("license"),
        source: field("source"),
    };
    if info.is_empty() { None } else { Some(info) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_params() {
        let params = json!({
            "text": "hello",
            "copyright": { "title": "Photo", "author": "A. Uthor", "license": "CC BY 4.0" }
        });
        let info = extract_from_params(&params).unwrap();
        assert_eq!(info.title.as_deref(), Some("Photo"));
        assert_eq!(info.author.as_deref(), Some("A. Uthor"));
        assert_eq!(info.license.as_deref(), Some("CC BY 4.0"));
        assert!(info.source.is_none());
    }

    #[test]
    fn test_extract_missing_copyright() {
        assert!(extract_from_params(&json!({ "text": "hello" })).is_none());
        assert!(extract_from_params(&json!({ "copyright": {} })).is_none());
    }
}
