//! Image URL sanitizing for display.
//!
//! Stored image references are not trusted: seed data embeds a display hint
//! in its placeholder URLs (`https://placehold.co/100x100.png" data-ai-hint="farmer portrait`),
//! uploads may have failed, and user records may carry anything. Every view
//! passes image references through [`sanitize_image_url`] before rendering.

/// Host serving placeholder images.
pub const PLACEHOLDER_HOST: &str = "https://placehold.co";

/// Marker separating a placeholder URL from its embedded display hint.
const HINT_MARKER: &str = "\" data-ai-hint=\"";

/// Hint used when a product has no usable category.
pub const DEFAULT_IMAGE_HINT: &str = "produce";

/// Size tokens for each view.
pub mod sizes {
    /// Product card on the home page.
    pub const PRODUCT_CARD: &str = "600x400";
    /// Product detail page.
    pub const PRODUCT_DETAIL: &str = "800x600";
    /// Listing row on the farmer dashboard.
    pub const LISTING_THUMB: &str = "50x50";
    /// Order row on the farmer dashboard.
    pub const ORDER_THUMB: &str = "40x40";
    /// Chat avatars.
    pub const AVATAR: &str = "40x40";
    /// Portrait on a farmer profile.
    pub const FARMER_PORTRAIT: &str = "150x150";
    /// Seed farmer portraits.
    pub const SEED_PORTRAIT: &str = "100x100";
}

/// Placeholder image URL for a size token like `600x400`.
#[must_use]
pub fn placeholder_url(size: &str) -> String {
    format!("{PLACEHOLDER_HOST}/{size}.png")
}

/// Turn a stored image reference into something safe to render.
///
/// Empty input, unsupported schemes and unparsable URLs all fall back to the
/// placeholder for `size`. Embedded display hints are stripped from
/// placeholder URLs.
#[must_use]
pub fn sanitize_image_url(raw: Option<&str>, size: &str) -> String {
    resolve_image_url(raw).unwrap_or_else(|| placeholder_url(size))
}

/// Like [`sanitize_image_url`] but returns `None` instead of a placeholder.
#[must_use]
pub fn resolve_image_url(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|s| !s.is_empty())?;

    let mut processed = raw;
    if processed.starts_with(PLACEHOLDER_HOST) {
        if let Some((url, _hint)) = processed.split_once(HINT_MARKER) {
            processed = url;
        }
    }
    if let Some(stripped) = processed.strip_suffix('"') {
        processed = stripped;
    }

    if processed.starts_with("data:image") {
        return Some(processed.to_owned());
    }
    if processed.starts_with("http") {
        return match url::Url::parse(processed) {
            Ok(_) => Some(processed.to_owned()),
            Err(e) => {
                tracing::warn!(
                    url = processed,
                    error = %e,
                    "Invalid image URL, falling back to placeholder"
                );
                None
            }
        };
    }
    None
}

/// The display hint embedded in a placeholder URL, if any.
#[must_use]
pub fn embedded_image_hint(raw: &str) -> Option<&str> {
    let (_, hint) = raw.split_once(HINT_MARKER)?;
    let hint = hint.strip_suffix('"').unwrap_or(hint);
    (!hint.is_empty()).then_some(hint)
}

/// Attach a display hint to a placeholder URL, dropping any query string.
///
/// URLs that already carry a hint, or are not placeholders, are returned
/// unchanged.
#[must_use]
pub fn with_image_hint(url: &str, hint: &str) -> String {
    if !url.starts_with(PLACEHOLDER_HOST) || url.contains("data-ai-hint") {
        return url.to_owned();
    }
    let base = url.split('?').next().unwrap_or(url);
    format!("{base}{HINT_MARKER}{hint}")
}

/// Display hint for a product category: its first word, lower-cased.
#[must_use]
pub fn image_hint_for_category(category: &str) -> String {
    category
        .split(' ')
        .next()
        .filter(|word| !word.is_empty())
        .map_or_else(|| DEFAULT_IMAGE_HINT.to_owned(), str::to_lowercase)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_uses_placeholder() {
        assert_eq!(
            sanitize_image_url(None, "600x400"),
            "https://placehold.co/600x400.png"
        );
        assert_eq!(
            sanitize_image_url(Some(""), "40x40"),
            "https://placehold.co/40x40.png"
        );
    }

    #[test]
    fn test_strips_embedded_hint() {
        assert_eq!(
            sanitize_image_url(
                Some(r#"https://placehold.co/100x100.png" data-ai-hint="farmer portrait"#),
                "150x150"
            ),
            "https://placehold.co/100x100.png"
        );
    }

    #[test]
    fn test_hint_marker_only_stripped_from_placeholders() {
        let raw = r#"https://cdn.example.com/a.png" data-ai-hint="x"#;
        // Not a placeholder, so the hint stays part of the URL.
        let result = sanitize_image_url(Some(raw), "50x50");
        assert!(result.starts_with("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_strips_single_trailing_quote() {
        assert_eq!(
            sanitize_image_url(Some("https://example.com/a.png\""), "50x50"),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_passes_data_urls() {
        let data = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(sanitize_image_url(Some(data), "50x50"), data);
    }

    #[test]
    fn test_rejects_relative_and_unknown_schemes() {
        assert_eq!(
            sanitize_image_url(Some("/images/carrot.png"), "50x50"),
            "https://placehold.co/50x50.png"
        );
        assert_eq!(
            sanitize_image_url(Some("ftp://example.com/a.png"), "50x50"),
            "https://placehold.co/50x50.png"
        );
    }

    #[test]
    fn test_rejects_unparsable_http_url() {
        assert_eq!(
            sanitize_image_url(Some("http://"), "800x600"),
            "https://placehold.co/800x600.png"
        );
        assert_eq!(
            sanitize_image_url(Some("httpfoo"), "800x600"),
            "https://placehold.co/800x600.png"
        );
    }

    #[test]
    fn test_resolve_returns_none_for_fallback() {
        assert_eq!(resolve_image_url(None), None);
        assert_eq!(resolve_image_url(Some("not a url")), None);
        assert_eq!(
            resolve_image_url(Some("https://example.com/me.jpg")).as_deref(),
            Some("https://example.com/me.jpg")
        );
    }

    #[test]
    fn test_embedded_image_hint() {
        assert_eq!(
            embedded_image_hint(r#"https://placehold.co/100x100.png" data-ai-hint="farmer portrait"#),
            Some("farmer portrait")
        );
        assert_eq!(embedded_image_hint("https://placehold.co/100x100.png"), None);
    }

    #[test]
    fn test_with_image_hint() {
        assert_eq!(
            with_image_hint("https://placehold.co/100x100.png?text=A", "farmer portrait"),
            r#"https://placehold.co/100x100.png" data-ai-hint="farmer portrait"#
        );
        let hinted = r#"https://placehold.co/100x100.png" data-ai-hint="x"#;
        assert_eq!(with_image_hint(hinted, "y"), hinted);
        assert_eq!(
            with_image_hint("https://example.com/a.png", "y"),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_image_hint_for_category() {
        assert_eq!(image_hint_for_category("Leafy Greens"), "leafy");
        assert_eq!(image_hint_for_category("Fruits"), "fruits");
        assert_eq!(image_hint_for_category(""), DEFAULT_IMAGE_HINT);
    }
}
