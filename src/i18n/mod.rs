//! Accept-Language negotiation
//!
//! A small negotiator over the `Accept-Language` grammar: candidates are
//! ordered by quality value and matched against the supported set, first
//! on the full tag and then on the primary subtag, so `de-CH` resolves to
//! a supported `de`. The same routine validates locale cookie values,
//! which keeps a tampered cookie from smuggling an unsupported language
//! into the response.

/// One parsed language range with its quality weight
#[derive(Debug, Clone, PartialEq)]
struct LanguageRange {
    tag: String,
    quality: f32,
}

/// Negotiate a header or cookie value against the supported languages
///
/// Returns the supported tag (in its canonical casing from `supported`)
/// that best satisfies the value, or `None` when nothing matches.
pub fn negotiate(value: &str, supported: &[String]) -> Option<String> {
    let ranges = parse_ranges(value);

    for range in &ranges {
        if range.tag == "*" {
            return supported.first().cloned();
        }
        // Full-tag match first
        if let Some(exact) = supported
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(&range.tag))
        {
            return Some(exact.clone());
        }
        // Fall back to the primary subtag: de-CH matches a supported de
        let primary = range.tag.split('-').next().unwrap_or(&range.tag);
        if let Some(primary_match) = supported
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(primary))
        {
            return Some(primary_match.clone());
        }
    }

    None
}

fn parse_ranges(value: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = value
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|param| {
                    let param = param.trim();
                    param.strip_prefix("q=").and_then(|q| q.parse::<f32>().ok())
                })
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);
            Some(LanguageRange {
                tag: tag.to_string(),
                quality,
            })
        })
        .filter(|range| range.quality > 0.0)
        .collect();

    // Stable sort keeps the header's order for equal weights
    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal));
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        vec!["en".to_string(), "de".to_string(), "es".to_string()]
    }

    #[test]
    fn exact_tag_wins() {
        assert_eq!(negotiate("de", &supported()), Some("de".to_string()));
    }

    #[test]
    fn quality_values_order_candidates() {
        assert_eq!(
            negotiate("fr;q=0.9, de;q=0.8, en;q=0.7", &supported()),
            Some("de".to_string())
        );
    }

    #[test]
    fn primary_subtag_matches_regional_variants() {
        assert_eq!(negotiate("de-CH", &supported()), Some("de".to_string()));
        assert_eq!(
            negotiate("es-419,en;q=0.5", &supported()),
            Some("es".to_string())
        );
    }

    #[test]
    fn wildcard_falls_back_to_first_supported() {
        assert_eq!(negotiate("*", &supported()), Some("en".to_string()));
    }

    #[test]
    fn zero_quality_means_not_acceptable() {
        assert_eq!(negotiate("de;q=0", &supported()), None);
    }

    #[test]
    fn unsupported_value_yields_none() {
        assert_eq!(negotiate("ja", &supported()), None);
        assert_eq!(negotiate("", &supported()), None);
        assert_eq!(negotiate("not a header!!", &supported()), None);
    }

    #[test]
    fn casing_is_ignored_but_canonical_tag_is_returned() {
        assert_eq!(negotiate("DE-ch", &supported()), Some("de".to_string()));
    }
}
