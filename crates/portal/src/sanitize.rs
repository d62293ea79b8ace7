//! Untrusted route-parameter sanitization.
//!
//! Defense in depth against parameter tampering on role-scoped routes,
//! independent of whatever routing mechanism renders pages. Nothing here
//! errors: bad input yields `None` or the safe fallback URL.

use std::collections::BTreeMap;

use korbly_core::routes::{ROOT_PATH, module_path};
use korbly_core::{Feature, UserRole};

/// Characters a route parameter may keep.
///
/// Deliberately tighter than the RFC 3986 unreserved set: `.` is dropped so
/// traversal sequences leave no residue at all.
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '~')
}

/// Strip every disallowed character; `None` if the input is absent or
/// nothing survives. Idempotent.
pub fn sanitize(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let cleaned: String = raw.chars().filter(|c| is_allowed_char(*c)).collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Membership test against a caller-supplied whitelist (typically the role
/// registry's canonical strings).
pub fn is_allowed(cleaned: &str, allowed: &[&str]) -> bool {
    allowed.contains(&cleaned)
}

/// Reject paths carrying traversal or injection patterns.
///
/// Refused: `..` anywhere, a leading `scheme://`, angle brackets, and the
/// substring `javascript:` in any casing.
pub fn is_path_safe(path: &str) -> bool {
    if path.contains("..") || path.contains('<') || path.contains('>') {
        return false;
    }
    if path.to_ascii_lowercase().contains("javascript:") {
        return false;
    }
    if has_leading_scheme(path) {
        return false;
    }
    true
}

fn has_leading_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Build a URL from a base template and parameters, or fall back to `/`.
///
/// Every parameter must pass [`is_path_safe`] and survive [`sanitize`]
/// unchanged; one bad parameter aborts the whole build — a
/// partially-substituted URL is worse than no URL. `:key` placeholders
/// substitute in-path; leftover parameters become URL-encoded query pairs
/// (sorted by key).
pub fn build_secure_url(base: &str, params: &BTreeMap<&str, &str>) -> String {
    for value in params.values() {
        if !is_path_safe(value) {
            return ROOT_PATH.to_string();
        }
        match sanitize(Some(value)) {
            Some(cleaned) if cleaned == *value => {}
            _ => return ROOT_PATH.to_string(),
        }
    }

    let mut url = base.to_string();
    let mut query: Vec<String> = Vec::new();

    for (key, value) in params {
        let placeholder = format!(":{key}");
        if url.contains(&placeholder) {
            url = url.replace(&placeholder, value);
        } else {
            query.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }
    }

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    url
}

/// Role-scoped URL for a module, built through the same parameter checks as
/// any caller-supplied URL.
pub fn module_url(feature: Feature, role: UserRole) -> String {
    let base = format!("{}/:userType", module_path(feature));
    build_secure_url(&base, &BTreeMap::from([("userType", role.as_str())]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_traversal_to_bare_residue() {
        assert_eq!(sanitize(Some("../etc/passwd")).as_deref(), Some("etcpasswd"));
    }

    #[test]
    fn absent_or_hostile_only_input_yields_none() {
        assert_eq!(sanitize(None), None);
        assert_eq!(sanitize(Some("")), None);
        assert_eq!(sanitize(Some("<>/../!!")), None);
    }

    #[test]
    fn clean_values_pass_through() {
        assert_eq!(sanitize(Some("pension_fund")).as_deref(), Some("pension_fund"));
        assert_eq!(sanitize(Some("abc-DEF_123~")).as_deref(), Some("abc-DEF_123~"));
    }

    #[test]
    fn whitelist_membership() {
        let allowed = ["pension_fund", "insurance"];
        assert!(is_allowed("insurance", &allowed));
        assert!(!is_allowed("admin", &allowed));
        assert!(!is_allowed("", &allowed));
    }

    #[test]
    fn path_safety_rejects_traversal_and_injection() {
        assert!(!is_path_safe("/a/../b"));
        assert!(!is_path_safe(".."));
        assert!(!is_path_safe("<script>"));
        assert!(!is_path_safe("a>b"));
        assert!(!is_path_safe("javascript:alert(1)"));
        assert!(!is_path_safe("JavaScript:alert(1)"));
        assert!(!is_path_safe("https://evil.example/x"));
        assert!(!is_path_safe("custom+scheme://x"));
    }

    #[test]
    fn path_safety_accepts_ordinary_paths() {
        assert!(is_path_safe("/modules/portfolio/pension_fund"));
        assert!(is_path_safe("/dashboard"));
        assert!(is_path_safe("relative/path"));
        // "://" without a scheme-shaped prefix is odd but not a hijack.
        assert!(is_path_safe("/weird/://x"));
    }

    #[test]
    fn builds_role_scoped_module_url() {
        let params = BTreeMap::from([("userType", "pension_fund")]);
        assert_eq!(
            build_secure_url("/modules/:userType", &params),
            "/modules/pension_fund"
        );
    }

    #[test]
    fn traversal_parameter_aborts_to_root() {
        let params = BTreeMap::from([("userType", "../../x")]);
        assert_eq!(build_secure_url("/modules/:userType", &params), "/");
    }

    #[test]
    fn any_bad_parameter_aborts_the_whole_build() {
        let params = BTreeMap::from([("userType", "hnwi"), ("next", "<svg>")]);
        assert_eq!(build_secure_url("/modules/:userType", &params), "/");
    }

    #[test]
    fn leftover_parameters_become_sorted_query_pairs() {
        let params = BTreeMap::from([("userType", "hnwi"), ("tab", "holdings"), ("page", "2")]);
        assert_eq!(
            build_secure_url("/modules/:userType", &params),
            "/modules/hnwi?page=2&tab=holdings"
        );
    }

    #[test]
    fn no_parameters_returns_base_unchanged() {
        assert_eq!(build_secure_url("/dashboard", &BTreeMap::new()), "/dashboard");
    }

    #[test]
    fn module_urls_are_role_scoped() {
        assert_eq!(
            module_url(Feature::Syndication, UserRole::PensionFund),
            "/modules/syndication/pension_fund"
        );
        assert_eq!(
            module_url(Feature::CreditEngine, UserRole::InstitutionalBorrower),
            "/modules/credit-engine/institutional_borrower"
        );
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(input in ".*") {
            let once = sanitize(Some(&input));
            let twice = sanitize(once.as_deref());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn sanitized_output_is_clean(input in ".*") {
            if let Some(cleaned) = sanitize(Some(&input)) {
                prop_assert!(cleaned.chars().all(is_allowed_char));
                prop_assert!(!cleaned.is_empty());
            }
        }
    }
}
