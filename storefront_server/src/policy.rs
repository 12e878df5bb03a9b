//! The route access policy.
//!
//! Authorization is declarative: an ordered table of `(method, path pattern) -> requirement` rules, evaluated
//! first-match-wins by the enforcement middleware. Patterns support `*` (exactly one path segment) and a trailing
//! `/**` (the whole subtree, including the prefix itself). Requests that match no rule require authentication, so
//! forgetting to list a new route fails closed rather than open.

use actix_web::http::Method;
use storefront_engine::db_types::Role;

/// What a caller must present to pass a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may call, identity or not.
    Public,
    /// Any authenticated identity suffices.
    Authenticated,
    /// The identity must carry this role.
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
}

/// A parsed path pattern. `/api/orders/*/status` matches exactly four segments with anything in the third
/// position; `/api/ai/**` matches `/api/ai` and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
    subtree: bool,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let (prefix, subtree) = match pattern.strip_suffix("/**") {
            Some(prefix) => (prefix, true),
            None => (pattern, false),
        };
        let segments = prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| if s == "*" { Segment::Wildcard } else { Segment::Literal(s.to_string()) })
            .collect();
        Self { segments, subtree }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts = path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
        if self.subtree {
            if parts.len() < self.segments.len() {
                return false;
            }
        } else if parts.len() != self.segments.len() {
            return false;
        }
        self.segments.iter().zip(parts.iter()).all(|(seg, part)| match seg {
            Segment::Literal(lit) => lit == part,
            Segment::Wildcard => true,
        })
    }
}

#[derive(Debug, Clone)]
struct Rule {
    /// `None` applies to every method.
    method: Option<Method>,
    pattern: PathPattern,
    requirement: Requirement,
}

/// The ordered rule table. Only the order of insertion matters; the first rule whose method and pattern both match
/// decides the requirement.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<Rule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(Rule { method, pattern: PathPattern::parse(pattern), requirement });
        self
    }

    pub fn public(self, method: Option<Method>, pattern: &str) -> Self {
        self.require(method, pattern, Requirement::Public)
    }

    pub fn admin_only(self, method: Option<Method>, pattern: &str) -> Self {
        self.require(method, pattern, Requirement::Role(Role::Admin))
    }

    /// Returns the requirement for a request, or [`Requirement::Authenticated`] when nothing matches.
    pub fn required_for(&self, method: &Method, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().map(|m| m == method).unwrap_or(true) && rule.pattern.matches(path)
            })
            .map(|rule| rule.requirement)
            .unwrap_or(Requirement::Authenticated)
    }

    /// The storefront's rule table. Order is load-bearing: preflight first, then the method-specific admin rules
    /// for the banner subtree ahead of the blanket public rule that also covers it.
    pub fn storefront_defaults() -> Self {
        Self::new()
            // CORS preflight is always allowed through, whatever the path.
            .public(Some(Method::OPTIONS), "/**")
            .public(Some(Method::POST), "/api/ai/**")
            .public(Some(Method::POST), "/api/auth/login")
            .public(Some(Method::POST), "/api/auth/register")
            // The OAuth2 redirect endpoints and the health probe are reached without a bearer token.
            .public(None, "/oauth2/**")
            .public(None, "/login/oauth2/**")
            .public(None, "/health")
            .admin_only(None, "/api/admin/**")
            // Mutating banner calls re-restrict a subtree the next block opens to everyone.
            .admin_only(Some(Method::POST), "/api/banners/**")
            .admin_only(Some(Method::PUT), "/api/banners/**")
            .admin_only(Some(Method::DELETE), "/api/banners/**")
            .public(None, "/")
            .public(None, "/api/products/**")
            .public(None, "/api/categories/**")
            .public(None, "/uploads/**")
            .public(None, "/api/upload/**")
            .public(None, "/api/banners/**")
            .admin_only(None, "/api/orders/all")
            .admin_only(Some(Method::PUT), "/api/orders/*/status")
            .require(None, "/api/orders/**", Requirement::Authenticated)
        // Everything else, news, reviews and the profile endpoint included, falls through to `Authenticated`.
    }
}

#[cfg(test)]
mod test {
    use actix_web::http::Method;
    use storefront_engine::db_types::Role;

    use super::{AccessPolicy, PathPattern, Requirement};

    #[test]
    fn wildcard_matches_exactly_one_segment() {
        let p = PathPattern::parse("/api/orders/*/status");
        assert!(p.matches("/api/orders/42/status"));
        assert!(!p.matches("/api/orders/status"));
        assert!(!p.matches("/api/orders/42/status/extra"));
        assert!(!p.matches("/api/orders/42"));
    }

    #[test]
    fn subtree_matches_the_prefix_itself_and_below() {
        let p = PathPattern::parse("/api/ai/**");
        assert!(p.matches("/api/ai"));
        assert!(p.matches("/api/ai/chat"));
        assert!(p.matches("/api/ai/chat/deeper/still"));
        assert!(!p.matches("/api/aix"));
        assert!(!p.matches("/api"));
    }

    #[test]
    fn root_subtree_matches_everything() {
        let p = PathPattern::parse("/**");
        assert!(p.matches("/"));
        assert!(p.matches("/anything"));
        assert!(p.matches("/deeply/nested/path"));
    }

    #[test]
    fn catalog_and_upload_subtrees_are_public_for_every_method() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::GET, "/"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/api/products"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/api/products/search"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::POST, "/api/products"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::PUT, "/api/products/7"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::DELETE, "/api/categories/3"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::POST, "/api/upload"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/uploads/logo.png"), Requirement::Public);
    }

    #[test]
    fn banner_rules_depend_on_the_method_not_just_the_path() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::GET, "/api/banners"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/api/banners/active"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::POST, "/api/banners"), Requirement::Role(Role::Admin));
        assert_eq!(policy.required_for(&Method::PUT, "/api/banners/2"), Requirement::Role(Role::Admin));
        assert_eq!(policy.required_for(&Method::DELETE, "/api/banners/2"), Requirement::Role(Role::Admin));
    }

    #[test]
    fn chat_proxy_is_public_for_post_only() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::POST, "/api/ai/chat"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/api/ai/chat"), Requirement::Authenticated);
    }

    #[test]
    fn preflight_is_allowed_everywhere_even_on_admin_paths() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::OPTIONS, "/api/admin/users"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::OPTIONS, "/api/orders/all"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::OPTIONS, "/api/banners"), Requirement::Public);
    }

    #[test]
    fn auth_entry_points_are_public_but_the_profile_is_not() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::POST, "/api/auth/login"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::POST, "/api/auth/register"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/oauth2/callback/google"), Requirement::Public);
        assert_eq!(policy.required_for(&Method::GET, "/api/auth/me"), Requirement::Authenticated);
    }

    #[test]
    fn order_routes_split_between_owner_and_admin() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::POST, "/api/orders"), Requirement::Authenticated);
        assert_eq!(policy.required_for(&Method::GET, "/api/orders/mine"), Requirement::Authenticated);
        assert_eq!(policy.required_for(&Method::GET, "/api/orders/all"), Requirement::Role(Role::Admin));
        assert_eq!(policy.required_for(&Method::PUT, "/api/orders/5/status"), Requirement::Role(Role::Admin));
        assert_eq!(policy.required_for(&Method::DELETE, "/api/orders/5"), Requirement::Authenticated);
    }

    #[test]
    fn admin_user_management_requires_the_admin_role() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::GET, "/api/admin/users"), Requirement::Role(Role::Admin));
        assert_eq!(policy.required_for(&Method::DELETE, "/api/admin/users/4"), Requirement::Role(Role::Admin));
    }

    #[test]
    fn unlisted_routes_fail_closed() {
        let policy = AccessPolicy::storefront_defaults();
        assert_eq!(policy.required_for(&Method::GET, "/api/news"), Requirement::Authenticated);
        assert_eq!(policy.required_for(&Method::GET, "/api/reviews/7"), Requirement::Authenticated);
        assert_eq!(policy.required_for(&Method::GET, "/api/unheard/of"), Requirement::Authenticated);
        assert_eq!(policy.required_for(&Method::POST, "/totally/unknown"), Requirement::Authenticated);
    }
}
