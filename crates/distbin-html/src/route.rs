//! Path-based route table.
//!
//! Routes are tried in insertion order and the first match wins. An exact
//! route matches the path byte-for-byte; a pattern route matches a regex and
//! hands its capture groups, in order, to the handler factory.

use regex::Regex;

/// How a route matches a request path.
#[derive(Debug, Clone)]
pub enum RouteMatcher {
    /// Case-sensitive, unnormalized equality.
    Exact(String),
    /// Regex match; captures become factory arguments.
    Pattern(Regex),
}

impl RouteMatcher {
    /// Capture groups if `path` matches. Exact matches capture nothing.
    ///
    /// Groups that did not participate in the match are passed as `""`.
    fn captures(&self, path: &str) -> Option<Vec<String>> {
        match self {
            Self::Exact(expected) => (path == expected).then(Vec::new),
            Self::Pattern(regex) => regex.captures(path).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }),
        }
    }
}

type Factory<H> = Box<dyn Fn(Vec<String>) -> H + Send + Sync>;

/// Ordered route table producing handlers of type `H`.
pub struct RouteTable<H> {
    routes: Vec<(RouteMatcher, Factory<H>)>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route matching `path` exactly.
    pub fn exact<F>(mut self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.routes
            .push((RouteMatcher::Exact(path.into()), Box::new(move |_| factory())));
        self
    }

    /// Add a route matching `pattern`; the factory receives its capture groups.
    pub fn pattern<F>(mut self, pattern: Regex, factory: F) -> Self
    where
        F: Fn(Vec<String>) -> H + Send + Sync + 'static,
    {
        self.routes
            .push((RouteMatcher::Pattern(pattern), Box::new(factory)));
        self
    }

    /// Build the handler for a request target, or `None` if nothing matches.
    ///
    /// Query string and fragment are ignored.
    pub fn route(&self, target: &str) -> Option<H> {
        let path = request_path(target);
        self.routes.iter().find_map(|(matcher, factory)| {
            matcher.captures(path).map(|args| factory(args))
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> std::fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|(matcher, _)| matcher))
            .finish()
    }
}

/// Strip the query string and fragment from a request target.
fn request_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}
