//! Template selection from a model path or model id.
//!
//! A [`TemplateResolver`] holds an ordered chain of [`Matcher`]s. A matcher
//! recognises a model in two ways:
//!
//! - exact, case-sensitive model-id aliases (`"llama-3"` -> `llama-3-instruct`);
//! - a heuristic over the model path, usually case-insensitive substrings.
//!
//! Resolution asks every matcher for an id alias first and only then runs the
//! path heuristics, so an explicit model id is never shadowed by a path that
//! happens to contain another family's name. Within each pass the first
//! registered matcher wins.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::registry::TemplateRegistry;
use crate::template::ChatTemplate;

type MatchFn = dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync;

/// A named recogniser proposing a template name for a model.
///
/// # Example
///
/// ```rust,ignore
/// let matcher = Matcher::new("vicuna")
///     .alias("vicuna", "vicuna_v1.1")
///     .path(|path| path.to_lowercase().contains("vicuna").then_some("vicuna_v1.1"));
/// ```
#[derive(Clone)]
pub struct Matcher {
    name: String,
    aliases: Vec<(String, String)>,
    func: Option<Arc<MatchFn>>,
}

impl Matcher {
    /// Create a matcher that recognises nothing yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            func: None,
        }
    }

    /// Map an exact model id to a template name.
    #[must_use]
    pub fn alias(mut self, model_id: impl Into<String>, template: impl Into<String>) -> Self {
        self.aliases.push((model_id.into(), template.into()));
        self
    }

    /// Set a heuristic over the model path. Returning `None` abstains.
    #[must_use]
    pub fn path<F, S>(self, func: F) -> Self
    where
        F: Fn(&str) -> Option<S> + Send + Sync + 'static,
        S: Into<String>,
    {
        self.func(move |path: &str, _id: Option<&str>| func(path))
    }

    /// Set a heuristic over both the model path and the model id.
    ///
    /// Replaces any heuristic set with [`path`](Self::path).
    #[must_use]
    pub fn func<F, S>(mut self, func: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<S> + Send + Sync + 'static,
        S: Into<String>,
    {
        let func: Arc<MatchFn> = Arc::new(move |path: &str, id: Option<&str>| -> Option<String> {
            func(path, id).map(Into::into)
        });
        self.func = Some(func);
        self
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template aliased to exactly `model_id`.
    #[must_use]
    pub fn match_id(&self, model_id: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(id, _)| id == model_id)
            .map(|(_, template)| template.as_str())
    }

    /// Template proposed by the path heuristic.
    #[must_use]
    pub fn match_path(&self, model_path: &str, model_id: Option<&str>) -> Option<String> {
        self.func.as_ref().and_then(|func| func(model_path, model_id))
    }

    /// Run this matcher alone: id aliases first, then the path heuristic.
    #[must_use]
    pub fn matches(&self, model_path: &str, model_id: Option<&str>) -> Option<String> {
        model_id
            .and_then(|id| self.match_id(id))
            .map(str::to_owned)
            .or_else(|| self.match_path(model_path, model_id))
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("has_path_heuristic", &self.func.is_some())
            .finish_non_exhaustive()
    }
}

/// Ordered chain of matchers; first match wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateResolver {
    matchers: Vec<Matcher>,
}

impl TemplateResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matcher to the end of the chain.
    pub fn register(&mut self, matcher: Matcher) {
        self.matchers.push(matcher);
    }

    /// Number of registered matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Check if no matchers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Matcher names in chain order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.matchers.iter().map(Matcher::name).collect()
    }

    /// First template name proposed by the chain, ignoring whether it exists.
    #[must_use]
    pub fn find(&self, model_path: &str, model_id: Option<&str>) -> Option<String> {
        self.proposals(model_path, model_id)
            .next()
            .map(|(_, name)| name)
    }

    /// First proposed template that exists in `registry`.
    ///
    /// A proposal naming an unregistered template is logged and skipped.
    #[must_use]
    pub fn resolve<'a>(
        &self,
        registry: &'a TemplateRegistry,
        model_path: &str,
        model_id: Option<&str>,
    ) -> Option<&'a ChatTemplate> {
        self.proposals(model_path, model_id)
            .find_map(|(matcher, name)| {
                if let Ok(template) = registry.get(&name) {
                    debug!(matcher = %matcher.name(), template = %name, model_path, ?model_id, "Chat template matched");
                    Some(template)
                } else {
                    warn!(matcher = %matcher.name(), template = %name, "Matcher proposed an unregistered chat template");
                    None
                }
            })
    }

    /// Every proposal in priority order: id aliases, then path heuristics.
    fn proposals<'s>(
        &'s self,
        model_path: &'s str,
        model_id: Option<&'s str>,
    ) -> impl Iterator<Item = (&'s Matcher, String)> {
        let by_id = self.matchers.iter().filter_map(move |matcher| {
            let template = matcher.match_id(model_id?)?;
            Some((matcher, template.to_owned()))
        });
        let by_path = self.matchers.iter().filter_map(move |matcher| {
            matcher
                .match_path(model_path, model_id)
                .map(|template| (matcher, template))
        });
        by_id.chain(by_path)
    }
}

impl Extend<Matcher> for TemplateResolver {
    fn extend<I: IntoIterator<Item = Matcher>>(&mut self, iter: I) {
        self.matchers.extend(iter);
    }
}

impl FromIterator<Matcher> for TemplateResolver {
    fn from_iter<I: IntoIterator<Item = Matcher>>(iter: I) -> Self {
        Self {
            matchers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contains(name: &'static str, needle: &'static str) -> Matcher {
        Matcher::new(name).path(move |path: &str| path.contains(needle).then_some(name))
    }

    fn registry(names: &[&str]) -> TemplateRegistry {
        names
            .iter()
            .map(|name| ChatTemplate::builder(*name).build())
            .collect()
    }

    mod matcher {
        use super::*;

        #[test]
        fn alias_is_exact() {
            let matcher = Matcher::new("m").alias("llama-3", "llama-3-instruct");
            assert_eq!(matcher.match_id("llama-3"), Some("llama-3-instruct"));
            assert_eq!(matcher.match_id("Llama-3"), None);
            assert_eq!(matcher.match_id("llama-3.1"), None);
        }

        #[test]
        fn alias_beats_path_within_matcher() {
            let matcher = Matcher::new("m")
                .alias("special", "by-id")
                .path(|_path: &str| Some("by-path"));
            assert_eq!(matcher.matches("x", Some("special")).as_deref(), Some("by-id"));
            assert_eq!(matcher.matches("x", Some("other")).as_deref(), Some("by-path"));
            assert_eq!(matcher.matches("x", None).as_deref(), Some("by-path"));
        }

        #[test]
        fn func_sees_model_id() {
            let matcher = Matcher::new("m").func(|path: &str, id: Option<&str>| {
                (path.is_empty() && id.is_some()).then_some("hit")
            });
            assert_eq!(matcher.matches("", Some("anything")).as_deref(), Some("hit"));
            assert!(matcher.matches("", None).is_none());
        }

        #[test]
        fn empty_matcher_abstains() {
            assert!(Matcher::new("m").matches("path", Some("id")).is_none());
        }

        #[test]
        fn debug_hides_function() {
            let debug = format!("{:?}", contains("named", "x"));
            assert!(debug.contains("named"));
            assert!(debug.contains("has_path_heuristic: true"));
            assert!(debug.ends_with(", .. }"));
        }
    }

    #[test]
    fn first_match_wins() {
        let resolver: TemplateResolver =
            [contains("a", "x"), contains("b", "x")].into_iter().collect();
        assert_eq!(resolver.find("xx", None).as_deref(), Some("a"));
        assert_eq!(resolver.names(), ["a", "b"]);
    }

    #[test]
    fn abstaining_matchers_are_skipped() {
        let resolver: TemplateResolver =
            [contains("a", "nope"), contains("b", "x")].into_iter().collect();
        assert_eq!(resolver.find("x", None).as_deref(), Some("b"));
        assert!(resolver.find("y", None).is_none());
    }

    #[test]
    fn id_alias_beats_earlier_path_heuristic() {
        let mut resolver = TemplateResolver::new();
        resolver.register(contains("early", "vicuna"));
        resolver.register(Matcher::new("late").alias("llama-3", "late"));

        assert_eq!(resolver.find("vicuna-7b", Some("llama-3")).as_deref(), Some("late"));
        assert_eq!(resolver.find("vicuna-7b", Some("unknown")).as_deref(), Some("early"));
        assert_eq!(resolver.find("vicuna-7b", None).as_deref(), Some("early"));
    }

    #[test]
    fn resolve_skips_unregistered_proposals() {
        let resolver: TemplateResolver =
            [contains("ghost", "x"), contains("real", "x")].into_iter().collect();
        let registry = registry(&["real"]);

        let template = resolver.resolve(&registry, "x", None).unwrap();
        assert_eq!(template.name(), "real");
        assert!(resolver.resolve(&registry, "y", None).is_none());
    }

    #[test]
    fn empty_resolver_matches_nothing() {
        let resolver = TemplateResolver::new();
        assert!(resolver.is_empty());
        assert_eq!(resolver.len(), 0);
        assert!(resolver.find("anything", Some("id")).is_none());
    }
}
