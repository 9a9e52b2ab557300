//! Resource filters
//!
//! A filter decides whether a single resource is selected, independent of the
//! provider that produced it. Each variant asks the resource for the
//! capability it needs and rejects the resource when it is missing.

use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Select everything
    #[default]
    AcceptAll,

    /// Every pair must be present as a label with a case-insensitively equal value
    LabelEquals(BTreeMap<String, String>),

    /// Case-insensitive full match on the resource name
    NameEquals(String),
}

impl Filter {
    pub fn label_equals<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::LabelEquals(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn name_equals(name: impl Into<String>) -> Self {
        Self::NameEquals(name.into())
    }

    /// Select resources of a workspace (`workspace` label)
    pub fn workspace(workspace: impl Into<String>) -> Self {
        Self::label_equals([("workspace", workspace.into())])
    }

    pub fn check<R: Resource + ?Sized>(&self, resource: &R) -> bool {
        match self {
            Filter::AcceptAll => true,
            Filter::LabelEquals(expected) => {
                let Some(labeled) = resource.as_labeled() else {
                    return false;
                };
                let labels = labeled.labels();
                expected.iter().all(|(key, value)| {
                    labels
                        .get(key)
                        .is_some_and(|actual| equal_fold(actual, value))
                })
            }
            Filter::NameEquals(expected) => resource
                .as_named()
                .is_some_and(|named| equal_fold(named.name(), expected)),
        }
    }

    /// Keep the matching resources, preserving their relative order
    pub fn apply<T: Resource + ?Sized>(&self, resources: Vec<Box<T>>) -> Vec<Box<T>> {
        let total = resources.len();
        let selected: Vec<Box<T>> = resources
            .into_iter()
            .filter(|r| self.check(r.as_ref()))
            .collect();
        tracing::debug!(total, selected = selected.len(), filter = ?self, "Applied filter");
        selected
    }
}

/// Apply an optional filter, defaulting to [`Filter::AcceptAll`]
pub fn apply<T: Resource + ?Sized>(filter: Option<&Filter>, resources: Vec<Box<T>>) -> Vec<Box<T>> {
    match filter {
        Some(filter) => filter.apply(resources),
        None => resources,
    }
}

/// Unicode case-insensitive equality, close to Go's `strings.EqualFold`
fn equal_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Labeled, Named, ResourceKind};
    use crate::testing::{StaticHost, StaticSubnet};
    use std::collections::HashMap;

    /// A resource that exposes no capabilities at all
    struct Opaque;

    impl Resource for Opaque {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Vpc
        }
    }

    /// Named but not labeled
    struct NameOnly(String);

    impl Named for NameOnly {
        fn name(&self) -> &str {
            &self.0
        }
    }

    impl Resource for NameOnly {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Database
        }

        fn as_named(&self) -> Option<&dyn Named> {
            Some(self)
        }
    }

    fn host(name: &str, labels: &[(&str, &str)]) -> StaticHost {
        StaticHost::new(format!("id-{}", name), name).with_labels(labels.iter().copied())
    }

    #[test]
    fn test_accept_all() {
        assert!(Filter::AcceptAll.check(&Opaque));
        assert!(Filter::default().check(&host("web1", &[])));
    }

    #[test]
    fn test_label_equals_empty_accepts_labeled() {
        let filter = Filter::LabelEquals(BTreeMap::new());
        assert!(filter.check(&host("web1", &[])));
    }

    #[test]
    fn test_label_equals_missing_key_rejects() {
        let filter = Filter::label_equals([("k", "v")]);
        assert!(!filter.check(&host("web1", &[("other", "v")])));
    }

    #[test]
    fn test_label_equals_case_insensitive_and_all_pairs() {
        let filter = Filter::label_equals([("workspace", "Prod"), ("group", "web")]);
        assert!(filter.check(&host("web1", &[("workspace", "prod"), ("group", "WEB")])));
        assert!(!filter.check(&host("web2", &[("workspace", "prod"), ("group", "db")])));
        assert!(!filter.check(&host("web3", &[("workspace", "prod")])));
    }

    #[test]
    fn test_label_equals_without_capability() {
        let filter = Filter::workspace("prod");
        assert!(!filter.check(&Opaque));
        assert!(!filter.check(&NameOnly("web".into())));
    }

    #[test]
    fn test_name_equals_case_insensitive() {
        let filter = Filter::name_equals("Web");
        assert!(filter.check(&host("web", &[])));
        assert!(filter.check(&NameOnly("WEB".into())));
        assert!(!filter.check(&host("web1", &[])));
        assert!(!filter.check(&Opaque));
    }

    #[test]
    fn test_name_equals_unicode_fold() {
        let filter = Filter::name_equals("Ärzte");
        assert!(filter.check(&NameOnly("ärzte".into())));
    }

    #[test]
    fn test_apply_preserves_order() {
        let resources: Vec<Box<StaticHost>> = vec![
            Box::new(host("c", &[("workspace", "prod")])),
            Box::new(host("a", &[("workspace", "dev")])),
            Box::new(host("b", &[("workspace", "prod")])),
            Box::new(host("d", &[])),
            Box::new(host("e", &[("workspace", "PROD")])),
        ];

        let selected = Filter::workspace("prod").apply(resources);
        let names: Vec<&str> = selected.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["c", "b", "e"]);
    }

    #[test]
    fn test_apply_over_trait_objects() {
        let subnet: Box<dyn crate::Subnet> = Box::new(
            StaticSubnet::new("s1", "v1", ["10.0.0.0/24"]).with_labels([("workspace", "prod")]),
        );
        let selected = apply(Some(&Filter::workspace("prod")), vec![subnet]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].labels(), &HashMap::from([("workspace".to_string(), "prod".to_string())]));

        let none = apply::<dyn crate::Subnet>(None, Vec::new());
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_is_shareable_across_threads() {
        let filter = std::sync::Arc::new(Filter::workspace("prod"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let filter = filter.clone();
                std::thread::spawn(move || {
                    let h = host(&format!("h{}", i), &[("workspace", "prod")]);
                    filter.check(&h)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
