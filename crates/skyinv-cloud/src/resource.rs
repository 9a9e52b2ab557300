//! Normalized resource model
//!
//! Every provider adapter exposes its resources through the capability traits
//! below. Filters and the inventory builder only ever see these traits, never
//! the provider-native records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag key used as the display name by providers without a native name field
pub const NAME_TAG: &str = "Name";

/// Kind of a cloud resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Host,
    Vpc,
    Subnet,
    Database,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Host => write!(f, "host"),
            ResourceKind::Vpc => write!(f, "vpc"),
            ResourceKind::Subnet => write!(f, "subnet"),
            ResourceKind::Database => write!(f, "database"),
        }
    }
}

/// Provider-assigned identifier, unique within provider and kind
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Display name of a resource (may be empty)
pub trait Named {
    fn name(&self) -> &str;
}

/// Provider tags / labels
pub trait Labeled {
    fn labels(&self) -> &HashMap<String, String>;

    fn label(&self, key: &str) -> Option<&str> {
        self.labels().get(key).map(String::as_str)
    }
}

/// Any resource a filter can be evaluated against
///
/// Capabilities are looked up at run time: a resource that does not carry a
/// capability returns `None`, and filters that need it reject the resource.
pub trait Resource: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn as_named(&self) -> Option<&dyn Named> {
        None
    }

    fn as_labeled(&self) -> Option<&dyn Labeled> {
        None
    }
}

/// Addresses attached to a host
///
/// `private` lists every attached interface in provider order; `public` lists
/// only the interfaces with a NAT/public mapping, in the same relative order.
/// The two lists are not positionally aligned beyond index 0 being "primary".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interfaces {
    pub public: Vec<String>,
    pub private: Vec<String>,
}

impl Interfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one interface; the public address is kept only if non-empty
    pub fn push(&mut self, private: impl Into<String>, public: Option<&str>) {
        self.private.push(private.into());
        if let Some(public) = public.filter(|p| !p.is_empty()) {
            self.public.push(public.to_string());
        }
    }

    pub fn primary_private(&self) -> Option<&str> {
        self.private.first().map(String::as_str)
    }

    pub fn primary_public(&self) -> Option<&str> {
        self.public.first().map(String::as_str)
    }
}

pub trait Host: Resource + Identifiable + Named + Labeled {
    fn interfaces(&self) -> Interfaces;
}

pub trait Vpc: Resource + Identifiable + Named + Labeled {}

pub trait Subnet: Resource + Identifiable + Named + Labeled {
    fn vpc_id(&self) -> &str;

    fn cidrs(&self) -> &[String];
}

pub trait CloudDb: Resource + Identifiable + Named + Labeled {
    /// Connection URI with an embedded `database` query parameter
    fn endpoint(&self) -> &str;
}

/// Convert a provider tag list to a map; the last duplicate key wins
pub fn tags_to_map<'a, I>(tags: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    tags.into_iter()
        .filter_map(|(key, value)| Some((key?.to_string(), value.unwrap_or_default().to_string())))
        .collect()
}

/// Read the `Name` tag, or an empty string
pub fn name_from_tags(labels: &HashMap<String, String>) -> String {
    labels.get(NAME_TAG).cloned().unwrap_or_default()
}

/// Implements `Resource` with both `Named` and `Labeled` capabilities
#[macro_export]
macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl $crate::Resource for $ty {
            fn kind(&self) -> $crate::ResourceKind {
                $kind
            }

            fn as_named(&self) -> Option<&dyn $crate::Named> {
                Some(self)
            }

            fn as_labeled(&self) -> Option<&dyn $crate::Labeled> {
                Some(self)
            }
        }
    };
}
