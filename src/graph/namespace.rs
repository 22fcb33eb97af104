//! Prefix bindings and qualified-name computation.
//!
//! Qualified names follow XML name rules: the local part is the longest
//! trailing run of name characters, starting at its first letter, digit or
//! underscore. IRIs that cannot be split have no qualified name.

use std::collections::BTreeMap;

use crate::vocab;

/// Characters allowed in a local name besides letters and digits.
const EXTRA_NAME_CHARS: [char; 8] = ['\u{00B7}', '\u{0387}', '-', '.', '_', '%', '(', ')'];

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Bound prefix, if the namespace has one.
    pub prefix: Option<String>,
    pub namespace: String,
    pub local: String,
}

/// Prefix → namespace bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    /// Bindings for the fixed vocabulary.
    pub fn new() -> Self {
        let mut ns = Self::empty();
        for (prefix, namespace) in vocab::DEFAULT_PREFIXES {
            ns.bind(prefix, namespace);
        }
        ns
    }

    /// No bindings at all.
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `prefix` to `namespace`, replacing any previous binding of the prefix.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.bindings.insert(prefix.into(), namespace.into());
    }

    /// The prefix bound to `namespace`, if any.
    pub fn prefix_of(&self, namespace: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// `(prefix, namespace)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Split `iri` into namespace and local name.
    pub fn compute_qname(&self, iri: &str) -> Option<QName> {
        let bound = self
            .bindings
            .values()
            .filter(|ns| {
                iri.len() > ns.len()
                    && iri.starts_with(ns.as_str())
                    && is_local_name(&iri[ns.len()..])
            })
            .max_by_key(|ns| ns.len());
        let (namespace, local) = match bound {
            Some(ns) => (ns.clone(), iri[ns.len()..].to_string()),
            None => {
                let (ns, local) = split_iri(iri)?;
                (ns.to_string(), local.to_string())
            }
        };
        Some(QName {
            prefix: self.prefix_of(&namespace).map(str::to_string),
            namespace,
            local,
        })
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || EXTRA_NAME_CHARS.contains(&c)
}

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_local_name(s: &str) -> bool {
    s.chars().next().is_some_and(is_name_start) && s.chars().all(is_name_char)
}

/// Split an IRI into `(namespace, local)` by XML name rules.
pub fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let (boundary, _) = iri.char_indices().rev().find(|&(_, c)| !is_name_char(c))?;
    let (start, _) = iri[boundary..]
        .char_indices()
        .find(|&(_, c)| is_name_start(c))?;
    let split = boundary + start;
    if split == 0 {
        return None;
    }
    Some((&iri[..split], &iri[split..]))
}

/// Renders `prefix:local` names, inventing `ns1`, `ns2`, ... for namespaces
/// without a binding.
#[derive(Debug)]
pub struct QNameResolver<'a> {
    namespaces: &'a Namespaces,
    generated: BTreeMap<String, String>,
}

impl<'a> QNameResolver<'a> {
    pub fn new(namespaces: &'a Namespaces) -> Self {
        Self {
            namespaces,
            generated: BTreeMap::new(),
        }
    }

    /// `prefix:local` for `iri`, or the IRI itself when it cannot be split.
    pub fn qname(&mut self, iri: &str) -> String {
        let Some(qname) = self.namespaces.compute_qname(iri) else {
            return iri.to_string();
        };
        let prefix = match qname.prefix {
            Some(prefix) => prefix,
            None => {
                let next = self.generated.len() + 1;
                self.generated
                    .entry(qname.namespace)
                    .or_insert_with(|| format!("ns{next}"))
                    .clone()
            }
        };
        format!("{prefix}:{}", qname.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_hash_and_slash() {
        assert_eq!(
            split_iri("http://schema.org/defaultValue"),
            Some(("http://schema.org/", "defaultValue"))
        );
        assert_eq!(
            split_iri("http://odahub.io/ontology#isUsing"),
            Some(("http://odahub.io/ontology#", "isUsing"))
        );
    }

    #[test]
    fn local_name_may_start_with_digit() {
        assert_eq!(
            split_iri("https://renkulab.io/plans/84d9b437-4a55"),
            Some(("https://renkulab.io/plans/", "84d9b437-4a55"))
        );
    }

    #[test]
    fn leading_punctuation_stays_in_namespace() {
        assert_eq!(
            split_iri("https://x.org/p/--ra_10.5"),
            Some(("https://x.org/p/--", "ra_10.5"))
        );
    }

    #[test]
    fn unsplittable() {
        assert_eq!(split_iri("abc"), None);
        assert_eq!(split_iri("https://x.org/"), None);
    }

    #[test]
    fn qname_uses_bound_prefix() {
        let ns = Namespaces::new();
        let q = ns.compute_qname(vocab::SCHEMA_DEFAULT_VALUE).unwrap();
        assert_eq!(q.prefix.as_deref(), Some("schema"));
        assert_eq!(q.local, "defaultValue");
    }

    #[test]
    fn resolver_invents_prefixes() {
        let ns = Namespaces::new();
        let mut resolver = QNameResolver::new(&ns);
        assert_eq!(resolver.qname("https://a.org/x#p"), "ns1:p");
        assert_eq!(resolver.qname("https://b.org/y#q"), "ns2:q");
        assert_eq!(resolver.qname("https://a.org/x#r"), "ns1:r");
        assert_eq!(resolver.qname(vocab::XSD_DATE_TIME), "xsd:dateTime");
    }
}
