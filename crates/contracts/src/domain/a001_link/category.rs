use serde::{Deserialize, Serialize};

use super::aggregate::Link;

/// Root categories used when nothing else is configured.
pub const DEFAULT_CATEGORY_ROOTS: [&str; 4] = ["common", "grade-1", "grade-2", "grade-3"];

/// Bucket for links whose label matches no known root.
pub const DEFAULT_CATEGORY: &str = "common";

/// Separator between a root label and a sub-group suffix (`grade-1-A`).
pub const SUB_SEPARATOR: char = '-';

/// Position of a link in the two-level category hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryPath {
    pub root: String,
    /// Full sub-category label (`grade-1-A`), `None` for links placed
    /// directly under the root.
    pub sub: Option<String>,
}

impl CategoryPath {
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            sub: None,
        }
    }

    /// Part of the sub label after `root-`, e.g. `A` for `grade-1-A`.
    pub fn suffix(&self) -> Option<&str> {
        let sub = self.sub.as_deref()?;
        sub.strip_prefix(self.root.as_str())
            .and_then(|rest| rest.strip_prefix(SUB_SEPARATOR))
    }
}

/// Known root labels plus the default bucket.
///
/// Roots are kept in display order; the default root is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRoots {
    roots: Vec<String>,
    default_root: String,
}

impl Default for CategoryRoots {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORY_ROOTS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_CATEGORY,
        )
    }
}

impl CategoryRoots {
    pub fn new(roots: Vec<String>, default_root: impl Into<String>) -> Self {
        let default_root = default_root.into().trim().to_string();
        let mut cleaned: Vec<String> = Vec::with_capacity(roots.len() + 1);
        for root in roots {
            let root = root.trim().to_string();
            if !root.is_empty() && !cleaned.contains(&root) {
                cleaned.push(root);
            }
        }
        if !cleaned.contains(&default_root) {
            cleaned.insert(0, default_root.clone());
        }
        Self {
            roots: cleaned,
            default_root,
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn default_root(&self) -> &str {
        &self.default_root
    }

    pub fn contains(&self, label: &str) -> bool {
        self.roots.iter().any(|r| r == label)
    }

    /// Roots other than the default bucket (the school grades).
    pub fn grades(&self) -> impl Iterator<Item = &str> {
        self.roots
            .iter()
            .map(String::as_str)
            .filter(move |r| *r != self.default_root)
    }

    /// Label to store for a link; a missing or blank label becomes the
    /// default root.
    pub fn normalize_label(&self, label: Option<&str>) -> String {
        match label.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => self.default_root.clone(),
        }
    }

    /// Map a free-text label to its hierarchy position.
    ///
    /// - exact root → `(root, None)`
    /// - `root-suffix` with a non-empty suffix → `(root, Some(label))`,
    ///   longest matching root wins
    /// - anything else → `(default, None)`
    pub fn classify(&self, label: &str) -> CategoryPath {
        let label = label.trim();

        if self.contains(label) {
            return CategoryPath::root(label);
        }

        let matched = self
            .roots
            .iter()
            .filter(|root| {
                label
                    .strip_prefix(root.as_str())
                    .and_then(|rest| rest.strip_prefix(SUB_SEPARATOR))
                    .is_some_and(|suffix| !suffix.trim().is_empty())
            })
            .max_by_key(|root| root.len());

        match matched {
            Some(root) => CategoryPath {
                root: root.clone(),
                sub: Some(label.to_string()),
            },
            None => CategoryPath::root(self.default_root.clone()),
        }
    }
}

/// Links of one sub-category (`grade-1-A`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryGroup {
    pub label: String,
    pub suffix: String,
    pub links: Vec<Link>,
}

/// All links under one root: direct links first, then sub-groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub root: String,
    pub links: Vec<Link>,
    pub subgroups: Vec<SubCategoryGroup>,
}

impl CategoryGroup {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.subgroups.is_empty()
    }
}

/// Build the two-level hierarchy for display.
///
/// Uses the path stored on each link. A stored root that is no longer
/// configured lands in the default group. Groups follow the configured root
/// order, sub-groups are sorted by label, and links keep their input order.
pub fn group_links(links: &[Link], roots: &CategoryRoots) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = roots
        .roots()
        .iter()
        .map(|root| CategoryGroup {
            root: root.clone(),
            links: Vec::new(),
            subgroups: Vec::new(),
        })
        .collect();

    for link in links {
        let path = &link.category_path;
        let (group_idx, sub) = match roots.roots().iter().position(|r| *r == path.root) {
            Some(idx) => (idx, path.sub.as_deref()),
            None => {
                let idx = roots
                    .roots()
                    .iter()
                    .position(|r| r == roots.default_root())
                    .unwrap_or(0);
                (idx, None)
            }
        };
        let group = &mut groups[group_idx];

        match sub {
            None => group.links.push(link.clone()),
            Some(label) => {
                match group.subgroups.iter_mut().find(|s| s.label == label) {
                    Some(existing) => existing.links.push(link.clone()),
                    None => group.subgroups.push(SubCategoryGroup {
                        label: label.to_string(),
                        suffix: path.suffix().unwrap_or(label).to_string(),
                        links: vec![link.clone()],
                    }),
                }
            }
        }
    }

    for group in &mut groups {
        group.subgroups.sort_by(|a, b| a.label.cmp(&b.label));
    }

    groups
}
