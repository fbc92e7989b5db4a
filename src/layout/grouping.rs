//! Assignment of ring devices to the redundancy box that owns their ring.
//!
//! Matching is a decision table: each owner contributes one rule, rules are
//! tried in owner order and the first match wins. A leaf no rule claims goes
//! to the currently smallest bucket, so the result is always a total
//! partition of the leaves.

use regex::Regex;

use crate::config::ClassifierConfig;
use crate::topology::Node;

/// Network side markers carried by a name. Both flags may be set when a name
/// is ambiguous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideMarks {
    pub a: bool,
    pub b: bool,
}

impl SideMarks {
    pub fn overlaps(self, other: SideMarks) -> bool {
        (self.a && other.a) || (self.b && other.b)
    }

    pub fn is_empty(self) -> bool {
        !self.a && !self.b
    }
}

/// Reads side markers off device names. Naming conventions differ between
/// substations, so the heuristic is swappable.
pub trait SideClassifier {
    fn leaf_sides(&self, leaf: &Node) -> SideMarks;
    fn owner_sides(&self, owner: &Node) -> SideMarks;
}

/// `RingA_IED01` belongs to `RedBox_A`.
///
/// Owner names are matched loosely: a name carrying the configured suffix
/// marker, or containing the letter but not the other one, counts. Names
/// that contain both letters for unrelated reasons ("REDBOX A" contains a
/// `B`) end up unmarked and fall through to load balancing.
#[derive(Debug, Clone)]
pub struct NamingConventionClassifier {
    leaf_a: Option<Regex>,
    leaf_b: Option<Regex>,
    owner_a_marker: String,
    owner_b_marker: String,
}

impl NamingConventionClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            leaf_a: compile_pattern(&config.leaf_a_pattern),
            leaf_b: compile_pattern(&config.leaf_b_pattern),
            owner_a_marker: config.owner_a_marker.to_ascii_uppercase(),
            owner_b_marker: config.owner_b_marker.to_ascii_uppercase(),
        }
    }
}

impl Default for NamingConventionClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("ignoring invalid side pattern {pattern:?}: {err}");
            None
        }
    }
}

fn pattern_hits(re: &Option<Regex>, token: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(token))
}

impl SideClassifier for NamingConventionClassifier {
    fn leaf_sides(&self, leaf: &Node) -> SideMarks {
        let token = leaf.label_token().to_uppercase();
        SideMarks {
            a: pattern_hits(&self.leaf_a, &token),
            b: pattern_hits(&self.leaf_b, &token),
        }
    }

    fn owner_sides(&self, owner: &Node) -> SideMarks {
        let token = owner.label_token().to_uppercase();
        let has_a = token.contains('A');
        let has_b = token.contains('B');
        SideMarks {
            a: token.contains(&self.owner_a_marker) || (has_a && !has_b),
            b: token.contains(&self.owner_b_marker) || (has_b && !has_a),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub owner_id: String,
    pub members: Vec<&'a Node>,
}

/// Buckets in owner input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping<'a> {
    pub buckets: Vec<Bucket<'a>>,
}

impl<'a> Grouping<'a> {
    pub fn members(&self, owner_id: &str) -> &[&'a Node] {
        self.buckets
            .iter()
            .find(|bucket| bucket.owner_id == owner_id)
            .map(|bucket| bucket.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.members.len()).sum()
    }
}

struct OwnerRule {
    bucket: usize,
    sides: SideMarks,
}

/// Partitions `leaves` among `owners`. With no owners there is nowhere to put
/// anything and the grouping is empty.
pub fn group_leaves_by_owner<'a>(
    leaves: &[&'a Node],
    owners: &[&Node],
    classifier: &dyn SideClassifier,
) -> Grouping<'a> {
    let mut grouping = Grouping {
        buckets: owners
            .iter()
            .map(|owner| Bucket {
                owner_id: owner.id.clone(),
                members: Vec::new(),
            })
            .collect(),
    };
    if owners.is_empty() {
        return grouping;
    }

    let rules: Vec<OwnerRule> = owners
        .iter()
        .enumerate()
        .map(|(bucket, owner)| OwnerRule {
            bucket,
            sides: classifier.owner_sides(owner),
        })
        .filter(|rule| !rule.sides.is_empty())
        .collect();

    for leaf in leaves {
        let marks = classifier.leaf_sides(leaf);
        let bucket = match rules.iter().find(|rule| rule.sides.overlaps(marks)) {
            Some(rule) => rule.bucket,
            None => {
                let idx = least_loaded(&grouping.buckets);
                log::debug!(
                    "no side match for {}, balancing into {}",
                    leaf.label_token(),
                    grouping.buckets[idx].owner_id
                );
                idx
            }
        };
        grouping.buckets[bucket].members.push(*leaf);
    }

    grouping
}

// First bucket wins ties.
fn least_loaded(buckets: &[Bucket<'_>]) -> usize {
    let mut best = 0;
    for (idx, bucket) in buckets.iter().enumerate() {
        if bucket.members.len() < buckets[best].members.len() {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::DeviceKind;

    fn leaf(name: &str) -> Node {
        Node::new(name.to_lowercase(), name, DeviceKind::Ied)
    }

    fn owner(id: &str, name: &str) -> Node {
        Node::new(id, name, DeviceKind::RedundancyBox)
    }

    fn refs(nodes: &[Node]) -> Vec<&Node> {
        nodes.iter().collect()
    }

    #[test]
    fn routes_by_ring_marker() {
        let leaves = vec![leaf("RingA_IED01"), leaf("RingB_IED01"), leaf("ring_a relay")];
        let owners = vec![owner("rb-a", "RedBox_A"), owner("rb-b", "RedBox_B")];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &classifier);
        let a: Vec<&str> = grouping.members("rb-a").iter().map(|n| n.name.as_str()).collect();
        let b: Vec<&str> = grouping.members("rb-b").iter().map(|n| n.name.as_str()).collect();
        assert_eq!(a, vec!["RingA_IED01", "ring_a relay"]);
        assert_eq!(b, vec!["RingB_IED01"]);
    }

    #[test]
    fn first_matching_owner_wins() {
        let leaves = vec![leaf("RingA_01")];
        let owners = vec![owner("first", "Box_A"), owner("second", "Spare_A")];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &classifier);
        assert_eq!(grouping.members("first").len(), 1);
        assert!(grouping.members("second").is_empty());
    }

    #[test]
    fn unmarked_leaves_are_balanced() {
        let leaves: Vec<Node> = (0..11).map(|i| leaf(&format!("IED_{i}"))).collect();
        let owners = vec![
            owner("rb-1", "North"),
            owner("rb-2", "South"),
            owner("rb-3", "West"),
        ];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &classifier);
        let sizes: Vec<usize> = grouping.buckets.iter().map(|b| b.members.len()).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
        assert_eq!(grouping.total(), leaves.len());
    }

    #[test]
    fn balancing_fills_around_matched_leaves() {
        let leaves = vec![
            leaf("RingA_1"),
            leaf("RingA_2"),
            leaf("plain_1"),
            leaf("plain_2"),
        ];
        let owners = vec![owner("rb-a", "RedBox_A"), owner("rb-b", "RedBox_B")];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &classifier);
        assert_eq!(grouping.members("rb-a").len(), 2);
        assert_eq!(grouping.members("rb-b").len(), 2);
    }

    #[test]
    fn ambiguous_owner_names_fall_back() {
        // "REDBOX A" contains both letters and no suffix marker.
        let classifier = NamingConventionClassifier::default();
        let sides = classifier.owner_sides(&owner("x", "RedBox A"));
        assert!(sides.is_empty());
        let sides = classifier.owner_sides(&owner("y", "RedBox_A"));
        assert!(sides.a);
    }

    #[test]
    fn every_leaf_lands_in_exactly_one_bucket() {
        let leaves: Vec<Node> = (0..25)
            .map(|i| match i % 3 {
                0 => leaf(&format!("RingA_{i}")),
                1 => leaf(&format!("RingB_{i}")),
                _ => leaf(&format!("Dev{i}")),
            })
            .collect();
        let owners = vec![owner("rb-a", "RedBox_A"), owner("rb-b", "RedBox_B")];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &classifier);
        assert_eq!(grouping.total(), leaves.len());
        for node in &leaves {
            let hits = grouping
                .buckets
                .iter()
                .filter(|b| b.members.iter().any(|m| m.id == node.id))
                .count();
            assert_eq!(hits, 1, "{} placed {hits} times", node.id);
        }
    }

    #[test]
    fn custom_classifier_is_honoured() {
        struct Everything;
        impl SideClassifier for Everything {
            fn leaf_sides(&self, _: &Node) -> SideMarks {
                SideMarks { a: false, b: true }
            }
            fn owner_sides(&self, owner: &Node) -> SideMarks {
                SideMarks {
                    a: false,
                    b: owner.id == "last",
                }
            }
        }
        let leaves = vec![leaf("x"), leaf("y")];
        let owners = vec![owner("first", "1"), owner("last", "2")];
        let grouping = group_leaves_by_owner(&refs(&leaves), &refs(&owners), &Everything);
        assert_eq!(grouping.members("last").len(), 2);
    }

    #[test]
    fn no_owners_yields_no_buckets() {
        let leaves = vec![leaf("a")];
        let classifier = NamingConventionClassifier::default();
        let grouping = group_leaves_by_owner(&refs(&leaves), &[], &classifier);
        assert!(grouping.buckets.is_empty());
    }
}
