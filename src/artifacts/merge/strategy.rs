use crate::artifacts::merge::ancestry::Ancestry;
use crate::artifacts::objects::object_id::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The merged head is already contained in ours
    AlreadyUpdated,
    /// Ours is contained in the merged head; just move the branch
    FastForward,
    /// Histories diverged; `base` is `None` for unrelated histories
    Recursive { base: Option<ObjectId> },
}

impl MergeStrategy {
    pub fn select<ParentsFn>(
        ancestry: &Ancestry<ParentsFn>,
        ours: &ObjectId,
        theirs: &ObjectId,
    ) -> anyhow::Result<Self>
    where
        ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
    {
        let strategy = if ancestry.is_ancestor(theirs, ours)? {
            MergeStrategy::AlreadyUpdated
        } else if ancestry.is_ancestor(ours, theirs)? {
            MergeStrategy::FastForward
        } else {
            MergeStrategy::Recursive {
                base: ancestry.lowest_common_ancestor(ours, theirs)?,
            }
        };

        tracing::info!(?strategy, "selected merge strategy");
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn oid(name: &str) -> ObjectId {
        ObjectId::hash_of(name.as_bytes())
    }

    fn select(graph: &[(&str, &[&str])], ours: &str, theirs: &str) -> MergeStrategy {
        let parents = graph
            .iter()
            .map(|(name, parents)| (oid(name), parents.iter().map(|p| oid(p)).collect::<Vec<_>>()))
            .collect::<HashMap<_, _>>();
        let ancestry = Ancestry::new(|commit: &ObjectId| {
            Ok(parents.get(commit).cloned().unwrap_or_default())
        });

        MergeStrategy::select(&ancestry, &oid(ours), &oid(theirs)).unwrap()
    }

    const GRAPH: &[(&str, &[&str])] = &[("A", &[]), ("B", &["A"]), ("C", &["B"]), ("D", &["B"])];

    #[test]
    fn merging_an_ancestor_is_a_no_op() {
        assert_eq!(select(GRAPH, "C", "A"), MergeStrategy::AlreadyUpdated);
        assert_eq!(select(GRAPH, "C", "C"), MergeStrategy::AlreadyUpdated);
    }

    #[test]
    fn merging_a_descendant_fast_forwards() {
        assert_eq!(select(GRAPH, "A", "C"), MergeStrategy::FastForward);
    }

    #[test]
    fn diverged_heads_merge_recursively_from_the_fork() {
        assert_eq!(
            select(GRAPH, "C", "D"),
            MergeStrategy::Recursive {
                base: Some(oid("B"))
            }
        );
    }
}
