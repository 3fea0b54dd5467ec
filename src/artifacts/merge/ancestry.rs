//! Commit graph walks
//!
//! Reachability follows every parent, so the second parent of a merge commit
//! counts as an ancestor. The lowest common ancestor search walks first
//! parents only: each head contributes its first-parent chain and the first
//! commit of one chain found in the other is the merge base. Nested merges can
//! therefore produce a base that is older than the best one.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Graph walker over a parent loader
pub struct Ancestry<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parents_of: ParentsFn,
}

impl<ParentsFn> Ancestry<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_of: ParentsFn) -> Self {
        Ancestry { parents_of }
    }

    /// Whether `ancestor` is reachable from `descendant`; a commit is its own
    /// ancestor
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([descendant.clone()]);

        while let Some(oid) = queue.pop_front() {
            if &oid == ancestor {
                return Ok(true);
            }
            if !visited.insert(oid.clone()) {
                continue;
            }
            queue.extend((self.parents_of)(&oid)?);
        }

        Ok(false)
    }

    /// `start` followed by its first parent, its first parent's first parent
    /// and so on down to a root commit
    pub fn first_parent_chain(&self, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        let mut chain = Vec::new();
        let mut current = Some(start.clone());

        while let Some(oid) = current {
            current = (self.parents_of)(&oid)?.into_iter().next();
            chain.push(oid);
        }

        Ok(chain)
    }

    /// Nearest commit shared by the first-parent chains of both heads
    pub fn lowest_common_ancestor(
        &self,
        ours: &ObjectId,
        theirs: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let their_chain = self
            .first_parent_chain(theirs)?
            .into_iter()
            .collect::<HashSet<_>>();

        let base = self
            .first_parent_chain(ours)?
            .into_iter()
            .find(|oid| their_chain.contains(oid));

        tracing::debug!(
            ours = %ours.to_short_oid(),
            theirs = %theirs.to_short_oid(),
            base = ?base.as_ref().map(ObjectId::to_short_oid),
            "lowest common ancestor"
        );

        Ok(base)
    }
}
