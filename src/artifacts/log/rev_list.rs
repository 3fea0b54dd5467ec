use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

pub struct RevList<'r> {
    database: &'r Database,
    queue: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl<'r> RevList<'r> {
    /// Walk from `start`; `None` (unborn HEAD) yields nothing
    pub fn new(database: &'r Database, start: Option<ObjectId>) -> Self {
        let mut rev_list = RevList {
            database,
            queue: VecDeque::new(),
            seen: HashSet::new(),
        };
        if let Some(start) = start {
            rev_list.enqueue(start);
        }
        rev_list
    }

    fn enqueue(&mut self, oid: ObjectId) {
        if self.seen.insert(oid.clone()) {
            self.queue.push_back(oid);
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.queue.pop_front()?;

        match self.database.parse_commit(&oid) {
            Ok(commit) => {
                for parent in commit.parents() {
                    self.enqueue(parent.clone());
                }
                Some(Ok((oid, commit)))
            }
            Err(error) => {
                // stop the walk after reporting the broken commit
                self.queue.clear();
                Some(Err(error))
            }
        }
    }
}
