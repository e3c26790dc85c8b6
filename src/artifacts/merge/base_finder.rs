//! Merge-base discovery
//!
//! Finds a most recent common ancestor of two commits by bounded traversal of
//! the parent DAG:
//!
//! 1. Collect `ancestors(ours)` breadth-first; if `theirs` is among them, it
//!    is the base.
//! 2. Collect `ancestors(theirs)`; if `ours` is among them, it is the base.
//! 3. Otherwise walk breadth-first from `theirs` and return the first commit
//!    that is also an ancestor of `ours`.
//!
//! When several equally-good bases exist (criss-cross histories) the one
//! reached first from the target side wins; the walk order is fixed by the
//! parent lists, so the result is deterministic. Disjoint histories yield
//! `None`.
//!
//! The finder is parameterised over a commit loader so the traversal can run
//! against the object database or an in-memory graph in tests.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Cap on visited commits per traversal
const TRAVERSAL_LIMIT: usize = 1000;

/// Most-recent-common-ancestor finder over a commit loader
pub struct MergeBaseFinder<LoadFn>
where
    LoadFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    load_commit: LoadFn,
    limit: usize,
}

impl<LoadFn> MergeBaseFinder<LoadFn>
where
    LoadFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(load_commit: LoadFn) -> Self {
        MergeBaseFinder {
            load_commit,
            limit: TRAVERSAL_LIMIT,
        }
    }

    /// Find a most recent common ancestor of `ours` and `theirs`
    pub fn find(&self, ours: &ObjectId, theirs: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        if ours == theirs {
            return Ok(Some(ours.clone()));
        }

        let our_ancestors = self.ancestors(ours)?;
        if our_ancestors.contains(theirs) {
            return Ok(Some(theirs.clone()));
        }

        let their_ancestors = self.ancestors(theirs)?;
        if their_ancestors.contains(ours) {
            return Ok(Some(ours.clone()));
        }

        // first ancestor of ours reached while walking back from theirs
        let mut queue = VecDeque::from([theirs.clone()]);
        let mut visited = HashSet::from([theirs.clone()]);
        let mut count = 0;

        while let Some(current) = queue.pop_front() {
            count += 1;
            if count > self.limit {
                break;
            }

            if our_ancestors.contains(&current) {
                return Ok(Some(current));
            }

            for parent in (self.load_commit)(&current)?.parents {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(None)
    }

    /// All commits reachable from `start` (inclusive), bounded
    fn ancestors(&self, start: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
        let mut ancestors = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start.clone()]);
        let mut count = 0;

        while let Some(current) = queue.pop_front() {
            count += 1;
            if count > self.limit {
                break;
            }

            for parent in (self.load_commit)(&current)?.parents {
                if ancestors.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(ancestors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    /// In-memory commit graph standing in for the database
    #[derive(Debug, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, Vec<ObjectId>>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, oid: ObjectId, parents: Vec<ObjectId>) {
            self.commits.insert(oid, parents);
        }

        fn load(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
            let parents = self
                .commits
                .get(oid)
                .ok_or_else(|| anyhow::anyhow!("commit {} not in store", oid))?;

            Ok(SlimCommit {
                oid: oid.clone(),
                parents: parents.clone(),
            })
        }
    }

    fn oid(label: &str) -> ObjectId {
        let mut hex = String::new();
        for byte in label.as_bytes() {
            hex.push_str(&format!("{:02x}", byte));
        }
        while hex.len() < 40 {
            hex.push('0');
        }
        hex.truncate(40);
        ObjectId::try_parse(hex).expect("valid test id")
    }

    #[fixture]
    fn linear_history() -> InMemoryCommitStore {
        // a <- b <- c <- d
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid("a"), vec![]);
        store.add_commit(oid("b"), vec![oid("a")]);
        store.add_commit(oid("c"), vec![oid("b")]);
        store.add_commit(oid("d"), vec![oid("c")]);
        store
    }

    #[fixture]
    fn forked_history() -> InMemoryCommitStore {
        //     a
        //    / \
        //   b   c
        //   |   |
        //   d   e
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid("a"), vec![]);
        store.add_commit(oid("b"), vec![oid("a")]);
        store.add_commit(oid("c"), vec![oid("a")]);
        store.add_commit(oid("d"), vec![oid("b")]);
        store.add_commit(oid("e"), vec![oid("c")]);
        store
    }

    #[rstest]
    fn same_commit_is_its_own_base(linear_history: InMemoryCommitStore) {
        let finder = MergeBaseFinder::new(|id| linear_history.load(id));
        assert_eq!(finder.find(&oid("c"), &oid("c")).unwrap(), Some(oid("c")));
    }

    #[rstest]
    fn ancestor_of_the_other_side_is_the_base(linear_history: InMemoryCommitStore) {
        let finder = MergeBaseFinder::new(|id| linear_history.load(id));

        assert_eq!(finder.find(&oid("b"), &oid("d")).unwrap(), Some(oid("b")));
        assert_eq!(finder.find(&oid("d"), &oid("b")).unwrap(), Some(oid("b")));
    }

    #[rstest]
    fn fork_point_is_the_base_for_diverged_branches(forked_history: InMemoryCommitStore) {
        let finder = MergeBaseFinder::new(|id| forked_history.load(id));

        assert_eq!(finder.find(&oid("d"), &oid("e")).unwrap(), Some(oid("a")));
        assert_eq!(finder.find(&oid("e"), &oid("d")).unwrap(), Some(oid("a")));
    }

    #[rstest]
    fn merge_commits_follow_all_parents() {
        //     a
        //    / \
        //   b   c
        //    \ /
        //     m   (merge of b and c)
        //     |
        //     f
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid("a"), vec![]);
        store.add_commit(oid("b"), vec![oid("a")]);
        store.add_commit(oid("c"), vec![oid("a")]);
        store.add_commit(oid("m"), vec![oid("b"), oid("c")]);
        store.add_commit(oid("f"), vec![oid("m")]);

        let finder = MergeBaseFinder::new(|id| store.load(id));
        assert_eq!(finder.find(&oid("f"), &oid("c")).unwrap(), Some(oid("c")));
    }

    #[rstest]
    fn criss_cross_returns_one_of_the_valid_bases() {
        //     a
        //    / \
        //   b   c
        //   |\ /|
        //   | x |
        //   |/ \|
        //   d   e
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid("a"), vec![]);
        store.add_commit(oid("b"), vec![oid("a")]);
        store.add_commit(oid("c"), vec![oid("a")]);
        store.add_commit(oid("d"), vec![oid("b"), oid("c")]);
        store.add_commit(oid("e"), vec![oid("c"), oid("b")]);

        let finder = MergeBaseFinder::new(|id| store.load(id));
        let base = finder.find(&oid("d"), &oid("e")).unwrap().unwrap();
        assert!(base == oid("b") || base == oid("c"), "got {}", base);
    }

    #[rstest]
    fn disjoint_histories_have_no_base() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit(oid("a"), vec![]);
        store.add_commit(oid("b"), vec![oid("a")]);
        store.add_commit(oid("x"), vec![]);
        store.add_commit(oid("y"), vec![oid("x")]);

        let finder = MergeBaseFinder::new(|id| store.load(id));
        assert_eq!(finder.find(&oid("b"), &oid("y")).unwrap(), None);
    }
}
