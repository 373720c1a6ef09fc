use balanced_bst::treap::Tree;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>, priorities: Vec<u16>) -> bool {
        let mut tree = Tree::new();
        let mut map = BTreeMap::new();
        let mut priorities = priorities.into_iter().cycle();

        let agreed = ops.iter().all(|op| match op {
            Op::Insert(k, v) => {
                tree.insert(*k, priorities.next().unwrap_or(0), *v);
                map.insert(*k, *v);
                tree.len() == map.len()
            }
            Op::Remove(k) => tree.erase(k) == map.remove(k) && tree.len() == map.len(),
        });

        agreed && map.keys().all(|key| tree.find(key) == map.get(key))
    }

    fn with_deletions(xs: Vec<(i8, u8)>, deletes: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for (x, priority) in &xs {
            tree.insert(*x, *priority, *x);
        }
        for delete in &deletes {
            tree.erase(delete);
        }

        let deleted: HashSet<_> = deletes.iter().collect();
        deletes.iter().all(|x| tree.find(x).is_none())
            && xs
                .iter()
                .filter(|(x, _)| !deleted.contains(x))
                .all(|(x, _)| tree.find(x) == Some(x))
    }

    fn clear_is_idempotent(xs: Vec<(i8, u8)>) -> bool {
        let mut tree = Tree::new();
        for (x, priority) in &xs {
            tree.insert(*x, *priority, *x);
        }
        tree.clear();
        tree.clear();

        tree.is_empty() && xs.iter().all(|(x, _)| tree.find(x).is_none())
    }
}
