use balanced_bst::avl::Tree;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a `BTreeMap`.
/// This way we can ensure that after a random smattering of inserts
/// and erases we have the same set of keys in the map.
fn do_ops<K, V>(ops: &[Op<K, V>], bst: &mut Tree<K, V>, map: &mut BTreeMap<K, V>) -> bool
where
    K: Clone + Ord,
    V: PartialEq + Clone,
{
    ops.iter().all(|op| match op {
        Op::Insert(k, v) => {
            bst.insert(k.clone(), v.clone());
            map.insert(k.clone(), v.clone());
            bst.len() == map.len()
        }
        Op::Remove(k) => bst.erase(k) == map.remove(k) && bst.len() == map.len(),
    })
}

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
        let mut tree = Tree::new();
        let mut map = BTreeMap::new();

        do_ops(&ops, &mut tree, &mut map)
            && map.keys().all(|key| tree.find(key) == map.get(key))
    }

    fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }
        let added: HashSet<_> = xs.into_iter().collect();
        let nots: HashSet<_> = nots.into_iter().collect();
        let mut nots = nots.difference(&added);

        nots.all(|x| tree.find(x).is_none())
    }

    fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }
        for delete in &deletes {
            tree.erase(delete);
        }

        let deleted: HashSet<_> = deletes.iter().collect();
        deletes.iter().all(|x| tree.find(x).is_none())
            && xs.iter().filter(|x| !deleted.contains(x)).all(|x| tree.find(x) == Some(x))
    }

    fn duplicates_do_not_grow(xs: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for (i, x) in xs.iter().enumerate() {
            tree.insert(*x, i);
        }
        let distinct: HashSet<_> = xs.iter().collect();
        tree.len() == distinct.len()
    }
}
