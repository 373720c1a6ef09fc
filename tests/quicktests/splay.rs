use balanced_bst::splay::Tree;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

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

    fn finds_do_not_change_contents(xs: Vec<i8>, probes: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        for x in &xs {
            tree.insert(*x, *x);
        }
        let len = tree.len();
        for probe in &probes {
            tree.find(probe);
        }

        tree.len() == len && xs.iter().all(|x| tree.find(x) == Some(x))
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
}
