use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use balanced_bst::{avl, splay, treap};

#[derive(Clone)]
enum TreeEnum<K, V> {
    Map(BTreeMap<K, V>),
    Avl(avl::Tree<K, V>),
    Splay(splay::Tree<K, V>),
    Treap(treap::Tree<K, u32, V>),
}

impl<K, V> TreeEnum<K, V> {
    fn find(&mut self, k: &K) -> Option<&V>
    where
        K: Ord,
    {
        match self {
            Self::Map(t) => t.get(k),
            Self::Avl(t) => t.find(k),
            Self::Splay(t) => t.find(k),
            Self::Treap(t) => t.find(k),
        }
    }

    /// Only the treap looks at `priority`.
    fn insert(&mut self, k: K, v: V, priority: u32)
    where
        K: Ord,
    {
        match self {
            Self::Map(t) => {
                t.insert(k, v);
            }
            Self::Avl(t) => t.insert(k, v),
            Self::Splay(t) => t.insert(k, v),
            Self::Treap(t) => t.insert(k, priority, v),
        }
    }

    fn erase(&mut self, k: &K) -> Option<V>
    where
        K: Ord,
    {
        match self {
            Self::Map(t) => t.remove(k),
            Self::Avl(t) => t.erase(k),
            Self::Splay(t) => t.erase(k),
            Self::Treap(t) => t.erase(k),
        }
    }
}

/// Helper to bench a function on every tree.
/// It creates a group for the given name and closure and runs tests for various sizes and
/// implementations of BSTs before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut TreeEnum<i32, i32>, i32)) {
    let mut group = c.benchmark_group(name);
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_tree = num_nodes - 1;

        let mut tree_tests = [
            ("btreemap", TreeEnum::Map(BTreeMap::new())),
            ("avl", TreeEnum::Avl(avl::Tree::new())),
            ("splay", TreeEnum::Splay(splay::Tree::new())),
            ("treap", TreeEnum::Treap(treap::Tree::new())),
        ];
        // Ascending inserts: the worst case for an unbalanced BST. Treap priorities are drawn on
        // the caller's side, as the treap expects.
        for (_, tree) in &mut tree_tests {
            for x in 0..num_nodes {
                tree.insert(x as i32, x as i32, rng.gen());
            }
        }

        for (name, tree) in tree_tests {
            let id = BenchmarkId::new(name, largest_element_in_tree);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut tree = black_box(tree.clone());
                        let instant = std::time::Instant::now();
                        f(&mut tree, black_box(largest_element_in_tree as i32));
                        let elapsed = instant.elapsed();
                        time += elapsed;
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |tree, i| {
        let _value = black_box(tree.find(&i));
    });
    bench_helper(c, "erase", |tree, i| {
        black_box(tree.erase(&i));
    });

    bench_helper(c, "insert", |tree, i| {
        // A fixed priority so every iteration does the same work.
        tree.insert(i + 1, i + 1, u32::MAX / 2);
    });

    bench_helper(c, "find-miss", |tree, i| {
        let _value = black_box(tree.find(&(i + 1)));
    });
    bench_helper(c, "erase-miss", |tree, i| {
        black_box(tree.erase(&(i + 1)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
