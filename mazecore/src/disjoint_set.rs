/// Union-find over cell indices.
///
/// Cells are identified by their row-major index in the grid, so the structure is a plain arena
/// of parent pointers with path compression and union by size.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
    sets: usize,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            sets: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges sets of `left` and `right`, returns `false` if they were already joined.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }

        if self.size[left] < self.size[right] {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        self.size[left] += self.size[right];
        self.sets -= 1;

        true
    }

    pub fn same_set(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }

    pub fn set_size(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.size[root]
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};

    use super::DisjointSet;
    use crate::algorithms::Random;

    #[test]
    fn singletons() {
        let mut set = DisjointSet::new(4);
        assert_eq!(set.set_count(), 4);
        for i in 0..4 {
            assert_eq!(set.find(i), i);
            assert_eq!(set.set_size(i), 1);
        }
        assert!(!set.same_set(0, 1));
    }

    #[test]
    fn union_is_idempotent() {
        let mut set = DisjointSet::new(3);
        assert!(set.union(0, 1));
        assert!(!set.union(1, 0));
        assert_eq!(set.set_count(), 2);
        assert_eq!(set.set_size(0), 2);
        assert_eq!(set.find(0), set.find(1));
    }

    #[test]
    fn union_chain() {
        let mut set = DisjointSet::new(6);
        set.union(0, 1);
        set.union(2, 3);
        assert!(!set.same_set(1, 2));
        set.union(1, 3);
        assert!(set.same_set(0, 2));
        assert!(!set.same_set(0, 4));
        assert_eq!(set.set_size(3), 4);
        assert_eq!(set.set_count(), 3);
    }

    #[test]
    fn matches_naive_partition() {
        const N: usize = 40;
        let mut rng = Random::seed_from_u64(1234);
        let mut set = DisjointSet::new(N);
        // label[i] is a naive set id, relabelled on every merge
        let mut label: Vec<usize> = (0..N).collect();

        for _ in 0..30 {
            let (a, b) = (rng.gen_range(0..N), rng.gen_range(0..N));
            let merged = set.union(a, b);
            assert_eq!(merged, label[a] != label[b]);

            let (old, new) = (label[b], label[a]);
            for l in label.iter_mut().filter(|l| **l == old) {
                *l = new;
            }
        }

        for a in 0..N {
            assert!(set.same_set(a, a));
            for b in 0..N {
                let same = set.same_set(a, b);
                assert_eq!(same, label[a] == label[b]);
                assert_eq!(same, set.same_set(b, a));
                for c in 0..N {
                    if same && set.same_set(b, c) {
                        assert!(set.same_set(a, c));
                    }
                }
            }
        }

        let distinct = {
            let mut l = label.clone();
            l.sort_unstable();
            l.dedup();
            l.len()
        };
        assert_eq!(set.set_count(), distinct);
    }
}
