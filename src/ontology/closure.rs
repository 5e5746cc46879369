use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Computes every (descendant, ancestor) pair reachable through one or more
/// `child -> parent` edges.
///
/// Each term is expanded breadth-first with its own visited set, so a cycle
/// stops the walk instead of looping. With `include_self`, every term seen in
/// `edges` (roots included) is also paired with itself; without it no
/// self-pair is emitted, even when a cycle leads back to the start.
///
/// The result is sorted and free of duplicates.
pub fn transitive_closure<'a>(
    edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    include_self: bool,
) -> BTreeSet<(&'a str, &'a str)> {
    let mut parents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut terms: BTreeSet<&str> = BTreeSet::new();

    for (child, parent) in edges {
        parents.entry(child).or_default().insert(parent);
        terms.insert(child);
        terms.insert(parent);
    }

    let mut pairs = BTreeSet::new();
    for &start in &terms {
        if include_self {
            pairs.insert((start, start));
        }

        let mut visited: BTreeSet<&str> = BTreeSet::new();
        visited.insert(start);
        let mut queue: VecDeque<&str> = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let Some(direct) = parents.get(current) else {
                continue;
            };
            for &ancestor in direct {
                if visited.insert(ancestor) {
                    pairs.insert((start, ancestor));
                    queue.push_back(ancestor);
                }
            }
        }
    }

    pairs
}
