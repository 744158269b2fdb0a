//! Order-preserving grouping

use std::collections::HashMap;
use std::hash::Hash;

/// Group `items` by `key`, keeping the first-seen order of keys and of the
/// values inside each group.
pub fn group_by_first_seen<K, V, I, F>(items: I, mut key: F) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = V>,
    F: FnMut(&V) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();

    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}
