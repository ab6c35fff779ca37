use crate::entity::PanelKey;

/// Bitset of panels keyed by [`PanelKey::index`].
///
/// Iteration yields keys in ascending index order, which is world insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSet {
    words: Vec<u64>,
    len: usize,
}

impl PanelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: PanelKey) -> bool {
        let (word, bit) = word_bit(key.index());
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Returns `true` if `key` was not already present.
    pub fn insert(&mut self, key: PanelKey) -> bool {
        let (word, bit) = word_bit(key.index());
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }

    /// Returns `true` if `key` was present.
    pub fn remove(&mut self, key: PanelKey) -> bool {
        let (word, bit) = word_bit(key.index());
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1u64 << bit;
        if (*w & mask) == 0 {
            return false;
        }
        *w &= !mask;
        self.len -= 1;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = PanelKey> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            let base = (word_idx as u32) * 64;
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let tz = rest.trailing_zeros();
                rest &= rest - 1;
                Some(PanelKey(base + tz))
            })
        })
    }
}

fn word_bit(index: u32) -> (usize, u32) {
    ((index / 64) as usize, index % 64)
}

#[cfg(test)]
mod tests {
    use super::PanelSet;
    use crate::entity::PanelKey;

    #[test]
    fn insert_remove_contains_and_len() {
        let mut s = PanelSet::new();
        assert!(s.is_empty());
        assert!(s.insert(PanelKey(1)));
        assert!(!s.insert(PanelKey(1)));
        assert!(s.contains(PanelKey(1)));
        assert_eq!(s.len(), 1);

        assert!(s.remove(PanelKey(1)));
        assert!(!s.remove(PanelKey(1)));
        assert!(!s.remove(PanelKey(500)));
        assert!(s.is_empty());
    }

    #[test]
    fn iterates_in_key_order_across_words() {
        let mut s = PanelSet::new();
        for k in [65, 2, 10, 64, 130] {
            s.insert(PanelKey(k));
        }
        let got: Vec<u32> = s.iter().map(|k| k.index()).collect();
        assert_eq!(got, vec![2, 10, 64, 65, 130]);
    }

    #[test]
    fn clear_empties() {
        let mut s = PanelSet::new();
        s.insert(PanelKey(3));
        s.clear();
        assert!(s.is_empty());
        assert!(!s.contains(PanelKey(3)));
    }
}
