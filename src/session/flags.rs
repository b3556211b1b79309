//! Bit-packed dirty flags
//!
//! Field `i` lives in word `i / 64` at bit `i % 64`. The editing state is
//! kept beside the words rather than in a reserved bit, so every bit of
//! every word belongs to a field. There is always at least one word.

const WORD_BITS: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyFlags {
    words: Vec<u64>,
    field_count: usize,
    editing: bool,
}

impl DirtyFlags {
    pub fn new(field_count: usize) -> Self {
        Self {
            words: vec![0; field_count / WORD_BITS + 1],
            field_count,
            editing: false,
        }
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Raw word access, mostly for inspecting the layout
    pub fn word(&self, word: usize) -> u64 {
        self.words.get(word).copied().unwrap_or(0)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Indices past the field count always read as clean
    pub fn is_dirty(&self, index: usize) -> bool {
        if index >= self.field_count {
            return false;
        }
        let (word, mask) = Self::locate(index);
        self.words[word] & mask != 0
    }

    /// Set or clear one field's bit. Returns whether the bit flipped.
    pub fn set_dirty(&mut self, index: usize, dirty: bool) -> bool {
        if index >= self.field_count {
            return false;
        }
        let (word, mask) = Self::locate(index);
        let was = self.words[word] & mask != 0;
        if dirty {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
        was != dirty
    }

    pub fn any_dirty(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    pub fn dirty_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Clear every field bit, leaving the editing state alone
    pub fn clear_fields(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Ascending iterator over dirty field indices
    pub fn iter_dirty(&self) -> DirtyIter<'_> {
        DirtyIter {
            words: &self.words,
            word: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Walks set bits word by word, lowest bit first.
#[derive(Clone, Debug)]
pub struct DirtyIter<'a> {
    words: &'a [u64],
    word: usize,
    current: u64,
}

impl Iterator for DirtyIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word * WORD_BITS + bit);
            }
            self.word += 1;
            if self.word >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word];
        }
    }
}

impl std::iter::FusedIterator for DirtyIter<'_> {}
