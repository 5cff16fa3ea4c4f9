//! Dictionary state for LZW decompression
//!
//! Entries live in fixed arrays indexed by `code - 258`, sized for the whole
//! 12-bit code space, so the table never grows and never reallocates.

use super::{DICTIONARY_CAPACITY, FIRST_FREE_CODE, MAX_CODE_COUNT, STACK_CAPACITY};

/// Hash-chain dictionary: each code maps to `(previous code, suffix byte)`
#[derive(Debug, Clone)]
pub struct Dictionary {
    prefix: [u16; DICTIONARY_CAPACITY],
    suffix: [u8; DICTIONARY_CAPACITY],
    /// Next code to be assigned
    free_index: u16,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self {
            prefix: [0; DICTIONARY_CAPACITY],
            suffix: [0; DICTIONARY_CAPACITY],
            free_index: FIRST_FREE_CODE,
        }
    }

    /// Forget every dynamic entry
    ///
    /// Stale slots are left in place; they are unreachable until redefined
    /// because codes at or above `free_index` take the KwKwK path.
    pub fn reset(&mut self) {
        self.free_index = FIRST_FREE_CODE;
    }

    /// Next code that `insert` will assign
    pub fn free_index(&self) -> u16 {
        self.free_index
    }

    /// True if `code` names an entry defined since the last reset
    pub fn contains(&self, code: u16) -> bool {
        (FIRST_FREE_CODE..self.free_index).contains(&code)
    }

    /// Append `(prefix, suffix)` at the free index
    ///
    /// Returns `false` once all 12-bit codes are taken.
    pub fn insert(&mut self, prefix: u16, suffix: u8) -> bool {
        if self.free_index >= MAX_CODE_COUNT {
            return false;
        }
        let slot = usize::from(self.free_index - FIRST_FREE_CODE);
        self.prefix[slot] = prefix;
        self.suffix[slot] = suffix;
        self.free_index += 1;
        true
    }

    /// Walk the chain of `code` backwards, pushing suffixes onto `stack`
    ///
    /// Returns the root byte (the first byte of the string), or `None` if the
    /// chain is longer than the stack, which only corrupt input produces.
    pub fn unwind(&self, mut code: u16, stack: &mut ScratchStack) -> Option<u8> {
        while code >= FIRST_FREE_CODE {
            let slot = usize::from(code - FIRST_FREE_CODE);
            if slot >= DICTIONARY_CAPACITY || !stack.push(self.suffix[slot]) {
                return None;
            }
            code = self.prefix[slot];
        }
        Some(code as u8)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded stack used to reverse a chain into output order
#[derive(Debug, Clone)]
pub struct ScratchStack {
    bytes: [u8; STACK_CAPACITY],
    len: usize,
}

impl ScratchStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            bytes: [0; STACK_CAPACITY],
            len: 0,
        }
    }

    /// Push a byte; `false` if the stack is full
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len >= STACK_CAPACITY {
            return false;
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        true
    }

    /// Pop the most recently pushed byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.bytes[self.len])
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Number of bytes on the stack
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is on the stack
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for ScratchStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_unwind() {
        let mut dict = Dictionary::new();
        assert!(dict.insert(u16::from(b'A'), b'B')); // 258 = "AB"
        assert!(dict.insert(258, b'C')); // 259 = "ABC"
        assert!(dict.contains(259));
        assert!(!dict.contains(260));

        let mut stack = ScratchStack::new();
        assert_eq!(dict.unwind(259, &mut stack), Some(b'A'));
        assert_eq!(stack.pop(), Some(b'B'));
        assert_eq!(stack.pop(), Some(b'C'));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_literal_unwinds_to_itself() {
        let dict = Dictionary::new();
        let mut stack = ScratchStack::new();
        assert_eq!(dict.unwind(0x41, &mut stack), Some(0x41));
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_insert_stops_at_code_ceiling() {
        let mut dict = Dictionary::new();
        for _ in 0..DICTIONARY_CAPACITY {
            assert!(dict.insert(0, 0));
        }
        assert_eq!(dict.free_index(), MAX_CODE_COUNT);
        assert!(!dict.insert(0, 0));

        dict.reset();
        assert_eq!(dict.free_index(), FIRST_FREE_CODE);
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut dict = Dictionary::new();
        // 258 -> 259 -> 258 ... never reaches a literal
        dict.insert(259, 1);
        dict.insert(258, 2);

        let mut stack = ScratchStack::new();
        assert_eq!(dict.unwind(258, &mut stack), None);
        assert_eq!(stack.len(), STACK_CAPACITY);
    }
}
