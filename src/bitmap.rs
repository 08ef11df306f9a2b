//! Word level helpers for the head/body bitmap pair.
//!
//! Bit `b` of a chunk's body word is set while block `b` belongs to some
//! allocation. Bit `b` of its head word is set only when an allocation starts
//! at block `b`, so the head word is always a subset of the body word. An
//! allocation's length is never stored: its run extends from its head bit up
//! to the next head bit, the next clear body bit, or the end of the word.

use super::constants::{FULL_WORD, WORD_BITS};

pub fn run_mask(blocks: usize) -> usize {
    debug_assert!(blocks > 0 && blocks <= WORD_BITS);

    if blocks == WORD_BITS {
        FULL_WORD
    } else {
        (1 << blocks) - 1
    }
}

pub fn span_mask(bit: usize, blocks: usize) -> usize {
    debug_assert!(bit + blocks <= WORD_BITS);

    run_mask(blocks) << bit
}

pub fn is_set(word: usize, bit: usize) -> bool {
    debug_assert!(bit < WORD_BITS);

    (word >> bit) & 1 == 1
}

pub fn is_full(body: usize) -> bool {
    body == FULL_WORD
}

// First fit: probe every start offset from bit 0 upward. Runs can start on any
// bit so there is no shortcut through leading/trailing zero counts.
pub fn find_fit(body: usize, blocks: usize) -> Option<usize> {
    if blocks == 0 || blocks > WORD_BITS {
        return None;
    }

    let free = !body;
    let need = run_mask(blocks);

    (0..=(WORD_BITS - blocks)).find(|&bit| (free >> bit) & need == need)
}

pub fn run_len(head: usize, body: usize, bit: usize) -> usize {
    debug_assert!(is_set(head, bit) && is_set(body, bit));

    let mut len = 1;

    while bit + len < WORD_BITS {
        let next = bit + len;

        if !is_set(body, next) || is_set(head, next) {
            break;
        }

        len += 1;
    }

    len
}

pub fn is_free(body: usize, bit: usize, blocks: usize) -> bool {
    if blocks == 0 {
        return true;
    }

    if bit + blocks > WORD_BITS {
        return false;
    }

    body & span_mask(bit, blocks) == 0
}
