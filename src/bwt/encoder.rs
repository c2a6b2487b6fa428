//! Turns a BWT-ordered symbol buffer into a finalized [`RlBwt`].
//!
//! Grounded on `original_source/build.c`'s `fm_bwtenc`: scan the
//! buffer once, accumulating a run of equal symbols, and flush it to
//! the encoder whenever the symbol changes.

use crate::bwt::alphabet::Symbol;
use crate::bwt::error::RlBwtError;
use crate::bwt::index::RlBwt;

pub struct BwtEncoder;

impl BwtEncoder {
    /// Encode `buf` (already in BWT order) into a fresh, finalized
    /// index. An empty buffer produces the empty index, not an error.
    pub fn encode(asize: u8, sbits: u8, buf: &[Symbol]) -> Result<RlBwt, RlBwtError> {
        let mut e = RlBwt::init(asize, sbits)?;
        if buf.is_empty() {
            let itr = e.begin_encoding()?;
            e.enc_finish(itr)?;
            return Ok(e);
        }

        let mut itr = e.begin_encoding()?;
        let mut run_sym = buf[0];
        let mut run_len: u64 = 1;
        for &sym in &buf[1..] {
            if sym == run_sym {
                run_len += 1;
            } else {
                e.enc(&mut itr, run_len, run_sym);
                run_sym = sym;
                run_len = 1;
            }
        }
        e.enc(&mut itr, run_len, run_sym);
        e.enc_finish(itr)?;
        Ok(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_coalesces_adjacent_equal_symbols() {
        let buf = [0u8, 1, 1, 1, 2, 2, 3, 3, 3, 3];
        let e = BwtEncoder::encode(4, 3, &buf).unwrap();
        let mut cursor = e.begin_decoding();
        let mut runs = Vec::new();
        while let Some(r) = e.dec(&mut cursor) {
            runs.push(r);
        }
        assert_eq!(runs, vec![(1, 0), (3, 1), (2, 2), (4, 3)]);
        assert_eq!(e.len(), buf.len() as u64);
    }

    #[test]
    fn encode_empty_buffer_yields_empty_index() {
        let e = BwtEncoder::encode(4, 3, &[]).unwrap();
        assert!(e.is_empty());
    }
}
