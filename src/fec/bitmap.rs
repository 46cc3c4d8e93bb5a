// Copyright (c) 2024, The QuicFuscate Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Packed bit-set over a fixed-size byte buffer, bounds-checked.

/// A bitmap over `BYTES * 8` bits, backed by a fixed-size byte array.
#[derive(Clone)]
pub struct Bitmap<const BYTES: usize> {
    bytes: [u8; BYTES],
}

impl<const BYTES: usize> Bitmap<BYTES> {
    pub const CAPACITY_BITS: usize = BYTES * 8;

    pub const fn new() -> Self {
        Self {
            bytes: [0u8; BYTES],
        }
    }

    #[inline]
    fn byte_of(bit: usize) -> usize {
        bit / 8
    }

    #[inline]
    fn mask_of(bit: usize) -> u8 {
        1u8 << (bit % 8)
    }

    pub fn set(&mut self, bit: usize) {
        assert!(bit < Self::CAPACITY_BITS, "bitmap set out of range: {bit} >= {}", Self::CAPACITY_BITS);
        self.bytes[Self::byte_of(bit)] |= Self::mask_of(bit);
    }

    pub fn clear(&mut self, bit: usize) {
        assert!(bit < Self::CAPACITY_BITS, "bitmap clear out of range: {bit} >= {}", Self::CAPACITY_BITS);
        self.bytes[Self::byte_of(bit)] &= !Self::mask_of(bit);
    }

    pub fn get(&self, bit: usize) -> bool {
        assert!(bit < Self::CAPACITY_BITS, "bitmap get out of range: {bit} >= {}", Self::CAPACITY_BITS);
        self.bytes[Self::byte_of(bit)] & Self::mask_of(bit) != 0
    }

    pub fn clear_all(&mut self) {
        self.bytes.fill(0);
    }
}

impl<const BYTES: usize> Default for Bitmap<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clear_get() {
        let mut bm: Bitmap<8> = Bitmap::new();
        assert!(!bm.get(5));
        bm.set(5);
        assert!(bm.get(5));
        bm.clear(5);
        assert!(!bm.get(5));
    }

    #[test]
    #[should_panic]
    fn out_of_range_panics() {
        let bm: Bitmap<1> = Bitmap::new();
        bm.get(8);
    }
}
