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

//! A single coded packet: an encoding-vector header plus a coded
//! payload, both packed at `2^l` bits per field element.

use crate::fec::gf_tables::{
    add_mul_bytes, bits_per_coef, packed_get, packed_set, scalar_mul_bytes, xor_into, FieldLog2,
};
use std::ops::AddAssign;

/// A coded packet over a sliding window of `HEADER_BYTES * 8 / 2^l`
/// source indices, with a payload of at most `PAYLOAD_MAX` bytes.
///
/// `coef_min`/`coef_max` are a *conservative* bound on the range of
/// nonzero coefficients; only [`CodedPacket::recompute_min_max`] is
/// guaranteed to return a tight bound.
#[derive(Clone)]
pub struct CodedPacket<const HEADER_BYTES: usize, const PAYLOAD_MAX: usize> {
    l: FieldLog2,
    coef_min: Option<u32>,
    coef_max: Option<u32>,
    data_size: usize,
    header: [u8; HEADER_BYTES],
    payload: [u8; PAYLOAD_MAX],
}

impl<const HEADER_BYTES: usize, const PAYLOAD_MAX: usize> CodedPacket<HEADER_BYTES, PAYLOAD_MAX> {
    /// Number of coefficients that fit in the header at field `l`.
    pub fn window(l: FieldLog2) -> u32 {
        (HEADER_BYTES as u32 * 8) / bits_per_coef(l)
    }

    /// An all-zero packet ("empty" per [`CodedPacket::is_empty`]).
    pub fn new(l: FieldLog2) -> Self {
        Self {
            l,
            coef_min: None,
            coef_max: None,
            data_size: 0,
            header: [0u8; HEADER_BYTES],
            payload: [0u8; PAYLOAD_MAX],
        }
    }

    /// Re-initializes `self` to the empty state, keeping `l`.
    pub fn init(&mut self) {
        self.coef_min = None;
        self.coef_max = None;
        self.data_size = 0;
        self.header.fill(0);
        self.payload.fill(0);
    }

    /// Builds `e_p ⊗ data`: coefficient 1 at source index `p`, payload
    /// equal to `data`.
    pub fn init_from_source(l: FieldLog2, p: u32, data: &[u8]) -> Self {
        assert!(data.len() <= PAYLOAD_MAX, "payload exceeds PAYLOAD_MAX");
        let mut pkt = Self::new(l);
        pkt.data_size = data.len();
        pkt.payload[..data.len()].copy_from_slice(data);
        pkt.set_coef(p, 1);
        pkt
    }

    pub fn l(&self) -> FieldLog2 {
        self.l
    }

    pub fn coef_min(&self) -> Option<u32> {
        self.coef_min
    }

    pub fn coef_max(&self) -> Option<u32> {
        self.coef_max
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload[..self.data_size]
    }

    /// Sets the coefficient at source index `p`. Requires `p` to lie
    /// within one window of the current range (a programmer-error
    /// contract, like the rest of the index arithmetic here).
    pub fn set_coef(&mut self, p: u32, c: u8) {
        let w = Self::window(self.l);
        if let (Some(lo), Some(hi)) = (self.coef_min, self.coef_max) {
            let new_lo = lo.min(p);
            let new_hi = hi.max(p);
            debug_assert!(
                new_hi - new_lo < w,
                "set_coef: p={p} would widen range [{lo},{hi}] beyond window {w}"
            );
        }
        let bit_off = ((p % w) as usize) * bits_per_coef(self.l) as usize;
        packed_set(&mut self.header, self.l, bit_off, c);
        match (self.coef_min, self.coef_max) {
            (None, None) => {
                self.coef_min = Some(p);
                self.coef_max = Some(p);
            }
            (Some(lo), Some(hi)) => {
                self.coef_min = Some(lo.min(p));
                self.coef_max = Some(hi.max(p));
            }
            _ => unreachable!("coef_min/coef_max are always both Some or both None"),
        }
    }

    /// Returns the coefficient at `p`, or 0 if outside the current range.
    pub fn get_coef(&self, p: u32) -> u8 {
        match (self.coef_min, self.coef_max) {
            (Some(lo), Some(hi)) if p >= lo && p <= hi => {
                let w = Self::window(self.l);
                let bit_off = ((p % w) as usize) * bits_per_coef(self.l) as usize;
                packed_get(&self.header, self.l, bit_off)
            }
            _ => 0,
        }
    }

    /// `self := c * self`, applied uniformly to header and payload.
    pub fn scalar_mul_in_place(&mut self, c: u8) {
        scalar_mul_bytes(self.l, &mut self.header, HEADER_BYTES, c);
        scalar_mul_bytes(self.l, &mut self.payload, self.data_size, c);
        if c == 0 {
            self.coef_min = None;
            self.coef_max = None;
        }
    }

    /// `self := self + c * other`, fused.
    pub fn add_mul(&mut self, c: u8, other: &Self) {
        if c == 0 {
            return;
        }
        add_mul_bytes(self.l, &mut self.header, &other.header, HEADER_BYTES, c);
        let n = self.data_size.max(other.data_size);
        if n > self.data_size {
            self.payload[self.data_size..n].fill(0);
            self.data_size = n;
        }
        add_mul_bytes(self.l, &mut self.payload, &other.payload, n, c);
        self.merge_range_from(other);
    }

    fn merge_range_from(&mut self, other: &Self) {
        self.coef_min = match (self.coef_min, other.coef_min) {
            (None, x) => x,
            (x, None) => x,
            (Some(a), Some(b)) => Some(a.min(b)),
        };
        self.coef_max = match (self.coef_max, other.coef_max) {
            (None, x) => x,
            (x, None) => x,
            (Some(a), Some(b)) => Some(a.max(b)),
        };
    }

    /// Shrinks `coef_min`/`coef_max` to the tightest bound containing
    /// every nonzero coefficient, or sets both to `None` if there are
    /// none. Returns whether the packet remains non-empty.
    pub fn recompute_min_max(&mut self) -> bool {
        let (lo, hi) = match (self.coef_min, self.coef_max) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return false,
        };
        let mut new_lo = None;
        let mut p = lo;
        loop {
            if self.get_coef(p) != 0 {
                new_lo = Some(p);
                break;
            }
            if p == hi {
                break;
            }
            p += 1;
        }
        if new_lo.is_none() {
            self.coef_min = None;
            self.coef_max = None;
            return false;
        }
        let mut new_hi = hi;
        while self.get_coef(new_hi) == 0 {
            new_hi -= 1;
        }
        self.coef_min = new_lo;
        self.coef_max = Some(new_hi);
        true
    }

    /// Equivalent to `!recompute_min_max(self)`.
    pub fn is_empty(&mut self) -> bool {
        !self.recompute_min_max()
    }

    /// `true` iff `coef_min == coef_max`, including the empty case
    /// (`None == None`) — a decoded pivot, or a row with no content.
    pub fn is_decoded(&self) -> bool {
        self.coef_min == self.coef_max
    }
}

impl<const H: usize, const P: usize> AddAssign<&CodedPacket<H, P>> for CodedPacket<H, P> {
    /// `self := self + other`.
    fn add_assign(&mut self, other: &CodedPacket<H, P>) {
        xor_into(&mut self.header, &other.header, H);
        let n = self.data_size.max(other.data_size);
        if n > self.data_size {
            self.payload[self.data_size..n].fill(0);
            self.data_size = n;
        }
        xor_into(&mut self.payload, &other.payload, n);
        self.merge_range_from(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fec::gf_tables::GF16;

    #[test]
    fn init_from_source_round_trip() {
        let pkt = CodedPacket::<16, 32>::init_from_source(GF16, 3, &[1, 2, 3]);
        assert_eq!(pkt.get_coef(3), 1);
        assert_eq!(pkt.get_coef(4), 0);
        assert_eq!(pkt.payload_bytes(), &[1, 2, 3]);
        assert!(pkt.is_decoded());
    }

    #[test]
    fn scalar_mul_identity_and_inverse() {
        let mut pkt = CodedPacket::<16, 32>::init_from_source(GF16, 0, &[5, 6]);
        let before = pkt.payload_bytes().to_vec();
        pkt.scalar_mul_in_place(1);
        assert_eq!(pkt.payload_bytes(), &before[..]);
        pkt.scalar_mul_in_place(7);
        pkt.scalar_mul_in_place(crate::fec::gf_tables::gf_inv(GF16, 7));
        assert_eq!(pkt.payload_bytes(), &before[..]);
    }

    #[test]
    fn self_cancellation() {
        let mut a = CodedPacket::<16, 32>::init_from_source(GF16, 2, &[9]);
        let b = a.clone();
        a += &b;
        assert!(a.is_empty());
    }
}
