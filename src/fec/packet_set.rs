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

//! Bounded sliding-window decoding buffer: insertion with reduction,
//! pivot selection, back-substitution and eviction.

use crate::fec::bitmap::Bitmap;
use crate::fec::gf_tables::{gf_inv, FieldLog2};
use crate::fec::packet::CodedPacket;

/// Per-insertion counters describing how `PacketSet::add` spent its
/// effort. Zeroed at the start of every `add` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReductionStat {
    pub non_reduction: u32,
    pub reduction_success: u32,
    pub reduction_failure: u32,
    pub coef_pos_too_low: u32,
    pub coef_pos_too_high: u32,
    pub elimination: u32,
    pub decoded: u32,
}

/// The packet set's three external collaborators.
///
/// `on_full` is the only method given a mutable reference: it is the
/// one point the original contract allows the host to call back into
/// the set (to evict via `free_first`). `on_decoded` and
/// `fetch_decoded` see a shared reference and cannot mutate the set —
/// enforced here by the type signature rather than left as a
/// documentation-only rule.
pub trait PacketSetObserver<const C: usize, const H: usize, const P: usize, const CB: usize> {
    /// Fired once a stored row transitions into the decoded state.
    fn on_decoded(&mut self, _set: &PacketSet<C, H, P, CB>, _packet_id: usize) {}

    /// Fired when the set must make room. `threshold`, if present,
    /// asks the host to free pivots at or below that source index.
    fn on_full(&mut self, _set: &mut PacketSet<C, H, P, CB>, _threshold: Option<u32>) {}

    /// Asked to rebuild a single-source row for an already-decoded
    /// source index. Returning `false` is always acceptable.
    fn fetch_decoded(
        &mut self,
        _set: &PacketSet<C, H, P, CB>,
        _p: u32,
        _out: &mut CodedPacket<H, P>,
    ) -> bool {
        false
    }
}

/// A packet set with capacity `C` pivots, header/payload sizes `H`/`P`,
/// and a decoded-delivery bitmap covering `CB * 8` source indices.
pub struct PacketSet<const C: usize, const H: usize, const P: usize, const CB: usize> {
    l: FieldLog2,
    rows: [CodedPacket<H, P>; C],
    id_to_pos: [Option<u32>; C],
    pos_to_id: [Option<usize>; C],
    coef_pos_min: Option<u32>,
    coef_pos_max: Option<u32>,
    decoded_bitmap: Bitmap<CB>,
    nb_decoded: u64,
}

impl<const C: usize, const H: usize, const P: usize, const CB: usize> PacketSet<C, H, P, CB> {
    pub fn new(l: FieldLog2) -> Self {
        Self {
            l,
            rows: std::array::from_fn(|_| CodedPacket::new(l)),
            id_to_pos: [None; C],
            pos_to_id: [None; C],
            coef_pos_min: None,
            coef_pos_max: None,
            decoded_bitmap: Bitmap::new(),
            nb_decoded: 0,
        }
    }

    pub fn l(&self) -> FieldLog2 {
        self.l
    }

    pub fn coef_pos_min(&self) -> Option<u32> {
        self.coef_pos_min
    }

    pub fn coef_pos_max(&self) -> Option<u32> {
        self.coef_pos_max
    }

    pub fn decoded_count(&self) -> u64 {
        self.nb_decoded
    }

    pub fn row(&self, slot: usize) -> &CodedPacket<H, P> {
        &self.rows[slot]
    }

    pub fn is_empty(&self) -> bool {
        self.coef_pos_min.is_none()
    }

    pub fn count(&self, include_decoded: bool) -> usize {
        (0..C)
            .filter(|&i| match self.id_to_pos[i] {
                Some(p) => include_decoded || !self.is_delivered(p),
                None => false,
            })
            .count()
    }

    fn is_delivered(&self, p: u32) -> bool {
        (p as usize) < Bitmap::<CB>::CAPACITY_BITS && self.decoded_bitmap.get(p as usize)
    }

    fn mark_delivered(&mut self, p: u32) {
        if (p as usize) < Bitmap::<CB>::CAPACITY_BITS {
            self.decoded_bitmap.set(p as usize);
        } else {
            log::warn!("decoded pivot {p} exceeds decoded-bitmap capacity, delivery not recorded");
        }
    }

    /// Returns the storage slot whose pivot is source index `p`.
    pub fn pivot_slot_of(&self, p: u32) -> Option<usize> {
        let slot = self.pos_to_id[(p as usize) % C]?;
        if self.id_to_pos[slot] == Some(p) {
            Some(slot)
        } else {
            None
        }
    }

    /// Releases the pivot at `coef_pos_min`, but only if it is
    /// already decoded. Returns whether a slot was freed.
    pub fn free_first(&mut self) -> bool {
        let lo = match self.coef_pos_min {
            Some(lo) => lo,
            None => return false,
        };
        let slot = match self.pivot_slot_of(lo) {
            Some(s) => s,
            None => return false,
        };
        if !self.is_delivered(lo) {
            return false;
        }
        self.id_to_pos[slot] = None;
        self.pos_to_id[(lo as usize) % C] = None;
        self.rows[slot].init();
        self.recompute_envelope();
        true
    }

    /// The smallest source index not yet delivered, bounded above by
    /// the highest decoded pivot position.
    pub fn low_index(&self) -> Option<u32> {
        let highest_decoded = (0..C)
            .filter_map(|i| self.id_to_pos[i].filter(|&p| self.is_delivered(p)))
            .max()?;
        (0..=highest_decoded).find(|&p| !self.is_delivered(p))
    }

    /// Recomputes `coef_pos_min`/`coef_pos_max` from the current rows.
    pub fn recompute_envelope(&mut self) {
        let mut lo = None;
        let mut hi = None;
        for i in 0..C {
            if self.id_to_pos[i].is_some() && self.rows[i].recompute_min_max() {
                let rlo = self.rows[i].coef_min().unwrap();
                let rhi = self.rows[i].coef_max().unwrap();
                lo = Some(lo.map_or(rlo, |l: u32| l.min(rlo)));
                hi = Some(hi.map_or(rhi, |h: u32| h.max(rhi)));
            }
        }
        self.coef_pos_min = lo;
        self.coef_pos_max = hi;
    }

    /// Audits every invariant in one pass; used by tests. Does not
    /// panic, so a failing test can report exactly which invariant
    /// broke.
    pub fn check(&self) -> bool {
        for i in 0..C {
            if let Some(p) = self.id_to_pos[i] {
                if self.pos_to_id[(p as usize) % C] != Some(i) {
                    return false;
                }
                if self.rows[i].get_coef(p) != 1 {
                    return false;
                }
                let (Some(lo), Some(hi)) = (self.coef_pos_min, self.coef_pos_max) else {
                    return false;
                };
                let (Some(rlo), Some(rhi)) = (self.rows[i].coef_min(), self.rows[i].coef_max())
                else {
                    return false;
                };
                if rlo < lo || rhi > hi {
                    return false;
                }
            }
        }
        for j in 0..C {
            if let Some(i) = self.pos_to_id[j] {
                match self.id_to_pos[i] {
                    Some(p) if (p as usize) % C == j => {}
                    _ => return false,
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.coef_pos_min, self.coef_pos_max) {
            if hi - lo >= C as u32 {
                return false;
            }
        }
        true
    }

    /// Inserts a coded packet, performing forward reduction against
    /// existing pivots, pivot acceptance, and back-substitution.
    /// Returns the storage slot of the accepted pivot, or `None` if
    /// the packet was fully reduced away or could not be accommodated.
    pub fn add<O: PacketSetObserver<C, H, P, CB>>(
        &mut self,
        mut pkt: CodedPacket<H, P>,
        stat: &mut ReductionStat,
        observer: &mut O,
    ) -> Option<usize> {
        *stat = ReductionStat::default();
        assert_eq!(pkt.l(), self.l, "packet field does not match packet set field");

        if !pkt.recompute_min_max() {
            return None;
        }
        let w = CodedPacket::<H, P>::window(self.l);
        let cap = C as u32;

        let lo0 = pkt.coef_min().unwrap();
        let hi0 = pkt.coef_max().unwrap();
        let mut p = lo0;
        loop {
            if pkt.get_coef(p) != 0 {
                let base = if let Some(q) = self.pivot_slot_of(p) {
                    Some(self.rows[q].clone())
                } else if self.is_delivered(p) {
                    let mut tmp = CodedPacket::new(self.l);
                    if observer.fetch_decoded(self, p, &mut tmp) {
                        Some(tmp)
                    } else {
                        None
                    }
                } else {
                    None
                };
                match base {
                    Some(base) => {
                        let combined_min = pkt.coef_min().unwrap().min(base.coef_min().unwrap());
                        let combined_max = pkt.coef_max().unwrap().max(base.coef_max().unwrap());
                        if combined_max - combined_min >= w.min(cap) {
                            stat.reduction_failure += 1;
                        } else {
                            let c = pkt.get_coef(p);
                            pkt.add_mul(c, &base);
                            stat.reduction_success += 1;
                            if !pkt.recompute_min_max() {
                                return None;
                            }
                        }
                    }
                    None => {
                        stat.non_reduction += 1;
                        log::trace!("packet-set: no reducer available at coef_pos {p}");
                    }
                }
            }
            if p == hi0 {
                break;
            }
            p += 1;
        }

        if !pkt.recompute_min_max() {
            return None;
        }

        // Pick the new pivot: highest unclaimed nonzero position.
        let new_lo = pkt.coef_min().unwrap();
        let new_hi = pkt.coef_max().unwrap();
        let mut pivot_p = None;
        let mut p = new_hi;
        loop {
            if pkt.get_coef(p) != 0 && self.pivot_slot_of(p).is_none() {
                pivot_p = Some(p);
                break;
            }
            if p == new_lo {
                break;
            }
            p -= 1;
        }
        let p = pivot_p?;

        if self.coef_pos_min.is_none() {
            self.coef_pos_min = Some(new_lo);
            self.coef_pos_max = Some(new_hi);
        }

        // Two independently-gated checks, not a single combined-span
        // test: growing past the high end may attempt eviction via
        // `on_full`; growing past the low end never does and is
        // refused outright if it would not fit.
        if new_hi > self.coef_pos_max.unwrap() {
            if new_hi - self.coef_pos_min.unwrap() >= cap {
                let threshold = new_hi.saturating_sub(cap).saturating_sub(1);
                observer.on_full(self, Some(threshold));

                if self.is_empty() {
                    // Eviction cleared everything the old envelope
                    // covered; the only remaining content is this packet.
                    self.coef_pos_min = Some(new_lo);
                    self.coef_pos_max = Some(new_hi);
                }

                if new_hi - self.coef_pos_min.unwrap() >= cap {
                    stat.coef_pos_too_high += 1;
                    return None;
                }
            }
            self.coef_pos_max = Some(new_hi);
        }

        if new_lo < self.coef_pos_min.unwrap() {
            if self.coef_pos_max.unwrap() - new_lo >= cap {
                stat.coef_pos_too_low += 1;
                return None;
            }
            self.coef_pos_min = Some(new_lo);
        }

        // Slot allocation, with one eviction retry.
        let mut slot = (0..C).find(|&i| self.id_to_pos[i].is_none());
        if slot.is_none() {
            observer.on_full(self, None);
            slot = (0..C).find(|&i| self.id_to_pos[i].is_none());
        }
        let i = slot?;

        let inv_c = gf_inv(self.l, pkt.get_coef(p));
        pkt.scalar_mul_in_place(inv_c);
        pkt.recompute_min_max();
        let decoded_now = pkt.is_decoded();

        self.id_to_pos[i] = Some(p);
        self.pos_to_id[(p as usize) % C] = Some(i);
        self.rows[i] = pkt;

        if decoded_now {
            self.mark_delivered(p);
            stat.decoded += 1;
            self.nb_decoded += 1;
            log::debug!("packet-set: pivot {p} decoded in slot {i}");
            observer.on_decoded(self, i);
        }

        let pivot_row = self.rows[i].clone();
        for j in 0..C {
            if j == i {
                continue;
            }
            if let Some(pos_j) = self.id_to_pos[j] {
                if self.is_delivered(pos_j) {
                    continue;
                }
                let coef_at_p = self.rows[j].get_coef(p);
                if coef_at_p != 0 {
                    self.rows[j].add_mul(coef_at_p, &pivot_row);
                    let still_live = self.rows[j].recompute_min_max();
                    assert!(
                        still_live,
                        "packet-set: elimination produced an empty row at slot {j}"
                    );
                    stat.elimination += 1;
                    if self.rows[j].is_decoded() {
                        self.mark_delivered(pos_j);
                        stat.decoded += 1;
                        self.nb_decoded += 1;
                        log::debug!("packet-set: pivot {pos_j} decoded in slot {j} via elimination");
                        observer.on_decoded(self, j);
                    }
                }
            }
        }

        Some(i)
    }
}
