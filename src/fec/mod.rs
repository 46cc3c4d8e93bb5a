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

//! # Sliding-Window Random Linear Network Coding decoder
//!
//! Online decoder for a random linear code over GF(2), GF(4), GF(16) or
//! GF(256), operating on a bounded sliding window of source packets.
//! Senders (out of scope here) transmit coded packets carrying an
//! encoding-vector header plus a coded payload; [`PacketSet`] is the
//! receive-side buffer that reduces incoming packets against existing
//! pivots, accepts new pivots, and back-substitutes until source
//! packets fall out fully decoded.

pub mod bitmap;
pub mod config;
pub mod gf_tables;
pub mod packet;
pub mod packet_set;

pub use bitmap::Bitmap;
pub use config::SizingConfig;
pub use gf_tables::{FieldLog2, GF16, GF2, GF256, GF4};
pub use packet::CodedPacket;
pub use packet_set::{PacketSet, PacketSetObserver, ReductionStat};
