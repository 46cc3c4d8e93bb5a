// Sliding-window RLNC decoder library
//
// This library contains the finite-field arithmetic, coded-packet
// representation, and bounded packet-set decoding buffer for an
// online random linear network code. The transport, the encoder, and
// any host application wiring are out of scope and live outside this
// crate.

pub mod error;
pub mod fec;

pub use fec::{
    Bitmap, CodedPacket, FieldLog2, PacketSet, PacketSetObserver, ReductionStat, SizingConfig,
    GF16, GF2, GF256, GF4,
};
