use rlnc_decoder::{CodedPacket, PacketSet, PacketSetObserver, ReductionStat, GF16};

struct EvictOldest;

impl<const C: usize, const H: usize, const P: usize, const CB: usize> PacketSetObserver<C, H, P, CB>
    for EvictOldest
{
    fn on_full(&mut self, set: &mut PacketSet<C, H, P, CB>, _threshold: Option<u32>) {
        while set.free_first() {}
    }
}

type Set = PacketSet<8, 16, 64, 512>;
type Pkt = CodedPacket<16, 64>;

#[test]
fn random_combinations_of_eight_sources_all_decode() {
    let l = GF16;
    let sources: Vec<Vec<u8>> = (0..8u32).map(|i| vec![i as u8; 16]).collect();
    let source_pkts: Vec<Pkt> = sources
        .iter()
        .enumerate()
        .map(|(i, data)| Pkt::init_from_source(l, i as u32, data))
        .collect();

    // A deterministic, full-rank coding matrix: packet j is the XOR of
    // sources j..=7, an upper-triangular system guaranteed invertible.
    let mut coded: Vec<Pkt> = Vec::new();
    for j in 0..8usize {
        let mut p = source_pkts[j].clone();
        for s in &source_pkts[j + 1..] {
            p += s;
        }
        coded.push(p);
    }

    let mut set: Set = PacketSet::new(l);
    let mut stat = ReductionStat::default();
    let mut obs = EvictOldest;
    for pkt in coded {
        set.add(pkt, &mut stat, &mut obs);
    }

    assert_eq!(set.count(true), 8);
    for i in 0..8u32 {
        let slot = set.pivot_slot_of(i).expect("pivot present");
        let row = set.row(slot);
        assert!(row.is_decoded());
        assert_eq!(row.payload_bytes(), &sources[i as usize][..]);
    }
    assert!(set.check());
}

#[test]
fn reduction_failure_is_recorded_when_span_would_exceed_window() {
    // HEADER_BYTES=16, l=GF16 (2 bits/coef) -> window W = 16*8/2 = 64.
    let l = GF16;
    let mut set: Set = PacketSet::new(l);
    let mut stat = ReductionStat::default();
    let mut obs = EvictOldest;

    set.add(Pkt::init_from_source(l, 0, &[1]), &mut stat, &mut obs);
    // A packet spanning 0 and 9 cannot be reduced against the pivot at
    // 0 without the combined span exceeding the set's capacity of 8.
    let mut wide = Pkt::init_from_source(l, 9, &[2]);
    wide.set_coef(0, 1);
    set.add(wide, &mut stat, &mut obs);
    assert!(stat.reduction_failure >= 1);
}
