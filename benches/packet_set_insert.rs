use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rlnc_decoder::fec::gf_tables::GF256;
use rlnc_decoder::{CodedPacket, PacketSet, PacketSetObserver, ReductionStat};

struct EvictOldest;

impl<const C: usize, const H: usize, const P: usize, const CB: usize> PacketSetObserver<C, H, P, CB>
    for EvictOldest
{
    fn on_full(&mut self, set: &mut PacketSet<C, H, P, CB>, _threshold: Option<u32>) {
        while set.free_first() {}
    }
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("packet_set_insert_sequential", |b| {
        b.iter(|| {
            let mut set: PacketSet<8, 16, 64, 256> = PacketSet::new(GF256);
            let mut stat = ReductionStat::default();
            let mut obs = EvictOldest;
            for p in 0..64u32 {
                let pkt = CodedPacket::<16, 64>::init_from_source(GF256, p, &[p as u8; 8]);
                black_box(set.add(pkt, &mut stat, &mut obs));
            }
        })
    });
}

criterion_group!(benches, bench_insert);
criterion_main!(benches);
