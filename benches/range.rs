use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use emza_bulletproofs::{
    group::{Bn254, ScalarOps},
    RangeProof, ReciprocalPrivate, ReciprocalPublic, Transcript,
};

const VALUE: u64 = 0x1234_5678_9abc_def0;

fn bench_range_prove(b: &mut Bencher<'_>) {
    let mut rng = ChaChaRng::from_seed([7; 32]);
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let private = ReciprocalPrivate::new(VALUE, blinding, &public).unwrap();

    b.iter(|| RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap());
}

fn bench_range_verify(b: &mut Bencher<'_>) {
    let mut rng = ChaChaRng::from_seed([7; 32]);
    let public = ReciprocalPublic::<Bn254>::new(16, 16, &mut rng).unwrap();
    let blinding = Bn254::generate_scalar(&mut rng);
    let v_com = public.commit_value(VALUE, &blinding);
    let private = ReciprocalPrivate::new(VALUE, blinding, &public).unwrap();
    let proof = RangeProof::new(&public, &private, &mut Transcript::new(), &mut rng).unwrap();

    b.iter(|| {
        proof
            .verify(&public, v_com, &mut Transcript::new())
            .unwrap()
    });
}

fn bench_basics(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("range");
    group.sample_size(10);
    group.bench_function("prove", bench_range_prove);
    group.bench_function("verify", bench_range_verify);
    group.finish();
}

criterion_group!(benches, bench_basics);
criterion_main!(benches);
