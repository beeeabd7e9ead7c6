use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use merkle_disclosure::{create_tree, DigestAlgorithm, HashDigest};

fn generate_leaves(count: usize) -> Vec<Vec<u8>> {
    (0..count).map(|i| format!("leaf-{:08}", i).into_bytes()).collect()
}

fn tree_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    let counts = vec![16, 256, 4096, 65536];

    for count in counts {
        group.throughput(Throughput::Elements(count as u64));
        let leaves = generate_leaves(count);

        group.bench_with_input(BenchmarkId::new("default", count), &leaves, |b, leaves| {
            let digest = HashDigest::default_digest(DigestAlgorithm::Sha256);
            b.iter(|| create_tree(black_box(leaves.clone()), digest.clone()).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("nonce", count), &leaves, |b, leaves| {
            let digest = HashDigest::nonce(DigestAlgorithm::Sha256, [7u8; 32]);
            b.iter(|| create_tree(black_box(leaves.clone()), digest.clone()).unwrap())
        });
    }

    group.finish();
}

fn audit_proof_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit_proof");

    let digest = HashDigest::default_digest(DigestAlgorithm::Sha256);
    let tree = create_tree(generate_leaves(4096), digest.clone()).unwrap();

    // Number of disclosed leaves, spread evenly over the tree
    for disclosed in [1u32, 16, 256] {
        let step = tree.size() / disclosed;
        let indices: Vec<u32> = (0..disclosed).map(|i| i * step).collect();

        group.bench_with_input(BenchmarkId::new("create", disclosed), &indices, |b, indices| {
            b.iter(|| tree.create_audit_proof(black_box(indices.iter().copied())).unwrap())
        });

        let proof = tree.create_audit_proof(indices.iter().copied()).unwrap();
        group.bench_with_input(BenchmarkId::new("verify", disclosed), &proof, |b, proof| {
            b.iter(|| proof.verify(black_box(tree.root()), &digest).unwrap())
        });
    }

    group.finish();
}

fn size_only_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_only_proof");

    let tree = create_tree(
        generate_leaves(4096),
        HashDigest::nonce(DigestAlgorithm::Sha256, [7u8; 32]),
    )
    .unwrap();
    let verifier = HashDigest::nonce_size_only_verify(DigestAlgorithm::Sha256);
    let proof = tree.create_size_only_proof();

    group.bench_function("verify_4096", |b| {
        b.iter(|| proof.verify(black_box(tree.root()), &verifier).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    tree_build_benchmark,
    audit_proof_benchmark,
    size_only_benchmark
);
criterion_main!(benches);
