use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use text_codecs::cs::compression::{huffman, lzw, rle};

fn sample_text(len: usize) -> String {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "aaaa", "zzzzzz"];
    let mut text = String::with_capacity(len + 8);
    while text.len() < len {
        text.push_str(words[rng.gen_range(0..words.len())]);
        text.push(' ');
    }
    text.truncate(len);
    text
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codecs");
    for &size in &[1_000usize, 10_000, 100_000] {
        let text = sample_text(size);

        group.bench_with_input(BenchmarkId::new("rle_encode", size), &text, |b, text| {
            b.iter(|| rle::encode(black_box(text)))
        });
        let runs = rle::encode(&text);
        group.bench_with_input(BenchmarkId::new("rle_decode", size), &runs, |b, runs| {
            b.iter(|| rle::decode(black_box(runs)))
        });

        group.bench_with_input(BenchmarkId::new("huffman_encode", size), &text, |b, text| {
            b.iter(|| huffman::huffman_encode(black_box(text)))
        });
        if let Ok((bits, table)) = huffman::huffman_encode(&text) {
            group.bench_with_input(BenchmarkId::new("huffman_decode", size), &bits, |b, bits| {
                b.iter(|| huffman::huffman_decode(black_box(bits), &table))
            });
        }

        group.bench_with_input(BenchmarkId::new("lzw_compress", size), &text, |b, text| {
            b.iter(|| lzw::compress(black_box(text)))
        });
        if let Ok(codes) = lzw::compress(&text) {
            group.bench_with_input(BenchmarkId::new("lzw_decompress", size), &codes, |b, codes| {
                b.iter(|| lzw::decompress(black_box(codes)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
