use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use csv_seeder::generation::{generate_example_csv, generate_prompt};
use csv_seeder::presets::{flashcard_columns, user_columns};

fn bench_generation(c: &mut Criterion) {
    let users = user_columns();
    let flashcards = flashcard_columns();
    let mut rng = StdRng::seed_from_u64(42);
    c.bench_function("example_csv_100_users", |b| {
        b.iter(|| generate_example_csv(&users, 100, &mut rng))
    });
    c.bench_function("prompt_flashcards", |b| b.iter(|| generate_prompt(&flashcards, 3, &mut rng)));
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
