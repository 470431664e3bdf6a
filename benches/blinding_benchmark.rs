use criterion::{criterion_group, criterion_main, Criterion};

use pairwise_secagg::{
    errors::Result, BlindingFactorEngine, Group, KeyManager, KeyPair, Participant,
    ParticipantList, RoundAggregator, RoundConfig,
};
use rand::{rngs::OsRng, Rng};

fn init_new_player_set(num_players: usize) -> Result<(Vec<KeyPair>, ParticipantList)> {
    let mut rng = OsRng;
    let manager = KeyManager::new(Group::secp256k1());
    let pairs = (0..num_players)
        .map(|_| manager.generate_key_pair(&mut rng))
        .collect::<Result<Vec<_>>>()?;
    let list = ParticipantList::new(pairs.iter().map(|p| *p.public_key()).collect())?;
    Ok((pairs, list))
}

/// Masks and aggregates one full round.
fn run_round(pairs: &[KeyPair], list: &ParticipantList, counters: &[u64]) -> Result<()> {
    let group = Group::secp256k1();
    let mut aggregator = RoundAggregator::new(RoundConfig {
        round: 1,
        participants: list.clone(),
        len: counters.len(),
    });
    for pair in pairs {
        let participant = Participant::new(group, pair.clone());
        let masked = participant.mask(list, 1, counters)?;
        aggregator.submit(participant.public_key(), &masked)?;
    }
    let _ = aggregator.finalize()?;
    Ok(())
}

fn run_benchmarks_for_given_size(c: &mut Criterion, num_players: usize, len: usize) {
    let mut rng = OsRng;
    let (pairs, list) = init_new_player_set(num_players).unwrap();
    let engine = BlindingFactorEngine::new(Group::secp256k1());

    c.bench_function(
        &format!("Blinding factors for {len} counters with {num_players} nodes"),
        |b| b.iter(|| engine.blinding_factors(&list, &pairs[0], len, 7)),
    );

    let counters: Vec<u64> = (0..len).map(|_| rng.gen_range(0..100)).collect();
    c.bench_function(
        &format!("Full round of {len} counters with {num_players} nodes"),
        |b| b.iter(|| run_round(&pairs, &list, &counters)),
    );
}

fn criterion_benchmark(c: &mut Criterion) {
    run_benchmarks_for_given_size(c, 3, 10);
    run_benchmarks_for_given_size(c, 10, 10);
    run_benchmarks_for_given_size(c, 10, 100);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
