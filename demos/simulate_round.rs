//! Example usage of the [`pairwise_secagg`] crate.
//!
//! Each [`Participant`] is represented by a worker thread. The main thread
//! plays the collector: it hands every worker the participant list for a
//! round, receives the masked vectors over [`std::sync::mpsc`] channels, and
//! prints the unmasked totals next to the ground truth.

use anyhow::{self, Context};
use clap::Parser;
use pairwise_secagg::{
    Group, MaskedCounter, Participant, ParticipantList, PublicKey, Round, RoundAggregator,
    RoundConfig,
};
use rand::{rngs::OsRng, Rng};
use std::{
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};
use tracing::{info, instrument, span, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// Number of participant worker threads to use.
    #[arg(short, long, default_value_t = 5)]
    number_of_workers: usize,
    /// Length of every counter vector.
    #[arg(short, long, default_value_t = 10)]
    counters: usize,
    /// Number of consecutive rounds to run.
    #[arg(short, long, default_value_t = 1)]
    rounds: u64,
}

/// Instruction from the main thread to a worker.
#[derive(Debug, Clone)]
struct RoundRequest {
    round: Round,
    participants: ParticipantList,
}

/// A worker's answer: its raw counters (for checking the demo only) and the
/// masked vector the collector actually uses.
#[derive(Debug)]
struct RoundReply {
    from: PublicKey,
    raw: Vec<u64>,
    masked: Vec<MaskedCounter>,
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineArgs::parse();
    let filter = EnvFilter::from_default_env().add_directive("simulate_round=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .compact()
        .init();
    let span = span!(Level::INFO, "main");
    let _enter = span.entered();

    let group = Group::secp256k1();
    let (reply_tx, reply_rx) = channel::<anyhow::Result<RoundReply>>();
    let mut request_txs: Vec<Sender<RoundRequest>> = vec![];
    let mut keys = vec![];
    let mut workers = vec![];

    for _ in 0..cli.number_of_workers {
        let participant = Participant::generate(group, &mut OsRng)?;
        keys.push(*participant.public_key());
        let (request_tx, request_rx) = channel();
        request_txs.push(request_tx);
        let reply_tx = reply_tx.clone();
        let len = cli.counters;
        workers.push(thread::spawn(move || {
            participant_worker(participant, len, request_rx, reply_tx)
        }));
    }
    drop(reply_tx);

    let participants = ParticipantList::new(keys)?;
    for round in 0..cli.rounds {
        run_round(
            round,
            &participants,
            cli.counters,
            &request_txs,
            &reply_rx,
        )?;
    }

    drop(request_txs);
    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
    }
    Ok(())
}

#[instrument(skip_all, fields(round = round))]
fn run_round(
    round: Round,
    participants: &ParticipantList,
    len: usize,
    request_txs: &[Sender<RoundRequest>],
    reply_rx: &Receiver<anyhow::Result<RoundReply>>,
) -> anyhow::Result<()> {
    let request = RoundRequest {
        round,
        participants: participants.clone(),
    };
    for tx in request_txs {
        tx.send(request.clone())?;
    }

    let mut aggregator = RoundAggregator::new(RoundConfig {
        round,
        participants: participants.clone(),
        len,
    });
    let mut ground_truth = vec![0u64; len];
    for _ in 0..request_txs.len() {
        let reply = reply_rx.recv().context("worker hung up")??;
        for (total, value) in ground_truth.iter_mut().zip(&reply.raw) {
            *total += value;
        }
        aggregator.submit(&reply.from, &reply.masked)?;
    }

    let sums = aggregator.finalize()?;
    for (index, (sum, expected)) in sums.iter().zip(&ground_truth).enumerate() {
        info!(
            "index {}: aggregate {} (expected {})",
            index,
            sum.to_decimal(),
            expected
        );
        anyhow::ensure!(sum.to_u64() == Some(*expected), "aggregate mismatch");
    }
    Ok(())
}

fn participant_worker(
    participant: Participant,
    len: usize,
    requests: Receiver<RoundRequest>,
    replies: Sender<anyhow::Result<RoundReply>>,
) {
    let mut rng = rand::thread_rng();
    for request in requests {
        let raw: Vec<u64> = (0..len).map(|_| rng.gen_range(0..100)).collect();
        let reply = participant
            .mask(&request.participants, request.round, &raw)
            .map(|masked| RoundReply {
                from: *participant.public_key(),
                raw,
                masked,
            })
            .map_err(anyhow::Error::from);
        if replies.send(reply).is_err() {
            return;
        }
    }
}
