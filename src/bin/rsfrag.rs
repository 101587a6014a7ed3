//! rsfrag - erasure coding throughput and self-check utility
//!
//! `bench` reports encode/recover throughput for a (K, M) configuration, `check`
//! verifies byte-exact recovery across erasure patterns.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rsfrag::{CodecConfig, FragmentMap, FragmentMapMut, ReedSolomon, SlotSet};
use std::time::Instant;

fn coding_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("data")
                .short('k')
                .long("data")
                .help("Number of data fragments (1-32)")
                .value_name("K")
                .required(true)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("parity")
                .short('m')
                .long("parity")
                .help("Number of parity fragments (1-32)")
                .value_name("M")
                .required(true)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .help("Fragment size in bytes")
                .value_name("BYTES")
                .default_value("65536")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for the generated test data")
                .value_name("SEED")
                .default_value("1")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of CPU threads for computation (0 = auto-detect)")
                .value_name("N")
                .default_value("0"),
        )
        .arg(
            Arg::new("no-parallel")
                .long("no-parallel")
                .help("Disable all parallel processing")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("rsfrag")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon fragment erasure coding utility")
        .arg_required_else_help(true)
        .subcommand(
            coding_args(Command::new("bench").about("Measure encode and recover throughput")).arg(
                Arg::new("repeat")
                    .short('r')
                    .long("repeat")
                    .help("Number of timed iterations")
                    .value_name("COUNT")
                    .default_value("100")
                    .value_parser(value_parser!(usize)),
            ),
        )
        .subcommand(coding_args(
            Command::new("check").about("Verify recovery across erasure patterns"),
        ))
        .get_matches();

    match matches.subcommand() {
        Some(("bench", sub_matches)) => handle_bench(sub_matches),
        Some(("check", sub_matches)) => handle_check(sub_matches),
        _ => anyhow::bail!("No command specified, see 'rsfrag --help'"),
    }
}

/// Engine, generated data fragments and their parity
struct Workload {
    rs: ReedSolomon,
    data: Vec<Vec<u8>>,
    parity: Vec<Vec<u8>>,
    size: usize,
}

impl Workload {
    fn from_args(matches: &ArgMatches) -> Result<Self> {
        let k = *matches.get_one::<usize>("data").context("missing -k")?;
        let m = *matches.get_one::<usize>("parity").context("missing -m")?;
        let size = *matches.get_one::<usize>("size").context("missing --size")?;
        let seed = *matches.get_one::<u32>("seed").context("missing --seed")?;

        let rs = ReedSolomon::with_config(k, m, CodecConfig::from_args(matches))
            .with_context(|| format!("Cannot build a ({}, {}) engine", k, m))?;

        let data = generate_data(k, size, seed);
        let mut parity = vec![vec![0u8; size]; m];
        rs.encode_buffers(&data, &mut parity)
            .context("Initial encode failed")?;

        Ok(Self {
            rs,
            data,
            parity,
            size,
        })
    }

    /// Original contents of any slot
    fn fragment(&self, slot: usize) -> &[u8] {
        let k = self.rs.data_count();
        if slot < k {
            &self.data[slot]
        } else {
            &self.parity[slot - k]
        }
    }

    /// Recover `erased` from the surviving fragments into fresh buffers
    fn recover(&self, erased: &SlotSet) -> rsfrag::CodecResult<Vec<(usize, Vec<u8>)>> {
        let mut inputs = FragmentMap::new();
        for slot in 0..self.rs.total_count() {
            if !erased.contains(slot) {
                inputs.insert(slot, self.fragment(slot));
            }
        }

        let mut recovered: Vec<(usize, Vec<u8>)> =
            erased.iter().map(|slot| (slot, vec![0u8; self.size])).collect();
        let mut outputs = FragmentMapMut::new();
        for (slot, buffer) in recovered.iter_mut() {
            outputs.insert(*slot, buffer);
        }

        self.rs
            .recover(&inputs, erased, &SlotSet::new(), &mut outputs, self.size)?;
        Ok(recovered)
    }
}

/// Deterministic test data: a byte stream advancing by 997 per byte
fn generate_data(count: usize, size: usize, seed: u32) -> Vec<Vec<u8>> {
    let mut seed = seed;
    (0..count)
        .map(|_| {
            (0..size)
                .map(|_| {
                    let byte = (seed % 256) as u8;
                    seed = seed.wrapping_add(997);
                    byte
                })
                .collect()
        })
        .collect()
}

fn throughput_mb_s(bytes: usize, started: Instant) -> u128 {
    let elapsed_us = started.elapsed().as_micros().max(1);
    bytes as u128 / elapsed_us
}

fn handle_bench(matches: &ArgMatches) -> Result<()> {
    let workload = Workload::from_args(matches)?;
    let repeat = *matches.get_one::<usize>("repeat").context("missing --repeat")?;
    let rs = &workload.rs;
    let (k, m, size) = (rs.data_count(), rs.parity_count(), workload.size);

    let mut parity = vec![vec![0u8; size]; m];
    let started = Instant::now();
    for _ in 0..repeat {
        rs.encode_buffers(&workload.data, &mut parity)?;
    }
    println!(
        "Encoding ({},{}) = {}MB/s",
        k,
        m,
        throughput_mb_s(k * size * repeat, started)
    );

    // All parity plus as many data fragments as the parity can cover
    let lost_data = k.min(m);
    let mut erased = SlotSet::range(0, lost_data);
    for slot in k..k + m - lost_data {
        erased.insert(slot);
    }
    let plan = rs.plan_recovery(&erased, &SlotSet::new())?;

    let mut inputs = FragmentMap::new();
    for slot in 0..rs.total_count() {
        if !erased.contains(slot) {
            inputs.insert(slot, workload.fragment(slot));
        }
    }
    let mut buffers = vec![vec![0u8; size]; erased.len()];

    let started = Instant::now();
    for _ in 0..repeat {
        let mut outputs = FragmentMapMut::new();
        for (slot, buffer) in erased.iter().zip(buffers.iter_mut()) {
            outputs.insert(slot, buffer);
        }
        rs.recover_with_plan(&plan, &inputs, &mut outputs, size)?;
    }
    println!(
        "Recovering {:?} of ({},{}) = {}MB/s",
        erased,
        k,
        m,
        throughput_mb_s(k * size * repeat, started)
    );

    Ok(())
}

fn handle_check(matches: &ArgMatches) -> Result<()> {
    let workload = Workload::from_args(matches)?;
    let rs = &workload.rs;
    let (k, m) = (rs.data_count(), rs.parity_count());
    let total = rs.total_count();

    let mut patterns = 0;
    for start in 0..total {
        let erased: SlotSet = (0..m).map(|i| (start + i) % total).collect();
        for (slot, recovered) in workload.recover(&erased)? {
            anyhow::ensure!(
                recovered == workload.fragment(slot),
                "Slot {} recovered incorrectly with erasures {:?}",
                slot,
                erased
            );
        }
        patterns += 1;
    }

    // K >= 1, so M+1 slots always exist
    let erased = SlotSet::range(0, m + 1);
    match workload.recover(&erased) {
        Err(e) if e.is_unrecoverable() => {}
        Err(e) => anyhow::bail!("Unexpected error for {:?}: {}", erased, e),
        Ok(_) => anyhow::bail!("Recovery with {} erasures should have failed", m + 1),
    }

    println!(
        "({},{}) OK: {} erasure patterns recovered, {:?} rejected as unrecoverable",
        k, m, patterns, erased
    );
    Ok(())
}
