//! Reed-Solomon fragment engine
//!
//! ## Overview
//!
//! A `ReedSolomon` engine is built once for a (K, M) configuration. It owns the
//! (K+M)×K systematic generator matrix, which is read-only afterwards, so one engine
//! can serve concurrent `encode`/`recover` calls from many threads.
//!
//! ## Recovery
//!
//! Recovery picks K known slots (lowest slot indices first), inverts the matching
//! K×K submatrix of the generator, and derives one coefficient row per erased slot:
//!
//! ```text
//! coefficients(e) = generator.row(e) × inverse(submatrix)
//! output[e]       = Σ coefficients(e)[s] · fragment[source s]
//! ```
//!
//! Known-zero slots count as known but contribute nothing, so their terms are skipped.
//! The decode step is exposed as a [`RecoveryPlan`] so callers can reuse it for
//! repeated identical erasure patterns.

use super::galois::Galois8;
use super::matrix::{systematic_generator, Matrix};
use super::scalar::{build_mul_table, WriteOp};
use super::simd::{process_slice_multiply, simd_level};
use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::fragment::{
    FragmentMap, FragmentMapMut, SlotSet, MAX_DATA_FRAGMENTS, MAX_FRAGMENTS,
    MAX_PARITY_FRAGMENTS,
};
use log::{debug, warn};
use rayon::prelude::*;
use smallvec::SmallVec;

/// Output buffers of one call, tagged with their slot
type Targets<'b> = SmallVec<[(usize, &'b mut [u8]); MAX_FRAGMENTS]>;

/// Decode coefficients for one erasure pattern
///
/// Built by [`ReedSolomon::plan_recovery`] and applied with
/// [`ReedSolomon::recover_with_plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    data_count: usize,
    parity_count: usize,
    erased: SlotSet,
    zeroed: SlotSet,
    sources: SmallVec<[usize; MAX_DATA_FRAGMENTS]>,
    /// One row of K coefficients per erased slot, in ascending slot order
    coefficients: Vec<Galois8>,
}

impl RecoveryPlan {
    pub fn erased(&self) -> &SlotSet {
        &self.erased
    }

    pub fn zeroed(&self) -> &SlotSet {
        &self.zeroed
    }

    /// The K known slots the erased fragments are computed from
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Coefficients applied to [`sources`](Self::sources) to rebuild `slot`
    pub fn coefficients(&self, slot: usize) -> Option<&[Galois8]> {
        if !self.erased.contains(slot) {
            return None;
        }
        let index = self.erased.iter().take_while(|&e| e < slot).count();
        let k = self.data_count;
        Some(&self.coefficients[index * k..(index + 1) * k])
    }
}

/// Systematic Reed-Solomon encoder/decoder over GF(2^8)
#[derive(Debug)]
pub struct ReedSolomon {
    data_count: usize,
    parity_count: usize,
    generator: Matrix,
    config: CodecConfig,
    /// `config.effective_threads()`, resolved once
    threads: usize,
    pool: Option<rayon::ThreadPool>,
}

impl ReedSolomon {
    /// Engine for `data` data fragments and `parity` parity fragments with the
    /// default configuration
    pub fn new(data: usize, parity: usize) -> CodecResult<Self> {
        Self::with_config(data, parity, CodecConfig::default())
    }

    pub fn with_config(data: usize, parity: usize, config: CodecConfig) -> CodecResult<Self> {
        if !(1..=MAX_DATA_FRAGMENTS).contains(&data)
            || !(1..=MAX_PARITY_FRAGMENTS).contains(&parity)
            || data + parity > MAX_FRAGMENTS
        {
            return Err(CodecError::InvalidConfiguration { data, parity });
        }

        let generator = systematic_generator(data, parity)?;

        // A dedicated pool only when an explicit thread count was requested
        let pool = if config.parallel && config.threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!(
                        "Could not build a {}-thread pool, using the global pool: {}",
                        config.threads, e
                    );
                    None
                }
            }
        } else {
            None
        };

        let threads = config.effective_threads();
        debug!(
            "Reed-Solomon ({}, {}) ready: SIMD {:?}, {} threads",
            data,
            parity,
            simd_level(),
            threads
        );

        Ok(Self {
            data_count: data,
            parity_count: parity,
            generator,
            config,
            threads,
            pool,
        })
    }

    /// K
    pub fn data_count(&self) -> usize {
        self.data_count
    }

    /// M
    pub fn parity_count(&self) -> usize {
        self.parity_count
    }

    /// K + M
    pub fn total_count(&self) -> usize {
        self.data_count + self.parity_count
    }

    /// The (K+M)×K generator matrix
    pub fn generator(&self) -> &Matrix {
        &self.generator
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compute the M parity fragments from the K data fragments.
    ///
    /// `data` holds slots `0..K`; `parity` is indexed by parity number `0..M`
    /// (global slot `K + j`). Every buffer must be exactly `size` bytes. All inputs
    /// are validated before any output byte is written.
    pub fn encode(
        &self,
        data: &FragmentMap<'_>,
        parity: &mut FragmentMapMut<'_>,
        size: usize,
    ) -> CodecResult<()> {
        let k = self.data_count;
        let m = self.parity_count;

        if size == 0 {
            return Err(CodecError::EmptyFragments);
        }

        if let Some(slot) = data.present().last().filter(|&s| s >= k) {
            return Err(CodecError::SlotOutOfRange { slot, limit: k });
        }
        for slot in 0..k {
            let buffer = data.get(slot).ok_or(CodecError::MissingFragment { slot })?;
            check_length(slot, buffer.len(), size)?;
        }

        if let Some(j) = parity.present().last().filter(|&j| j >= m) {
            return Err(CodecError::SlotOutOfRange {
                slot: k + j,
                limit: k + m,
            });
        }
        for j in 0..m {
            let buffer = parity
                .get(j)
                .ok_or(CodecError::MissingFragment { slot: k + j })?;
            check_length(k + j, buffer.len(), size)?;
        }

        let mut targets: Targets<'_> = parity.iter_mut().collect();

        self.for_each_output(&mut targets, size, |j, output| {
            let row = self.generator.row(k + j);
            combine(
                row.iter()
                    .enumerate()
                    .filter_map(|(i, &c)| data.get(i).map(|input| (c, input))),
                output,
            );
        });

        Ok(())
    }

    /// Encode from plain buffers: `data.len()` must be K and `parity.len()` M.
    pub fn encode_buffers<D, P>(&self, data: &[D], parity: &mut [P]) -> CodecResult<()>
    where
        D: AsRef<[u8]>,
        P: AsMut<[u8]>,
    {
        check_buffer_count(data.len(), self.data_count, 0)?;
        check_buffer_count(parity.len(), self.parity_count, self.data_count)?;

        let size = data
            .first()
            .map(|d| d.as_ref().len())
            .ok_or(CodecError::MissingFragment { slot: 0 })?;

        let data_map = FragmentMap::from_buffers(data);
        let mut parity_map = FragmentMapMut::from_buffers(parity);
        self.encode(&data_map, &mut parity_map, size)
    }

    /// Validate an erasure pattern and compute its decode coefficients.
    ///
    /// `erased` are the slots to rebuild, `zeroed` slots known to be all zeros.
    /// The two sets must be disjoint and at least K slots must remain known.
    pub fn plan_recovery(&self, erased: &SlotSet, zeroed: &SlotSet) -> CodecResult<RecoveryPlan> {
        let k = self.data_count;
        let total = self.total_count();

        for set in [erased, zeroed] {
            if let Some(slot) = set.last().filter(|&s| s >= total) {
                return Err(CodecError::SlotOutOfRange {
                    slot,
                    limit: total,
                });
            }
        }

        if let Some(slot) = erased.intersection(zeroed).iter().next() {
            return Err(CodecError::ErasedZeroOverlap { slot });
        }

        let known = SlotSet::range(0, total).difference(erased);
        if known.len() < k {
            return Err(CodecError::InsufficientFragments {
                known: known.len(),
                required: k,
            });
        }

        // Lowest slots first: surviving data slots contribute identity rows
        let sources: SmallVec<[usize; MAX_DATA_FRAGMENTS]> = known.iter().take(k).collect();
        let decode = self.generator.select_rows(&sources).invert()?;

        let mut coefficients = Vec::with_capacity(erased.len() * k);
        for slot in erased {
            coefficients.extend(decode.left_multiply(self.generator.row(slot)));
        }

        debug!(
            "Recovery plan: erased {:?}, zero {:?}, sources {:?}",
            erased, zeroed, sources
        );

        Ok(RecoveryPlan {
            data_count: k,
            parity_count: self.parity_count,
            erased: *erased,
            zeroed: *zeroed,
            sources,
            coefficients,
        })
    }

    /// Rebuild the erased fragments of `plan`.
    ///
    /// `inputs` must hold a `size`-byte buffer for every slot that is neither erased
    /// nor zeroed; buffers for erased or zeroed slots are ignored. `outputs` must hold
    /// a `size`-byte buffer for every erased slot, keyed by that slot, and no others.
    pub fn recover_with_plan(
        &self,
        plan: &RecoveryPlan,
        inputs: &FragmentMap<'_>,
        outputs: &mut FragmentMapMut<'_>,
        size: usize,
    ) -> CodecResult<()> {
        if plan.data_count != self.data_count || plan.parity_count != self.parity_count {
            return Err(CodecError::InvalidConfiguration {
                data: plan.data_count,
                parity: plan.parity_count,
            });
        }
        if size == 0 {
            return Err(CodecError::EmptyFragments);
        }

        let total = self.total_count();
        if let Some(slot) = inputs.present().last().filter(|&s| s >= total) {
            return Err(CodecError::SlotOutOfRange {
                slot,
                limit: total,
            });
        }

        let required = SlotSet::range(0, total)
            .difference(&plan.erased)
            .difference(&plan.zeroed);
        for slot in &required {
            let buffer = inputs.get(slot).ok_or(CodecError::MissingFragment { slot })?;
            check_length(slot, buffer.len(), size)?;
        }

        // One output per erased slot and nothing else
        if outputs.present() != plan.erased {
            return Err(CodecError::OutputMismatch {
                expected: plan.erased.len(),
                actual: outputs.len(),
            });
        }
        for (slot, buffer) in outputs.iter_mut() {
            check_length(slot, buffer.len(), size)?;
        }

        if plan.erased.is_empty() {
            return Ok(());
        }

        // Zero slots among the sources drop out of every sum
        let sources: SmallVec<[(usize, &[u8]); MAX_DATA_FRAGMENTS]> = plan
            .sources
            .iter()
            .enumerate()
            .filter(|&(_, &slot)| !plan.zeroed.contains(slot))
            .filter_map(|(position, &slot)| inputs.get(slot).map(|b| (position, b)))
            .collect();

        let mut targets: Targets<'_> = outputs.iter_mut().collect();

        self.for_each_output(&mut targets, size, |slot, output| {
            if let Some(row) = plan.coefficients(slot) {
                combine(
                    sources
                        .iter()
                        .map(|&(position, input)| (row[position], input)),
                    output,
                );
            }
        });

        Ok(())
    }

    /// Rebuild erased fragments: [`plan_recovery`](Self::plan_recovery) followed by
    /// [`recover_with_plan`](Self::recover_with_plan).
    pub fn recover(
        &self,
        inputs: &FragmentMap<'_>,
        erased: &SlotSet,
        zeroed: &SlotSet,
        outputs: &mut FragmentMapMut<'_>,
        size: usize,
    ) -> CodecResult<()> {
        let plan = self.plan_recovery(erased, zeroed)?;
        self.recover_with_plan(&plan, inputs, outputs, size)
    }

    /// Run `job` once per output buffer, in parallel when the call is large enough.
    /// Each output is computed independently, so results do not depend on threading.
    fn for_each_output<F>(&self, targets: &mut [(usize, &mut [u8])], size: usize, job: F)
    where
        F: Fn(usize, &mut [u8]) + Sync + Send,
    {
        if self.config.use_parallel(self.threads, size, targets.len()) {
            debug!(
                "Processing {} fragments of {} bytes in parallel on {} threads",
                targets.len(),
                size,
                self.threads
            );
            match &self.pool {
                Some(pool) => pool.install(|| apply_parallel(targets, &job)),
                None => apply_parallel(targets, &job),
            }
        } else {
            debug!(
                "Processing {} fragments of {} bytes sequentially",
                targets.len(),
                size
            );
            for (slot, output) in targets.iter_mut() {
                job(*slot, &mut **output);
            }
        }
    }
}

fn apply_parallel<F>(targets: &mut [(usize, &mut [u8])], job: &F)
where
    F: Fn(usize, &mut [u8]) + Sync,
{
    targets
        .par_iter_mut()
        .for_each(|(slot, output)| job(*slot, &mut **output));
}

/// `output = Σ coefficient · input` over the given terms
fn combine<'s>(terms: impl Iterator<Item = (Galois8, &'s [u8])>, output: &mut [u8]) {
    let mut mode = WriteOp::Direct;
    for (coefficient, input) in terms {
        if coefficient.is_zero() {
            continue;
        }
        process_slice_multiply(input, output, &build_mul_table(coefficient), mode);
        mode = WriteOp::Add;
    }

    // No contributing term: the fragment is all zeros
    if mode == WriteOp::Direct {
        output.fill(0);
    }
}

#[inline]
fn check_length(slot: usize, actual: usize, expected: usize) -> CodecResult<()> {
    if actual != expected {
        return Err(CodecError::LengthMismatch {
            slot,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_buffer_count(actual: usize, expected: usize, first_slot: usize) -> CodecResult<()> {
    if actual < expected {
        return Err(CodecError::MissingFragment {
            slot: first_slot + actual,
        });
    }
    if actual > expected {
        return Err(CodecError::SlotOutOfRange {
            slot: first_slot + expected,
            limit: first_slot + expected,
        });
    }
    Ok(())
}
