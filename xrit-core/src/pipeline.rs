//! The frame decoding pipeline: synchronization, error correction, and the
//! statistics bookkeeping threaded through every stage.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam::channel::{Sender, TrySendError};
use log::{debug, warn};

use crate::config::{DecoderConfig, Mode};
use crate::correlator::Correlator;
use crate::derandomizer::Derandomizer;
use crate::errors::{DecoderError, Result};
use crate::fifo::SymbolFifo;
use crate::frame::{
    FrameHeader, CODED_FRAME_SIZE, FRAME_BITS, FRAME_SIZE, PAYLOAD_SIZE, RS_BLOCKS,
    SYNC_WORD_SIZE, TAIL_CARRY_BYTES, TAIL_CARRY_SYMBOLS,
};
use crate::metrics::{MetricSink, NullMetrics};
use crate::nrzm::nrzm_decode;
use crate::packet_fixer::{fix_packet, PhaseShift};
use crate::reed_solomon::{deinterleave, interleave, ReedSolomon, BLOCK_SIZE};
use crate::statistics::{ChannelCounters, Statistics};
use crate::viterbi::Viterbi;

/// Viterbi error count at which signal quality reads zero.
const MAX_VITERBI_ERRORS: u32 = 500;

/// Scan window used to verify alignment while the flywheel is locked.
const SHORT_SCAN: usize = CODED_FRAME_SIZE / 64;

/// Outcome of one pipeline iteration that consumed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame was valid; payload handed to the demultiplexer.
    Dispatched,
    /// All RS blocks failed; frame dropped, lock lost.
    Dropped,
}

/// Streaming soft-symbol frame decoder.
///
/// Symbols enter through the shared [`SymbolFifo`]; validated payloads leave
/// through the payload channel (blocking, lossless) and statistics snapshots
/// through the optional stats channel (non-blocking, dropped under pressure).
/// The pipeline itself is strictly single threaded; [`FrameDecoder::run`]
/// drives it until the shutdown flag clears.
pub struct FrameDecoder {
    config: DecoderConfig,
    fifo: Arc<SymbolFifo>,
    running: Arc<AtomicBool>,
    demod_fifo_usage: Arc<AtomicU8>,

    correlator: Correlator,
    viterbi: Viterbi,
    derandomizer: Derandomizer,
    reed_solomon: ReedSolomon,
    metrics: Box<dyn MetricSink>,

    payload_tx: Sender<Vec<u8>>,
    stats_tx: Option<Sender<Statistics>>,

    coded: Vec<u8>,
    viterbi_in: Vec<u8>,
    decoded: Vec<u8>,
    corrected: Vec<u8>,
    rs_block: [u8; BLOCK_SIZE],
    /// Coded tail of the previous frame, seeding the next Viterbi pass.
    tail: Vec<u8>,

    stats: Statistics,
    counters: ChannelCounters,
    rs_sum: f32,
    vit_sum: f32,
    flywheel: u32,
    locked: bool,
}

impl FrameDecoder {
    pub fn new(config: DecoderConfig, payload_tx: Sender<Vec<u8>>) -> Self {
        let tail_bits = if config.use_last_frame_data {
            TAIL_CARRY_BYTES * 8
        } else {
            0
        };
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0);

        let stats = Statistics {
            start_time,
            frame_bits: FRAME_BITS as u32,
            ..Statistics::default()
        };

        Self {
            config: config.clone(),
            correlator: Correlator::new(config.mode.sync_words()),
            viterbi: Viterbi::new(FRAME_BITS + tail_bits),
            derandomizer: Derandomizer::new(),
            reed_solomon: ReedSolomon::new(),
            metrics: Box::new(NullMetrics),
            fifo: Arc::new(SymbolFifo::new(config.fifo_capacity)),
            running: Arc::new(AtomicBool::new(true)),
            demod_fifo_usage: Arc::new(AtomicU8::new(0)),
            payload_tx,
            stats_tx: None,
            coded: vec![0; CODED_FRAME_SIZE],
            viterbi_in: vec![0; CODED_FRAME_SIZE + tail_bits * 2],
            decoded: vec![0; FRAME_SIZE + tail_bits / 8],
            corrected: vec![0; FRAME_SIZE],
            rs_block: [0; BLOCK_SIZE],
            tail: vec![0x80; tail_bits * 2],
            stats,
            counters: ChannelCounters::new(),
            rs_sum: 0.0,
            vit_sum: 0.0,
            flywheel: 0,
            locked: false,
        }
    }

    /// Replace the metric sink (defaults to [`NullMetrics`]).
    pub fn with_metrics<M: MetricSink + 'static>(mut self, metrics: M) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    /// Attach a statistics channel; snapshots are sent non-blocking and
    /// dropped when the receiver lags.
    pub fn with_stats_channel(mut self, stats_tx: Sender<Statistics>) -> Self {
        self.stats_tx = Some(stats_tx);
        self
    }

    /// The symbol queue shared with the demodulator producer.
    pub fn fifo(&self) -> Arc<SymbolFifo> {
        Arc::clone(&self.fifo)
    }

    /// Cooperative shutdown flag, polled at every iteration boundary.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Gauge through which the demodulator reports its own FIFO usage.
    pub fn demod_usage_gauge(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.demod_fifo_usage)
    }

    /// The statistics snapshot of the most recent frame.
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Drive the pipeline until the shutdown flag clears or the payload
    /// receiver disconnects.
    pub fn run(&mut self) {
        while self.running.load(Ordering::Relaxed) {
            if self.fifo.len() < CODED_FRAME_SIZE {
                thread::sleep(Duration::from_micros(5));
                continue;
            }
            match self.process_frame() {
                Ok(_) => {}
                Err(DecoderError::ChannelClosed) => break,
                // recoverable per-frame events; already reflected in stats
                Err(_) => {}
            }
        }
        debug!("decoder loop exit");
    }

    /// Execute one pipeline iteration over the next coded frame.
    pub fn process_frame(&mut self) -> Result<FrameStatus> {
        let decoder_usage = self.fifo.usage();
        let demod_usage = self.demod_fifo_usage.load(Ordering::Relaxed);
        self.metrics.decoder_fifo_usage(decoder_usage);
        self.metrics.demodulator_fifo_usage(demod_usage);

        if self.stats.total_packets % self.config.frames_per_average == 0 {
            self.rs_sum = 0.0;
            self.vit_sum = 0.0;
        }

        if !self.fifo.pop_into(&mut self.coded) {
            return Err(DecoderError::InsufficientSymbols {
                required: CODED_FRAME_SIZE,
                available: self.fifo.len(),
            });
        }

        // Flywheel: skip the full-frame scan while the previous frame locked
        // cleanly, but force one every recheck period to catch slow drift.
        if self.flywheel == self.config.flywheel_recheck {
            self.locked = false;
            self.flywheel = 0;
        }
        let sync = if self.locked {
            let short = self.correlator.correlate(&self.coded, SHORT_SCAN);
            if short.position != 0 {
                self.flywheel = 0;
                self.correlator.correlate(&self.coded, CODED_FRAME_SIZE)
            } else {
                short
            }
        } else {
            self.correlator.correlate(&self.coded, CODED_FRAME_SIZE)
        };
        self.flywheel += 1;

        let phase = if sync.word_index == 1 {
            PhaseShift::Deg180
        } else {
            PhaseShift::Deg0
        };
        self.metrics.sync_correlation(sync.correlation);

        if sync.correlation < self.config.min_correlation {
            warn!(
                "correlation didn't match criteria of {} bits, got {}",
                self.config.min_correlation, sync.correlation
            );
            self.locked = false;
            self.metrics.signal_status(false);
            return Err(DecoderError::LowCorrelation {
                correlation: sync.correlation,
                minimum: self.config.min_correlation,
            });
        }

        if sync.position != 0 {
            // Realign: rotate the sync word to the front and top the buffer
            // back up to a whole coded frame.
            self.coded.rotate_left(sync.position);
            let refill_at = CODED_FRAME_SIZE - sync.position;
            loop {
                if self.fifo.pop_into(&mut self.coded[refill_at..]) {
                    break;
                }
                if !self.running.load(Ordering::Relaxed) {
                    return Err(DecoderError::InsufficientSymbols {
                        required: sync.position,
                        available: self.fifo.len(),
                    });
                }
                thread::sleep(Duration::from_micros(1));
            }
        }

        if self.config.mode == Mode::Lrit {
            fix_packet(&mut self.coded, phase, false);
        }

        if self.config.use_last_frame_data {
            self.viterbi_in[..TAIL_CARRY_SYMBOLS].copy_from_slice(&self.tail);
            self.viterbi_in[TAIL_CARRY_SYMBOLS..].copy_from_slice(&self.coded);
            self.viterbi.decode(&self.viterbi_in, &mut self.decoded);
        } else {
            self.viterbi.decode(&self.coded, &mut self.decoded);
        }

        if self.config.mode == Mode::Hrit {
            nrzm_decode(&mut self.decoded);
        }

        let mut vit_errors = self.viterbi.ber();
        if self.config.use_last_frame_data {
            // Do not account for carried-tail bit errors.
            vit_errors = vit_errors.saturating_sub(TAIL_CARRY_SYMBOLS as u32 / 2);
        }
        self.metrics.viterbi_errors(vit_errors);

        let signal_quality = if vit_errors >= MAX_VITERBI_ERRORS {
            0
        } else {
            (100 * (MAX_VITERBI_ERRORS - vit_errors) / MAX_VITERBI_ERRORS) as u8
        };
        self.metrics.signal_quality(signal_quality);
        self.vit_sum += vit_errors as f32;

        if self.config.use_last_frame_data {
            self.tail
                .copy_from_slice(&self.coded[CODED_FRAME_SIZE - TAIL_CARRY_SYMBOLS..]);
            self.decoded.copy_within(TAIL_CARRY_BYTES.., 0);
        }

        self.stats
            .sync_word
            .copy_from_slice(&self.decoded[..SYNC_WORD_SIZE]);
        self.decoded.copy_within(SYNC_WORD_SIZE..FRAME_SIZE, 0);
        let body_size = FRAME_SIZE - SYNC_WORD_SIZE;

        self.stats.total_packets += 1;

        self.derandomizer.apply(&mut self.decoded[..body_size]);

        let mut bytes_fixed = 0u32;
        for block in 0..RS_BLOCKS {
            deinterleave(&self.decoded[..body_size], &mut self.rs_block, block, RS_BLOCKS);
            let corrections = self.reed_solomon.decode(&mut self.rs_block);
            interleave(&self.rs_block, &mut self.corrected[..body_size], block, RS_BLOCKS);
            self.stats.rs_errors[block] = corrections;
            if corrections > -1 {
                self.rs_sum += corrections as f32;
                bytes_fixed += corrections as u32;
            }
        }
        self.metrics.rs_bytes_fixed(bytes_fixed);

        let corrupted = self.stats.rs_errors.iter().all(|&errors| errors == -1);
        if corrupted {
            self.locked = false;
            self.stats.dropped_packets += 1;
            self.metrics.signal_status(false);
        } else {
            self.locked = true;
            self.metrics.signal_status(true);
        }

        let header = FrameHeader::parse(&self.corrected);

        self.stats.decoder_fifo_usage = decoder_usage;
        self.stats.demodulator_fifo_usage = demod_usage;
        self.stats.scid = header.scid;
        self.stats.vcid = header.vcid;
        self.stats.packet_number = u64::from(header.counter);
        self.stats.vit_errors = vit_errors as u16;
        self.stats.signal_quality = signal_quality;
        self.stats.sync_correlation = sync.correlation;
        self.stats.phase_correction = phase.wire_code();

        let status = if corrupted {
            self.stats.frame_lock = 0;
            FrameStatus::Dropped
        } else {
            self.stats.frame_lock = 1;
            let gap = self.counters.record(header.vcid, header.counter);
            self.stats.lost_packets += gap;

            let window = self.stats.total_packets % self.config.frames_per_average;
            if window == 0 {
                self.stats.average_rs_corrections = (self.rs_sum / RS_BLOCKS as f32) as u8;
                self.stats.average_vit_corrections = self.vit_sum as u16;
            } else {
                self.stats.average_rs_corrections =
                    (self.rs_sum / (RS_BLOCKS as f32 * window as f32)) as u8;
                self.stats.average_vit_corrections = (self.vit_sum / window as f32) as u16;
            }
            self.stats.received_packets_per_channel = *self.counters.received();
            self.stats.lost_packets_per_channel = *self.counters.lost();

            // payload loss is unacceptable once produced: block on the demuxer
            self.payload_tx
                .send(self.corrected[..PAYLOAD_SIZE].to_vec())
                .map_err(|_| DecoderError::ChannelClosed)?;
            FrameStatus::Dispatched
        };

        if let Some(stats_tx) = &self.stats_tx {
            match stats_tx.try_send(self.stats.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => debug!("stats channel full, snapshot dropped"),
                Err(TrySendError::Disconnected(_)) => {
                    debug!("stats receiver gone, snapshot dropped")
                }
            }
        }

        Ok(status)
    }
}
