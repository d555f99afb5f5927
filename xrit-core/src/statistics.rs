//! Per-frame decoder statistics and channel-continuity bookkeeping.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::frame::{RS_BLOCKS, SYNC_WORD_SIZE};

/// Number of addressable virtual channels.
pub const CHANNELS: usize = 256;

/// Snapshot of the decoder state, fully settled once per frame and published
/// by copy. `pack` produces the little-endian fixed-layout wire form consumed
/// by the statistics channel.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub start_time: i64,
    pub total_packets: u64,
    pub dropped_packets: u64,
    pub lost_packets: u64,
    pub average_vit_corrections: u16,
    pub average_rs_corrections: u8,
    pub vit_errors: u16,
    /// Corrected symbols per RS block, -1 for an uncorrectable block.
    pub rs_errors: [i32; RS_BLOCKS],
    pub sync_correlation: u8,
    pub phase_correction: u8,
    pub signal_quality: u8,
    pub frame_lock: u8,
    pub frame_bits: u32,
    pub sync_word: [u8; SYNC_WORD_SIZE],
    pub scid: u8,
    pub vcid: u8,
    pub packet_number: u64,
    pub demodulator_fifo_usage: u8,
    pub decoder_fifo_usage: u8,
    #[serde_as(as = "[_; 256]")]
    pub received_packets_per_channel: [i64; CHANNELS],
    #[serde_as(as = "[_; 256]")]
    pub lost_packets_per_channel: [i64; CHANNELS],
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            start_time: 0,
            total_packets: 0,
            dropped_packets: 0,
            lost_packets: 0,
            average_vit_corrections: 0,
            average_rs_corrections: 0,
            vit_errors: 0,
            rs_errors: [0; RS_BLOCKS],
            sync_correlation: 0,
            phase_correction: 0,
            signal_quality: 0,
            frame_lock: 0,
            frame_bits: 0,
            sync_word: [0; SYNC_WORD_SIZE],
            scid: 0,
            vcid: 0,
            packet_number: 0,
            demodulator_fifo_usage: 0,
            decoder_fifo_usage: 0,
            received_packets_per_channel: [0; CHANNELS],
            lost_packets_per_channel: [0; CHANNELS],
        }
    }
}

impl Statistics {
    /// Size of the packed wire form in bytes.
    pub const PACKED_SIZE: usize = 61 + RS_BLOCKS * 4 + CHANNELS * 16;

    /// Serialize into the little-endian packed layout, field order as
    /// documented on the statistics channel.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::PACKED_SIZE);
        buf.extend_from_slice(&self.start_time.to_le_bytes());
        buf.extend_from_slice(&self.total_packets.to_le_bytes());
        buf.extend_from_slice(&self.dropped_packets.to_le_bytes());
        buf.extend_from_slice(&self.lost_packets.to_le_bytes());
        buf.extend_from_slice(&self.average_vit_corrections.to_le_bytes());
        buf.push(self.average_rs_corrections);
        buf.extend_from_slice(&self.vit_errors.to_le_bytes());
        for errors in &self.rs_errors {
            buf.extend_from_slice(&errors.to_le_bytes());
        }
        buf.push(self.sync_correlation);
        buf.push(self.phase_correction);
        buf.push(self.signal_quality);
        buf.push(self.frame_lock);
        buf.extend_from_slice(&self.frame_bits.to_le_bytes());
        buf.extend_from_slice(&self.sync_word);
        buf.push(self.scid);
        buf.push(self.vcid);
        buf.extend_from_slice(&self.packet_number.to_le_bytes());
        buf.push(self.demodulator_fifo_usage);
        buf.push(self.decoder_fifo_usage);
        for received in &self.received_packets_per_channel {
            buf.extend_from_slice(&received.to_le_bytes());
        }
        for lost in &self.lost_packets_per_channel {
            buf.extend_from_slice(&lost.to_le_bytes());
        }
        buf
    }
}

/// Per-VCID frame continuity counters.
///
/// The last-seen counter starts at -1 so the first frame on a channel never
/// registers a gap.
#[derive(Debug, Clone)]
pub struct ChannelCounters {
    last: [i64; CHANNELS],
    received: [i64; CHANNELS],
    lost: [i64; CHANNELS],
}

impl ChannelCounters {
    pub fn new() -> Self {
        Self {
            last: [-1; CHANNELS],
            received: [0; CHANNELS],
            lost: [0; CHANNELS],
        }
    }

    /// Record a valid frame for `vcid` and return how many frames went
    /// missing since the last one.
    pub fn record(&mut self, vcid: u8, counter: u32) -> u64 {
        let channel = vcid as usize;
        let counter = i64::from(counter);
        let mut gap = 0;
        if self.last[channel] > -1 && self.last[channel] + 1 != counter {
            gap = (counter - self.last[channel] - 1).max(0);
            self.lost[channel] += gap;
        }
        self.last[channel] = counter;
        self.received[channel] += 1;
        gap as u64
    }

    pub fn last_counter(&self, vcid: u8) -> i64 {
        self.last[vcid as usize]
    }

    pub fn received(&self) -> &[i64; CHANNELS] {
        &self.received
    }

    pub fn lost(&self) -> &[i64; CHANNELS] {
        &self.lost
    }
}

impl Default for ChannelCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_is_stable() {
        let stats = Statistics {
            start_time: 0x0102_0304_0506_0708,
            total_packets: 2,
            vit_errors: 0x1234,
            rs_errors: [3, -1, 0, 7],
            sync_correlation: 64,
            frame_lock: 1,
            sync_word: [0x1A, 0xCF, 0xFC, 0x1D],
            ..Statistics::default()
        };
        let packed = stats.pack();
        assert_eq!(packed.len(), Statistics::PACKED_SIZE);
        // little-endian start time leads
        assert_eq!(packed[0], 0x08);
        assert_eq!(packed[7], 0x01);
        // vit errors at its fixed offset
        assert_eq!(&packed[35..37], &[0x34, 0x12]);
        // rs_errors[1] == -1
        assert_eq!(&packed[41..45], &[0xFF, 0xFF, 0xFF, 0xFF]);
        // sync word follows frame bits
        assert_eq!(&packed[61..65], &[0x1A, 0xCF, 0xFC, 0x1D]);
    }

    #[test]
    fn contiguous_counters_lose_nothing() {
        let mut counters = ChannelCounters::new();
        for counter in 100..110 {
            assert_eq!(counters.record(7, counter), 0);
        }
        assert_eq!(counters.received()[7], 10);
        assert_eq!(counters.lost()[7], 0);
    }

    #[test]
    fn gap_adds_exactly_the_missing_frames() {
        let mut counters = ChannelCounters::new();
        counters.record(7, 100);
        counters.record(7, 101);
        assert_eq!(counters.record(7, 105), 3);
        assert_eq!(counters.lost()[7], 3);
        assert_eq!(counters.received()[7], 3);
    }

    #[test]
    fn first_frame_never_counts_as_a_gap() {
        let mut counters = ChannelCounters::new();
        assert_eq!(counters.record(30, 5000), 0);
        assert_eq!(counters.lost()[30], 0);
        assert_eq!(counters.last_counter(30), 5000);
        // other channels untouched
        assert_eq!(counters.last_counter(31), -1);
    }
}
