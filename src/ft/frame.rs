//! Force/torque sensor frame decoding
//!
//! The sensor emits a fixed 28-byte record with no delimiter and no
//! checksum: seven little-endian IEEE-754 float32 values in wire order
//! `CH2, CH1, CH4, CH3, CH6, CH5, temp`. Neighbouring channel pairs are
//! swapped on the wire, so the host-side mapping is
//!
//! ```text
//! wire:  CH2  CH1  CH4  CH3  CH6  CH5  temp
//! host:  Fy   Fx   Mx   Fz   Mz   My   temp
//! cols:  Fx=CH1, Fy=CH2, Fz=CH3, Mx=CH4, My=CH5, Mz=CH6
//! ```

/// Fixed frame size on the wire
pub const FRAME_SIZE: usize = 28;

/// One decoded and timestamped sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FtSample {
    /// Host wall-clock when the frame was fully read, ms since Unix epoch
    pub timestamp_ms: u64,
    pub fx: f32,
    pub fy: f32,
    pub fz: f32,
    pub mx: f32,
    pub my: f32,
    pub mz: f32,
    pub temp: f32,
}

/// Decode a raw frame into the seven wire-order float32 values
pub fn decode_frame(frame: &[u8; FRAME_SIZE]) -> [f32; 7] {
    let mut wire = [0f32; 7];
    for (i, value) in wire.iter_mut().enumerate() {
        let base = i * 4;
        *value = f32::from_le_bytes([
            frame[base],
            frame[base + 1],
            frame[base + 2],
            frame[base + 3],
        ]);
    }
    wire
}

/// Apply the channel map and attach the host timestamp
pub fn map_channels(wire: [f32; 7], timestamp_ms: u64) -> FtSample {
    let [ch2, ch1, ch4, ch3, ch6, ch5, temp] = wire;
    FtSample {
        timestamp_ms,
        fx: ch1,
        fy: ch2,
        fz: ch3,
        mx: ch4,
        my: ch5,
        mz: ch6,
        temp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a frame from wire-order values
    fn frame_bytes(wire: [f32; 7]) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        for (i, v) in wire.iter().enumerate() {
            frame[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        frame
    }

    #[test]
    fn test_decode_wire_order() {
        let frame = frame_bytes([2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 7.0]);
        let wire = decode_frame(&frame);
        assert_eq!(wire, [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 7.0]);
    }

    #[test]
    fn test_channel_map_swaps_pairs() {
        // Wire floats (2,1,4,3,6,5,7) must surface as Fx..Mz,temp = 1..7
        let sample = map_channels([2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 7.0], 0);
        assert_eq!(
            (
                sample.fx, sample.fy, sample.fz, sample.mx, sample.my, sample.mz, sample.temp
            ),
            (1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0)
        );
    }
}
