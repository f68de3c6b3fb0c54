//! Pitch lookup table.
//!
//! Entries are 16-bit phase increments for the oscillators at the engine's
//! fixed 31 250 Hz logical sample rate. Index 0 is silence; 1..=63 climb
//! chromatically from C-4.

/// Highest valid note index.
pub const MAX_NOTE: u8 = 63;

/// Ceiling for frequency slides and vibrato (the top of the table).
pub const MAX_FREQ: u16 = 9397;

/// Ceiling for volume slides and tremolo.
pub const MAX_VOLUME: u8 = 63;

/// Note index → phase increment.
pub const NOTE_TABLE: [u16; 64] = [
    0,
    262, 277, 294, 311, 330, 349, 370, 392, 415, 440, 466, 494,
    523, 554, 587, 622, 659, 698, 740, 784, 831, 880, 932, 988,
    1047, 1109, 1175, 1245, 1319, 1397, 1480, 1568, 1661, 1760, 1865, 1976,
    2093, 2217, 2349, 2489, 2637, 2794, 2960, 3136, 3322, 3520, 3729, 3951,
    4186, 4435, 4699, 4978, 5274, 5588, 5920, 6272, 6645, 7040, 7459, 7902,
    8372, 8870, 9397,
];

/// Look up a note, clamping out-of-range indices to the top of the table.
pub fn note_to_freq(note: u8) -> u16 {
    NOTE_TABLE[note.min(MAX_NOTE) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_silence() {
        assert_eq!(NOTE_TABLE[0], 0);
        assert_eq!(note_to_freq(0), 0);
    }

    #[test]
    fn table_is_monotonic() {
        for pair in NOTE_TABLE.windows(2) {
            assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn octave_roughly_doubles() {
        // C-4 (1) vs C-5 (13) vs C-6 (25)
        assert_eq!(NOTE_TABLE[13], 523);
        assert!((NOTE_TABLE[13] as i32 - 2 * NOTE_TABLE[1] as i32).abs() <= 1);
        assert!((NOTE_TABLE[25] as i32 - 2 * NOTE_TABLE[13] as i32).abs() <= 1);
    }

    #[test]
    fn last_entry_is_max_freq() {
        assert_eq!(NOTE_TABLE[MAX_NOTE as usize], MAX_FREQ);
    }

    #[test]
    fn out_of_range_note_clamps() {
        assert_eq!(note_to_freq(64), MAX_FREQ);
        assert_eq!(note_to_freq(255), MAX_FREQ);
    }
}
