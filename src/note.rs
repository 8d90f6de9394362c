// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.
//!
//! A note is an index counting semitones, where `12 * octave + name` picks the
//! note. Index 57 (A4) is the tuning reference at 440 Hz.

use std::str::FromStr;

/// The name of a note in standard notation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// Any offset applied to a note in standard notation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteOffset {
    /// The note is a half-tone lower then indicated by its name.
    Flat,
    /// The note is left unchanged.
    Base,
    /// The note is a half-tone higher then indicated by its name.
    Sharp,
}

/// Compute the note index from standard notation.
/// Note that different names may refer to the same note, e.g. a G♯ is the same as a A♭.
///
/// # Examples
///
/// ```
/// use note_forge::note::*;
///
/// assert_eq!(note_index(NoteName::A, NoteOffset::Base, 4), 57);
/// assert_eq!(note_index(NoteName::C, NoteOffset::Base, 0), 0);
/// assert_eq!(note_index(NoteName::G, NoteOffset::Flat, 2), 30);
/// ```
pub fn note_index(name: NoteName, offset: NoteOffset, octave: i32) -> i32 {
    let name_index = match name {
        NoteName::C => 0,
        NoteName::D => 2,
        NoteName::E => 4,
        NoteName::F => 5,
        NoteName::G => 7,
        NoteName::A => 9,
        NoteName::B => 11,
    };
    let offset_index = match offset {
        NoteOffset::Base => 0,
        NoteOffset::Flat => -1,
        NoteOffset::Sharp => 1,
    };
    octave * 12 + name_index + offset_index
}

/// Parse a note given either as a plain index or as a name string of the
/// format `<letter><offset><octave>`.
///
/// # Examples
///
/// ```
/// # use note_forge::note::*;
///
/// assert_eq!(parse_note("A4"), Some(57));
/// assert_eq!(parse_note("a4"), Some(57));
/// assert_eq!(parse_note("Csharp5"), Some(61));
/// assert_eq!(parse_note("C♯5"), Some(61));
/// assert_eq!(parse_note("Gb2"), Some(30));
/// assert_eq!(parse_note("B-1"), Some(-1));
/// assert_eq!(parse_note("12"), Some(12));
/// assert_eq!(parse_note("H2"), None);
/// ```
pub fn parse_note(name_str: &str) -> Option<i32> {
    if let Ok(index) = name_str.parse() {
        return Some(index);
    }

    let mut name_chars = name_str.chars();
    let name_ch = name_chars.next()?;
    let name = match name_ch.to_ascii_uppercase() {
        'A' => NoteName::A,
        'B' => NoteName::B,
        'C' => NoteName::C,
        'D' => NoteName::D,
        'E' => NoteName::E,
        'F' => NoteName::F,
        'G' => NoteName::G,
        _ => return None,
    };

    let offset_str = name_chars
        .as_str()
        .trim_end_matches(|ch: char| ch.is_ascii_digit() || ch == '-');
    let offset = match offset_str {
        "sharp" | "♯" | "#" => NoteOffset::Sharp,
        "flat" | "♭" | "b" => NoteOffset::Flat,
        "" => NoteOffset::Base,
        _ => return None,
    };

    let octave_str = &name_chars.as_str()[offset_str.len()..];
    let octave = octave_str.parse().ok()?;
    Some(note_index(name, offset, octave))
}

/// Musical note values, measured relative to a crotchet (quarter note) beat.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteLength {
    Breve,
    DottedSemibreve,
    Semibreve,
    DottedMinim,
    Minim,
    DottedCrotchet,
    Crotchet,
    DottedQuaver,
    Quaver,
    DottedSemiquaver,
    Semiquaver,
    DottedDemisemiquaver,
    Demisemiquaver,
}

impl NoteLength {
    /// Length in crotchet beats.
    pub fn beats(self) -> f32 {
        match self {
            NoteLength::Breve => 8.0,
            NoteLength::DottedSemibreve => 6.0,
            NoteLength::Semibreve => 4.0,
            NoteLength::DottedMinim => 3.0,
            NoteLength::Minim => 2.0,
            NoteLength::DottedCrotchet => 1.5,
            NoteLength::Crotchet => 1.0,
            NoteLength::DottedQuaver => 0.75,
            NoteLength::Quaver => 0.5,
            NoteLength::DottedSemiquaver => 0.375,
            NoteLength::Semiquaver => 0.25,
            NoteLength::DottedDemisemiquaver => 0.1875,
            NoteLength::Demisemiquaver => 0.125,
        }
    }

    /// Length in seconds at the given tempo in crotchet beats per minute.
    ///
    /// ```
    /// # use note_forge::note::NoteLength;
    /// assert_eq!(NoteLength::Crotchet.seconds(120.0), 0.5);
    /// assert_eq!(NoteLength::DottedMinim.seconds(60.0), 3.0);
    /// ```
    pub fn seconds(self, beats_per_minute: f32) -> f32 {
        self.beats() * 60.0 / beats_per_minute
    }
}

impl FromStr for NoteLength {
    type Err = String;

    /// Accepts the British names (`crotchet`, `dotted-quaver`) as well as the
    /// American ones (`quarter`, `dotted-eighth`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let (dotted, base) = match lower.strip_prefix("dotted") {
            Some(rest) => (true, rest.trim_start_matches(|ch: char| ch == '-' || ch == '_' || ch == ' ')),
            None => (false, lower.as_str()),
        };
        let length = match (dotted, base) {
            (false, "breve") | (false, "double-whole") => NoteLength::Breve,
            (true, "semibreve") | (true, "whole") => NoteLength::DottedSemibreve,
            (false, "semibreve") | (false, "whole") => NoteLength::Semibreve,
            (true, "minim") | (true, "half") => NoteLength::DottedMinim,
            (false, "minim") | (false, "half") => NoteLength::Minim,
            (true, "crotchet") | (true, "quarter") => NoteLength::DottedCrotchet,
            (false, "crotchet") | (false, "quarter") => NoteLength::Crotchet,
            (true, "quaver") | (true, "eighth") => NoteLength::DottedQuaver,
            (false, "quaver") | (false, "eighth") => NoteLength::Quaver,
            (true, "semiquaver") | (true, "sixteenth") => NoteLength::DottedSemiquaver,
            (false, "semiquaver") | (false, "sixteenth") => NoteLength::Semiquaver,
            (true, "demisemiquaver") | (true, "thirty-second") => {
                NoteLength::DottedDemisemiquaver
            }
            (false, "demisemiquaver") | (false, "thirty-second") => NoteLength::Demisemiquaver,
            _ => return Err(format!("unknown note length {:?}", s)),
        };
        Ok(length)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enharmonic() {
        assert_eq!(parse_note("G#3"), parse_note("Ab3"));
        assert_eq!(parse_note("E#3"), parse_note("F3"));
        assert_eq!(parse_note("Cb4"), parse_note("B3"));
    }

    #[test]
    fn lengths() {
        assert_eq!("crotchet".parse(), Ok(NoteLength::Crotchet));
        assert_eq!("dotted-quaver".parse(), Ok(NoteLength::DottedQuaver));
        assert_eq!("Dotted Half".parse(), Ok(NoteLength::DottedMinim));
        assert_eq!("thirty-second".parse(), Ok(NoteLength::Demisemiquaver));
        assert!("dotted-breve".parse::<NoteLength>().is_err());
        assert_eq!(NoteLength::Semibreve.seconds(120.0), 2.0);
    }
}
