//! Cyclic subset seeds (spec.md §4.B), grounded in
//! `original_source/CyclicSubsetSeed.cc`.
//!
//! A seed is an ordered sequence of *positions*; each position owns a
//! byte -> subset-id map of length 256. Matching advances cyclically
//! through the positions via [`CyclicSubsetSeed::next_map`].

use crate::error::LastError;
use eyre::{eyre, Result};

/// The subset id that never matches; reserved for the delimiter byte.
pub const DELIMITER: u8 = 255;
const MAX_LETTERS: usize = DELIMITER as usize;

/// Recommended in "YASS: enhancing the sensitivity of DNA similarity
/// search", NAR 2005 33:W540-W543.
pub const YASS_SEED: &str = "\
A C G T
AG CT
A C G T
ACGT
ACGT
A C G T
A C G T
ACGT
ACGT
A C G T
ACGT
A C G T
";

#[derive(Debug, Clone)]
pub struct CyclicSubsetSeed {
    /// Flattened `positions.len() * 256` byte -> subset-id maps.
    subset_maps: Vec<[u8; 256]>,
    /// The canonicalized subset-label groups per position, used to
    /// round-trip the seed back into `.prj` `subsetseed=` lines.
    subset_lists: Vec<Vec<String>>,
}

impl CyclicSubsetSeed {
    pub fn from_text(src: &str, is_mask_lowercase: bool, letter_code: &[u8; 256]) -> Result<Self> {
        let mut seed = Self {
            subset_maps: Vec::new(),
            subset_lists: Vec::new(),
        };
        for line in src.lines() {
            if is_blank_or_comment(line) {
                continue;
            }
            seed.append_position(line, is_mask_lowercase, letter_code)?;
        }
        if seed.subset_maps.is_empty() {
            return Err(eyre!(LastError::Configuration(
                "seed pattern has no positions".to_string()
            )));
        }
        Ok(seed)
    }

    /// Expand a compact code string (`1`/`#` = exact match, `0`/`_`/`-` = any
    /// proper letter, `T`/`t`/`@` = DNA transition group `AG|CT`) into a
    /// position list, per `CyclicSubsetSeed::fromCodeString`.
    pub fn from_code(code: &str, letters: &str, is_mask_lowercase: bool, letter_code: &[u8; 256]) -> Result<Self> {
        let exact: String = letters.bytes().map(|b| b as char).collect::<Vec<_>>().join(" ");
        let mut seed = Self {
            subset_maps: Vec::new(),
            subset_lists: Vec::new(),
        };
        for c in code.chars() {
            let line = match c {
                '1' | '#' => exact.clone(),
                '0' | '_' | '-' => letters.to_string(),
                'T' | 't' | '@' => "AG CT".to_string(),
                _ => return Err(eyre!(LastError::Configuration(format!("bad seed pattern: {code}")))),
            };
            seed.append_position(&line, is_mask_lowercase, letter_code)?;
        }
        Ok(seed)
    }

    fn append_position(&mut self, line: &str, is_mask_lowercase: bool, letter_code: &[u8; 256]) -> Result<()> {
        let mut numbers_to_subsets = [DELIMITER; MAX_LETTERS];
        let mut subset_list = Vec::new();

        for (subset_num, word) in line.split_whitespace().enumerate() {
            if subset_num >= DELIMITER as usize {
                return Err(eyre!(LastError::Configuration("too many subsets in seed position".to_string())));
            }
            let mut subset_chars: Vec<char> = Vec::new();
            for ch in word.chars() {
                let upper = ch.to_ascii_uppercase();
                let lower = ch.to_ascii_lowercase();
                add_letter(&mut numbers_to_subsets, upper as u8, subset_num as u8, letter_code)?;
                subset_chars.push(upper);
                if !is_mask_lowercase && lower != upper {
                    add_letter(&mut numbers_to_subsets, lower as u8, subset_num as u8, letter_code)?;
                }
            }
            subset_chars.sort_unstable();
            subset_list.push(subset_chars.into_iter().collect());
        }

        let mut map = [DELIMITER; 256];
        for byte in 0..256usize {
            let number = letter_code[byte];
            if (number as usize) < MAX_LETTERS {
                map[byte] = numbers_to_subsets[number as usize];
            }
        }
        map[b' ' as usize] = DELIMITER;

        self.subset_maps.push(map);
        self.subset_lists.push(subset_list);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.subset_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subset_maps.is_empty()
    }

    pub fn first_map(&self) -> &[u8; 256] {
        &self.subset_maps[0]
    }

    /// Advance cyclically to the map at `index + 1` (wrapping).
    pub fn next_map_index(&self, index: usize) -> usize {
        (index + 1) % self.subset_maps.len()
    }

    pub fn prev_map_index(&self, index: usize) -> usize {
        (index + self.subset_maps.len() - 1) % self.subset_maps.len()
    }

    pub fn map_at(&self, index: usize) -> &[u8; 256] {
        &self.subset_maps[index % self.subset_maps.len()]
    }

    /// Number of distinct subsets at position `d` (cyclic), excluding the
    /// delimiter subset. Used to size buckets, since the delimiter subset
    /// can never appear inside the text.
    pub fn restricted_subset_count(&self, d: usize) -> usize {
        self.subset_lists[d % self.subset_lists.len()].len()
    }

    /// As [`restricted_subset_count`], but +1 to reserve a delimiter slot
    /// (used for bucket depths beyond `word_length`).
    pub fn unrestricted_subset_count(&self, d: usize) -> usize {
        self.restricted_subset_count(d) + 1
    }

    /// Lexicographically compare the text at offsets `a` and `b` under the
    /// cyclic subset map, starting at position `start_map`.
    pub fn is_less(&self, text: &[u8], a: usize, b: usize, start_map: usize) -> std::cmp::Ordering {
        let n = self.subset_maps.len();
        let mut map_idx = start_map;
        loop {
            let map = self.map_at(map_idx);
            let sa = text.get(a).map_or(DELIMITER, |&c| map[c as usize]);
            let sb = text.get(b).map_or(DELIMITER, |&c| map[c as usize]);
            if sa != sb {
                return sa.cmp(&sb);
            }
            if sa == DELIMITER {
                return std::cmp::Ordering::Equal;
            }
            map_idx = (map_idx + 1) % n;
        }
    }

    /// Write a seed position back out in its canonical textual form, e.g.
    /// for round-tripping through a `.prj` `subsetseed=` line.
    pub fn write_position(&self, position: usize) -> String {
        self.subset_lists[position].join(" ")
    }

    pub fn to_text(&self) -> String {
        (0..self.subset_lists.len())
            .map(|i| self.write_position(i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn add_letter(numbers_to_subsets: &mut [u8; MAX_LETTERS], letter: u8, subset_num: u8, letter_code: &[u8; 256]) -> Result<()> {
    let number = letter_code[letter as usize];
    if number as usize >= MAX_LETTERS {
        return Err(eyre!(LastError::Configuration(format!(
            "bad symbol in subset-seed: {}",
            letter as char
        ))));
    }
    if numbers_to_subsets[number as usize] < DELIMITER {
        return Err(eyre!(LastError::Configuration(format!(
            "repeated symbol in subset-seed: {}",
            letter as char
        ))));
    }
    numbers_to_subsets[number as usize] = subset_num;
    Ok(())
}

fn is_blank_or_comment(line: &str) -> bool {
    match line.trim_start().chars().next() {
        None => true,
        Some('#') => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn exact_match_seed_has_one_subset_per_letter() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_code("ACGT", "ACGT", false, &alph.encode).unwrap();
        assert_eq!(seed.len(), 4);
        assert_eq!(seed.restricted_subset_count(0), 4);
    }

    #[test]
    fn transition_pattern_groups_purines_and_pyrimidines() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_code("T", "ACGT", false, &alph.encode).unwrap();
        let map = seed.first_map();
        let a = map[b'A' as usize];
        let g = map[b'G' as usize];
        let c = map[b'C' as usize];
        let t = map[b'T' as usize];
        assert_eq!(a, g);
        assert_eq!(c, t);
        assert_ne!(a, c);
    }

    #[test]
    fn duplicate_letter_in_one_line_is_an_error() {
        let alph = Alphabet::dna().unwrap();
        assert!(CyclicSubsetSeed::from_text("AA C G T", false, &alph.encode).is_err());
    }

    #[test]
    fn blank_byte_always_maps_to_delimiter() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_text("A C G T", false, &alph.encode).unwrap();
        assert_eq!(seed.first_map()[b' ' as usize], DELIMITER);
    }

    #[test]
    fn next_map_wraps_cyclically() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_code("ACGT", "ACGT", false, &alph.encode).unwrap();
        assert_eq!(seed.next_map_index(3), 0);
    }

    #[test]
    fn yass_seed_parses() {
        let alph = Alphabet::dna().unwrap();
        let seed = CyclicSubsetSeed::from_text(YASS_SEED, false, &alph.encode).unwrap();
        assert_eq!(seed.len(), 12);
    }
}
