//! On-disk index file codec (spec.md §6 "Index on disk"), grounded in the
//! field list of `original_source/SubsetSuffixArray.hh` and
//! `MultiSequence::toFiles`/`fromFiles`.
//!
//! A database volume is a set of files sharing one base name:
//! - `.prj` -- a line-oriented `key=value` text manifest.
//! - `.tis` -- the concatenated encoded text (one byte per code).
//! - `.des`/`.sds` -- sequence name bytes and per-sequence end offsets.
//! - `.ssp` -- per-seed cumulative suffix-array-run end offsets.
//! - `.suf` -- packed little-endian suffix-array positions (`posParts`
//!   bytes each, so ≤40-bit text lengths fit in 5 bytes rather than 8).
//! - `.bck` -- per-seed flat bucket offset tables.
//! - `.chi`/`.kid`/`.chb` -- child tables (u8/u16/usize), whichever one
//!   [`crate::suffix_array::ChildTableKind`] built.
//!
//! Binary blobs are little-endian flat arrays, written/read with explicit
//! `to_le_bytes`/`from_le_bytes` rather than a general serialization crate,
//! matching spec.md §9's "kept dependency-light since this is a fixed,
//! simple format".

use crate::error::LastError;
use crate::suffix_array::ChildTable;
use eyre::{bail, ensure, eyre, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The `.prj` manifest: mandatory keys plus one `subsetseed=` line per seed
/// position-group (spec.md §6).
#[derive(Debug, Clone)]
pub struct IndexManifest {
    pub version: u32,
    pub alphabet: String,
    pub numofsequences: u64,
    pub numofletters: u64,
    pub masklowercase: u8,
    pub sequenceformat: String,
    pub volumes: u32,
    /// Byte width of each packed `.suf` record (spec.md §6, "`pos_parts`
    /// bytes each"); recorded here so a reader doesn't have to re-derive it
    /// from `numofletters`.
    pub pos_parts: usize,
    /// One entry per seed, each the seed's `to_text()` joined by `;`
    /// (positions are themselves newline-separated, so `;` keeps each
    /// seed on one `subsetseed=` line).
    pub subset_seeds: Vec<String>,
}

/// The minimum `.prj` version this implementation accepts (spec.md §7
/// "Index" error category: "version earlier than the current minimum").
pub const MIN_SUPPORTED_VERSION: u32 = 1;
pub const CURRENT_VERSION: u32 = 1;

impl IndexManifest {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("version={}\n", self.version));
        out.push_str(&format!("alphabet={}\n", self.alphabet));
        out.push_str(&format!("numofsequences={}\n", self.numofsequences));
        out.push_str(&format!("numofletters={}\n", self.numofletters));
        out.push_str(&format!("masklowercase={}\n", self.masklowercase));
        out.push_str(&format!("sequenceformat={}\n", self.sequenceformat));
        out.push_str(&format!("volumes={}\n", self.volumes));
        out.push_str(&format!("posparts={}\n", self.pos_parts));
        for seed in &self.subset_seeds {
            out.push_str(&format!("subsetseed={}\n", seed.replace('\n', ";")));
        }
        out
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut version = None;
        let mut alphabet = None;
        let mut numofsequences = None;
        let mut numofletters = None;
        let mut masklowercase = None;
        let mut sequenceformat = None;
        let mut volumes = None;
        let mut pos_parts = None;
        let mut subset_seeds = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(eyre!(LastError::Index(format!("malformed .prj line: {line}"))));
            };
            match key {
                "version" => version = Some(parse_field(key, value)?),
                "alphabet" => alphabet = Some(value.to_string()),
                "numofsequences" => numofsequences = Some(parse_field(key, value)?),
                "numofletters" => numofletters = Some(parse_field(key, value)?),
                "masklowercase" => masklowercase = Some(parse_field(key, value)?),
                "sequenceformat" => sequenceformat = Some(value.to_string()),
                "volumes" => volumes = Some(parse_field(key, value)?),
                "posparts" => pos_parts = Some(parse_field(key, value)?),
                "subsetseed" => subset_seeds.push(value.replace(';', "\n")),
                _ => {} // forward-compatible: unknown keys are ignored
            }
        }

        let manifest = Self {
            version: version.ok_or_else(|| missing("version"))?,
            alphabet: alphabet.ok_or_else(|| missing("alphabet"))?,
            numofsequences: numofsequences.ok_or_else(|| missing("numofsequences"))?,
            numofletters: numofletters.ok_or_else(|| missing("numofletters"))?,
            masklowercase: masklowercase.ok_or_else(|| missing("masklowercase"))?,
            sequenceformat: sequenceformat.ok_or_else(|| missing("sequenceformat"))?,
            volumes: volumes.ok_or_else(|| missing("volumes"))?,
            pos_parts: pos_parts.ok_or_else(|| missing("posparts"))?,
            subset_seeds,
        };
        if manifest.version < MIN_SUPPORTED_VERSION {
            return Err(eyre!(LastError::IndexVersion { found: manifest.version, minimum: MIN_SUPPORTED_VERSION }));
        }
        Ok(manifest)
    }
}

fn missing(key: &str) -> eyre::Report {
    eyre!(LastError::Index(format!("'.prj' manifest missing mandatory key: {key}")))
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| eyre!(LastError::Index(format!("'.prj' key {key} has a non-numeric value: {value}"))))
}

/// Handle to one database volume's files on disk, addressed by a shared
/// base path (e.g. `/data/mydb` for `/data/mydb.prj`, `/data/mydb.tis`, ...).
#[derive(Debug, Clone)]
pub struct ProjectFile {
    base_path: PathBuf,
}

impl ProjectFile {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    fn path(&self, extension: &str) -> PathBuf {
        let mut p = self.base_path.clone();
        let mut name = p.file_name().map(|n| n.to_owned()).unwrap_or_default();
        name.push(format!(".{extension}"));
        p.set_file_name(name);
        p
    }

    pub fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        log::debug!("writing {}", self.path("prj").display());
        write_file(&self.path("prj"), manifest.to_text().as_bytes())
    }

    pub fn read_manifest(&self) -> Result<IndexManifest> {
        let text = read_to_string(&self.path("prj"))?;
        IndexManifest::from_text(&text)
    }

    /// `.tis`: the concatenated encoded text, one byte per code.
    pub fn write_sequence_data(&self, seq: &[u8]) -> Result<()> {
        write_file(&self.path("tis"), seq)
    }

    pub fn read_sequence_data(&self) -> Result<Vec<u8>> {
        read_bytes(&self.path("tis"))
    }

    /// `.des`/`.sds`: name bytes (newline-separated) and per-sequence end
    /// offsets (little-endian `u64`, into the `.tis` buffer).
    pub fn write_names(&self, names: &[String], ends: &[usize]) -> Result<()> {
        ensure!(names.len() == ends.len(), "{}", LastError::Internal("names/ends length mismatch".to_string()));
        let des = names.join("\n");
        write_file(&self.path("des"), des.as_bytes())?;
        let sds: Vec<u8> = ends.iter().flat_map(|&e| (e as u64).to_le_bytes()).collect();
        write_file(&self.path("sds"), &sds)
    }

    pub fn read_names(&self) -> Result<(Vec<String>, Vec<usize>)> {
        let des = read_to_string(&self.path("des"))?;
        let names: Vec<String> = if des.is_empty() { Vec::new() } else { des.split('\n').map(str::to_string).collect() };
        let sds = read_bytes(&self.path("sds"))?;
        let ends = decode_u64_le(&sds)?.into_iter().map(|v| v as usize).collect();
        Ok((names, ends))
    }

    /// `.ssp`: per-seed cumulative suffix-array-run end offsets.
    pub fn write_cumulative_counts(&self, counts: &[usize]) -> Result<()> {
        let bytes: Vec<u8> = counts.iter().flat_map(|&c| (c as u64).to_le_bytes()).collect();
        write_file(&self.path("ssp"), &bytes)
    }

    pub fn read_cumulative_counts(&self) -> Result<Vec<usize>> {
        let bytes = read_bytes(&self.path("ssp"))?;
        Ok(decode_u64_le(&bytes)?.into_iter().map(|v| v as usize).collect())
    }

    /// `.suf`: positions packed as `pos_parts`-byte little-endian records
    /// (spec.md §3: "supports ≤40-bit text lengths" at `pos_parts = 5`).
    pub fn write_positions(&self, positions: &[u64], pos_parts: usize) -> Result<()> {
        let mut bytes = Vec::with_capacity(positions.len() * pos_parts);
        for &p in positions {
            bytes.extend_from_slice(&p.to_le_bytes()[..pos_parts]);
        }
        write_file(&self.path("suf"), &bytes)
    }

    pub fn read_positions(&self, pos_parts: usize) -> Result<Vec<u64>> {
        let bytes = read_bytes(&self.path("suf"))?;
        ensure!(bytes.len() % pos_parts == 0, "{}", LastError::Index(".suf file size is not a multiple of pos_parts".to_string()));
        Ok(bytes
            .chunks_exact(pos_parts)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..pos_parts].copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect())
    }

    /// `.bck`: per-seed flat bucket tables, each preceded by its chosen
    /// depth and stride table, so a loaded index needs no re-derivation
    /// of either (spec.md §4.D "Bucket build" is re-run only by `lastdb`).
    pub fn write_buckets(&self, buckets: &[Vec<u64>], bucket_steps: &[Vec<usize>], bucket_depth: &[usize]) -> Result<()> {
        ensure!(
            buckets.len() == bucket_steps.len() && buckets.len() == bucket_depth.len(),
            "{}",
            LastError::Internal("buckets/bucket_steps/bucket_depth length mismatch".to_string())
        );
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(buckets.len() as u64).to_le_bytes());
        for ((bucket, steps), &depth) in buckets.iter().zip(bucket_steps).zip(bucket_depth) {
            bytes.extend_from_slice(&(depth as u64).to_le_bytes());
            bytes.extend_from_slice(&(steps.len() as u64).to_le_bytes());
            for &s in steps {
                bytes.extend_from_slice(&(s as u64).to_le_bytes());
            }
            bytes.extend_from_slice(&(bucket.len() as u64).to_le_bytes());
            for &v in bucket {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        write_file(&self.path("bck"), &bytes)
    }

    #[allow(clippy::type_complexity)]
    pub fn read_buckets(&self) -> Result<(Vec<Vec<u64>>, Vec<Vec<usize>>, Vec<usize>)> {
        let bytes = read_bytes(&self.path("bck"))?;
        let mut cursor = 0usize;
        let num_seeds = read_u64(&bytes, &mut cursor)? as usize;
        let mut buckets = Vec::with_capacity(num_seeds);
        let mut bucket_steps = Vec::with_capacity(num_seeds);
        let mut bucket_depth = Vec::with_capacity(num_seeds);
        for _ in 0..num_seeds {
            let depth = read_u64(&bytes, &mut cursor)? as usize;
            let steps_len = read_u64(&bytes, &mut cursor)? as usize;
            let mut steps = Vec::with_capacity(steps_len);
            for _ in 0..steps_len {
                steps.push(read_u64(&bytes, &mut cursor)? as usize);
            }
            let len = read_u64(&bytes, &mut cursor)? as usize;
            let mut bucket = Vec::with_capacity(len);
            for _ in 0..len {
                bucket.push(read_u64(&bytes, &mut cursor)?);
            }
            bucket_depth.push(depth);
            bucket_steps.push(steps);
            buckets.push(bucket);
        }
        Ok((buckets, bucket_steps, bucket_depth))
    }

    /// Write every file that makes up a suffix-array volume (everything but
    /// the `.prj` manifest, `.tis` text and `.des`/`.sds` names, which the
    /// caller already owns from the `MultiSequence` it built the index from).
    pub fn write_suffix_array(&self, sa: &crate::suffix_array::SubsetSuffixArray, pos_parts: usize) -> Result<()> {
        self.write_cumulative_counts(&sa.cumulative_counts)?;
        self.write_positions(&sa.positions, pos_parts)?;
        self.write_buckets(&sa.buckets, &sa.bucket_steps, &sa.bucket_depth)?;
        self.write_child_table(&sa.child_table)
    }

    pub fn read_suffix_array(&self, pos_parts: usize) -> Result<crate::suffix_array::SubsetSuffixArray> {
        let cumulative_counts = self.read_cumulative_counts()?;
        let positions = self.read_positions(pos_parts)?;
        let (buckets, bucket_steps, bucket_depth) = self.read_buckets()?;
        let child_table = self.read_child_table()?;
        Ok(crate::suffix_array::SubsetSuffixArray {
            positions,
            cumulative_counts,
            buckets,
            bucket_steps,
            bucket_depth,
            child_table,
        })
    }

    /// Child table, written to whichever of `.chi`/`.kid`/`.chb` matches
    /// its width; absent entirely when the index has no child table.
    pub fn write_child_table(&self, table: &ChildTable) -> Result<()> {
        match table {
            ChildTable::None => Ok(()),
            ChildTable::Chibi(v) => write_file(&self.path("chi"), v),
            ChildTable::Kiddy(v) => {
                let bytes: Vec<u8> = v.iter().flat_map(|&x| x.to_le_bytes()).collect();
                write_file(&self.path("kid"), &bytes)
            }
            ChildTable::Full(v) => {
                let bytes: Vec<u8> = v.iter().flat_map(|&x| (x as u64).to_le_bytes()).collect();
                write_file(&self.path("chb"), &bytes)
            }
        }
    }

    pub fn read_child_table(&self) -> Result<ChildTable> {
        if let Ok(bytes) = read_bytes(&self.path("chi")) {
            return Ok(ChildTable::Chibi(bytes));
        }
        if let Ok(bytes) = read_bytes(&self.path("kid")) {
            let values = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            return Ok(ChildTable::Kiddy(values));
        }
        if let Ok(bytes) = read_bytes(&self.path("chb")) {
            let values = decode_u64_le(&bytes)?.into_iter().map(|v| v as usize).collect();
            return Ok(ChildTable::Full(values));
        }
        Ok(ChildTable::None)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| eyre!(LastError::Index(format!("can't write {}: {e}", path.display()))))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| eyre!(LastError::Index(format!("can't read {}: {e}", path.display()))))
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| eyre!(LastError::Index(format!("can't read {}: {e}", path.display()))))
}

fn decode_u64_le(bytes: &[u8]) -> Result<Vec<u64>> {
    if bytes.len() % 8 != 0 {
        bail!(LastError::Index("binary index file size is not a multiple of 8".to_string()));
    }
    Ok(bytes.chunks_exact(8).map(|c| u64::from_le_bytes(c.try_into().unwrap())).collect())
}

fn read_u64(bytes: &[u8], cursor: &mut usize) -> Result<u64> {
    let end = *cursor + 8;
    if end > bytes.len() {
        bail!(LastError::Index(".bck file truncated".to_string()));
    }
    let v = u64::from_le_bytes(bytes[*cursor..end].try_into().unwrap());
    *cursor = end;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> IndexManifest {
        IndexManifest {
            version: 1,
            alphabet: "ACGT".to_string(),
            numofsequences: 3,
            numofletters: 120,
            masklowercase: 0,
            sequenceformat: "fasta".to_string(),
            volumes: 1,
            pos_parts: 5,
            subset_seeds: vec!["A C G T".to_string(), "A C G T\nACGT".to_string()],
        }
    }

    #[test]
    fn manifest_round_trips_through_text() {
        let manifest = sample_manifest();
        let parsed = IndexManifest::from_text(&manifest.to_text()).unwrap();
        assert_eq!(parsed.numofsequences, 3);
        assert_eq!(parsed.subset_seeds.len(), 2);
        assert_eq!(parsed.subset_seeds[1], "A C G T\nACGT");
    }

    #[test]
    fn missing_mandatory_key_is_an_error() {
        assert!(IndexManifest::from_text("version=1\nalphabet=ACGT\n").is_err());
    }

    #[test]
    fn old_version_is_rejected() {
        let mut manifest = sample_manifest();
        manifest.version = 0;
        let err = IndexManifest::from_text(&manifest.to_text()).unwrap_err();
        assert!(err.to_string().contains("older than"));
    }

    #[test]
    fn project_file_round_trips_manifest_and_binary_blobs() {
        let dir = std::env::temp_dir().join(format!("last-core-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let pf = ProjectFile::new(dir.join("mydb"));

        let manifest = sample_manifest();
        pf.write_manifest(&manifest).unwrap();
        assert_eq!(pf.read_manifest().unwrap().numofsequences, 3);

        pf.write_sequence_data(&[0, 1, 2, 3]).unwrap();
        assert_eq!(pf.read_sequence_data().unwrap(), vec![0, 1, 2, 3]);

        pf.write_names(&["a".to_string(), "b".to_string()], &[4, 8]).unwrap();
        let (names, ends) = pf.read_names().unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(ends, vec![4, 8]);

        pf.write_positions(&[0, 1_000_000, 1_099_511_627_775], 5).unwrap();
        assert_eq!(pf.read_positions(5).unwrap(), vec![0, 1_000_000, 1_099_511_627_775]);

        pf.write_buckets(&[vec![0, 1, 2], vec![5, 6]], &[vec![1, 4], vec![1]], &[2, 1]).unwrap();
        let (buckets, steps, depth) = pf.read_buckets().unwrap();
        assert_eq!(buckets, vec![vec![0, 1, 2], vec![5, 6]]);
        assert_eq!(steps, vec![vec![1, 4], vec![1]]);
        assert_eq!(depth, vec![2, 1]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
