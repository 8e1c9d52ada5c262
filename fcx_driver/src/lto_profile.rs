//! (De)serialization of the optional LTO profile format (§6): a 4-byte
//! magic, an execution count, a block-count array, and a branch-probability
//! array, each array preceded by its own explicit length field rather than
//! `bincode`'s usual length-prefixed `Vec` encoding — so fields are written
//! one at a time instead of deriving `Serialize` on the whole struct.

use fcx_common::{FcxError, Span};
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"FCXP";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LtoProfile {
    pub execution_count: u64,
    pub block_counts: Vec<u64>,
    pub branch_probabilities: Vec<f64>,
}

impl LtoProfile {
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), FcxError> {
        out.write_all(MAGIC).map_err(io_error)?;
        bincode::serialize_into(&mut out, &self.execution_count).map_err(bincode_error)?;
        bincode::serialize_into(&mut out, &(self.block_counts.len() as u32)).map_err(bincode_error)?;
        for count in &self.block_counts {
            bincode::serialize_into(&mut out, count).map_err(bincode_error)?;
        }
        bincode::serialize_into(&mut out, &(self.branch_probabilities.len() as u32)).map_err(bincode_error)?;
        for probability in &self.branch_probabilities {
            bincode::serialize_into(&mut out, probability).map_err(bincode_error)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut input: R) -> Result<Self, FcxError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic).map_err(io_error)?;
        if &magic != MAGIC {
            return Err(FcxError::io("not an FCXP profile: bad magic", Span::default()));
        }
        let execution_count: u64 = bincode::deserialize_from(&mut input).map_err(bincode_error)?;
        let block_count: u32 = bincode::deserialize_from(&mut input).map_err(bincode_error)?;
        let mut block_counts = Vec::with_capacity(block_count as usize);
        for _ in 0..block_count {
            block_counts.push(bincode::deserialize_from(&mut input).map_err(bincode_error)?);
        }
        let branch_count: u32 = bincode::deserialize_from(&mut input).map_err(bincode_error)?;
        let mut branch_probabilities = Vec::with_capacity(branch_count as usize);
        for _ in 0..branch_count {
            branch_probabilities.push(bincode::deserialize_from(&mut input).map_err(bincode_error)?);
        }
        Ok(LtoProfile { execution_count, block_counts, branch_probabilities })
    }
}

fn io_error(e: std::io::Error) -> FcxError {
    FcxError::io(e.to_string(), Span::default())
}

fn bincode_error(e: bincode::Error) -> FcxError {
    FcxError::io(format!("malformed LTO profile: {e}"), Span::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let profile = LtoProfile { execution_count: 42, block_counts: vec![1, 2, 3], branch_probabilities: vec![0.5, 0.25] };
        let mut buf = Vec::new();
        profile.write_to(&mut buf).unwrap();
        assert_eq!(&buf[0..4], MAGIC);
        let decoded = LtoProfile::read_from(&buf[..]).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = [b'X', b'X', b'X', b'X', 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(LtoProfile::read_from(&buf[..]).is_err());
    }

    #[test]
    fn empty_arrays_round_trip() {
        let profile = LtoProfile { execution_count: 0, block_counts: Vec::new(), branch_probabilities: Vec::new() };
        let mut buf = Vec::new();
        profile.write_to(&mut buf).unwrap();
        let decoded = LtoProfile::read_from(&buf[..]).unwrap();
        assert_eq!(decoded, profile);
    }
}
