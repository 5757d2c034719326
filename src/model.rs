//! Data model for heart-rate blocks and the in-memory ledger.

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::crypto::fingerprint;
use crate::error::ChainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 0 for genesis, predecessor index + 1 otherwise.
    #[serde(rename = "Index")]
    pub index: u64,
    /// RFC3339 timestamp string. Informational only.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Heart-rate reading supplied by the client.
    #[serde(rename = "BPM")]
    pub bpm: i64,
    /// SHA-256 hex over (index, bpm, timestamp, prev_hash).
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Hash of the previous block (empty for genesis).
    #[serde(rename = "PrevHash")]
    pub prev_hash: String,
}

impl Block {
    /// The first block of every chain.
    pub fn genesis() -> Result<Self, ChainError> {
        Ok(Self::sealed(0, now_rfc3339()?, 0, String::new()))
    }

    /// Build the block that follows `predecessor`, stamped with the current time.
    pub fn next(predecessor: &Block, bpm: i64) -> Result<Self, ChainError> {
        Self::successor(predecessor, bpm, now_rfc3339()?)
    }

    /// Build the block that follows `predecessor` with an explicit timestamp.
    pub fn successor(predecessor: &Block, bpm: i64, timestamp: String) -> Result<Self, ChainError> {
        let index = predecessor
            .index
            .checked_add(1)
            .ok_or(ChainError::IndexOverflow(predecessor.index))?;
        Ok(Self::sealed(index, timestamp, bpm, predecessor.hash.clone()))
    }

    /// Recompute the fingerprint from the block's own fields.
    pub fn compute_hash(&self) -> String {
        fingerprint(self.index, self.bpm, &self.timestamp, &self.prev_hash)
    }

    fn sealed(index: u64, timestamp: String, bpm: i64, prev_hash: String) -> Self {
        let hash = fingerprint(index, bpm, &timestamp, &prev_hash);
        Self {
            index,
            timestamp,
            bpm,
            hash,
            prev_hash,
        }
    }
}

fn now_rfc3339() -> Result<String, ChainError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ChainError::Timestamp(e.to_string()))
}

/// Check `candidate` against its `predecessor`: sequence, link, then hash.
pub fn check_link(candidate: &Block, predecessor: &Block) -> Result<(), ChainError> {
    let expected = predecessor.index.checked_add(1);
    if expected != Some(candidate.index) {
        return Err(ChainError::IndexMismatch {
            expected: expected.unwrap_or(u64::MAX),
            found: candidate.index,
        });
    }
    if candidate.prev_hash != predecessor.hash {
        return Err(ChainError::BrokenLink {
            index: candidate.index,
        });
    }
    if candidate.compute_hash() != candidate.hash {
        return Err(ChainError::HashMismatch {
            index: candidate.index,
        });
    }
    Ok(())
}

/// Returns `true` if `candidate` may directly follow `predecessor`.
pub fn is_valid(candidate: &Block, predecessor: &Block) -> bool {
    check_link(candidate, predecessor).is_ok()
}

/// Walk a whole chain from genesis to tail.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::EmptyChain)?;
    if genesis.index != 0 {
        return Err(ChainError::InvalidGenesis(format!(
            "index is {}",
            genesis.index
        )));
    }
    if !genesis.prev_hash.is_empty() {
        return Err(ChainError::InvalidGenesis("prev_hash should be empty".into()));
    }
    if genesis.compute_hash() != genesis.hash {
        return Err(ChainError::HashMismatch { index: 0 });
    }
    for pair in blocks.windows(2) {
        check_link(&pair[1], &pair[0])?;
    }
    Ok(())
}

/// The chain store. Always holds at least the genesis block.
#[derive(Debug)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    /// Start a ledger holding a fresh genesis block.
    pub fn new() -> Result<Self, ChainError> {
        let genesis = Block::genesis()?;
        tracing::debug!(block = ?genesis, "genesis block created");
        Ok(Self {
            blocks: vec![genesis],
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tail(&self) -> &Block {
        // `new` seeds genesis and `replace_if_longer` only adopts validated,
        // therefore non-empty, chains.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Push a block without checks. Validate with [`check_link`] first.
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Adopt `candidate` if it is strictly longer than the current chain and
    /// walks cleanly from genesis. Returns whether the chain was replaced.
    pub fn replace_if_longer(&mut self, candidate: Vec<Block>) -> Result<bool, ChainError> {
        if candidate.len() <= self.blocks.len() {
            return Ok(false);
        }
        validate_chain(&candidate)?;
        self.blocks = candidate;
        Ok(true)
    }

    /// Create, validate and append the next block for `bpm`.
    ///
    /// Only the new block is checked against the tail; the stored prefix is
    /// already linked, so each submission costs one hash regardless of length.
    pub fn submit(&mut self, bpm: i64) -> Result<Block, ChainError> {
        let block = Block::next(self.tail(), bpm)?;
        check_link(&block, self.tail())?;
        self.append(block.clone());

        tracing::debug!(blocks = ?self.blocks, "chain updated");
        Ok(block)
    }

    /// Validate the stored chain.
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_chain(&self.blocks)
    }
}
