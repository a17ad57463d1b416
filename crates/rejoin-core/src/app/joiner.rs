//! OrderedJoiner - 完了順に依存しない結合
//!
//! fetch の完了順はバラバラなので、結果は index ごとのスロットに置くだけにして、
//! 全スロットが埋まったことを確認してから 1 回だけ昇順に連結します。
//! 到着順に追記していく実装は出力順が非決定的になるので使いません。

use bytes::{Bytes, BytesMut};

use crate::domain::{ChunkResult, JoinError};

/// Pre-sized, index-keyed collection of chunk bytes.
#[derive(Debug)]
pub struct OrderedJoiner {
    slots: Vec<Option<Bytes>>,
    filled: usize,
    total_len: usize,
}

impl OrderedJoiner {
    pub fn new(chunk_count: u32) -> Self {
        Self {
            slots: vec![None; chunk_count as usize],
            filled: 0,
            total_len: 0,
        }
    }

    /// Place one result into its slot. Each index is accepted exactly once.
    pub fn insert(&mut self, result: ChunkResult) -> Result<(), JoinError> {
        let count = self.slots.len() as u32;
        let slot = self
            .slots
            .get_mut(result.index as usize)
            .ok_or(JoinError::OutOfRange {
                index: result.index,
                count,
            })?;
        if slot.is_some() {
            return Err(JoinError::Duplicate(result.index));
        }
        self.total_len += result.bytes.len();
        *slot = Some(result.bytes);
        self.filled += 1;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    pub fn remaining(&self) -> usize {
        self.slots.len() - self.filled
    }

    /// Concatenate all slots in ascending index order.
    ///
    /// Fails with the first empty index if any chunk never arrived.
    pub fn finish(self) -> Result<Bytes, JoinError> {
        if let Some(missing) = self.slots.iter().position(Option::is_none) {
            return Err(JoinError::Missing(missing as u32));
        }

        if self.slots.len() == 1 {
            return Ok(self.slots.into_iter().flatten().next().unwrap_or_default());
        }

        let mut joined = BytesMut::with_capacity(self.total_len);
        for bytes in self.slots.into_iter().flatten() {
            joined.extend_from_slice(&bytes);
        }
        Ok(joined.freeze())
    }
}
