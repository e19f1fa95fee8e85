//! Ranking result parsing and caching

use std::collections::HashMap;

use shared::{RankingRecord, TokenId};

use crate::error::{RarityError, RarityResult};

/// Parse the runtime's raw result into ranking records
///
/// The raw text is deserialized as a JSON document and never evaluated. The
/// batch must contain exactly one record per input token, with ranks starting
/// at 1 and never decreasing.
pub fn parse_rankings(raw: &str, expected_len: usize) -> RarityResult<Vec<RankingRecord>> {
    let records: Vec<RankingRecord> = serde_json::from_str(raw.trim())
        .map_err(|e| RarityError::invalid_result(format!("not a ranking document: {e}")))?;

    if records.len() != expected_len {
        return Err(RarityError::invalid_result(format!(
            "expected {expected_len} records, got {}",
            records.len()
        )));
    }

    let mut previous_rank = 1;
    for record in &records {
        if record.rank == 0 {
            return Err(RarityError::invalid_result(format!("token {} has rank 0", record.token_id)));
        }
        if record.rank < previous_rank {
            return Err(RarityError::invalid_result(format!(
                "token {} ranked {} after rank {}",
                record.token_id, record.rank, previous_rank
            )));
        }
        previous_rank = record.rank;
    }

    Ok(records)
}

/// Most recent ranking batch with an identifier index
#[derive(Debug, Clone, Default)]
pub struct RankingCache {
    records: Vec<RankingRecord>,
    index: HashMap<TokenId, usize>,
}

impl RankingCache {
    pub fn new(records: Vec<RankingRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            // First occurrence wins, matching a front-to-back scan
            index.entry(record.token_id.clone()).or_insert(position);
        }
        Self { records, index }
    }

    pub fn get(&self, token_id: &TokenId) -> Option<&RankingRecord> {
        self.index.get(token_id).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[RankingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
