//! Token collections used across the integration suites

use std::str::FromStr;

use rarity::{TokenAttribute, TokenMetadata};
use serde_json::{Number, Value};

pub struct TestFixtures;

impl TestFixtures {
    pub const COLLECTION_SIZE: i64 = 100;
    /// 2^255, an id only a `uint256` can hold
    pub const UINT256_ID: &'static str =
        "57896044618658097711785492504343953926634992332820282019728792003956564819968";
    pub const EYES: [&'static str; 4] = ["Laser", "Sleepy", "Wide", "Closed"];

    /// 100 tokens keyed by `tokenID`; token 1 alone wears a gold background
    pub fn collection() -> Vec<TokenMetadata> {
        Self::collection_keyed_by("tokenID")
    }

    /// Same collection with the identifier stored under `field`
    pub fn collection_keyed_by(field: &str) -> Vec<TokenMetadata> {
        (1..=Self::COLLECTION_SIZE)
            .map(|id| TokenMetadata::new(field, id, Self::attributes_for(id)))
            .collect()
    }

    /// Small collection with string identifiers
    pub fn named_tokens() -> Vec<TokenMetadata> {
        vec![
            TokenMetadata::new("tokenID", "alpha", vec![TokenAttribute::new("Hat", "Crown")]),
            TokenMetadata::new("tokenID", "beta", vec![TokenAttribute::new("Hat", "Cap")]),
            TokenMetadata::new("tokenID", "gamma", vec![TokenAttribute::new("Hat", "Cap")]),
        ]
    }

    /// Ids at and beyond the `u64` range; the `u64::MAX` token is the rarest
    pub fn wide_id_tokens() -> Vec<TokenMetadata> {
        let uint256 = Value::Number(Number::from_str(Self::UINT256_ID).unwrap());
        vec![
            TokenMetadata::new("tokenID", u64::MAX, vec![TokenAttribute::new("Hat", "Crown")]),
            TokenMetadata::new("tokenID", uint256, vec![TokenAttribute::new("Hat", "Cap")]),
            TokenMetadata::new("tokenID", 5, vec![TokenAttribute::new("Hat", "Cap")]),
        ]
    }

    fn attributes_for(id: i64) -> Vec<TokenAttribute> {
        let background = if id == 1 { "Gold" } else { "Blue" };
        let eyes = Self::EYES[(id as usize) % Self::EYES.len()];
        vec![
            TokenAttribute::new("Background", background),
            TokenAttribute::new("Eyes", eyes),
        ]
    }
}
