//! Ranking script generation
//!
//! Only the fixed ranking logic is templated. Token data and the identifier
//! field travel beside the script as a JSON value, so no caller-supplied text
//! is ever interpreted as source.

use serde_json::{json, Value};

/// Python source executed by the runtime
///
/// Reads `rarity_input = {"tokens": [...], "identifier_field": "..."}`, builds an
/// OpenRarity collection, ranks it and leaves `[{tokenID, rank, score}, ...]`
/// in `rarity_output`, rarest first.
pub const RANKING_SOURCE: &str = r#"
from open_rarity import Collection, RarityRanker, Token, TokenMetadata
from open_rarity.models.token_identifier import EVMContractTokenIdentifier
from open_rarity.models.token_metadata import StringAttribute
from open_rarity.models.token_standard import TokenStandard


def rank_tokens(tokens, identifier_field):
    collection_tokens = []
    for token in tokens:
        string_attributes = {}
        for attribute in token["attributes"]:
            name = attribute["trait_type"]
            string_attributes[name] = StringAttribute(name=name, value=attribute["value"])

        collection_tokens.append(
            Token(
                token_identifier=EVMContractTokenIdentifier(
                    contract_address="0x0", token_id=token[identifier_field]
                ),
                token_standard=TokenStandard.ERC721,
                metadata=TokenMetadata(string_attributes=string_attributes),
            )
        )

    collection = Collection(name="ERC721", tokens=collection_tokens)

    ranked_tokens = []
    for token_rarity in RarityRanker.rank_collection(collection=collection):
        ranked_tokens.append(
            {
                "tokenID": token_rarity.token.token_identifier.token_id,
                "rank": token_rarity.rank,
                "score": token_rarity.score,
            }
        )
    return ranked_tokens


rarity_output = rank_tokens(rarity_input["tokens"], rarity_input["identifier_field"])
"#;

/// A ready-to-run ranking request
#[derive(Debug, Clone, PartialEq)]
pub struct RankingScript {
    pub source: &'static str,
    pub input: Value,
}

/// Build the ranking script for a serialized token batch
///
/// `tokens` is expected to be a JSON array of token objects carrying
/// `attributes` and `identifier_field`. Nothing is validated here; malformed
/// input surfaces as an execution error inside the runtime.
pub fn generate(tokens: Value, identifier_field: &str) -> RankingScript {
    RankingScript {
        source: RANKING_SOURCE,
        input: json!({
            "tokens": tokens,
            "identifier_field": identifier_field,
        }),
    }
}
