//! Golden vectors for content ids and signed data items.
//!
//! Content ids must match what any IPFS implementation computes for the same
//! bytes with raw leaves and CIDv1. Item ids are fixed by the ed25519 seed and
//! the exact tag order, so a change here means uploads are no longer
//! reproducible.
//!
//! RSA-PSS signatures are salted, so the Arweave wallet vector is a fixed
//! encoded item that must decode, verify and re-encode byte for byte.

use mdprov_core::{ContentId, DataItem, DataItemBuilder, Keypair, UploadTag, CONTENT_ID_TAG};

/// Seed of the key that signs every item vector.
pub const VECTOR_SEED: [u8; 32] = [0x01; 32];

/// Owner key of [`VECTOR_SEED`], hex.
pub const VECTOR_OWNER_HEX: &str =
    "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";

/// Wallet address of [`VECTOR_SEED`].
pub const VECTOR_ADDRESS: &str = "NHUPmL1Z_PyUbaRaqr6TO-FUpLUJThxKv0KGZQXzyX4";

/// An Arweave RSA wallet in JWK form.
pub const ARWEAVE_WALLET_JWK: &str =
    include_str!("../../mdprov-core/testdata/arweave-wallet.json");

/// Wallet address of [`ARWEAVE_WALLET_JWK`].
pub const ARWEAVE_ADDRESS: &str = "IA9_WmkHkLUsdIiXWTfi5X2Nw8fHF0SNd6H8L9_tAIM";

/// A type-1 item signed by [`ARWEAVE_WALLET_JWK`] over the `tagged_markdown`
/// data and tags, hex.
pub const ARWEAVE_ITEM_HEX: &str = include_str!("../../mdprov-core/testdata/arweave-item.hex");

/// Id of [`ARWEAVE_ITEM_HEX`].
pub const ARWEAVE_ITEM_ID: &str = "KHSKiTNiCgxfc2BLyT-t8ZqvBcoFU1CwFGk_81pFY2g";

const ARWEAVE_VECTOR: &str = "arweave_wallet_item";

/// Bytes and their expected content id.
#[derive(Debug, Clone, Copy)]
pub struct ContentVector {
    pub name: &'static str,
    pub content: &'static [u8],
    pub cid: &'static str,
}

/// A data item signed with [`VECTOR_SEED`].
#[derive(Debug, Clone)]
pub struct ItemVector {
    pub name: &'static str,
    pub data: &'static [u8],
    pub tags: Vec<UploadTag>,
    pub item_id: &'static str,
    pub encoded_len: usize,
}

/// Known content ids.
pub fn content_vectors() -> Vec<ContentVector> {
    vec![
        ContentVector {
            name: "heading",
            content: b"# Hello",
            cid: "bafkreiabzdpejycnf55dat2qsy2ulivp6wgdh2oejipth7ols6h3ejgloq",
        },
        ContentVector {
            name: "heading_newline",
            content: b"# Hello\n",
            cid: "bafkreieq7dwfm2ongqmdxgyp36fzj5ppwtbwokdwgmhuvj3ardbljlixxy",
        },
        ContentVector {
            name: "empty",
            content: b"",
            cid: "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku",
        },
        ContentVector {
            name: "hello_world",
            content: b"hello world",
            cid: "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e",
        },
    ]
}

/// Known item ids.
pub fn item_vectors() -> Vec<ItemVector> {
    vec![
        ItemVector {
            name: "tagged_markdown",
            data: b"# Hello",
            tags: vec![
                UploadTag::new("Content-Type", "text/markdown"),
                UploadTag::new(
                    CONTENT_ID_TAG,
                    "bafkreiabzdpejycnf55dat2qsy2ulivp6wgdh2oejipth7ols6h3ejgloq",
                ),
            ],
            item_id: "_RrE2B_-3qs_-XNidNm43ejyR9xxkImkDOCxSb6aXjA",
            encoded_len: 221,
        },
        ItemVector {
            name: "empty",
            data: b"",
            tags: Vec::new(),
            item_id: "Y4j-rX-dKgzTVj9Y48KkeVadj5N38SzdkGhOTRj589s",
            encoded_len: 116,
        },
    ]
}

/// Names of every vector, content vectors first.
pub fn all_vectors() -> Vec<&'static str> {
    content_vectors()
        .iter()
        .map(|v| v.name)
        .chain(item_vectors().iter().map(|v| v.name))
        .chain(std::iter::once(ARWEAVE_VECTOR))
        .collect()
}

/// Recompute every vector: `(name, matches, actual)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mut results: Vec<_> = content_vectors()
        .iter()
        .map(|v| {
            let actual = ContentId::identify(v.content).to_string();
            (v.name.to_string(), actual == v.cid, actual)
        })
        .collect();

    let keypair = Keypair::from_seed(&VECTOR_SEED);
    for v in item_vectors() {
        let actual = DataItemBuilder::new(v.data)
            .tags(v.tags.clone())
            .sign(&keypair)
            .and_then(|item| Ok((item.id(), item.to_bytes()?.len())));
        match actual {
            Ok((id, len)) => results.push((
                v.name.to_string(),
                id.as_str() == v.item_id && len == v.encoded_len,
                format!("{id} ({len} bytes)"),
            )),
            Err(e) => results.push((v.name.to_string(), false, e.to_string())),
        }
    }
    results.push(verify_arweave_vector());
    results
}

fn verify_arweave_vector() -> (String, bool, String) {
    let name = ARWEAVE_VECTOR.to_string();
    let bytes = match hex::decode(ARWEAVE_ITEM_HEX.trim()) {
        Ok(bytes) => bytes,
        Err(e) => return (name, false, e.to_string()),
    };
    let checked = DataItem::from_bytes(&bytes).and_then(|item| {
        item.verify()?;
        let reencoded = item.to_bytes()? == bytes;
        Ok((item, reencoded))
    });
    let tagged = &item_vectors()[0];
    match checked {
        Ok((item, reencoded)) => {
            let id = item.id();
            let address = item.owner().address();
            let ok = reencoded
                && id.as_str() == ARWEAVE_ITEM_ID
                && address == ARWEAVE_ADDRESS
                && item.data() == tagged.data
                && item.tags() == tagged.tags.as_slice();
            (name, ok, format!("{id} from {address}"))
        }
        Err(e) => (name, false, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vector_matches() {
        for (name, ok, actual) in verify_all_vectors() {
            assert!(ok, "vector '{name}' produced {actual}");
        }
    }

    #[test]
    fn vector_key_is_stable() {
        let keypair = Keypair::from_seed(&VECTOR_SEED);
        assert_eq!(hex::encode(keypair.owner().as_bytes()), VECTOR_OWNER_HEX);
        assert_eq!(keypair.owner().address(), VECTOR_ADDRESS);
    }

    #[test]
    fn arweave_wallet_signs_verifiable_items() {
        let keypair = Keypair::from_jwk_json(ARWEAVE_WALLET_JWK).unwrap();
        assert_eq!(keypair.owner().address(), ARWEAVE_ADDRESS);

        let tagged = &item_vectors()[0];
        let item = DataItemBuilder::new(tagged.data)
            .tags(tagged.tags.clone())
            .sign(&keypair)
            .unwrap();
        let decoded = DataItem::from_bytes(&item.to_bytes().unwrap()).unwrap();
        decoded.verify().unwrap();
        assert_eq!(decoded.id(), item.id());
        assert_ne!(item.id().as_str(), ARWEAVE_ITEM_ID);
    }

    #[test]
    fn names_are_unique() {
        let mut names = all_vectors();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
