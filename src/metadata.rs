//! NFT metadata document pinned next to the memorial image

use serde::Serialize;

use crate::engagers::EngagerRecord;
use crate::rendering::layout::MAX_TILES;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorialMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
}

impl MemorialMetadata {
    /// Build the document for a memorial of `fname`.
    ///
    /// One attribute per engager shown on the image, in input order.
    pub fn new(fname: &str, token_id: &str, image_uri: &str, engagers: &[EngagerRecord]) -> Self {
        let attributes: Vec<Attribute> = engagers
            .iter()
            .take(MAX_TILES)
            .enumerate()
            .map(|(i, e)| Attribute {
                trait_type: format!("Engager #{}", i + 1),
                value: format!("@{}", e.fname),
            })
            .collect();

        Self {
            name: format!("{} Memorial #{}", fname, token_id),
            description: format!("Top engagers of @{}, preserved on IPFS.", fname),
            image: image_uri.to_string(),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagers::MockEngagerSource;

    #[test]
    fn metadata_lists_one_attribute_per_engager() {
        let engagers = MockEngagerSource::lookup("dwr");
        let meta = MemorialMetadata::new("dwr", "1", "ipfs://QmImg", &engagers);
        assert_eq!(meta.name, "dwr Memorial #1");
        assert_eq!(meta.image, "ipfs://QmImg");
        assert_eq!(meta.attributes.len(), 3);
        assert_eq!(meta.attributes[0].trait_type, "Engager #1");
        assert_eq!(meta.attributes[0].value, "@v");
        assert_eq!(meta.attributes[2].trait_type, "Engager #3");
        assert_eq!(meta.attributes[2].value, "@pedro");
        assert!(meta.attributes.iter().all(|a| a.value != "@dwr"));
    }

    #[test]
    fn metadata_caps_engager_attributes() {
        let one = MockEngagerSource::lookup("dwr").remove(0);
        let engagers = vec![one; 7];
        let meta = MemorialMetadata::new("dwr", "9", "ipfs://x", &engagers);
        assert_eq!(meta.attributes.len(), MAX_TILES);
        assert_eq!(meta.attributes[MAX_TILES - 1].trait_type, "Engager #5");
    }
}
