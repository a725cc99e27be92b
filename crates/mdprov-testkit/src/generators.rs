//! Proptest generators for property-based testing.

use proptest::prelude::*;

use mdprov::UploadRequest;
use mdprov_core::{Keypair, UploadTag, CONTENT_ID_TAG};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate arbitrary bytes of at most `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a small markdown document.
pub fn markdown() -> impl Strategy<Value = String> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,40}",
        prop::collection::vec("[A-Za-z0-9 .,*_`-]{0,80}", 0..8),
    )
        .prop_map(|(title, lines)| {
            let mut doc = format!("# {title}\n\n");
            for line in lines {
                doc.push_str(&line);
                doc.push('\n');
            }
            doc
        })
}

/// Generate a tag that is legal in a data item and never a content-id tag.
pub fn upload_tag() -> impl Strategy<Value = UploadTag> {
    ("[A-Z][A-Za-z-]{0,23}", "[ -~]{1,64}")
        .prop_filter("content-id tag", |(name, _)| name != CONTENT_ID_TAG)
        .prop_map(|(name, value)| UploadTag::new(name, value))
}

/// Generate a document file name.
pub fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}\\.md".prop_map(String::from)
}

/// A document and the request it is uploaded with.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub content: String,
    pub request: UploadRequest,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            markdown(),
            file_name(),
            proptest::option::of("[A-Za-z ]{1,20}"),
            prop::collection::vec(upload_tag(), 0..4),
        )
            .prop_map(|(content, name, author, tags)| {
                let mut request = UploadRequest::new(name);
                request.author = author;
                request.tags = tags;
                DocumentParams { content, request }
            })
            .boxed()
    }
}
