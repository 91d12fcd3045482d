use docqa_core::chunker::{Chunker, ChunkingConfig};
use docqa_core::types::ChunkId;

#[test]
fn chunk_ids_unique_across_documents() {
    let chunker = Chunker::new(ChunkingConfig { chunk_size: 40, chunk_overlap: 8 }).expect("chunker");
    let docs = [
        ("a.txt", "Alpha bravo charlie delta echo foxtrot golf hotel india juliett kilo lima."),
        ("b.txt", ""),
        ("c.txt", "Mike november oscar papa quebec romeo sierra tango uniform victor whiskey."),
    ];

    let mut next: ChunkId = 0;
    let mut all = Vec::new();
    for (name, text) in docs {
        all.extend(chunker.chunk(text, name, &mut next));
    }

    let mut ids: Vec<_> = all.iter().map(|c| c.chunk_id).collect();
    ids.dedup();
    assert_eq!(ids.len(), all.len(), "chunk ids are never reused");
    assert_eq!(next as usize, all.len());
    assert!(all.iter().all(|c| c.source_name != "b.txt"), "empty document contributes no chunks");
    assert!(all.iter().all(|c| c.chunk_index < c.total_chunks));
}

#[test]
fn invalid_overlap_is_rejected() {
    let err = Chunker::new(ChunkingConfig { chunk_size: 10, chunk_overlap: 10 }).err().expect("must fail");
    assert_eq!(err.kind(), "invalid_config");
}
