//! End-to-end check of the offline path: CSV ingestion, index build,
//! artifact reload, ordinal-aligned queries.

use std::io::Write;

use stylefind_indexer::{load_csv, IndexBuilder, DEFAULT_BATCH_SIZE};
use stylefind_vector_store::math::l2_normalized;
use stylefind_vector_store::{HnswIndex, HnswParams, VectorStore};
use tempfile::TempDir;

fn write_fixture_csv(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("embeddings.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "path,embedding").unwrap();
    let rows = [
        ("WOMEN/Denim/a.jpg", "[1.0, 0.0, 0.0]"),
        ("WOMEN/Denim/b.jpg", "[0.9, 0.1, 0.0]"),
        ("MEN/Polo/c.jpg", "[0.0, 1.0, 0.0]"),
        ("WOMEN/Dress/d.jpg", "[0.0, 0.9, 0.1]"),
        ("MEN/Denim/e.jpg", "[0.0, 0.0, 1.0]"),
    ];
    for (p, e) in rows {
        writeln!(file, "{p},\"{e}\"").unwrap();
    }
    path
}

#[tokio::test]
async fn csv_rows_become_queryable_ordinals() {
    let tmp = TempDir::new().unwrap();
    let csv = write_fixture_csv(&tmp);
    let artifact = tmp.path().join("index.json");

    let mut store = VectorStore::new();
    let load = load_csv(&mut store, &csv, DEFAULT_BATCH_SIZE).unwrap();
    assert_eq!(load.inserted, 5);

    let params = HnswParams {
        m: 4,
        ef_construction: 32,
        seed: Some(7),
    };
    let build = IndexBuilder::new(params)
        .build_and_save(&store, &artifact)
        .await
        .unwrap();
    assert_eq!(build.vectors, 5);
    assert_eq!(build.dimension, 3);

    // A fresh process loads the artifact and gets store-aligned positions.
    let index = HnswIndex::load(&artifact).await.unwrap();
    let query = l2_normalized(&[0.0, 1.0, 0.0]);
    let hits = index.search(&query, 2, 32).unwrap();
    let top_path = &store.get_by_position(hits[0].0).unwrap().path;
    assert_eq!(top_path, "MEN/Polo/c.jpg");
}

#[tokio::test]
async fn rebuild_after_new_ingestion_extends_the_index() {
    let tmp = TempDir::new().unwrap();
    let csv = write_fixture_csv(&tmp);
    let artifact = tmp.path().join("index.json");

    let mut store = VectorStore::new();
    load_csv(&mut store, &csv, DEFAULT_BATCH_SIZE).unwrap();

    let params = HnswParams {
        m: 4,
        ef_construction: 32,
        seed: Some(7),
    };
    let builder = IndexBuilder::new(params);
    builder.build_and_save(&store, &artifact).await.unwrap();

    // New vector arrives; the artifact only covers it after a rebuild.
    store
        .put("WOMEN/Skirts/f.jpg", vec![0.5, 0.5, 0.5])
        .unwrap();
    let stale = HnswIndex::load(&artifact).await.unwrap();
    assert_eq!(stale.len(), 5);

    builder.build_and_save(&store, &artifact).await.unwrap();
    let fresh = HnswIndex::load(&artifact).await.unwrap();
    assert_eq!(fresh.len(), 6);

    let query = l2_normalized(&[0.5, 0.5, 0.5]);
    let hits = fresh.search(&query, 1, 32).unwrap();
    assert_eq!(hits[0].0, 5);
}
