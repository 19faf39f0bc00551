//! Integration tests for the engine.
//!
//! These tests run the whole normalize -> soup -> vectorize -> index -> rank
//! path on small hand-built corpora and on the sample catalog snapshot.

use catalog::{MediaType, TitleKey, TitleRecord};
use engine::{
    EngineConfig, EngineError, MinVotes, RankingMode, RecommendationEngine, RefitPolicy,
    TypeFilter,
};
use std::path::Path;

fn title(
    id: u64,
    name: &str,
    genres: &[&str],
    overview: &str,
    vote_average: f32,
    vote_count: u32,
) -> TitleRecord {
    TitleRecord {
        id,
        name: name.to_string(),
        media_type: MediaType::Movie,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        overview: overview.to_string(),
        vote_average,
        vote_count,
        ..Default::default()
    }
}

/// A and B share a genre and most of their overview; C shares nothing
fn create_abc_corpus() -> Vec<TitleRecord> {
    vec![
        title(1, "A", &["action"], "hero saves city", 8.0, 1000),
        title(2, "B", &["action"], "hero saves world", 7.5, 50),
        title(3, "C", &["drama"], "family drama", 9.0, 5),
    ]
}

fn create_engine(config: EngineConfig) -> RecommendationEngine {
    let mut engine = RecommendationEngine::new(config).unwrap();
    engine.load_corpus(create_abc_corpus()).unwrap();
    engine
}

fn names(recs: &[engine::Recommendation]) -> Vec<&str> {
    recs.iter().map(|r| r.record.name.as_str()).collect()
}

#[test]
fn test_shared_tokens_outrank_higher_rating() {
    let engine = create_engine(EngineConfig::default());

    let recs = engine.recommend(0, 2, TypeFilter::Both).unwrap();

    assert_eq!(names(&recs), vec!["B", "C"]);
    assert!((recs[0].similarity - 0.75).abs() < 1e-6);
    assert_eq!(recs[1].similarity, 0.0);
}

#[test]
fn test_discover_drama_returns_only_c() {
    let engine = create_engine(EngineConfig::default());

    let recs = engine.discover_by_genre("drama", 5).unwrap();
    assert_eq!(names(&recs), vec!["C"]);
}

#[test]
fn test_empty_title_inserts_and_recommends_without_error() {
    let mut engine = create_engine(EngineConfig::default());

    let d = TitleRecord {
        id: 4,
        name: "D".to_string(),
        ..Default::default()
    };
    let position = engine.insert_and_index(d).unwrap();
    assert_eq!(position, 3);
    assert_eq!(engine.soup(position).unwrap(), "");

    let recs = engine.recommend(position, 3, TypeFilter::Both).unwrap();
    assert!(recs.len() <= 3);
    assert!(recs.iter().all(|r| r.similarity == 0.0));
    assert!(recs.iter().all(|r| r.position != position));

    let matrix = engine.full_matrix();
    assert_eq!(matrix[position][position], 0.0);
}

#[test]
fn test_matrix_is_deterministic() {
    let first = create_engine(EngineConfig::default());
    let second = create_engine(EngineConfig::default());

    assert_eq!(first.full_matrix(), first.full_matrix());
    assert_eq!(first.full_matrix(), second.full_matrix());
}

#[test]
fn test_matrix_invariants() {
    let engine = create_engine(EngineConfig::default());
    let matrix = engine.full_matrix();

    assert_eq!(matrix.len(), engine.len());
    for (i, row) in matrix.iter().enumerate() {
        assert_eq!(row.len(), engine.len());
        assert_eq!(row[i], 1.0);
        for (j, &value) in row.iter().enumerate() {
            assert!((0.0..=1.0).contains(&value));
            assert_eq!(value, matrix[j][i]);
        }
    }
}

#[test]
fn test_incremental_matches_refit_for_known_tokens() {
    let mut refit = create_engine(EngineConfig::default().with_refit_policy(RefitPolicy::Refit));
    let mut incremental =
        create_engine(EngineConfig::default().with_refit_policy(RefitPolicy::Incremental));

    let known = title(5, "E", &["action"], "hero city drama", 6.0, 300);
    let a = refit.insert_and_index(known.clone()).unwrap();
    let b = incremental.insert_and_index(known).unwrap();

    assert_eq!(a, b);
    assert_eq!(refit.vocabulary_len(), incremental.vocabulary_len());
    assert_eq!(refit.full_matrix(), incremental.full_matrix());
}

#[test]
fn test_incremental_refits_on_new_tokens() {
    let mut engine =
        create_engine(EngineConfig::default().with_refit_policy(RefitPolicy::Incremental));
    let before = engine.vocabulary_len();

    engine
        .insert_and_index(title(6, "F", &["western"], "outlaw rides", 6.5, 80))
        .unwrap();

    assert_eq!(engine.vocabulary_len(), before + 3);
    assert_eq!(engine.full_matrix().len(), 4);
}

#[test]
fn test_project_keeps_vocabulary() {
    let mut engine =
        create_engine(EngineConfig::default().with_refit_policy(RefitPolicy::Project));
    let before = engine.vocabulary_len();

    let position = engine
        .insert_and_index(title(7, "G", &["action"], "space hero", 6.0, 10))
        .unwrap();

    assert_eq!(engine.vocabulary_len(), before);
    assert_eq!(engine.len(), 4);

    // "space" is dropped, the rest still matches A and B
    let row = engine.similarity_row(position).unwrap();
    assert_eq!(row.len(), 4);
    assert!(row[0] > 0.0);
    assert!(row[1] > 0.0);
    assert_eq!(row[2], 0.0);
}

#[test]
fn test_project_reselect_refits_vocabulary() {
    let mut engine =
        create_engine(EngineConfig::default().with_refit_policy(RefitPolicy::Project));
    let before = engine.vocabulary_len();

    let mut upgraded = create_abc_corpus().remove(2);
    upgraded.keywords = vec!["lighthouse".to_string()];
    let position = engine.insert_and_index(upgraded).unwrap();

    // a re-select rebuilds everything, even under Project
    assert_eq!(position, 2);
    assert_eq!(engine.vocabulary_len(), before + 1);
    assert_eq!(engine.len(), 3);
}

#[test]
fn test_reselect_keeps_position() {
    let mut engine = create_engine(EngineConfig::default());

    let mut detailed = create_abc_corpus().remove(2);
    detailed.keywords = vec!["hero".to_string()];
    let position = engine.insert_and_index(detailed).unwrap();

    assert_eq!(position, 2);
    assert_eq!(engine.len(), 3);
    assert_eq!(engine.position_of(TitleKey::new(MediaType::Movie, 3)), Some(2));
    assert!(engine.soup(2).unwrap().starts_with("hero"));
    assert!(engine.similarity_row(0).unwrap()[2] > 0.0);
}

#[test]
fn test_type_filter_applied_before_truncation() {
    let mut engine = RecommendationEngine::new(EngineConfig::default()).unwrap();
    let mut show = title(10, "Show", &["action"], "hero saves city", 7.0, 100);
    show.media_type = MediaType::Tv;

    engine
        .load_corpus(vec![
            title(1, "A", &["action"], "hero saves city", 8.0, 1000),
            show,
            title(2, "B", &["action"], "hero saves world", 7.5, 50),
            title(3, "C", &["drama"], "family drama", 9.0, 5),
        ])
        .unwrap();

    let recs = engine.recommend(0, 2, TypeFilter::Movie).unwrap();
    assert_eq!(names(&recs), vec!["B", "C"]);

    let recs = engine.recommend(0, 2, TypeFilter::Tv).unwrap();
    assert_eq!(names(&recs), vec!["Show"]);
}

#[test]
fn test_weighted_mode_reorders_shortlist() {
    let engine = create_engine(EngineConfig::default().with_min_votes(MinVotes::Fixed(0)));

    let by_similarity = engine
        .recommend_with_mode(0, 2, TypeFilter::Both, RankingMode::Similarity)
        .unwrap();
    let by_rating = engine
        .recommend_with_mode(0, 2, TypeFilter::Both, RankingMode::Weighted)
        .unwrap();

    // with m = 0 the weighted rating is the raw vote average
    assert_eq!(names(&by_similarity), vec!["B", "C"]);
    assert_eq!(names(&by_rating), vec!["C", "B"]);
}

#[test]
fn test_edge_cases() {
    let engine = create_engine(EngineConfig::default());

    assert!(engine.recommend(0, 0, TypeFilter::Both).unwrap().is_empty());
    assert!(matches!(
        engine.recommend(42, 3, TypeFilter::Both),
        Err(EngineError::NotFound { .. })
    ));

    let mut single = RecommendationEngine::new(EngineConfig::default()).unwrap();
    single
        .load_corpus(vec![title(1, "Alone", &["drama"], "solo", 7.0, 10)])
        .unwrap();
    assert!(single.recommend(0, 5, TypeFilter::Both).unwrap().is_empty());
}

#[test]
fn test_sample_catalog_recommendations() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json");
    let records = catalog::parser::parse_file(&path).unwrap();

    let mut engine = RecommendationEngine::new(EngineConfig::default()).unwrap();
    engine.load_corpus(records).unwrap();

    let matrix = engine.lookup_by_name("the matrix").unwrap();
    let recs = engine.recommend(matrix, 3, TypeFilter::Both).unwrap();
    assert_eq!(recs[0].record.name, "The Matrix Reloaded");

    let breaking_bad = engine.lookup_by_name("Breaking Bad").unwrap();
    let recs = engine.recommend(breaking_bad, 3, TypeFilter::Tv).unwrap();
    assert_eq!(recs[0].record.name, "Better Call Saul");
    assert!(recs.iter().all(|r| r.record.media_type == MediaType::Tv));

    // the 12-vote title is pulled all the way to the corpus mean
    let romance = engine.discover_by_genre("Romance", 5).unwrap();
    assert_eq!(romance.len(), 2);
    let stats = engine.corpus_stats();
    let paper_moons = romance
        .iter()
        .find(|r| r.record.name == "Paper Moons")
        .unwrap();
    assert!((paper_moons.weighted_rating - stats.mean_vote).abs() < 0.01);
    assert!(paper_moons.weighted_rating < 9.0);
}
