//! Integration tests for the crawler
//!
//! These tests use wiremock to serve lexicon entry pages and test the full
//! fetch, extract, write and discover cycle end-to-end against an in-memory
//! vault.

use std::time::{Duration, Instant};
use strongs_graph::config::{AliasMode, UserAgentConfig};
use strongs_graph::output::frontmatter::{read_list, read_scalar};
use strongs_graph::state::EdgeType;
use strongs_graph::{
    normalize_seed, CrawlResult, Crawler, DocumentStore, Fetcher, MemoryStore, Recipe,
    SourceUrls, StrongsId,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn id(s: &str) -> StrongsId {
    s.parse().unwrap()
}

fn ids(list: &[&str]) -> Vec<StrongsId> {
    list.iter().map(|s| id(s)).collect()
}

fn create_test_fetcher() -> Fetcher {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    Fetcher::from_user_agent(&user_agent, Duration::ZERO).expect("Failed to build fetcher")
}

/// A recipe that follows every edge type without rate limiting
fn create_test_recipe(max_depth: u32, max_nodes: u32) -> Recipe {
    Recipe {
        follow_edges: EdgeType::ALL.into_iter().collect(),
        max_depth,
        max_nodes,
        rate_limit_ms: 0,
        ..Recipe::default()
    }
}

/// An entry page whose Word Origin section cites `origin`
fn entry_page(lemma: &str, origin: &str) -> String {
    format!(
        r#"<html><head><title>Strong's</title></head><body>
        <p><span class="tophdg">Original Word: </span>{}</p>
        <p><span class="tophdg">Definition: </span>test entry</p>
        <p><b>Word Origin</b></p>
        <p>{}</p>
        </body></html>"#,
        lemma, origin
    )
}

/// Serves one Greek entry page and expects it to be fetched `hits` times
async fn mount_entry(server: &MockServer, number: u32, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/greek/{}.htm", number)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

/// Mounts the graph G1 -> {G2, G3}, G2 -> {G4}
async fn mount_small_graph(server: &MockServer, hits: [u64; 4]) {
    mount_entry(server, 1, entry_page("ἀρχή", "From 2 and 3."), hits[0]).await;
    mount_entry(server, 2, entry_page("βίβλος", "From 4."), hits[1]).await;
    mount_entry(server, 3, entry_page("γένεσις", "A primary word."), hits[2]).await;
    mount_entry(server, 4, entry_page("δέ", "A particle."), hits[3]).await;
}

async fn run_crawl(
    server: &MockServer,
    store: &MemoryStore,
    fetcher: &mut Fetcher,
    recipe: &Recipe,
    seed: &str,
) -> CrawlResult {
    let urls = SourceUrls::new(&server.uri()).expect("Failed to parse base URL");
    Crawler::new(recipe, fetcher, store, urls).run(id(seed)).await
}

#[tokio::test]
async fn test_full_graph_is_imported_once() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 1, 1, 1]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(2, 10), "G1").await;

    assert_eq!(result.processed, ids(&["G1", "G2", "G3", "G4"]));
    assert_eq!(result.created, 4);
    assert_eq!(result.updated, 0);
    assert!(result.errors.is_empty());
    assert!(!result.cancelled);

    let note = store.read("Lexicon/Strongs/G1.md").await.unwrap();
    assert_eq!(read_scalar(&note, "lemma").as_deref(), Some("ἀρχή"));
    assert_eq!(
        read_list(&note, "related_ids"),
        vec!["[[G2]]".to_string(), "[[G3]]".to_string()]
    );
    assert!(note.contains("<!-- imported: word_origin -->\nFrom 2 and 3.\n\n---\n"));
}

#[tokio::test]
async fn test_budgets_bound_traversal() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 1, 0, 0]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(1, 2), "G1").await;

    assert_eq!(result.processed, ids(&["G1", "G2"]));
    assert_eq!(result.created, 2);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_depth_zero_imports_only_the_seed() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 0, 0, 0]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(0, 10), "G1").await;

    assert_eq!(result.processed, ids(&["G1"]));
}

#[tokio::test]
async fn test_failed_node_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_entry(&server, 1, entry_page("ἀρχή", "From 2 and 3."), 1).await;
    mount_entry(&server, 2, entry_page("βίβλος", "From 4."), 1).await;
    Mock::given(method("GET"))
        .and(path("/greek/3.htm"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_entry(&server, 4, entry_page("δέ", "A particle."), 1).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(2, 10), "G1").await;

    assert_eq!(result.created, 3);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].0, id("G3"));
    assert!(!result.errors[0].1.is_empty());
    assert!(!store.exists("Lexicon/Strongs/G3.md").await.unwrap());
}

#[tokio::test]
async fn test_rejected_write_is_recorded() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 0, 0, 0]).await;

    let store = MemoryStore::new().with_read_only_prefix("Lexicon/Strongs");
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(2, 10), "G1").await;

    // The seed failed to write, so nothing was discovered from it
    assert_eq!(result.processed, ids(&["G1"]));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].1.contains("Lexicon/Strongs/G1.md"));
}

#[tokio::test]
async fn test_second_run_merges_and_reuses_cache() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 1, 1, 1]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let recipe = create_test_recipe(2, 10);

    run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;
    let first = store.snapshot().await;

    let second = run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 4);
    assert_eq!(store.snapshot().await, first);
}

#[tokio::test]
async fn test_merge_keeps_hand_edits() {
    let server = MockServer::start().await;
    mount_entry(&server, 1, entry_page("ἀρχή", "Fresh origin text."), 1).await;

    let existing = "---\nid: \"G1\"\nlemma: \"custom\"\n---\n# G1\n\nMy notes.\n\n## Word Origin\n<!-- imported: word_origin -->\nstale\n\n## Personal\nKeep me.\n";
    let store = MemoryStore::with_files([("Lexicon/Strongs/G1.md", existing)]);
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(0, 10), "G1").await;

    assert_eq!(result.updated, 1);
    let note = store.read("Lexicon/Strongs/G1.md").await.unwrap();
    assert_eq!(
        note,
        existing.replace("\nstale\n\n", "\nFresh origin text.\n\n---\n\n")
    );
}

#[tokio::test]
async fn test_skip_existing_stops_discovery() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [0, 0, 0, 0]).await;

    let store = MemoryStore::with_files([(
        "Lexicon/Strongs/G1.md",
        "---\nid: \"G1\"\nlemma: \"ἀρχή\"\n---\n# G1\n",
    )]);
    let mut fetcher = create_test_fetcher();
    let recipe = Recipe {
        skip_existing: true,
        ..create_test_recipe(2, 10)
    };
    let result = run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;

    assert_eq!(result.skipped, 1);
    assert_eq!(result.processed, ids(&["G1"]));
}

#[tokio::test]
async fn test_skip_existing_imports_placeholders() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 0, 0, 0]).await;

    let store = MemoryStore::with_files([(
        "Lexicon/Strongs/Placeholder G1.md",
        "---\nid: \"G1\"\nplaceholder: true\n---\n# G1\n\n## Word Origin\n<!-- imported: word_origin -->\n---\n\n",
    )]);
    let mut fetcher = create_test_fetcher();
    let recipe = Recipe {
        skip_existing: true,
        ..create_test_recipe(0, 10)
    };
    let result = run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;

    assert_eq!(result.updated, 1);
    let note = store.read("Lexicon/Strongs/Placeholder G1.md").await.unwrap();
    assert!(note.contains("From 2 and 3."));
    assert!(!store.exists("Lexicon/Strongs/G1.md").await.unwrap());
}

#[tokio::test]
async fn test_scripture_notes_are_created_once() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <p>Original Word: λόγος</p>
        <p>Word Origin</p><p>As in John 1:1. From 2.</p>
        <a href="/interlinear/john/1-1.htm">John 1:1</a>
        <a href="https://biblehub.com/interlinear/John/1-1.htm">John 1:1</a>
        </body></html>"#;
    mount_entry(&server, 1, body.to_string(), 1).await;
    // G2 cites the same verse; it must not get a second note
    let cited_again =
        r#"<p>Word Origin</p><p>Cited at John 1:1.</p><a href="/interlinear/john/1-1.htm">John 1:1</a>"#;
    mount_entry(&server, 2, cited_again.to_string(), 1).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let result = run_crawl(&server, &store, &mut fetcher, &create_test_recipe(1, 10), "G1").await;
    assert!(result.errors.is_empty());

    let verses = store.list("Lexicon/Scripture/").await.unwrap();
    assert_eq!(verses, vec!["Lexicon/Scripture/John 1.1.md".to_string()]);

    let note = store.read("Lexicon/Strongs/G1.md").await.unwrap();
    assert!(note.contains("As in [[John 1.1|John 1:1]]."));
    assert_eq!(
        read_list(&note, "scripture"),
        vec!["[[John 1.1|John 1:1]]".to_string()]
    );
}

#[tokio::test]
async fn test_term_linking_adds_alias_to_target() {
    let server = MockServer::start().await;
    mount_entry(&server, 1, entry_page("ἀρχή", "Related to βίβλου here."), 1).await;

    let target = "---\nid: \"G2\"\nlemma: \"βίβλος\"\naliases:\n  - \"βίβλου\"\n---\n# G2\n";
    let store = MemoryStore::with_files([("Lexicon/Strongs/G2.md", target)]);
    let mut fetcher = create_test_fetcher();
    let recipe = Recipe {
        link_greek_hebrew: true,
        lemma_alias_mode: AliasMode::All,
        ..create_test_recipe(0, 10)
    };
    let result = run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;
    assert!(result.errors.is_empty());

    let note = store.read("Lexicon/Strongs/G1.md").await.unwrap();
    assert!(note.contains("Related to [[G2|βίβλου]] here."));

    // Already an alias, so the target note is untouched
    assert_eq!(store.read("Lexicon/Strongs/G2.md").await.unwrap(), target);
    assert_eq!(read_list(&note, "aliases"), vec!["ἀρχή".to_string()]);
}

#[tokio::test]
async fn test_term_linking_creates_placeholder_for_unwritten_target() {
    let server = MockServer::start().await;
    // G3 -> {G2, G4}, G4 -> {G1}; G2 is indexed by lemma but its note cannot be written
    mount_entry(&server, 3, entry_page("γένεσις", "From 2 and 4."), 1).await;
    mount_entry(&server, 2, entry_page("βίβλος", "A primary word."), 1).await;
    mount_entry(&server, 4, entry_page("δέ", "From 1."), 1).await;
    mount_entry(&server, 1, entry_page("ἀρχή", "Compare Βίβλος here."), 1).await;

    let store = MemoryStore::new().with_read_only_prefix("Lexicon/Strongs/G2 βίβλος");
    let mut fetcher = create_test_fetcher();
    let recipe = Recipe {
        link_greek_hebrew: true,
        lemma_alias_mode: AliasMode::All,
        note_title_pattern: "{id} {lemma}".to_string(),
        ..create_test_recipe(2, 10)
    };
    let result = run_crawl(&server, &store, &mut fetcher, &recipe, "G3").await;

    assert_eq!(result.processed, ids(&["G3", "G2", "G4", "G1"]));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].0, id("G2"));

    let note = store.read("Lexicon/Strongs/G1 ἀρχή.md").await.unwrap();
    assert!(note.contains("Compare [[G2|Βίβλος]] here."));

    let placeholder = store.read("Lexicon/Strongs/G2 Βίβλος.md").await.unwrap();
    assert_eq!(read_scalar(&placeholder, "id").as_deref(), Some("G2"));
    assert_eq!(read_scalar(&placeholder, "placeholder").as_deref(), Some("true"));
    assert_eq!(read_list(&placeholder, "aliases"), vec!["Βίβλος".to_string()]);
}

#[tokio::test]
async fn test_cancelled_run_processes_nothing() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [0, 0, 0, 0]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let recipe = create_test_recipe(2, 10);
    let urls = SourceUrls::new(&server.uri()).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let result = Crawler::new(&recipe, &mut fetcher, &store, urls)
        .with_cancellation(token)
        .run(id("G1"))
        .await;

    assert!(result.cancelled);
    assert!(result.processed.is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_rate_limit_spaces_fetches() {
    let server = MockServer::start().await;
    mount_small_graph(&server, [1, 1, 1, 0]).await;

    let store = MemoryStore::new();
    let mut fetcher = create_test_fetcher();
    let recipe = Recipe {
        rate_limit_ms: 100,
        ..create_test_recipe(1, 10)
    };

    let start = Instant::now();
    let result = run_crawl(&server, &store, &mut fetcher, &recipe, "G1").await;
    assert_eq!(result.created, 3);
    // Three network fetches need at least two full intervals between them
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[test]
fn test_malformed_seeds_are_rejected() {
    assert!(normalize_seed("", None).is_err());
    assert!(normalize_seed("G0", None).is_err());
    assert!(normalize_seed("3056", None).is_err());
    assert!(normalize_seed("not a seed", None).is_err());
    assert_eq!(normalize_seed("g03056", None).unwrap(), id("G3056"));
}
