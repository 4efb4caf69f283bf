//! Graph builder
//!
//! Runs web and news searches for a person, extracts entities from each
//! result and folds them into a star graph centred on that person.

use std::collections::HashMap;
use std::sync::Arc;

use sgm_core::{Result, SearchConfig, SearchRecord, WebSearch};
use sgm_extractor::{EntityExtractor, EntityMention};

use crate::element::{
    is_self_reference, truncate_snippet, EdgeData, Element, GraphResponse, NodeData, NodeType,
    EDGE_LABEL,
};

/// Web results requested per graph
pub const DEFAULT_WEB_RESULTS: usize = 20;

/// News results requested per graph
pub const DEFAULT_NEWS_RESULTS: usize = 10;

// ============================================================================
// Entity Graph
// ============================================================================

/// Per-request accumulator for nodes and edges
///
/// Nodes are unique by lowercase text and keep the casing they were first
/// seen with. Edges are never deduplicated: each accepted mention adds one.
#[derive(Debug, Clone)]
pub struct EntityGraph {
    person: String,
    nodes: Vec<NodeData>,
    /// Lowercase text -> index into `nodes`
    index: HashMap<String, usize>,
    edges: Vec<EdgeData>,
}

impl EntityGraph {
    /// Start a graph holding only the central node
    pub fn seed(person: &str) -> Self {
        let mut index = HashMap::new();
        index.insert(person.to_lowercase(), 0);

        Self {
            person: person.to_string(),
            nodes: vec![NodeData::new(person, NodeType::Central)],
            index,
            edges: Vec::new(),
        }
    }

    /// Record one mention found in `record`
    ///
    /// Returns `false` when the mention refers to the central person and
    /// was skipped.
    pub fn add_mention(&mut self, mention: &EntityMention, record: &SearchRecord) -> bool {
        if is_self_reference(&self.person, &mention.text) {
            return false;
        }

        let key = mention.text.to_lowercase();
        if !self.index.contains_key(&key) {
            self.index.insert(key, self.nodes.len());
            self.nodes
                .push(NodeData::new(mention.text.as_str(), mention.label.into()));
        }

        self.edges.push(EdgeData {
            id: format!("e{}", self.edges.len()),
            source: self.person.clone(),
            target: mention.text.clone(),
            label: EDGE_LABEL.to_string(),
            snippet: truncate_snippet(record.text()),
            url: record.url().to_string(),
            title: record.title().to_string(),
        });

        true
    }

    /// Node for an entity text, matched case-insensitively
    pub fn node(&self, text: &str) -> Option<&NodeData> {
        self.index
            .get(&text.to_lowercase())
            .and_then(|&i| self.nodes.get(i))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in insertion order, then edges in creation order
    pub fn into_response(self) -> GraphResponse {
        let elements = self
            .nodes
            .into_iter()
            .map(Element::node)
            .chain(self.edges.into_iter().map(Element::edge))
            .collect();

        GraphResponse { elements }
    }
}

// ============================================================================
// Graph Builder
// ============================================================================

/// Builds co-mention graphs from search and extraction collaborators
///
/// Holds no per-request state; one instance serves every request.
pub struct GraphBuilder {
    search: Arc<dyn WebSearch>,
    extractor: Arc<dyn EntityExtractor>,
    web_results: usize,
    news_results: usize,
}

impl GraphBuilder {
    /// Create a builder with default result limits
    pub fn new(search: Arc<dyn WebSearch>, extractor: Arc<dyn EntityExtractor>) -> Self {
        Self {
            search,
            extractor,
            web_results: DEFAULT_WEB_RESULTS,
            news_results: DEFAULT_NEWS_RESULTS,
        }
    }

    /// Create a builder with limits from search configuration
    pub fn from_config(
        search: Arc<dyn WebSearch>,
        extractor: Arc<dyn EntityExtractor>,
        config: &SearchConfig,
    ) -> Self {
        Self::new(search, extractor).with_limits(config.web_results, config.news_results)
    }

    /// Set web and news result limits
    pub fn with_limits(mut self, web_results: usize, news_results: usize) -> Self {
        self.web_results = web_results;
        self.news_results = news_results;
        self
    }

    /// Name of the search backend
    pub fn search_backend(&self) -> &str {
        self.search.name()
    }

    /// Build the co-mention graph for `person`
    ///
    /// `person` is used verbatim as the central node id; rejecting empty input
    /// is up to the caller. Collaborator failures only shrink the graph; the
    /// result always holds the central node.
    pub async fn build_graph(&self, person: &str) -> Result<GraphResponse> {
        let mut records = self.search.search_web(person, self.web_results).await;
        let web_count = records.len();
        records.extend(self.search.search_news(person, self.news_results).await);

        tracing::debug!(
            backend = self.search.name(),
            web = web_count,
            news = records.len() - web_count,
            "Search results collected"
        );

        let mut graph = EntityGraph::seed(person);
        let mut skipped = 0usize;

        for record in &records {
            let mentions = match self.extractor.extract(record.text()) {
                Ok(mentions) => mentions,
                Err(e) => {
                    tracing::warn!(error = %e, url = record.url(), "Entity extraction failed");
                    continue;
                }
            };

            for mention in &mentions {
                if !graph.add_mention(mention, record) {
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            person,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            self_references = skipped,
            "Graph built"
        );

        Ok(graph.into_response())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use sgm_core::SgmError;
    use sgm_extractor::EntityLabel;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Search stub returning fixed records and counting calls
    #[derive(Default)]
    struct StubSearch {
        web: Vec<SearchRecord>,
        news: Vec<SearchRecord>,
        calls: Mutex<Vec<(&'static str, usize)>>,
    }

    #[async_trait]
    impl WebSearch for StubSearch {
        async fn search_web(&self, _query: &str, max_results: usize) -> Vec<SearchRecord> {
            self.calls.lock().unwrap().push(("web", max_results));
            self.web.iter().take(max_results).cloned().collect()
        }

        async fn search_news(&self, _query: &str, max_results: usize) -> Vec<SearchRecord> {
            self.calls.lock().unwrap().push(("news", max_results));
            self.news.iter().take(max_results).cloned().collect()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Extractor stub keyed by exact input text
    #[derive(Default)]
    struct StubExtractor {
        entities: HashMap<String, Vec<EntityMention>>,
        failing: HashSet<String>,
        calls: AtomicUsize,
    }

    impl StubExtractor {
        fn with(mut self, text: &str, mentions: &[(&str, EntityLabel)]) -> Self {
            self.entities.insert(
                text.to_string(),
                mentions
                    .iter()
                    .map(|(t, l)| EntityMention::new(*t, *l))
                    .collect(),
            );
            self
        }

        fn failing_on(mut self, text: &str) -> Self {
            self.failing.insert(text.to_string());
            self
        }
    }

    impl EntityExtractor for StubExtractor {
        fn extract(&self, text: &str) -> Result<Vec<EntityMention>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(text) {
                return Err(SgmError::Extraction("model unavailable".to_string()));
            }
            Ok(self.entities.get(text).cloned().unwrap_or_default())
        }
    }

    fn record(body: &str, url: &str) -> SearchRecord {
        SearchRecord::new(format!("Title {url}"), url, body)
    }

    fn mention(text: &str, label: EntityLabel) -> EntityMention {
        EntityMention::new(text, label)
    }

    fn builder(search: StubSearch, extractor: StubExtractor) -> GraphBuilder {
        GraphBuilder::new(Arc::new(search), Arc::new(extractor))
    }

    #[test]
    fn test_seed_has_only_central_node() {
        let response = EntityGraph::seed("Ada Lovelace").into_response();
        assert_eq!(response.elements.len(), 1);
        let central = response.nodes().next().unwrap();
        assert_eq!(central.id, "Ada Lovelace");
        assert_eq!(central.label, "Ada Lovelace");
        assert_eq!(central.node_type, NodeType::Central);
    }

    #[test]
    fn test_nodes_deduplicated_case_insensitively() {
        let mut graph = EntityGraph::seed("Ada Lovelace");
        let r = record("text", "https://a.example");

        assert!(graph.add_mention(&mention("Charles Babbage", EntityLabel::Person), &r));
        assert!(graph.add_mention(&mention("CHARLES BABBAGE", EntityLabel::Person), &r));
        assert!(graph.add_mention(&mention("charles babbage", EntityLabel::Organization), &r));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 3);

        let node = graph.node("charles BABBAGE").unwrap();
        assert_eq!(node.id, "Charles Babbage");
        assert_eq!(node.node_type, NodeType::Person);
    }

    #[test]
    fn test_edge_targets_keep_extracted_casing() {
        let mut graph = EntityGraph::seed("Ada Lovelace");
        let r = record("text", "https://a.example");
        graph.add_mention(&mention("London", EntityLabel::Gpe), &r);
        graph.add_mention(&mention("LONDON", EntityLabel::Gpe), &r);

        let response = graph.into_response();
        let targets: Vec<_> = response.edges().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["London", "LONDON"]);
    }

    #[test]
    fn test_self_references_skipped() {
        let mut graph = EntityGraph::seed("John Smith");
        let r = record("text", "https://a.example");

        assert!(!graph.add_mention(&mention("Smith", EntityLabel::Person), &r));
        assert!(!graph.add_mention(&mention("john smith", EntityLabel::Person), &r));
        assert!(!graph.add_mention(&mention("John Smith Jr.", EntityLabel::Person), &r));
        assert!(graph.add_mention(&mention("Jane Smith", EntityLabel::Person), &r));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_substring_filter_over_filters() {
        // Known limitation: an unrelated entity containing the name is dropped
        let mut graph = EntityGraph::seed("Gore");
        let r = record("text", "https://a.example");
        assert!(!graph.add_mention(&mention("Gore-Tex", EntityLabel::Organization), &r));
        assert!(!graph.add_mention(&mention("Al Gore", EntityLabel::Person), &r));

        let mut graph = EntityGraph::seed("Al Gore");
        assert!(!graph.add_mention(&mention("Gore", EntityLabel::Person), &r));
    }

    #[test]
    fn test_edge_provenance() {
        let mut graph = EntityGraph::seed("Ada Lovelace");
        let body = "a".repeat(150);
        let r = SearchRecord::new("Analytical Engine", "https://a.example/engine", body);
        graph.add_mention(&mention("Charles Babbage", EntityLabel::Person), &r);

        let no_title = SearchRecord {
            snippet: Some("short".to_string()),
            ..Default::default()
        };
        graph.add_mention(&mention("London", EntityLabel::Gpe), &no_title);

        let response = graph.into_response();
        let edges: Vec<_> = response.edges().collect();

        assert_eq!(edges[0].id, "e0");
        assert_eq!(edges[0].source, "Ada Lovelace");
        assert_eq!(edges[0].label, "MENTIONED_WITH");
        assert_eq!(edges[0].snippet.chars().count(), 103);
        assert_eq!(edges[0].url, "https://a.example/engine");
        assert_eq!(edges[0].title, "Analytical Engine");

        assert_eq!(edges[1].id, "e1");
        assert_eq!(edges[1].snippet, "short...");
        assert_eq!(edges[1].url, "");
        assert_eq!(edges[1].title, "");
    }

    #[tokio::test]
    async fn test_build_graph_orders_nodes_then_edges() {
        let search = StubSearch {
            web: vec![
                record("web one", "https://w1.example"),
                record("web two", "https://w2.example"),
            ],
            news: vec![record("news one", "https://n1.example")],
            ..Default::default()
        };
        let extractor = StubExtractor::default()
            .with(
                "web one",
                &[
                    ("Charles Babbage", EntityLabel::Person),
                    ("London", EntityLabel::Gpe),
                ],
            )
            .with("web two", &[("Royal Society", EntityLabel::Organization)])
            .with(
                "news one",
                &[
                    ("charles babbage", EntityLabel::Person),
                    ("Ada", EntityLabel::Person),
                ],
            );

        let response = builder(search, extractor)
            .build_graph("Ada Lovelace")
            .await
            .unwrap();

        let node_ids: Vec<_> = response.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(
            node_ids,
            vec!["Ada Lovelace", "Charles Babbage", "London", "Royal Society"]
        );

        let edges: Vec<_> = response
            .edges()
            .map(|e| (e.id.as_str(), e.target.as_str(), e.url.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("e0", "Charles Babbage", "https://w1.example"),
                ("e1", "London", "https://w1.example"),
                ("e2", "Royal Society", "https://w2.example"),
                ("e3", "charles babbage", "https://n1.example"),
            ]
        );

        // All nodes precede all edges
        let first_edge = response
            .elements
            .iter()
            .position(|e| e.as_edge().is_some())
            .unwrap();
        assert!(response.elements[..first_edge]
            .iter()
            .all(|e| e.as_node().is_some()));
        assert!(response.elements[first_edge..]
            .iter()
            .all(|e| e.as_edge().is_some()));
    }

    #[tokio::test]
    async fn test_build_graph_queries_web_then_news_with_limits() {
        let search = Arc::new(StubSearch::default());
        let extractor = Arc::new(StubExtractor::default());
        let builder = GraphBuilder::new(search.clone(), extractor);

        builder.build_graph("Grace Hopper").await.unwrap();

        assert_eq!(
            *search.calls.lock().unwrap(),
            vec![("web", DEFAULT_WEB_RESULTS), ("news", DEFAULT_NEWS_RESULTS)]
        );
    }

    #[tokio::test]
    async fn test_build_graph_uses_configured_limits() {
        let search = Arc::new(StubSearch::default());
        let config = SearchConfig {
            web_results: 5,
            news_results: 2,
            ..Default::default()
        };
        let builder =
            GraphBuilder::from_config(search.clone(), Arc::new(StubExtractor::default()), &config);

        builder.build_graph("Grace Hopper").await.unwrap();
        assert_eq!(*search.calls.lock().unwrap(), vec![("web", 5), ("news", 2)]);
    }

    #[tokio::test]
    async fn test_empty_collaborators_yield_central_only() {
        let extractor = Arc::new(StubExtractor::default());
        let builder = GraphBuilder::new(Arc::new(StubSearch::default()), extractor.clone());

        let response = builder.build_graph("Grace Hopper").await.unwrap();

        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.nodes().next().unwrap().node_type, NodeType::Central);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_snippet_fallback_for_extraction() {
        let search = StubSearch {
            web: vec![SearchRecord {
                snippet: Some("from snippet".to_string()),
                body: Some(String::new()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let extractor =
            StubExtractor::default().with("from snippet", &[("NASA", EntityLabel::Organization)]);

        let response = builder(search, extractor)
            .build_graph("Grace Hopper")
            .await
            .unwrap();

        assert_eq!(response.edges().count(), 1);
        assert_eq!(response.edges().next().unwrap().snippet, "from snippet...");
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_only_that_result() {
        let search = StubSearch {
            web: vec![
                record("broken", "https://w1.example"),
                record("fine", "https://w2.example"),
            ],
            ..Default::default()
        };
        let extractor = StubExtractor::default()
            .failing_on("broken")
            .with("fine", &[("Harvard", EntityLabel::Organization)]);

        let response = builder(search, extractor)
            .build_graph("Grace Hopper")
            .await
            .unwrap();

        assert_eq!(response.nodes().count(), 2);
        let edge = response.edges().next().unwrap();
        assert_eq!(edge.id, "e0");
        assert_eq!(edge.url, "https://w2.example");
    }

    #[tokio::test]
    async fn test_whitespace_name_builds_central_only_graph() {
        let search = Arc::new(StubSearch::default());
        let builder = GraphBuilder::new(search.clone(), Arc::new(StubExtractor::default()));

        let response = builder.build_graph("   ").await.unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.nodes().next().unwrap().id, "   ");
        assert_eq!(search.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_name_used_verbatim() {
        let response = builder(StubSearch::default(), StubExtractor::default())
            .build_graph(" Ada Lovelace ")
            .await
            .unwrap();

        let central = response.nodes().next().unwrap();
        assert_eq!(central.id, " Ada Lovelace ");
        assert_eq!(central.label, " Ada Lovelace ");
    }

    #[test]
    fn test_builder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphBuilder>();
    }

    fn arb_mention() -> impl Strategy<Value = EntityMention> {
        let label = prop_oneof![
            Just(EntityLabel::Person),
            Just(EntityLabel::Organization),
            Just(EntityLabel::Gpe),
            Just(EntityLabel::Location),
        ];
        ("[A-Za-z]{1,3}( [A-Za-z]{1,3})?", label)
            .prop_map(|(text, label)| EntityMention::new(text, label))
    }

    proptest! {
        #[test]
        fn prop_graph_invariants(
            person in "[A-Za-z]{2,6}",
            batches in proptest::collection::vec(
                proptest::collection::vec(arb_mention(), 0..6),
                0..6,
            ),
        ) {
            let mut graph = EntityGraph::seed(&person);
            let mut accepted = 0usize;

            for (i, batch) in batches.iter().enumerate() {
                let r = record("body", &format!("https://{i}.example"));
                for m in batch {
                    if !is_self_reference(&person, &m.text) {
                        accepted += 1;
                    }
                    graph.add_mention(m, &r);
                }
            }

            let response = graph.into_response();
            let nodes: Vec<_> = response.nodes().collect();
            let edges: Vec<_> = response.edges().collect();

            // Exactly one central node, and it comes first
            prop_assert_eq!(nodes[0].node_type, NodeType::Central);
            prop_assert_eq!(&nodes[0].id, &person);
            prop_assert_eq!(
                nodes.iter().filter(|n| n.node_type == NodeType::Central).count(),
                1
            );

            let unique: HashSet<String> = nodes.iter().map(|n| n.id.to_lowercase()).collect();
            prop_assert_eq!(unique.len(), nodes.len());

            prop_assert_eq!(edges.len(), accepted);
            for (i, edge) in edges.iter().enumerate() {
                prop_assert_eq!(&edge.id, &format!("e{i}"));
                prop_assert_eq!(&edge.source, &person);
                prop_assert!(unique.contains(&edge.target.to_lowercase()));
            }
        }
    }
}
