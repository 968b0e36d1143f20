//! Document dependency graph.
//!
//! An arena of documents plus relation and redirect edge lists, built by
//! the crawler and mutated in place by the policy pipeline. Queries return
//! ids; all mutation goes through `&mut Graph`, so declaration batches can
//! be detached and reattached without iterating live collections.

pub mod types;


use url::Url;

pub use types::{
    Document, DocumentId, DocumentKind, PolicyDeclaration, PolicyName, PolicyOrigin, Redirect,
    Relation, RelationKind, RelationTarget,
};

/// The dependency graph for one invocation.
///
/// Constructed per run and discarded on return; nothing is shared across
/// invocations.
#[derive(Debug, Default)]
pub struct Graph {
    documents: Vec<Document>,
    relations: Vec<Relation>,
    redirects: Vec<Redirect>,
    next_sequence_id: u64,
    /// Root URL against which relative references resolve
    pub root: Option<Url>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Graph::default()
    }

    /// Adds a document for `url`, or returns the id of the document already
    /// registered under that URL.
    pub fn add_document(&mut self, url: Url, kind: DocumentKind) -> DocumentId {
        if let Some(existing) = self.documents.iter().find(|d| d.url == url) {
            return existing.id;
        }
        let id = self.documents.len();
        self.documents.push(Document {
            id,
            kind,
            url,
            is_initial: false,
            is_loaded: false,
            existing_header_policy: None,
            existing_header_policy_report_only: None,
            declarations: Vec::new(),
        });
        id
    }

    /// Returns the document with the given id.
    pub fn document(&self, id: DocumentId) -> &Document {
        &self.documents[id]
    }

    /// Returns the document with the given id, mutably.
    pub fn document_mut(&mut self, id: DocumentId) -> &mut Document {
        &mut self.documents[id]
    }

    /// All documents, in creation order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Ids of documents matching `filter`, in creation order.
    pub fn find_documents(&self, filter: impl Fn(&Document) -> bool) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|d| filter(d))
            .map(|d| d.id)
            .collect()
    }

    /// Ids of initial, loaded HTML documents, in creation order.
    pub fn initial_html_documents(&self) -> Vec<DocumentId> {
        self.find_documents(|d| d.kind == DocumentKind::Html && d.is_initial && d.is_loaded)
    }

    /// Records a redirect edge, assigning the next global sequence id.
    pub fn add_redirect(&mut self, from: DocumentId, to: DocumentId) {
        let sequence_id = self.next_sequence_id;
        self.record_redirect(from, to, sequence_id);
    }

    /// Records a redirect edge with an explicit sequence id.
    ///
    /// Sequence ids impose a strict total order reflecting request order;
    /// later auto-assigned ids continue above the highest recorded one.
    pub fn record_redirect(&mut self, from: DocumentId, to: DocumentId, sequence_id: u64) {
        self.next_sequence_id = self.next_sequence_id.max(sequence_id + 1);
        self.redirects.push(Redirect {
            from,
            to,
            sequence_id,
        });
    }

    /// All recorded redirects, in discovery order (not sequence order).
    pub fn redirects(&self) -> &[Redirect] {
        &self.redirects
    }

    /// Adds a relation edge.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    /// All relations, in discovery order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations originating from `from`, in discovery order.
    pub fn relations_from(&self, from: DocumentId) -> Vec<&Relation> {
        self.relations.iter().filter(|r| r.from == from).collect()
    }

    /// Attaches a policy declaration to a document.
    ///
    /// With `first` set, the declaration lands at ordinal 0 so later logic
    /// treats it as the primary declaration of its name.
    pub fn add_policy_declaration(
        &mut self,
        doc: DocumentId,
        declaration: PolicyDeclaration,
        first: bool,
    ) {
        let declarations = &mut self.documents[doc].declarations;
        if first {
            declarations.insert(0, declaration);
        } else {
            declarations.push(declaration);
        }
    }

    /// Detaches every declaration of `name` from a document.
    ///
    /// The surviving set is computed as a fixed batch; nothing iterates the
    /// declaration list while it shrinks. Returns the number of detached
    /// declarations.
    pub fn detach_declarations(&mut self, doc: DocumentId, name: PolicyName) -> usize {
        let declarations = &mut self.documents[doc].declarations;
        let before = declarations.len();
        declarations.retain(|d| d.name != name);
        before - declarations.len()
    }
}
