//! Open text documents, reparsed on every change

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;
use wpflint_core::parser::ParsedFile;

/// One open document at the version the client last sent.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub uri: Url,
    pub version: i32,
    pub file: Arc<ParsedFile>,
}

impl OpenDocument {
    fn parse(uri: Url, version: i32, text: &str) -> Self {
        let file = ParsedFile::from_source(&display_name(&uri), text);
        Self {
            uri,
            version,
            file: Arc::new(file),
        }
    }
}

#[derive(Default)]
pub struct DocumentStore {
    documents: DashMap<Url, OpenDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, version: i32, text: &str) {
        self.documents
            .insert(uri.clone(), OpenDocument::parse(uri, version, text));
    }

    /// Replaces the text unless the store already holds a newer version.
    /// Answers whether the document changed.
    pub fn change(&self, uri: &Url, version: i32, text: &str) -> bool {
        if self.version(uri).is_some_and(|current| current > version) {
            tracing::debug!(%uri, version, "ignoring out-of-order change");
            return false;
        }
        self.documents
            .insert(uri.clone(), OpenDocument::parse(uri.clone(), version, text));
        true
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn version(&self, uri: &Url) -> Option<i32> {
        self.documents.get(uri).map(|doc| doc.version)
    }

    #[cfg(test)]
    pub fn get(&self, uri: &Url) -> Option<Arc<ParsedFile>> {
        self.documents.get(uri).map(|doc| Arc::clone(&doc.file))
    }

    /// Open C# documents, ordered by uri so every compilation sees them in the same order.
    pub fn snapshot(&self) -> Vec<OpenDocument> {
        let mut documents: Vec<OpenDocument> = self
            .documents
            .iter()
            .filter(|entry| is_csharp(entry.key()))
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        documents
    }
}

pub fn is_csharp(uri: &Url) -> bool {
    uri.path().ends_with(".cs")
}

/// Local path for `file:` uris, the uri path otherwise (unsaved buffers).
fn display_name(uri: &Url) -> String {
    match uri.to_file_path() {
        Ok(path) => path.display().to_string(),
        Err(()) => uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///test/{name}")).unwrap()
    }

    #[test]
    fn opened_document_is_parsed() {
        let store = DocumentStore::new();

        store.open(uri("Gauge.cs"), 1, "public class Gauge { }");

        let file = store.get(&uri("Gauge.cs")).unwrap();
        assert_eq!(file.source(), "public class Gauge { }");
        assert!(!file.metadata().has_errors);
        assert_eq!(store.version(&uri("Gauge.cs")), Some(1));
    }

    #[test]
    fn newer_change_replaces_text() {
        let store = DocumentStore::new();
        store.open(uri("Gauge.cs"), 1, "public class Gauge { }");

        assert!(store.change(&uri("Gauge.cs"), 2, "public class Gauge\n{\n}"));

        let file = store.get(&uri("Gauge.cs")).unwrap();
        assert_eq!(file.metadata().line_count, 3);
        assert_eq!(store.version(&uri("Gauge.cs")), Some(2));
    }

    #[test]
    fn stale_change_is_ignored() {
        let store = DocumentStore::new();
        store.open(uri("Gauge.cs"), 5, "public class Gauge { }");

        assert!(!store.change(&uri("Gauge.cs"), 4, "public class Meter { }"));

        assert_eq!(store.get(&uri("Gauge.cs")).unwrap().source(), "public class Gauge { }");
        assert_eq!(store.version(&uri("Gauge.cs")), Some(5));
    }

    #[test]
    fn change_to_unknown_document_opens_it() {
        let store = DocumentStore::new();

        assert!(store.change(&uri("Gauge.cs"), 3, "public class Gauge { }"));

        assert_eq!(store.version(&uri("Gauge.cs")), Some(3));
    }

    #[test]
    fn snapshot_outlives_later_changes() {
        let store = DocumentStore::new();
        store.open(uri("Gauge.cs"), 1, "public class Gauge { }");

        let snapshot = store.snapshot();
        store.change(&uri("Gauge.cs"), 2, "public class Meter { }");

        assert_eq!(snapshot[0].file.source(), "public class Gauge { }");
        assert_eq!(snapshot[0].version, 1);
        assert_eq!(store.get(&uri("Gauge.cs")).unwrap().source(), "public class Meter { }");
    }

    #[test]
    fn snapshot_is_sorted_csharp_only() {
        let store = DocumentStore::new();
        store.open(uri("B.cs"), 1, "public class B { }");
        store.open(uri("A.cs"), 1, "public class A { }");
        store.open(uri("MainWindow.xaml"), 1, "<Window />");

        let paths: Vec<String> = store
            .snapshot()
            .iter()
            .map(|doc| doc.uri.path().to_string())
            .collect();

        assert_eq!(paths, ["/test/A.cs", "/test/B.cs"]);
    }

    #[test]
    fn closed_document_is_forgotten() {
        let store = DocumentStore::new();
        store.open(uri("Gauge.cs"), 1, "public class Gauge { }");

        store.close(&uri("Gauge.cs"));

        assert!(store.get(&uri("Gauge.cs")).is_none());
        assert_eq!(store.version(&uri("Gauge.cs")), None);
    }

    #[test]
    fn syntax_errors_are_kept_on_the_file() {
        let store = DocumentStore::new();

        store.open(uri("Broken.cs"), 1, "public class { int = ; }");

        let file = store.get(&uri("Broken.cs")).unwrap();
        assert!(file.metadata().has_errors);
        assert!(!file.errors().is_empty());
    }

    #[test]
    fn concurrent_opens_all_land() {
        let store = Arc::new(DocumentStore::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.open(uri(&format!("File{i}.cs")), 1, &format!("public class File{i} {{ }}"));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.snapshot().len(), 10);
    }
}
