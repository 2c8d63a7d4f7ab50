//! The fixed set of remote calls the relay knows how to issue.

use reqwest::Method;
use serde_json::Value;

use crate::tigris::payloads;

/// One remote call: target resource, verb, and body shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create the collection, or update its schema when it already exists.
    CreateOrUpdateCollection {
        /// Target collection.
        collection: String,
        /// Full `{schema: ...}` body.
        schema: Value,
    },
    /// Describe a collection's schema and metadata.
    DescribeCollection {
        /// Target collection.
        collection: String,
    },
    /// Insert documents.
    InsertDocuments {
        /// Target collection.
        collection: String,
        /// Documents to insert, passed through untouched.
        documents: Vec<Value>,
    },
    /// Read documents matching a filter.
    ReadDocuments {
        /// Target collection.
        collection: String,
        /// Full `{filter: ...}` body.
        body: Value,
    },
    /// Update documents matching a filter.
    UpdateDocuments {
        /// Target collection.
        collection: String,
        /// Full `{fields: ..., filter: ...}` body.
        body: Value,
    },
    /// Full-text search.
    SearchDocuments {
        /// Target collection.
        collection: String,
        /// Full search body.
        body: Value,
    },
    /// Delete documents matching a filter.
    DeleteDocuments {
        /// Target collection.
        collection: String,
        /// Filter selecting the documents to delete.
        filter: Value,
    },
    /// Drop a collection and all of its documents.
    DropCollection {
        /// Target collection.
        collection: String,
    },
    /// Create a database branch.
    CreateBranch {
        /// Branch name.
        branch: String,
    },
}

impl Operation {
    /// Stable name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateOrUpdateCollection { .. } => "create_or_update_collection",
            Self::DescribeCollection { .. } => "describe_collection",
            Self::InsertDocuments { .. } => "insert_documents",
            Self::ReadDocuments { .. } => "read_documents",
            Self::UpdateDocuments { .. } => "update_documents",
            Self::SearchDocuments { .. } => "search_documents",
            Self::DeleteDocuments { .. } => "delete_documents",
            Self::DropCollection { .. } => "drop_collection",
            Self::CreateBranch { .. } => "create_branch",
        }
    }

    /// HTTP verb mandated by the remote API.
    pub fn method(&self) -> Method {
        match self {
            Self::UpdateDocuments { .. } => Method::PUT,
            Self::DeleteDocuments { .. } | Self::DropCollection { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    /// Collection or branch the call targets.
    pub fn target(&self) -> &str {
        match self {
            Self::CreateOrUpdateCollection { collection, .. }
            | Self::DescribeCollection { collection }
            | Self::InsertDocuments { collection, .. }
            | Self::ReadDocuments { collection, .. }
            | Self::UpdateDocuments { collection, .. }
            | Self::SearchDocuments { collection, .. }
            | Self::DeleteDocuments { collection, .. }
            | Self::DropCollection { collection } => collection,
            Self::CreateBranch { branch } => branch,
        }
    }

    /// Path segments relative to the API base URL.
    ///
    /// Collection and branch names are single segments; the client percent-encodes them so a
    /// name can never reach a different endpoint.
    pub fn path_segments<'a>(&'a self, project: &'a str) -> Vec<&'a str> {
        let mut segments = vec!["v1", "projects", project, "database"];
        match self {
            Self::CreateOrUpdateCollection { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "createOrUpdate"])
            }
            Self::DescribeCollection { collection } => {
                segments.extend(["collections", collection.as_str(), "describe"])
            }
            Self::InsertDocuments { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "documents", "insert"])
            }
            Self::ReadDocuments { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "documents", "read"])
            }
            Self::UpdateDocuments { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "documents", "update"])
            }
            Self::SearchDocuments { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "documents", "search"])
            }
            Self::DeleteDocuments { collection, .. } => {
                segments.extend(["collections", collection.as_str(), "documents", "delete"])
            }
            Self::DropCollection { collection } => {
                segments.extend(["collections", collection.as_str(), "drop"])
            }
            Self::CreateBranch { branch } => {
                segments.extend(["branches", branch.as_str(), "create"])
            }
        }
        segments
    }

    /// JSON body, or `None` for calls sent without one.
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::CreateOrUpdateCollection { schema, .. } => Some(schema.clone()),
            Self::InsertDocuments { documents, .. } => {
                Some(payloads::insert_body(documents.clone()))
            }
            Self::ReadDocuments { body, .. }
            | Self::UpdateDocuments { body, .. }
            | Self::SearchDocuments { body, .. } => Some(body.clone()),
            Self::DeleteDocuments { filter, .. } => Some(payloads::delete_body(filter.clone())),
            Self::DescribeCollection { .. }
            | Self::DropCollection { .. }
            | Self::CreateBranch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verbs_follow_remote_api() {
        let update = Operation::UpdateDocuments {
            collection: "users".into(),
            body: json!({}),
        };
        let delete = Operation::DeleteDocuments {
            collection: "users".into(),
            filter: json!({}),
        };
        let drop = Operation::DropCollection {
            collection: "users".into(),
        };
        let search = Operation::SearchDocuments {
            collection: "users".into(),
            body: json!({}),
        };
        assert_eq!(update.method(), Method::PUT);
        assert_eq!(delete.method(), Method::DELETE);
        assert_eq!(drop.method(), Method::DELETE);
        assert_eq!(search.method(), Method::POST);
    }

    #[test]
    fn paths_are_scoped_to_project_database() {
        let describe = Operation::DescribeCollection {
            collection: "users".into(),
        };
        assert_eq!(
            describe.path_segments("demo"),
            ["v1", "projects", "demo", "database", "collections", "users", "describe"]
        );

        let branch = Operation::CreateBranch {
            branch: "staging".into(),
        };
        assert_eq!(
            branch.path_segments("demo"),
            ["v1", "projects", "demo", "database", "branches", "staging", "create"]
        );
        assert_eq!(branch.target(), "staging");
    }

    #[test]
    fn names_stay_a_single_segment() {
        let drop = Operation::DropCollection {
            collection: "users/documents/delete?".into(),
        };
        let segments = drop.path_segments("demo");
        assert_eq!(segments.len(), 7);
        assert_eq!(segments[5], "users/documents/delete?");
        assert_eq!(segments[6], "drop");
    }

    #[test]
    fn bodyless_operations_send_nothing() {
        assert!(
            Operation::DropCollection {
                collection: "users".into()
            }
            .body()
            .is_none()
        );
        assert!(
            Operation::DescribeCollection {
                collection: "users".into()
            }
            .body()
            .is_none()
        );
    }

    #[test]
    fn insert_and_delete_wrap_their_payloads() {
        let insert = Operation::InsertDocuments {
            collection: "users".into(),
            documents: vec![json!({ "name": "Ada" })],
        };
        assert_eq!(
            insert.body(),
            Some(json!({ "documents": [{ "name": "Ada" }] }))
        );

        let delete = Operation::DeleteDocuments {
            collection: "users".into(),
            filter: json!({ "id": 7 }),
        };
        assert_eq!(delete.body(), Some(json!({ "filter": { "id": 7 } })));
    }
}
