//! Data store collaborator

use async_trait::async_trait;

use crate::error::StoreError;

/// A queryable store of named relations
///
/// Implementations classify every failure as [`ErrorKind::Fatal`] or
/// [`ErrorKind::Recoverable`] at this boundary.
///
/// [`ErrorKind::Fatal`]: crate::error::ErrorKind::Fatal
/// [`ErrorKind::Recoverable`]: crate::error::ErrorKind::Recoverable
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Query dialect understood by [`execute`](Self::execute), e.g. `sqlite`
    fn dialect(&self) -> &str;

    /// All usable relation names, in a stable order
    async fn list_relation_names(&self) -> Result<Vec<String>, StoreError>;

    /// Schema description for the given relations (`None` = everything)
    async fn schema_text(&self, relation_names: Option<&[String]>) -> Result<String, StoreError>;

    /// Run a query and render its result as text
    async fn execute(&self, query: &str) -> Result<String, StoreError>;
}
