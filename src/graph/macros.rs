//! Macro for convenient SPARQL query construction.

/// Macro for inline SPARQL queries with optional parameters.
///
/// # Usage
///
/// ```ignore
/// use cyberlex::sparql;
///
/// // Query without parameters
/// let query = sparql!(graph, "SELECT ?x WHERE { ?x wdt:P31 wd:Q5 } LIMIT 3");
///
/// // Query with parameters
/// let query = sparql!(graph, "ASK { $item wdt:P279 ?c }", item = &id);
///
/// let rows = query.fetch_all().await?;
/// ```
#[macro_export]
macro_rules! sparql {
    // Query without parameters
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    // Query with parameters
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::graph::query::{Params, QueryExt, Term};
    use crate::graph::row::RowStream;
    use crate::graph::traits::SparqlExecutor;
    use crate::models::EntityId;

    struct TestExecutor;

    #[async_trait::async_trait]
    impl SparqlExecutor for TestExecutor {
        async fn execute_sparql(
            &self,
            _sparql: &str,
            _params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn ask_sparql(&self, _sparql: &str, _params: Params) -> Result<bool, AppError> {
            Ok(false)
        }
    }

    #[test]
    fn test_sparql_macro_no_params() {
        let executor = TestExecutor;
        let query = sparql!(executor, "SELECT ?x WHERE { ?x ?p ?o }");
        assert_eq!(query.render().unwrap(), "SELECT ?x WHERE { ?x ?p ?o }");
    }

    #[test]
    fn test_sparql_macro_with_params() {
        let executor = TestExecutor;
        let id = EntityId::from("Q7397");
        let query = sparql!(
            executor,
            "SELECT ?x WHERE { ?x wdt:P31 $item } LIMIT $limit",
            item = &id,
            limit = Term::Integer(10),
        );
        assert_eq!(
            query.render().unwrap(),
            "SELECT ?x WHERE { ?x wdt:P31 wd:Q7397 } LIMIT 10"
        );
    }
}
