use crate::constants::{
    APPROVED_SYNONYM_STATUS, FINDINGS_DATASET, NORMALISATION_DATASET, STUDY_DATASET,
};
use crate::error::{ExtractError, Result};
use crate::source::RecordSource;
use crate::types::{OntologyEdge, OntologyTerm, RawFinding, RawStudy, SynonymPair};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::fmt;
use tracing::{debug, info};

const STUDY_QUERY: &str = r#"
SELECT study_id::text                       AS study_id,
       subst_id::text                       AS subst_id,
       normalised_sex::text                 AS sex,
       normalised_administration_route::text AS administration_route,
       normalised_species::text             AS species,
       normalised_strain::text              AS strain,
       exposure_period_days::int4           AS exposure_period_days,
       report_number::text                  AS report_number
FROM study
ORDER BY 1
"#;

const FINDINGS_QUERY: &str = r#"
SELECT study_id::text               AS study_id,
       relevance::text              AS relevance,
       observation_normalised::text AS observation,
       organ_normalised::text       AS organ,
       normalised_sex::text         AS sex,
       dose::float8                 AS dose,
       grade::text                  AS grade,
       source::text                 AS source
FROM findings_all
WHERE source = ANY($1)
ORDER BY 1, 8, 4, 3, 6, 5, 7, 2
"#;

const TERMS_QUERY: &str = r#"
SELECT "ONTOLOGY_TERM_ID"::text AS term_id,
       "TERM_NAME"::text        AS term_name,
       "ONTOLOGY_NAME"::text    AS ontology
FROM input_onto_etox_ontology_terms
WHERE "ONTOLOGY_NAME" = ANY($1)
  AND "TERM_NAME" IS NOT NULL
ORDER BY 3, 1
"#;

const EDGES_QUERY: &str = r#"
SELECT "ONTOLOGY_TERM_ID"::text         AS child_id,
       "RELATED_ONTOLOGY_TERM_ID"::text AS parent_id
FROM input_onto_etox_ontology_relationships
WHERE "ONTOLOGY_TERM_ID" IS NOT NULL
  AND "RELATED_ONTOLOGY_TERM_ID" IS NOT NULL
ORDER BY 1, 2
"#;

const SYNONYMS_QUERY: &str = r#"
SELECT syn."VX_VALUE"::text  AS verbatim,
       term."TERM_NAME"::text AS normalised
FROM public.input_onto_vx_synonyms AS syn
JOIN public.input_onto_etox_ontology_terms AS term
  ON syn."ONTOLOGY_TERM_ID" = term."ONTOLOGY_TERM_ID"
WHERE syn."SYNONYM_STATUS" = $1
  AND syn."SYNONYM_DOMAIN" = ANY($2)
  AND syn."VX_VALUE" IS NOT NULL
  AND term."TERM_NAME" IS NOT NULL
ORDER BY 1, 2
"#;

/// Connection parameters for the source database
#[derive(Clone)]
pub struct SourceCredentials {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl SourceCredentials {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password)
    }
}

/// PostgreSQL-backed source holding a single connection for the whole run.
///
/// The connection is released when this value is dropped, on every exit
/// path; [`PostgresSource::close`] additionally performs the graceful
/// protocol shutdown.
pub struct PostgresSource {
    conn: PgConnection,
}

impl PostgresSource {
    pub async fn connect(credentials: &SourceCredentials) -> Result<Self> {
        info!(
            host = %credentials.host,
            port = credentials.port,
            dbname = %credentials.dbname,
            user = %credentials.user,
            "Connecting to source database"
        );

        let conn = PgConnection::connect_with(&credentials.connect_options())
            .await
            .map_err(|e| ExtractError::Connection {
                host: format!("{}:{}", credentials.host, credentials.port),
                source: e,
            })?;

        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(|e| ExtractError::Connection {
            host: "source database".to_string(),
            source: e,
        })?;
        debug!("Source connection closed");
        Ok(())
    }
}

#[async_trait]
impl RecordSource for PostgresSource {
    async fn fetch_studies(&mut self) -> Result<Vec<RawStudy>> {
        sqlx::query_as::<_, RawStudy>(STUDY_QUERY)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExtractError::query(STUDY_DATASET, e))
    }

    async fn fetch_findings(&mut self, sources: &[String]) -> Result<Vec<RawFinding>> {
        sqlx::query_as::<_, RawFinding>(FINDINGS_QUERY)
            .bind(sources)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExtractError::query(FINDINGS_DATASET, e))
    }

    async fn fetch_ontology_terms(&mut self, domains: &[String]) -> Result<Vec<OntologyTerm>> {
        sqlx::query_as::<_, OntologyTerm>(TERMS_QUERY)
            .bind(domains)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExtractError::query("ontology terms", e))
    }

    async fn fetch_ontology_edges(&mut self) -> Result<Vec<OntologyEdge>> {
        sqlx::query_as::<_, OntologyEdge>(EDGES_QUERY)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExtractError::query("ontology relationships", e))
    }

    async fn fetch_synonyms(&mut self, domains: &[String]) -> Result<Vec<SynonymPair>> {
        sqlx::query_as::<_, SynonymPair>(SYNONYMS_QUERY)
            .bind(APPROVED_SYNONYM_STATUS)
            .bind(domains)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExtractError::query(NORMALISATION_DATASET, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credentials = SourceCredentials {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "vitic".to_string(),
            user: "postgres".to_string(),
            password: "s3cret".to_string(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("localhost"));
        assert!(!rendered.contains("s3cret"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_error() {
        let credentials = SourceCredentials {
            host: "127.0.0.1".to_string(),
            port: 1,
            dbname: "vitic".to_string(),
            user: "postgres".to_string(),
            password: "unused".to_string(),
        };

        match PostgresSource::connect(&credentials).await {
            Err(ExtractError::Connection { host, .. }) => assert_eq!(host, "127.0.0.1:1"),
            Err(other) => panic!("expected a connection error, got {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
