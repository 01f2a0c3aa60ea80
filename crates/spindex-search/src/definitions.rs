//! Resource definition builders
//!
//! Builds the JSON bodies for the four vertical resources. The shapes
//! follow the management API's REST contract; vectorization is integrated,
//! meaning the service itself calls Azure OpenAI both at indexing time
//! (embedding skill) and at query time (vectorizer on the index).

use serde_json::{json, Value};

use spindex_core::domain::vertical::VerticalNames;

/// Default split-skill chunk size in characters
pub const DEFAULT_CHUNK_SIZE: u32 = 2000;
/// Default overlap between adjacent chunks
pub const DEFAULT_CHUNK_OVERLAP: u32 = 100;
/// File extensions the indexer processes by default
pub const DEFAULT_INDEXED_EXTENSIONS: &str = ".pdf,.docx,.pptx,.txt,.xlsx,.html,.md";
/// File extensions the indexer skips by default (sidecars and exports)
pub const DEFAULT_EXCLUDED_EXTENSIONS: &str = ".json,.xml";

/// Everything the definition builders need beyond the vertical names
///
/// Connection material for the blob data source and the Azure OpenAI
/// embedding resource the skillset and vectorizer call into.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub storage_connection_string: String,
    pub container: String,
    pub openai_endpoint: String,
    pub openai_api_key: String,
    pub embedding_deployment: String,
    pub embedding_dimensions: u32,
}

/// Optional per-vertical tuning applied on top of the defaults
#[derive(Debug, Clone, Default)]
pub struct VerticalOverrides {
    pub chunk_size: Option<u32>,
    pub chunk_overlap: Option<u32>,
    pub indexed_extensions: Option<String>,
    pub excluded_extensions: Option<String>,
}

impl VerticalOverrides {
    fn chunk_size(&self) -> u32 {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    fn chunk_overlap(&self) -> u32 {
        self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP)
    }

    fn indexed_extensions(&self) -> &str {
        self.indexed_extensions
            .as_deref()
            .unwrap_or(DEFAULT_INDEXED_EXTENSIONS)
    }

    fn excluded_extensions(&self) -> &str {
        self.excluded_extensions
            .as_deref()
            .unwrap_or(DEFAULT_EXCLUDED_EXTENSIONS)
    }
}

/// Blob container data source definition
pub fn data_source_definition(name: &str, ctx: &ProvisionContext) -> Value {
    json!({
        "name": name,
        "type": "azureblob",
        "credentials": {
            "connectionString": ctx.storage_connection_string,
        },
        "container": {
            "name": ctx.container,
        },
    })
}

/// Search index definition with integrated vectorization
///
/// The `id` key is the base64-encoded storage path, so re-indexing the
/// same blob updates its document instead of duplicating it.
pub fn index_definition(name: &str, ctx: &ProvisionContext) -> Value {
    json!({
        "name": name,
        "fields": [
            {
                "name": "id",
                "type": "Edm.String",
                "key": true,
                "searchable": false,
                "filterable": true,
                "sortable": true,
            },
            {
                "name": "title",
                "type": "Edm.String",
                "searchable": true,
                "filterable": false,
                "sortable": true,
            },
            {
                "name": "content",
                "type": "Edm.String",
                "searchable": true,
                "filterable": false,
                "sortable": false,
            },
            {
                "name": "source_url",
                "type": "Edm.String",
                "searchable": false,
                "filterable": true,
                "sortable": false,
            },
            {
                "name": "lastModified",
                "type": "Edm.DateTimeOffset",
                "searchable": false,
                "filterable": true,
                "sortable": true,
            },
            {
                "name": "size",
                "type": "Edm.Int64",
                "searchable": false,
                "filterable": true,
                "sortable": true,
            },
            {
                "name": "file_extension",
                "type": "Edm.String",
                "searchable": false,
                "filterable": true,
                "facetable": true,
            },
            {
                "name": "content_vector",
                "type": "Collection(Edm.Single)",
                "searchable": true,
                "retrievable": true,
                "dimensions": ctx.embedding_dimensions,
                "vectorSearchProfile": "vector-profile",
            },
        ],
        "vectorSearch": {
            "algorithms": [
                {
                    "name": "hnsw-algorithm",
                    "kind": "hnsw",
                    "hnswParameters": {
                        "metric": "cosine",
                        "m": 4,
                        "efConstruction": 400,
                        "efSearch": 500,
                    },
                },
            ],
            "profiles": [
                {
                    "name": "vector-profile",
                    "algorithm": "hnsw-algorithm",
                    "vectorizer": "openai-vectorizer",
                },
            ],
            "vectorizers": [
                {
                    "name": "openai-vectorizer",
                    "kind": "azureOpenAI",
                    "azureOpenAIParameters": {
                        "resourceUri": ctx.openai_endpoint,
                        "deploymentId": ctx.embedding_deployment,
                        "apiKey": ctx.openai_api_key,
                        "modelName": ctx.embedding_deployment,
                    },
                },
            ],
        },
    })
}

/// Skillset definition: split into chunks, embed each chunk
pub fn skillset_definition(
    name: &str,
    ctx: &ProvisionContext,
    overrides: &VerticalOverrides,
) -> Value {
    json!({
        "name": name,
        "description": "Chunk documents and embed the chunks with Azure OpenAI",
        "skills": [
            {
                "@odata.type": "#Microsoft.Skills.Text.SplitSkill",
                "context": "/document",
                "textSplitMode": "pages",
                "maximumPageLength": overrides.chunk_size(),
                "pageOverlapLength": overrides.chunk_overlap(),
                "inputs": [
                    {"name": "text", "source": "/document/content"},
                ],
                "outputs": [
                    {"name": "textItems", "targetName": "pages"},
                ],
            },
            {
                "@odata.type": "#Microsoft.Skills.Text.AzureOpenAIEmbeddingSkill",
                "context": "/document/pages/*",
                "resourceUri": ctx.openai_endpoint,
                "apiKey": ctx.openai_api_key,
                "deploymentId": ctx.embedding_deployment,
                "modelName": ctx.embedding_deployment,
                "dimensions": ctx.embedding_dimensions,
                "inputs": [
                    {"name": "text", "source": "/document/pages/*"},
                ],
                "outputs": [
                    {"name": "embedding", "targetName": "content_vector"},
                ],
            },
        ],
    })
}

/// Indexer definition wiring data source, skillset and index together
///
/// Runs on a 30-minute schedule and tolerates unsupported or
/// unprocessable documents instead of failing the whole run.
pub fn indexer_definition(names: &VerticalNames, overrides: &VerticalOverrides) -> Value {
    json!({
        "name": names.indexer,
        "dataSourceName": names.data_source,
        "targetIndexName": names.index,
        "skillsetName": names.skillset,
        "schedule": {
            "interval": "PT30M",
        },
        "parameters": {
            "configuration": {
                "dataToExtract": "contentAndMetadata",
                "parsingMode": "default",
                "indexedFileNameExtensions": overrides.indexed_extensions(),
                "excludedFileNameExtensions": overrides.excluded_extensions(),
                "failOnUnsupportedContentType": false,
                "failOnUnprocessableDocument": false,
            },
        },
        "fieldMappings": [
            {
                "sourceFieldName": "metadata_storage_path",
                "targetFieldName": "id",
                "mappingFunction": {"name": "base64Encode"},
            },
            {
                "sourceFieldName": "metadata_storage_name",
                "targetFieldName": "title",
            },
            {
                "sourceFieldName": "metadata_storage_path",
                "targetFieldName": "source_url",
            },
            {
                "sourceFieldName": "metadata_storage_last_modified",
                "targetFieldName": "lastModified",
            },
            {
                "sourceFieldName": "metadata_storage_size",
                "targetFieldName": "size",
            },
            {
                "sourceFieldName": "metadata_storage_file_extension",
                "targetFieldName": "file_extension",
            },
        ],
        "outputFieldMappings": [
            {
                "sourceFieldName": "/document/pages/*/content_vector",
                "targetFieldName": "content_vector",
            },
        ],
    })
}
