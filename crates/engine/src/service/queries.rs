//! GraphQL documents for the batch change execution operations.

use srcbatch_api::{Operation, SchemaField};

pub const UPSERT_EMPTY_BATCH_CHANGE: Operation = Operation {
    name: "UpsertEmptyBatchChange",
    feature_field: SchemaField {
        type_name: "Mutation",
        field_name: "upsertEmptyBatchChange",
    },
    document: r#"
mutation UpsertEmptyBatchChange(
    $name: String!
    $namespace: ID!
) {
    upsertEmptyBatchChange(
        name: $name,
        namespace: $namespace
    ) {
        id
        name
    }
}
"#,
};

pub const CREATE_BATCH_SPEC_FROM_RAW: Operation = Operation {
    name: "CreateBatchSpecFromRaw",
    feature_field: SchemaField {
        type_name: "Mutation",
        field_name: "createBatchSpecFromRaw",
    },
    document: r#"
mutation CreateBatchSpecFromRaw(
    $batchSpec: String!,
    $namespace: ID!,
    $allowIgnored: Boolean!,
    $allowUnsupported: Boolean!,
    $noCache: Boolean!,
    $batchChange: ID!,
) {
    createBatchSpecFromRaw(
        batchSpec: $batchSpec,
        namespace: $namespace,
        allowIgnored: $allowIgnored,
        allowUnsupported: $allowUnsupported,
        noCache: $noCache,
        batchChange: $batchChange,
    ) {
        id
    }
}
"#,
};

pub const EXECUTE_BATCH_SPEC: Operation = Operation {
    name: "ExecuteBatchSpec",
    feature_field: SchemaField {
        type_name: "Mutation",
        field_name: "executeBatchSpec",
    },
    document: r#"
mutation ExecuteBatchSpec($batchSpec: ID!, $noCache: Boolean!) {
    executeBatchSpec(batchSpec: $batchSpec, noCache: $noCache) {
        id
    }
}
"#,
};

pub const BATCH_SPEC_WORKSPACE_RESOLUTION: Operation = Operation {
    name: "BatchSpecWorkspaceResolution",
    feature_field: SchemaField {
        type_name: "BatchSpec",
        field_name: "workspaceResolution",
    },
    document: r#"
query BatchSpecWorkspaceResolution($batchSpec: ID!) {
    node(id: $batchSpec) {
        __typename
        ... on BatchSpec {
            workspaceResolution {
                failureMessage
                state
            }
        }
    }
}
"#,
};

/// Every operation the engine issues.
pub const ALL_OPERATIONS: [Operation; 4] = [
    UPSERT_EMPTY_BATCH_CHANGE,
    CREATE_BATCH_SPEC_FROM_RAW,
    EXECUTE_BATCH_SPEC,
    BATCH_SPEC_WORKSPACE_RESOLUTION,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_declare_their_operation_name_and_feature_field() {
        for operation in ALL_OPERATIONS {
            assert!(
                operation.document.contains(&format!(" {}(", operation.name)),
                "document for {} should declare the operation",
                operation.name
            );
            assert!(
                operation.document.contains(operation.feature_field.field_name),
                "document for {} should select {}",
                operation.name,
                operation.feature_field.field_name
            );
        }
    }
}
