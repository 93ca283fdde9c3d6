//! Control Plane Module Tests
//!
//! Validates the wire contracts and error tagging of the control-plane client.
//!
//! ## Test Scopes
//! - **Wire format**: Decoding of literal control-plane responses (camelCase fields, optional parts).
//! - **Ingestion**: Role parsing of status listings, including unknown names.
//! - **Errors**: Stage rendering and not-found classification.
//!
//! *Note: HTTP round trips against the mock backend live in `tests/end_to_end.rs`.*

#[cfg(test)]
mod tests {
    use crate::control_plane::client::parse_components;
    use crate::control_plane::error::{ControlPlaneError, Stage};
    use crate::control_plane::protocol::*;
    use crate::topology::types::{ComponentDto, ComponentRole, ComponentStatus};

    // ============================================================
    // WIRE FORMAT TESTS
    // ============================================================

    #[test]
    fn test_status_toggle_response_decodes_migrations() {
        let body = r#"{
            "name": "Extent Node 1",
            "status": "down",
            "migrations": [{"file": "report.pdf", "from": "Extent Node 1", "to": "Extent Node 3"}]
        }"#;

        let resp: StatusToggleResponse = serde_json::from_str(body).unwrap();

        assert_eq!(resp.status, ComponentStatus::Down);
        assert_eq!(
            resp.migrations,
            vec![MigrationEntry {
                file: "report.pdf".to_string(),
                from: "Extent Node 1".to_string(),
                to: "Extent Node 3".to_string(),
            }]
        );
    }

    #[test]
    fn test_status_toggle_response_without_migrations() {
        let body = r#"{"name": "Partition Manager", "status": "down"}"#;

        let resp: StatusToggleResponse = serde_json::from_str(body).unwrap();

        assert!(resp.migrations.is_empty());
    }

    #[test]
    fn test_camel_case_fields() {
        let assignment: PartitionAssignment =
            serde_json::from_str(r#"{"partitionServer": "Partition Server 2", "key": "a.txt"}"#)
                .unwrap();
        assert_eq!(assignment.partition_server, "Partition Server 2");

        let location: StreamLocation =
            serde_json::from_str(r#"{"filename": "a.txt", "extentNodeId": "Extent Node 4"}"#)
                .unwrap();
        assert_eq!(location.extent_node_id, "Extent Node 4");

        let metadata: FileMetadata = serde_json::from_str(
            r#"{"filename": "a.txt", "primaryExtentNode": "Extent Node 1", "secondaryExtentNode1": "Extent Node 2"}"#,
        )
        .unwrap();
        assert_eq!(metadata.primary_extent_node, "Extent Node 1");
        assert_eq!(metadata.secondary_extent_node1.as_deref(), Some("Extent Node 2"));
        assert!(metadata.secondary_extent_node2.is_none());
    }

    #[test]
    fn test_error_body_is_optional() {
        let with: ErrorBody = serde_json::from_str(r#"{"error": "Extent Node is down"}"#).unwrap();
        let without: ErrorBody = serde_json::from_str(r#"{"extentNodeId": "Extent Node 1"}"#).unwrap();

        assert_eq!(with.error.as_deref(), Some("Extent Node is down"));
        assert!(without.error.is_none());
    }

    // ============================================================
    // INGESTION TESTS
    // ============================================================

    #[test]
    fn test_parse_components_drops_unknown_names() {
        let raw = vec![
            ComponentDto {
                name: "Front-End Service".to_string(),
                status: ComponentStatus::Up,
            },
            ComponentDto {
                name: "Coffee Machine".to_string(),
                status: ComponentStatus::Down,
            },
            ComponentDto {
                name: "Extent Node 2".to_string(),
                status: ComponentStatus::Down,
            },
        ];

        let snapshot = parse_components(raw);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, ComponentRole::FrontEnd);
        assert_eq!(snapshot[1].role, ComponentRole::ExtentNode(2));
        assert_eq!(snapshot[1].status, ComponentStatus::Down);
    }

    // ============================================================
    // ERROR TESTS
    // ============================================================

    #[test]
    fn test_stage_display_uses_diagram_identity() {
        assert_eq!(Stage::System.to_string(), "system");
        assert_eq!(Stage::FileNotFound.to_string(), "file_not_found");
        assert_eq!(
            Stage::Component(ComponentRole::ExtentNode(3)).to_string(),
            "Extent Node 3"
        );
        assert_eq!(
            Stage::Component(ComponentRole::StreamManager).to_string(),
            "Stream Manager"
        );
    }

    #[test]
    fn test_error_classification() {
        let missing = ControlPlaneError::new(Stage::FileNotFound, "no such file");
        let down = ControlPlaneError::new(
            Stage::Component(ComponentRole::PartitionManager),
            "Partition Manager is down",
        );

        assert!(missing.is_not_found());
        assert!(!down.is_not_found());
        assert_eq!(down.to_string(), "[Partition Manager] Partition Manager is down");
    }
}
