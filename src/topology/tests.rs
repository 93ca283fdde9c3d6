//! Topology Module Tests
//!
//! Validates role parsing and the snapshot semantics of the topology model.
//!
//! ## Test Scopes
//! - **Roles**: Parsing of the fixed name namespace and round trips through `Display`.
//! - **Lookup**: `find_by_role`, `is_up` and `status_of` over a snapshot.
//! - **Model**: Wholesale replacement on fetch and soft failure when the control plane is unreachable.

#[cfg(test)]
mod tests {
    use crate::testing::{ScriptedControlPlane, healthy_components};
    use crate::topology::model::{TopologyModel, find_by_role, is_up, status_of};
    use crate::topology::types::{Component, ComponentRole, ComponentStatus};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    // ============================================================
    // ROLE PARSING TESTS
    // ============================================================

    #[test]
    fn test_parse_fixed_names() {
        assert_eq!("Front-End Service".parse::<ComponentRole>(), Ok(ComponentRole::FrontEnd));
        assert_eq!("Partition Manager".parse::<ComponentRole>(), Ok(ComponentRole::PartitionManager));
        assert_eq!("Stream Manager".parse::<ComponentRole>(), Ok(ComponentRole::StreamManager));
    }

    #[test]
    fn test_parse_indexed_names() {
        assert_eq!(
            "Partition Server 2".parse::<ComponentRole>(),
            Ok(ComponentRole::PartitionServer(2))
        );
        assert_eq!("Extent Node 14".parse::<ComponentRole>(), Ok(ComponentRole::ExtentNode(14)));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!("Extent Node".parse::<ComponentRole>().is_err());
        assert!("Extent Node X".parse::<ComponentRole>().is_err());
        assert!("extent node 1".parse::<ComponentRole>().is_err());
        assert!("Load Balancer".parse::<ComponentRole>().is_err());
    }

    #[test]
    fn test_display_matches_control_plane_names() {
        for name in [
            "Front-End Service",
            "Partition Manager",
            "Stream Manager",
            "Partition Server 1",
            "Extent Node 3",
        ] {
            let role: ComponentRole = name.parse().unwrap();
            assert_eq!(role.to_string(), name);
        }
    }

    #[test]
    fn test_component_wire_format() {
        let component: Component =
            serde_json::from_str(r#"{"name": "Extent Node 2", "status": "down"}"#).unwrap();

        assert_eq!(component.role, ComponentRole::ExtentNode(2));
        assert_eq!(component.status, ComponentStatus::Down);
        assert_eq!(
            serde_json::to_value(&component).unwrap(),
            serde_json::json!({"name": "Extent Node 2", "status": "down"})
        );
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("UP".parse::<ComponentStatus>(), Ok(ComponentStatus::Up));
        assert_eq!(" down ".parse::<ComponentStatus>(), Ok(ComponentStatus::Down));
        assert!("sideways".parse::<ComponentStatus>().is_err());
    }

    // ============================================================
    // LOOKUP TESTS
    // ============================================================

    #[test]
    fn test_find_by_role_returns_first_match() {
        let mut snapshot = healthy_components();
        snapshot[5].status = ComponentStatus::Down; // Extent Node 1

        let first_up_extent = find_by_role(&snapshot, |role| {
            role.is_extent_node()
        });
        assert_eq!(first_up_extent.unwrap().role, ComponentRole::ExtentNode(1));
        assert!(!is_up(first_up_extent.unwrap()));

        assert_eq!(
            status_of(&snapshot, ComponentRole::PartitionManager),
            Some(ComponentStatus::Up)
        );
        assert_eq!(status_of(&snapshot, ComponentRole::ExtentNode(9)), None);
    }

    // ============================================================
    // MODEL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_fetch_replaces_snapshot() {
        let control = Arc::new(ScriptedControlPlane::healthy("Partition Server 1", "Extent Node 1"));
        let topology = TopologyModel::new(control.clone());

        assert!(topology.latest().is_empty());

        let first = topology.fetch_status().await;
        assert_eq!(first.len(), 9);

        control.set_status(ComponentRole::StreamManager, ComponentStatus::Down);
        let second = topology.fetch_status().await;

        assert_eq!(
            status_of(&second, ComponentRole::StreamManager),
            Some(ComponentStatus::Down)
        );
        // The earlier snapshot is a separate value and was not touched.
        assert_eq!(
            status_of(&first, ComponentRole::StreamManager),
            Some(ComponentStatus::Up)
        );
        assert_eq!(topology.latest(), second);
    }

    #[tokio::test]
    async fn test_fetch_fails_soft() {
        let control = Arc::new(ScriptedControlPlane::healthy("Partition Server 1", "Extent Node 1"));
        let topology = TopologyModel::new(control.clone());
        topology.fetch_status().await;

        control.status_unreachable.store(true, Ordering::SeqCst);
        let snapshot = topology.fetch_status().await;

        assert!(snapshot.is_empty());
        assert!(topology.latest().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let control = Arc::new(ScriptedControlPlane::healthy("Partition Server 1", "Extent Node 1"));
        let topology = TopologyModel::new(control);
        let mut rx = topology.subscribe();

        topology.fetch_status().await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 9);
    }
}
