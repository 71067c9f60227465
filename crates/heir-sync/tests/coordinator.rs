//! Person and relationship protocols across the relational store and the
//! graph mirror.

mod common;

use chrono::NaiveDate;
use common::{fixture, ALICE};
use heir_core::types::{
    BloodType, PersonCreate, PersonUpdate, ProjectionStatus, RelationshipCreate,
    RelationshipType, RelationshipUpdate,
};
use heir_core::ErrorKind;
use heir_graph::PropertyValue;

#[tokio::test]
async fn test_create_person_projects_and_writes_back_node_ref() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;

    let person = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("Hanako").spouse())
        .await
        .unwrap();

    let node_ref = person.graph_node_ref.clone().expect("node ref written back");
    assert_eq!(person.projection_status, ProjectionStatus::Projected);

    let node = fx.graph.node(&node_ref).unwrap();
    assert_eq!(node.case_id, owned.id());
    assert_eq!(node.person_id, person.id.0);
    assert_eq!(node.props["is_spouse"], PropertyValue::Bool(true));

    let stored = fx.store.get_person(&owned, person.id).await.unwrap();
    assert_eq!(stored.graph_node_ref, Some(node_ref));
}

#[tokio::test]
async fn test_person_survives_unreachable_graph() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    fx.graph.set_failing(true);

    let err = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("Jiro"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);

    let persons = fx.store.list_persons(&owned).await.unwrap();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].name, "Jiro");
    assert!(persons[0].graph_node_ref.is_none());
    assert_eq!(persons[0].projection_status, ProjectionStatus::Failed);

    // Graph back up: the update still must not touch it.
    fx.graph.set_failing(false);
    let calls_before = fx.graph.call_count();
    let updated = fx
        .coordinator
        .update_person(
            &owned,
            persons[0].id,
            &PersonUpdate {
                name: Some("Jiro Sato".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Jiro Sato");
    assert!(updated.graph_node_ref.is_none());
    assert_eq!(fx.graph.call_count(), calls_before);
}

#[tokio::test]
async fn test_update_person_propagates_only_valued_fields() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let mut create = PersonCreate::new("Saburo");
    create.gender = Some("male".into());
    create.birth_date = NaiveDate::from_ymd_opt(1950, 1, 2);
    let person = fx.coordinator.create_person(&owned, &create).await.unwrap();

    let update = PersonUpdate {
        is_alive: Some(false),
        death_date: Some(NaiveDate::from_ymd_opt(2024, 6, 30)),
        gender: Some(None),
        ..Default::default()
    };
    let updated = fx
        .coordinator
        .update_person(&owned, person.id, &update)
        .await
        .unwrap();

    assert!(!updated.is_alive);
    assert_eq!(updated.gender, None);
    assert_eq!(updated.birth_date, NaiveDate::from_ymd_opt(1950, 1, 2));

    let node = fx.graph.node(person.graph_node_ref.as_ref().unwrap()).unwrap();
    assert_eq!(node.props["is_alive"], PropertyValue::Bool(false));
    assert_eq!(
        node.props["death_date"],
        PropertyValue::Text("2024-06-30".into())
    );
    // Clears stay relational.
    assert_eq!(node.props["gender"], PropertyValue::Text("male".into()));
    assert_eq!(node.props["name"], PropertyValue::Text("Saburo".into()));
}

#[tokio::test]
async fn test_graph_failure_on_update_keeps_relational_change() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let person = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("Shiro"))
        .await
        .unwrap();

    fx.graph.set_failing(true);
    let err = fx
        .coordinator
        .update_person(
            &owned,
            person.id,
            &PersonUpdate {
                is_spouse: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);

    let stored = fx.store.get_person(&owned, person.id).await.unwrap();
    assert!(stored.is_spouse);
}

#[tokio::test]
async fn test_relationship_between_projected_persons_gets_edge() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();

    let mut create = RelationshipCreate::new(b.id, a.id, RelationshipType::SiblingOf);
    create.is_biological = Some(true);
    create.blood_type = Some(BloodType::Half);
    let rel = fx
        .coordinator
        .create_relationship(&owned, &create)
        .await
        .unwrap();

    assert_eq!(rel.projection_status, ProjectionStatus::Projected);
    let edge = fx.graph.edge(rel.graph_edge_ref.as_ref().unwrap()).unwrap();
    assert_eq!(edge.edge_type, "SIBLING_OF");
    assert_eq!(&edge.from, &b.graph_node_ref.as_ref().unwrap().0);
    assert_eq!(&edge.to, &a.graph_node_ref.as_ref().unwrap().0);
    assert_eq!(edge.props["blood_type"], PropertyValue::Text("half".into()));
    assert_eq!(edge.props["is_biological"], PropertyValue::Bool(true));
}

#[tokio::test]
async fn test_relationship_with_unprojected_endpoint_stays_without_edge() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();

    fx.graph.set_failing(true);
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await;
    assert!(b.is_err());
    fx.graph.set_failing(false);
    let b = fx
        .store
        .list_persons(&owned)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "B")
        .unwrap();

    let calls_before = fx.graph.call_count();
    let rel = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::ChildOf),
        )
        .await
        .unwrap();

    assert!(rel.graph_edge_ref.is_none());
    assert_eq!(rel.projection_status, ProjectionStatus::Pending);
    assert_eq!(fx.graph.call_count(), calls_before);

    // Later activity on the case does not retro-project it.
    fx.coordinator
        .update_relationship(
            &owned,
            rel.id,
            &RelationshipUpdate {
                is_adopted: Some(Some(false)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stored = fx.store.get_relationship(&owned, rel.id).await.unwrap();
    assert!(stored.graph_edge_ref.is_none());
    assert_eq!(fx.graph.edge_count(), 0);
}

#[tokio::test]
async fn test_relationship_endpoint_from_other_case_is_not_found() {
    let fx = fixture().await;
    let mine = fx.case(ALICE, "Mine").await;
    let other = fx.case(ALICE, "Other").await;
    let a = fx
        .coordinator
        .create_person(&mine, &PersonCreate::new("A"))
        .await
        .unwrap();
    let stranger = fx
        .coordinator
        .create_person(&other, &PersonCreate::new("Stranger"))
        .await
        .unwrap();

    let err = fx
        .coordinator
        .create_relationship(
            &mine,
            &RelationshipCreate::new(stranger.id, a.id, RelationshipType::SpouseOf),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(fx.store.list_relationships(&mine).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relationship_type_change_replaces_edge() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();
    let rel = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::SiblingOf),
        )
        .await
        .unwrap();
    let old_edge = rel.graph_edge_ref.clone().unwrap();

    let updated = fx
        .coordinator
        .update_relationship(
            &owned,
            rel.id,
            &RelationshipUpdate {
                relationship_type: Some(RelationshipType::ChildOf),
                is_biological: Some(Some(true)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let new_edge = updated.graph_edge_ref.clone().unwrap();
    assert_ne!(new_edge, old_edge);
    assert!(fx.graph.edge(&old_edge).is_none());
    let edge = fx.graph.edge(&new_edge).unwrap();
    assert_eq!(edge.edge_type, "CHILD_OF");
    assert_eq!(edge.props["is_biological"], PropertyValue::Bool(true));
    assert_eq!(fx.graph.edge_count(), 1);
}

#[tokio::test]
async fn test_relationship_flag_change_updates_edge_in_place() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();
    let rel = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::ChildOf),
        )
        .await
        .unwrap();

    let updated = fx
        .coordinator
        .update_relationship(
            &owned,
            rel.id,
            &RelationshipUpdate {
                is_adopted: Some(Some(true)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.graph_edge_ref, rel.graph_edge_ref);
    assert_eq!(updated.is_adopted, Some(true));
    let edge = fx.graph.edge(rel.graph_edge_ref.as_ref().unwrap()).unwrap();
    assert_eq!(edge.props["is_adopted"], PropertyValue::Bool(true));
}

#[tokio::test]
async fn test_delete_person_cascades_relationships() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();
    let c = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("C"))
        .await
        .unwrap();
    fx.coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::SpouseOf),
        )
        .await
        .unwrap();
    // This edge never makes it into the graph.
    fx.graph.set_failing(true);
    let failed = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(c.id, a.id, RelationshipType::ChildOf),
        )
        .await;
    assert!(failed.is_err());
    fx.graph.set_failing(false);
    let kept = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(c.id, b.id, RelationshipType::ChildOf),
        )
        .await
        .unwrap();

    fx.coordinator.delete_person(&owned, a.id).await.unwrap();

    let remaining = fx.store.list_relationships(&owned).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
    assert!(fx.graph.node(a.graph_node_ref.as_ref().unwrap()).is_none());
    assert_eq!(fx.graph.edge_count(), 1);
}

#[tokio::test]
async fn test_delete_person_without_node_skips_graph() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    fx.graph.set_failing(true);
    let _ = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("Ghost"))
        .await;
    let ghost = fx.store.list_persons(&owned).await.unwrap().remove(0);

    // Still failing: a person with no node never needs the graph.
    fx.coordinator.delete_person(&owned, ghost.id).await.unwrap();
    assert!(fx.store.list_persons(&owned).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_graph_delete_keeps_relational_row() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let person = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();

    fx.graph.set_failing(true);
    let err = fx
        .coordinator
        .delete_person(&owned, person.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    assert!(fx.store.get_person(&owned, person.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_relationship_removes_edge_then_row() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A"))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();
    let rel = fx
        .coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::SpouseOf),
        )
        .await
        .unwrap();

    fx.coordinator.delete_relationship(&owned, rel.id).await.unwrap();

    assert_eq!(fx.graph.edge_count(), 0);
    assert_eq!(fx.graph.node_count(), 2);
    let err = fx
        .coordinator
        .get_relationship(&owned, rel.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_graph_snapshot_reads_back_the_case() {
    let fx = fixture().await;
    let owned = fx.case(ALICE, "Estate").await;
    let other = fx.case(ALICE, "Other").await;
    let a = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("A").decedent(None))
        .await
        .unwrap();
    let b = fx
        .coordinator
        .create_person(&owned, &PersonCreate::new("B"))
        .await
        .unwrap();
    fx.coordinator
        .create_person(&other, &PersonCreate::new("Elsewhere"))
        .await
        .unwrap();
    fx.coordinator
        .create_relationship(
            &owned,
            &RelationshipCreate::new(b.id, a.id, RelationshipType::ChildOf),
        )
        .await
        .unwrap();

    let tree = fx.coordinator.graph_snapshot(&owned).await.unwrap();
    assert_eq!(tree.nodes.len(), 2);
    assert_eq!(tree.edges.len(), 1);
    assert_eq!(tree.edges[0].edge_type, "CHILD_OF");
    assert!(tree
        .nodes
        .iter()
        .any(|n| n.name == "A" && n.is_decedent == Some(true)));
}
