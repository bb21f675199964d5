use furnish_ngin::{
    Command, PointerEvent, PointerReply, Pose, Reply,
    data_structures::{
        instance::{NewInstance, Property},
        room::DimensionsPatch,
    },
    error::GestureRejected,
    gesture::{
        Axis, GestureOutcome, Handle, HandleKind, HandleSet, RevertReason, TransformMode,
    },
    persistence::InteriorScene,
    pick::Ray,
    render::{BLOCKED_OPACITY, Highlight, Render},
    resources::GeometryState,
    snap::SnapAxis,
    store::InstanceView,
};

use crate::common::test_utils::{app, pump, v};

mod common;

const MOVE_X: Handle = Handle {
    kind: HandleKind::Translate,
    axis: Axis::X,
};

fn instance_id(reply: Reply) -> furnish_ngin::InstanceId {
    match reply {
        Reply::Instance(id) => id,
        other => panic!("expected an instance, got {:?}", other),
    }
}

fn pose_at(x: f32, y: f32, z: f32) -> Pose {
    Pose::from(v(x, y, z))
}

#[test]
fn catalog_instance_renders_once_geometry_arrives() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));

    let instance = app.state().store.instance(id).unwrap();
    assert_eq!(instance.name, "Cube 1");
    assert_eq!(instance.position, v(0.0, 0.01, 0.0));
    assert_eq!(app.state().store.selected(), Some(id));
    assert!(matches!(
        app.state().geometry.state("cube"),
        Some(GeometryState::Pending)
    ));

    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));
    let batches = app.frame().into_batches();
    assert_eq!(batches.opaque.len(), 1);
    assert_eq!(batches.opaque[0].id, id);
    assert_eq!(batches.opaque[0].model_id, "cube");
    assert_eq!(batches.opaque[0].highlight, Highlight::Selected);
    assert_eq!(batches.handles.len(), 1);
    assert_eq!(
        batches.handles[0].handles,
        HandleSet::for_mode(TransformMode::Translate)
    );
}

#[test]
fn catalog_names_count_up_and_use_default_scale() {
    let mut app = app();
    app.apply(Command::AddFromCatalog {
        model_id: "sofa".into(),
    });
    let second = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "sofa".into(),
    }));

    let sofa = app.state().store.instance(second).unwrap();
    assert_eq!(sofa.name, "Modern Sofa 2");
    assert_eq!(sofa.scale, v(1.2, 1.0, 1.2));
    assert_eq!(
        app.apply(Command::AddFromCatalog {
            model_id: "wardrobe".into()
        }),
        Reply::Ignored
    );
}

#[test]
fn failed_model_is_neither_drawn_nor_collidable() {
    let mut app = app();
    let broken = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("broken", "Lamp").at(v(0.0, 0.0, 0.0)),
    )));
    let cube = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "Cube").at(v(-2.0, 0.0, 0.0)),
    )));

    assert!(pump(&mut app, |app| {
        app.state().geometry.is_failed("broken") && app.state().geometry.is_loaded("cube")
    }));
    assert!(app.state().store.instance(broken).is_some());
    let batches = app.frame().into_batches();
    assert!(batches.find(broken).is_none());
    assert!(batches.find(cube).is_some());

    // right on top of the lamp
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: cube,
            handle: MOVE_X
        }),
        PointerReply::Started
    );
    app.pointer(PointerEvent::Drag(pose_at(0.0, 0.0, 0.0)));
    match app.pointer(PointerEvent::Up) {
        PointerReply::Finished(outcome) => assert!(outcome.is_committed()),
        other => panic!("expected the gesture to finish, got {:?}", other),
    }
    assert_eq!(
        app.state().store.instance(cube).unwrap().position,
        v(0.0, 0.0, 0.0)
    );
}

#[test]
fn blocked_drag_renders_translucent_and_reverts() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    app.pointer(PointerEvent::Down {
        target: id,
        handle: MOVE_X,
    });
    match app.pointer(PointerEvent::Drag(pose_at(3.55, 0.01, 0.0))) {
        PointerReply::Feedback(feedback) => assert_eq!(feedback.highlight, Highlight::Blocked),
        other => panic!("expected feedback, got {:?}", other),
    }

    let batches = app.frame().into_batches();
    assert!(batches.opaque.is_empty());
    assert_eq!(batches.transparent.len(), 1);
    let dragged = &batches.transparent[0];
    assert_eq!(dragged.raw.highlight, Highlight::Blocked as u32);
    assert_eq!(dragged.raw.opacity, BLOCKED_OPACITY);
    assert_eq!(dragged.raw.model[3][0], 3.55);
    assert_eq!(batches.handles[0].snap, SnapAxis::None);
    assert_eq!(app.state().store.instance(id).unwrap().position.x, 0.0);

    let reply = app.pointer(PointerEvent::Up);
    assert!(matches!(
        reply,
        PointerReply::Finished(GestureOutcome::Reverted {
            reason: RevertReason::Blocked,
            ..
        })
    ));
    assert_eq!(app.last_outcome().map(|o| o.target()), Some(id));
    assert_eq!(
        app.state().store.instance(id).unwrap().position,
        v(0.0, 0.01, 0.0)
    );
    let batches = app.frame().into_batches();
    assert_eq!(batches.opaque.len(), 1);
    assert_eq!(batches.opaque[0].raw.opacity, 1.0);
}

#[test]
fn snapping_can_be_switched_off() {
    let mut app = app();
    let a = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "A").at(v(-2.0, 0.0, -2.0)),
    )));
    app.apply(Command::AddInstance(
        NewInstance::new("cube", "B").at(v(2.0, 0.0, 2.0)),
    ));
    app.apply(Command::Select(Some(a)));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    app.pointer(PointerEvent::Down {
        target: a,
        handle: MOVE_X,
    });
    app.pointer(PointerEvent::Drag(pose_at(-1.0, 0.0, 2.3)));
    app.pointer(PointerEvent::Up);
    assert_eq!(
        app.state().store.instance(a).unwrap().position,
        v(-1.0, 0.0, 2.0)
    );

    app.apply(Command::SetSnapping(false));
    assert!(!app.ctx().config.snap.enabled);
    app.pointer(PointerEvent::Down {
        target: a,
        handle: MOVE_X,
    });
    app.pointer(PointerEvent::Drag(pose_at(-1.0, 0.0, 2.3)));
    app.pointer(PointerEvent::Up);
    assert_eq!(
        app.state().store.instance(a).unwrap().position,
        v(-1.0, 0.0, 2.3)
    );
}

#[test]
fn click_picks_nearest_instance_or_clears_selection() {
    let mut app = app();
    let near = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "Near").at(v(0.0, 0.0, 2.0)),
    )));
    let far = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "Far").at(v(0.0, 0.0, -2.0)),
    )));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    let ray = Ray::new(v(0.0, 0.5, 6.0), v(0.0, 0.0, -1.0));
    assert_eq!(
        app.pointer(PointerEvent::Click(ray)),
        PointerReply::Selected(Some(near))
    );
    assert_eq!(app.state().store.selected(), Some(near));

    app.apply(Command::SetProperty(near, Property::Visible(false)));
    assert_eq!(
        app.pointer(PointerEvent::Click(ray)),
        PointerReply::Selected(Some(far))
    );

    let miss = Ray::new(v(3.0, 5.0, 3.0), v(0.0, -1.0, 0.0));
    assert_eq!(
        app.pointer(PointerEvent::Click(miss)),
        PointerReply::Selected(None)
    );
    assert_eq!(app.state().store.selected(), None);
}

#[test]
fn pointer_down_respects_selection_lock_and_active_session() {
    let mut app = app();
    let a = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    let b = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "B").at(v(3.0, 0.0, 0.0)),
    )));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: a,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::NotSelected(a))
    );

    app.apply(Command::SetProperty(b, Property::Locked(true)));
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: b,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::Locked(b))
    );

    app.apply(Command::SetProperty(b, Property::Locked(false)));
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: b,
            handle: MOVE_X
        }),
        PointerReply::Started
    );
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: b,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::SessionActive(b))
    );
    assert_eq!(
        app.pointer(PointerEvent::Click(Ray::new(
            v(0.0, 5.0, 0.0),
            v(0.0, -1.0, 0.0)
        ))),
        PointerReply::Ignored
    );
}

#[test]
fn undrawn_instances_cannot_be_grabbed() {
    let mut app = app();
    let lamp = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "broken".into(),
    }));
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: lamp,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::NotRendered(lamp))
    );
    assert!(pump(&mut app, |app| app.state().geometry.is_failed("broken")));
    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: lamp,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::NotRendered(lamp))
    );

    let cube = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));
    app.apply(Command::SetProperty(cube, Property::Visible(false)));
    assert!(app.frame().into_batches().handles.is_empty());

    assert_eq!(
        app.pointer(PointerEvent::Down {
            target: cube,
            handle: MOVE_X
        }),
        PointerReply::Rejected(GestureRejected::NotRendered(cube))
    );
    assert!(app.controller().session().is_none());
}

#[test]
fn loading_a_scene_drops_the_active_gesture() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));
    app.apply(Command::SaveScene {
        name: "Start".into(),
        description: None,
    });
    let saved = app.state().current_scene.clone().unwrap();

    app.apply(Command::SetProperty(id, Property::Position(v(1.0, 0.0, 1.0))));
    app.pointer(PointerEvent::Down {
        target: id,
        handle: MOVE_X,
    });
    app.apply(Command::LoadScene(saved));
    assert!(app.controller().session().is_none());

    // the stale drag must not reach the loaded instance
    app.apply(Command::Select(Some(id)));
    assert_eq!(
        app.pointer(PointerEvent::Drag(pose_at(1.2, 0.0, 1.0))),
        PointerReply::Ignored
    );
    assert_eq!(app.pointer(PointerEvent::Up), PointerReply::Ignored);
    assert_eq!(
        app.state().store.instance(id).unwrap().position,
        v(0.0, 0.01, 0.0)
    );
    assert_eq!(app.last_outcome(), None);
}

#[test]
fn deleting_dragged_instance_ends_the_gesture() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));
    app.pointer(PointerEvent::Down {
        target: id,
        handle: MOVE_X,
    });

    assert_eq!(app.apply(Command::Delete(id)), Reply::Done);
    let reply = app.pointer(PointerEvent::Drag(pose_at(1.0, 0.0, 0.0)));

    assert!(matches!(
        reply,
        PointerReply::Finished(GestureOutcome::Reverted {
            reason: RevertReason::TargetMissing,
            ..
        })
    ));
    assert!(app.state().store.is_empty());
    assert!(!app.controller().is_dragging());
    assert_eq!(app.pointer(PointerEvent::Up), PointerReply::Ignored);
}

#[test]
fn edit_mode_changes_the_handles_shown() {
    let mut app = app();
    app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    });
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    app.apply(Command::SetEditMode(TransformMode::Rotate));
    let batches = app.frame().into_batches();
    assert_eq!(
        batches.handles[0].handles,
        HandleSet::for_mode(TransformMode::Rotate)
    );
    assert_eq!(app.controller().mode(), TransformMode::Rotate);
}

#[test]
fn locked_selection_shows_no_handles() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));
    app.apply(Command::SetProperty(id, Property::Locked(true)));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    let batches = app.frame().into_batches();
    assert_eq!(batches.instance_count(), 1);
    assert!(batches.handles.is_empty());
}

#[test]
fn duplicate_and_delete_commands() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));

    let copy = instance_id(app.apply(Command::Duplicate(id)));
    let duplicate = app.state().store.instance(copy).unwrap();
    assert_eq!(duplicate.name, "Cube 1 (copy)");
    assert_eq!(duplicate.position, v(0.5, 0.01, 0.5));
    assert_eq!(app.state().store.selected(), Some(copy));

    assert_eq!(app.apply(Command::Delete(id)), Reply::Done);
    assert_eq!(app.apply(Command::Delete(id)), Reply::Ignored);
    assert_eq!(app.apply(Command::Duplicate(id)), Reply::Ignored);
    assert_eq!(app.state().store.len(), 1);
}

#[test]
fn changing_model_requests_new_geometry() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }));

    app.apply(Command::SetProperty(id, Property::ModelId("table".into())));

    assert!(app.state().geometry.state("table").is_some());
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("table")));
    let batches = app.frame().into_batches();
    assert_eq!(batches.find(id).unwrap().model_id, "table");
}

#[test]
fn recommendations_arrive_on_a_later_frame() {
    let mut app = app();
    assert_eq!(
        app.apply(Command::RequestRecommendations {
            area: "living room".into()
        }),
        Reply::Done
    );

    assert!(pump(&mut app, |app| !app.state().recommendations.is_empty()));
    let recommendation = &app.state().recommendations[0];
    assert_eq!(recommendation.area, "living room");
    let ids: Vec<&str> = recommendation.models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["cube", "sofa"]);
}

#[test]
fn suggested_position_is_placed_like_a_catalog_add() {
    let mut app = app();
    assert_eq!(
        app.apply(Command::PlaceSuggested {
            model_id: "cube".into()
        }),
        Reply::Done
    );
    assert!(app.state().store.is_empty());

    assert!(pump(&mut app, |app| app.state().store.len() == 1));
    let placed = &app.state().store.list()[0];
    assert_eq!(placed.position, v(1.0, 0.0, -1.0));
    assert_eq!(placed.name, "Cube 1");
    assert_eq!(app.state().store.selected(), Some(placed.id));

    assert_eq!(
        app.apply(Command::PlaceSuggested {
            model_id: "wardrobe".into()
        }),
        Reply::Ignored
    );
}

#[test]
fn saved_scene_restores_instances_and_room() {
    let mut app = app();
    app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    });
    app.apply(Command::AddInstance(
        NewInstance::new("table", "Table").at(v(2.0, 0.0, -1.0)),
    ));
    let saved_instances = app.state().store.list().to_vec();

    let id = match app.apply(Command::SaveScene {
        name: "Living room".into(),
        description: Some("first draft".into()),
    }) {
        Reply::Scene(id) => id,
        other => panic!("expected a scene, got {:?}", other),
    };
    let json = app.state().current_scene.as_ref().unwrap().to_json().unwrap();

    for instance in saved_instances.iter() {
        app.apply(Command::Delete(instance.id));
    }
    app.apply(Command::UpdateRoom(DimensionsPatch {
        width: Some(12.0),
        ..Default::default()
    }));
    assert_eq!(app.state().room.dimensions().width, 12.0);

    let scene = InteriorScene::from_json(&json).unwrap();
    assert_eq!(scene.id, id);
    assert_eq!(app.apply(Command::LoadScene(scene)), Reply::Scene(id));

    assert_eq!(app.state().store.list(), saved_instances.as_slice());
    assert_eq!(app.state().store.selected(), None);
    assert_eq!(app.state().room.dimensions().width, 9.1);
    let current = app.state().current_scene.as_ref().unwrap();
    assert_eq!(current.name, "Living room");
    assert!(current.modified >= current.created);
}

#[test]
fn room_resize_moves_walls() {
    let mut app = app();
    let id = instance_id(app.apply(Command::AddInstance(
        NewInstance::new("cube", "Cube").at(v(3.0, 0.0, 0.0)),
    )));
    assert!(pump(&mut app, |app| app.state().geometry.is_loaded("cube")));

    app.pointer(PointerEvent::Down {
        target: id,
        handle: MOVE_X,
    });
    let reply = app.pointer(PointerEvent::Drag(pose_at(3.5, 0.0, 0.0)));
    assert!(matches!(reply, PointerReply::Feedback(f) if f.highlight == Highlight::Blocked));
    app.pointer(PointerEvent::Up);

    app.apply(Command::UpdateRoom(DimensionsPatch {
        width: Some(12.0),
        ..Default::default()
    }));
    app.pointer(PointerEvent::Down {
        target: id,
        handle: MOVE_X,
    });
    let reply = app.pointer(PointerEvent::Drag(pose_at(3.5, 0.0, 0.0)));
    assert!(matches!(reply, PointerReply::Feedback(f) if f.highlight == Highlight::Selected));
}

#[test]
fn empty_scene_renders_nothing_and_frames_count() {
    let mut app = app();
    assert_eq!(app.frame(), Render::None);
    assert_eq!(app.frame(), Render::None);
    assert_eq!(app.ctx().frame, 2);
}
