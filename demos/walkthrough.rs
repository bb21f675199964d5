//! A scripted editing session against the models in `assets/`.
//!
//! Run with `RUST_LOG=info` to follow what the editor does.

use std::{thread, time::Duration};

use furnish_ngin::{
    Command, EditorApp, PointerEvent, PointerReply, Pose, Reply, Vector3,
    context::EditorConfig,
    data_structures::model::{Category, Model, ModelCatalog},
    gesture::{Axis, Handle, HandleKind, TransformMode},
    persistence::InteriorScene,
};

fn catalog() -> ModelCatalog {
    ModelCatalog::new(vec![
        Model::new("cube", "Storage Cube", Category::Decoration, "/models/cube.obj")
            .with_tags(["living room", "bedroom"]),
        Model::new("table", "Coffee Table", Category::Furniture, "/models/table.obj")
            .with_tags(["living room"]),
    ])
}

fn settle(app: &mut EditorApp) {
    for _ in 0..20 {
        let _ = app.frame();
        thread::sleep(Duration::from_millis(10));
    }
}

fn drag(app: &mut EditorApp, target: furnish_ngin::InstanceId, to: Vector3<f32>) -> PointerReply {
    let handle = Handle::new(HandleKind::Translate, Axis::X);
    if let PointerReply::Rejected(reason) = app.pointer(PointerEvent::Down { target, handle }) {
        log::warn!("could not grab {}: {}", target, reason);
        return PointerReply::Ignored;
    }
    app.pointer(PointerEvent::Drag(Pose::from(to)));
    app.pointer(PointerEvent::Up)
}

fn main() -> anyhow::Result<()> {
    let config = EditorConfig {
        asset_root: concat!(env!("CARGO_MANIFEST_DIR"), "/assets").into(),
        ..Default::default()
    };
    let mut app = EditorApp::with_assets(config, catalog())?;

    let Reply::Instance(cube) = app.apply(Command::AddFromCatalog {
        model_id: "cube".into(),
    }) else {
        anyhow::bail!("cube is missing from the catalog");
    };
    settle(&mut app);

    // too close to the right wall, comes back to the spawn point
    log::info!("{:?}", drag(&mut app, cube, Vector3::new(3.9, 0.01, 0.0)));
    // 2.5 away from the wall
    log::info!("{:?}", drag(&mut app, cube, Vector3::new(2.05, 0.01, 0.0)));

    app.apply(Command::RequestRecommendations {
        area: "living room".into(),
    });
    app.apply(Command::PlaceSuggested {
        model_id: "table".into(),
    });
    settle(&mut app);
    for recommendation in &app.state().recommendations {
        log::info!(
            "{} ({:.2}): {} models",
            recommendation.reason,
            recommendation.score,
            recommendation.models.len()
        );
    }

    app.apply(Command::SetEditMode(TransformMode::Rotate));
    let Reply::Scene(_) = app.apply(Command::SaveScene {
        name: "Living room".into(),
        description: None,
    }) else {
        anyhow::bail!("scene was not saved");
    };
    if let Some(scene) = &app.state().current_scene {
        let json = scene.to_json()?;
        log::info!("saved {} bytes", json.len());
        let restored = InteriorScene::from_json(&json)?;
        app.apply(Command::LoadScene(restored));
    }

    let batches = app.frame().into_batches();
    log::info!(
        "{} instances drawn, {} translucent",
        batches.instance_count(),
        batches.transparent.len()
    );
    Ok(())
}
